// src/dag/tracker.rs

//! Kahn-style readiness tracking.
//!
//! [`ReadinessTracker::prepare`] validates the dependency structure
//! (every referenced id exists, no cycles) and seeds an
//! outstanding-dependency count per node. [`ReadinessTracker::mark_done`]
//! decrements the counts of dependents; a dependent reaching zero becomes
//! ready. A node that fails is simply never marked done, which leaves its
//! transitive dependents permanently un-ready — the runner turns that
//! into the "blocked" portion of its report.

use std::collections::{HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::{debug, warn};

use crate::dag::graph::{Graph, NodeId};
use crate::errors::{DagError, Result};

pub struct ReadinessTracker {
    /// Number of not-yet-done dependencies per node.
    outstanding: HashMap<NodeId, usize>,
    /// Reverse edges: node id -> ids of nodes that depend on it.
    dependents: HashMap<NodeId, Vec<NodeId>>,
    /// Nodes whose dependencies are all done and which have not been
    /// handed out yet.
    ready: Vec<NodeId>,
    /// Guards against double `mark_done`.
    done: HashSet<NodeId>,
}

impl ReadinessTracker {
    /// Validate the graph's dependency structure and build the tracker.
    ///
    /// Fails with [`DagError::MissingDependency`] if any dependency id is
    /// not a graph member, or [`DagError::Cycle`] if the dependency
    /// relation is cyclic. Zero-dependency nodes start out ready.
    pub fn prepare<V>(graph: &Graph<V>) -> Result<Self> {
        for (id, node) in graph.iter() {
            for dep in node.dependencies() {
                if !graph.contains(dep) {
                    return Err(DagError::MissingDependency {
                        node: id.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        // Edge direction: dep -> node, so a topological sort fails
        // exactly when the dependency relation has a cycle.
        let mut digraph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for id in graph.node_ids() {
            digraph.add_node(id);
        }
        for (id, node) in graph.iter() {
            for dep in node.dependencies() {
                digraph.add_edge(dep.as_str(), id.as_str(), ());
            }
        }
        if let Err(cycle) = toposort(&digraph, None) {
            return Err(DagError::Cycle(cycle.node_id().to_string()));
        }

        let mut outstanding: HashMap<NodeId, usize> = HashMap::new();
        let mut dependents: HashMap<NodeId, Vec<NodeId>> = HashMap::new();

        for (id, node) in graph.iter() {
            outstanding.insert(id.clone(), node.dependencies().len());
            for dep in node.dependencies() {
                dependents.entry(dep.clone()).or_default().push(id.clone());
            }
        }

        let ready: Vec<NodeId> = outstanding
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(id, _)| id.clone())
            .collect();

        debug!(
            nodes = outstanding.len(),
            initially_ready = ready.len(),
            "readiness tracker prepared"
        );

        Ok(Self {
            outstanding,
            dependents,
            ready,
            done: HashSet::new(),
        })
    }

    /// Drain the set of nodes that are ready to run.
    ///
    /// Each id is returned at most once over the tracker's lifetime.
    /// Order among nodes that became ready together is unspecified.
    pub fn take_ready(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.ready)
    }

    /// Record that a node has completed, unlocking dependents whose
    /// other dependencies are also done.
    pub fn mark_done(&mut self, id: &str) {
        if !self.done.insert(id.to_string()) {
            warn!(node = %id, "mark_done called twice for node; ignoring");
            return;
        }

        let Some(dependents) = self.dependents.get(id) else {
            return;
        };

        for dependent in dependents.clone() {
            if let Some(count) = self.outstanding.get_mut(&dependent) {
                if *count > 0 {
                    *count -= 1;
                    if *count == 0 {
                        debug!(node = %dependent, "all dependencies done; node ready");
                        self.ready.push(dependent);
                    }
                }
            }
        }
    }
}
