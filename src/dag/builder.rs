// src/dag/builder.rs

//! Registration API for building a computation graph.
//!
//! Callers declare every node up front with an explicit id and, for
//! computed nodes, an explicit *ordered* list of input ids. The order of
//! the input list is the order in which dependency values are bound to
//! the callable's argument slice; the dependency set is the deduplicated
//! input list.

use std::collections::BTreeMap;

use crate::dag::graph::{Graph, Node, NodeId, NodeKind};
use crate::errors::{DagError, Result};

/// Builder for a [`Graph`].
///
/// Duplicate ids are rejected at declaration time. Dangling dependency
/// references and cycles are only detected later, by
/// [`crate::dag::ReadinessTracker::prepare`], since a dependency may
/// legitimately be declared after its dependent.
pub struct GraphBuilder<V> {
    nodes: BTreeMap<NodeId, Node<V>>,
}

impl<V> GraphBuilder<V> {
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
        }
    }

    /// Declare a constant node holding a precomputed value.
    pub fn declare_constant(&mut self, id: impl Into<NodeId>, value: V) -> Result<()> {
        let id = id.into();
        self.insert(id.clone(), NodeKind::Constant(Some(value)), Vec::new())
    }

    /// Declare a computed node.
    ///
    /// `inputs` is ordered: the callable receives the corresponding
    /// values in exactly this order. An input id may repeat; the
    /// dependency set is deduplicated for scheduling purposes.
    pub fn declare_computed<F>(
        &mut self,
        id: impl Into<NodeId>,
        inputs: &[&str],
        func: F,
    ) -> Result<()>
    where
        F: FnOnce(&[V]) -> anyhow::Result<V> + Send + 'static,
    {
        let id = id.into();
        let inputs: Vec<NodeId> = inputs.iter().map(|s| s.to_string()).collect();

        let mut deps: Vec<NodeId> = Vec::new();
        for input in &inputs {
            if !deps.contains(input) {
                deps.push(input.clone());
            }
        }

        self.insert(
            id,
            NodeKind::Computed {
                func: Some(Box::new(func)),
                inputs,
            },
            deps,
        )
    }

    /// Finish construction and hand the graph over for preparation.
    pub fn build(self) -> Graph<V> {
        Graph::new(self.nodes)
    }

    fn insert(&mut self, id: NodeId, kind: NodeKind<V>, deps: Vec<NodeId>) -> Result<()> {
        if self.nodes.contains_key(&id) {
            return Err(DagError::DuplicateNode(id));
        }
        self.nodes.insert(id.clone(), Node::new(id, kind, deps));
        Ok(())
    }
}

impl<V> Default for GraphBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}
