// src/engine/runtime.rs

//! The control loop that drives a run to completion.
//!
//! Single-writer discipline: the control loop is the only mutator of node
//! state, `started_at` and the result store. Workers receive an owned
//! callable plus owned copies of its input values, and hand back only
//! `(id, result)` over an mpsc channel. Dependency values are therefore
//! published (store insert, then `mark_done`) strictly before any
//! dependent can be dispatched.
//!
//! There is no cancellation or timeout: once dispatched, a node runs to
//! completion or failure. This is an intentional omission carried over
//! from the original contract, not a gap to be patched silently.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use tokio::sync::{mpsc, watch, Semaphore};
use tokio::task;
use tracing::{debug, info, warn};

use crate::dag::graph::{Graph, NodeFn, NodeId, NodeKind, NodeState};
use crate::dag::ReadinessTracker;
use crate::engine::store::ResultStore;
use crate::errors::{DagError, Result};
use crate::report::{NodeProgress, NodeStatus, StatusSnapshot};

/// Capacity of the worker -> control-loop completion channel.
const COMPLETION_CHANNEL_CAPACITY: usize = 64;

/// Options that influence how the runner behaves.
#[derive(Debug, Clone, Default)]
pub struct RunnerOptions {
    /// Maximum number of concurrently running node callables.
    ///
    /// `None` (the default) leaves sizing to the worker pool itself.
    pub max_concurrency: Option<usize>,
}

/// Aggregate outcome of a run.
///
/// `failed` maps each failed node to its rendered error; `blocked` lists
/// every node left permanently `Pending` because a transitive dependency
/// failed. A run always terminates: the waiting set shrinks monotonically,
/// either by completion or by permanent exclusion.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub failed: BTreeMap<NodeId, String>,
    pub blocked: BTreeSet<NodeId>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.blocked.is_empty()
    }
}

/// Completion message sent by a worker back to the control loop.
struct Completion<V> {
    id: NodeId,
    result: anyhow::Result<V>,
}

/// What the control loop decided to do with a ready node.
enum Dispatch<V> {
    Constant(V),
    Computed { func: NodeFn<V>, inputs: Vec<NodeId> },
}

/// Owns the graph, the readiness tracker and the result store for one run.
///
/// Construction via [`DagRunner::prepare`] validates the dependency
/// structure up front; [`DagRunner::run`] then drives the graph to
/// completion. [`DagRunner::get`] retrieves completed values afterwards
/// (or mid-run, from the caller that owns the runner).
pub struct DagRunner<V> {
    graph: Graph<V>,
    tracker: ReadinessTracker,
    store: ResultStore<V>,
    limiter: Option<Arc<Semaphore>>,
    status_tx: watch::Sender<StatusSnapshot>,
    failed: BTreeMap<NodeId, String>,
}

impl<V> std::fmt::Debug for DagRunner<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DagRunner")
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

impl<V> DagRunner<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Validate the graph and build a runner with default options.
    pub fn prepare(graph: Graph<V>) -> Result<Self> {
        Self::prepare_with_options(graph, RunnerOptions::default())
    }

    /// Validate the graph and build a runner.
    ///
    /// Fails fast with [`DagError::MissingDependency`] or
    /// [`DagError::Cycle`]; the run never starts on a structurally
    /// invalid graph.
    pub fn prepare_with_options(graph: Graph<V>, options: RunnerOptions) -> Result<Self> {
        let tracker = ReadinessTracker::prepare(&graph)?;
        let limiter = options
            .max_concurrency
            .map(|n| Arc::new(Semaphore::new(n.max(1))));
        let (status_tx, _) = watch::channel(StatusSnapshot::default());

        let runner = Self {
            graph,
            tracker,
            store: ResultStore::new(),
            limiter,
            status_tx,
            failed: BTreeMap::new(),
        };
        runner.publish_snapshot(false);
        Ok(runner)
    }

    /// Subscribe to status snapshots.
    ///
    /// The control loop publishes a fresh snapshot after every node state
    /// transition; receivers always observe the latest one. See
    /// [`crate::report::spawn_reporter`] for the polling consumer.
    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.status_tx.subscribe()
    }

    /// Drive the graph to completion.
    ///
    /// Blocks (asynchronously) until no further progress is possible:
    /// every node is `Done`, or the only remaining nodes are blocked
    /// behind failures. Node failures do not abort the run; independent
    /// branches keep executing and all failures are reported together.
    /// A callable that panics is caught on the worker and recorded as
    /// that node's failure.
    pub async fn run(&mut self) -> RunReport {
        let (done_tx, mut done_rx) = mpsc::channel::<Completion<V>>(COMPLETION_CHANNEL_CAPACITY);
        let mut in_flight: HashSet<NodeId> = HashSet::new();

        info!(nodes = self.graph.len(), "dag run started");

        loop {
            // Dispatch everything currently ready. Constants complete
            // inline and can cascade further readiness, hence the loop.
            loop {
                let ready = self.tracker.take_ready();
                if ready.is_empty() {
                    break;
                }
                for id in ready {
                    self.dispatch(&id, &done_tx, &mut in_flight).await;
                }
            }

            if in_flight.is_empty() {
                break;
            }

            // Multi-way wait: any worker's completion wakes us.
            let Some(completion) = done_rx.recv().await else {
                warn!("completion channel closed with nodes in flight");
                break;
            };
            in_flight.remove(&completion.id);
            self.finish(completion);
            self.publish_snapshot(false);
        }

        let report = self.build_report();
        info!(
            completed = self.store.len(),
            failed = report.failed.len(),
            blocked = report.blocked.len(),
            "dag run finished"
        );
        self.publish_snapshot(true);
        report
    }

    /// Retrieve a completed node's value.
    ///
    /// Fails with [`DagError::NotFound`] if `id` was never declared, and
    /// with [`DagError::NotReady`] if the node has not produced a value
    /// (still pending, blocked, or failed). Read-only and idempotent.
    pub fn get(&self, id: &str) -> Result<&V> {
        if let Some(value) = self.store.get(id) {
            return Ok(value);
        }
        if self.graph.contains(id) {
            Err(DagError::NotReady(id.to_string()))
        } else {
            Err(DagError::NotFound(id.to_string()))
        }
    }

    /// Handle one ready node: complete constants inline, send computed
    /// nodes to the worker pool.
    async fn dispatch(
        &mut self,
        id: &NodeId,
        done_tx: &mpsc::Sender<Completion<V>>,
        in_flight: &mut HashSet<NodeId>,
    ) {
        let action = {
            let Some(node) = self.graph.node_mut(id) else {
                warn!(node = %id, "ready node missing from graph; ignoring");
                return;
            };
            match &mut node.kind {
                NodeKind::Constant(slot) => match slot.take() {
                    Some(value) => {
                        node.state = NodeState::Done;
                        Dispatch::Constant(value)
                    }
                    None => {
                        warn!(node = %id, "constant already published; ignoring");
                        return;
                    }
                },
                NodeKind::Computed { func, inputs } => match func.take() {
                    Some(func) => {
                        node.state = NodeState::Running;
                        node.started_at = Some(Instant::now());
                        Dispatch::Computed {
                            func,
                            inputs: inputs.clone(),
                        }
                    }
                    None => {
                        warn!(node = %id, "node already dispatched; ignoring");
                        return;
                    }
                },
            }
        };

        match action {
            Dispatch::Constant(value) => {
                debug!(node = %id, "constant published");
                self.store.insert(id.clone(), value);
                self.tracker.mark_done(id);
            }
            Dispatch::Computed { func, inputs } => {
                let mut values: Vec<V> = Vec::with_capacity(inputs.len());
                for dep in &inputs {
                    match self.store.get(dep) {
                        Some(value) => values.push(value.clone()),
                        None => {
                            // Unreachable with a validated graph: deps are
                            // done before a node is handed out.
                            warn!(node = %id, dep = %dep, "input value missing from result store");
                            self.failed
                                .insert(id.clone(), format!("input value for '{dep}' missing"));
                            self.publish_snapshot(false);
                            return;
                        }
                    }
                }

                let permit = match &self.limiter {
                    Some(semaphore) => semaphore.clone().acquire_owned().await.ok(),
                    None => None,
                };

                in_flight.insert(id.clone());
                debug!(node = %id, inputs = inputs.len(), "dispatching node to worker pool");

                let tx = done_tx.clone();
                let task_id = id.clone();
                task::spawn_blocking(move || {
                    // A panicking callable must still deliver a completion,
                    // or the control loop would wait on this node forever.
                    let result = match catch_unwind(AssertUnwindSafe(|| func(&values))) {
                        Ok(result) => result,
                        Err(panic) => Err(anyhow!(
                            "node callable panicked: {}",
                            panic_message(panic.as_ref())
                        )),
                    };
                    drop(permit);
                    // If the control loop is gone there is nobody left to
                    // report to.
                    let _ = tx.blocking_send(Completion {
                        id: task_id,
                        result,
                    });
                });
            }
        }

        self.publish_snapshot(false);
    }

    /// Apply a worker completion to graph, store and tracker.
    fn finish(&mut self, completion: Completion<V>) {
        match completion.result {
            Ok(value) => {
                if let Some(node) = self.graph.node_mut(&completion.id) {
                    node.state = NodeState::Done;
                }
                debug!(node = %completion.id, "node completed");
                self.store.insert(completion.id.clone(), value);
                self.tracker.mark_done(&completion.id);
            }
            Err(err) => {
                let rendered = format!("{err:#}");
                warn!(node = %completion.id, error = %rendered, "node failed; dependents stay pending");
                self.failed.insert(completion.id, rendered);
            }
        }
    }

    fn build_report(&self) -> RunReport {
        let blocked: BTreeSet<NodeId> = self
            .graph
            .iter()
            .filter(|(id, node)| {
                node.state() == NodeState::Pending && !self.failed.contains_key(*id)
            })
            .map(|(id, _)| id.clone())
            .collect();

        RunReport {
            failed: self.failed.clone(),
            blocked,
        }
    }

    fn publish_snapshot(&self, finished: bool) {
        self.status_tx.send_replace(self.snapshot(finished));
    }

    fn snapshot(&self, finished: bool) -> StatusSnapshot {
        let nodes = self
            .graph
            .iter()
            .map(|(id, node)| {
                let deps = node
                    .dependencies()
                    .iter()
                    .map(|dep| {
                        let progress = self
                            .graph
                            .node(dep)
                            .map(|dep_node| self.progress_of(dep, dep_node))
                            .unwrap_or(NodeProgress::Pending);
                        (dep.clone(), progress)
                    })
                    .collect();
                NodeStatus {
                    id: id.clone(),
                    progress: self.progress_of(id, node),
                    deps,
                }
            })
            .collect();

        StatusSnapshot { nodes, finished }
    }

    fn progress_of(&self, id: &str, node: &crate::dag::Node<V>) -> NodeProgress {
        if self.failed.contains_key(id) {
            return NodeProgress::Failed;
        }
        match node.state() {
            NodeState::Pending => NodeProgress::Pending,
            NodeState::Running => NodeProgress::Running {
                since: node.started_at().unwrap_or_else(Instant::now),
            },
            NodeState::Done => NodeProgress::Done,
        }
    }
}

/// Best-effort rendering of a panic payload for the failure record.
fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "unknown panic payload"
    }
}
