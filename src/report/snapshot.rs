// src/report/snapshot.rs

use std::time::Instant;

use crate::dag::NodeId;

/// Display-level progress of a node.
///
/// The internal node state is three-valued (`Pending`/`Running`/`Done`);
/// `Failed` is derived from the runner's out-of-band failure record so
/// that sinks can render failures without a separate lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeProgress {
    Pending,
    Running { since: Instant },
    Done,
    Failed,
}

impl NodeProgress {
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeProgress::Done | NodeProgress::Failed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            NodeProgress::Pending => "pending",
            NodeProgress::Running { .. } => "running",
            NodeProgress::Done => "done",
            NodeProgress::Failed => "failed",
        }
    }
}

/// Status of a single node within a snapshot.
#[derive(Debug, Clone)]
pub struct NodeStatus {
    pub id: NodeId,
    pub progress: NodeProgress,
    /// Dependency ids annotated with their own progress, for rendering
    /// what a pending node is waiting on.
    pub deps: Vec<(NodeId, NodeProgress)>,
}

/// A point-in-time view of the whole graph, nodes in id order.
///
/// Snapshots are value copies: the runner builds one on its control loop
/// and publishes it whole, so readers never race the engine. A snapshot
/// across nodes is consistent at the instant it was built, but successive
/// snapshots may be skipped by slow readers; only the latest is retained.
#[derive(Debug, Clone, Default)]
pub struct StatusSnapshot {
    pub nodes: Vec<NodeStatus>,
    /// Set on the final snapshot: the run terminated (all done, or no
    /// further progress possible). Reporters stop once they observe it.
    pub finished: bool,
}
