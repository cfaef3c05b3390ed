// src/dag/graph.rs

use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

/// Public type alias for node identifiers throughout the crate.
pub type NodeId = String;

/// Callable stored in a computed node.
///
/// The slice holds the values of the node's inputs, in the order the
/// inputs were declared. Callables run on the worker pool, so they may
/// block; errors are reported through the returned `Result` and recorded
/// against the node.
pub type NodeFn<V> = Box<dyn FnOnce(&[V]) -> anyhow::Result<V> + Send>;

/// Per-run state of a node.
///
/// Transitions are monotonic: `Pending -> Running -> Done`. A failed
/// node keeps its last state; failure itself is tracked out-of-band by
/// the runner so that the result store only ever holds values of nodes
/// that reached `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Pending,
    Running,
    Done,
}

/// What a node actually is.
///
/// Both variants use `Option` for their payload: the value/callable is
/// *taken* exactly once when the node is dispatched, which structurally
/// enforces the at-most-once submission guarantee.
pub enum NodeKind<V> {
    /// A precomputed value; completes without touching the worker pool.
    Constant(Option<V>),
    /// A callable plus the ordered list of input node ids.
    Computed {
        func: Option<NodeFn<V>>,
        inputs: Vec<NodeId>,
    },
}

impl<V> fmt::Debug for NodeKind<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Constant(_) => f.write_str("Constant"),
            NodeKind::Computed { inputs, .. } => {
                f.debug_struct("Computed").field("inputs", inputs).finish()
            }
        }
    }
}

/// One node of the computation graph.
#[derive(Debug)]
pub struct Node<V> {
    pub(crate) id: NodeId,
    pub(crate) kind: NodeKind<V>,
    /// Unique dependency ids, derived from the input list at declaration
    /// time. Immutable after the graph is built.
    deps: Vec<NodeId>,
    pub(crate) state: NodeState,
    /// Set on the transition to `Running`; used only for elapsed-time
    /// reporting.
    pub(crate) started_at: Option<Instant>,
}

impl<V> Node<V> {
    pub(crate) fn new(id: NodeId, kind: NodeKind<V>, deps: Vec<NodeId>) -> Self {
        Self {
            id,
            kind,
            deps,
            state: NodeState::Pending,
            started_at: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Unique dependency ids of this node.
    pub fn dependencies(&self) -> &[NodeId] {
        &self.deps
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }
}

/// The computation graph, keyed by node id.
///
/// Built once via [`crate::dag::GraphBuilder`] before the run starts.
/// Structure (`kind` payloads aside) is immutable after preparation; only
/// `state` and `started_at` mutate during a run, and only from the
/// runner's control loop. A `BTreeMap` keeps iteration deterministic for
/// snapshots and reports.
#[derive(Debug)]
pub struct Graph<V> {
    nodes: BTreeMap<NodeId, Node<V>>,
}

impl<V> Graph<V> {
    pub(crate) fn new(nodes: BTreeMap<NodeId, Node<V>>) -> Self {
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node<V>> {
        self.nodes.get(id)
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> Option<&mut Node<V>> {
        self.nodes.get_mut(id)
    }

    /// Iterate nodes in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &Node<V>)> {
        self.nodes.iter()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }
}
