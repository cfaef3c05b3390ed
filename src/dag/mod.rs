// src/dag/mod.rs

//! Graph model and readiness tracking.
//!
//! - [`graph`] holds the computation graph: nodes, their kinds and
//!   per-node run state.
//! - [`builder`] is the registration API callers use to declare constants
//!   and computed nodes up front.
//! - [`tracker`] contains the Kahn-style readiness bookkeeping that
//!   decides which nodes may run next, and the preparation-time
//!   validation of the dependency structure.

pub mod builder;
pub mod graph;
pub mod tracker;

pub use builder::GraphBuilder;
pub use graph::{Graph, Node, NodeFn, NodeId, NodeKind, NodeState};
pub use tracker::ReadinessTracker;
