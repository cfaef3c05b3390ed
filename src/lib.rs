// src/lib.rs

//! `dagrun` executes a graph of interdependent computations in-process:
//! constant nodes hold precomputed values, computed nodes are callables
//! over the results of other nodes. Independent nodes run concurrently on
//! a worker pool; dependency order is always respected; live status
//! snapshots are published while the run is in progress.
//!
//! Typical usage:
//!
//! ```no_run
//! use dagrun::{DagRunner, GraphBuilder};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let mut builder = GraphBuilder::new();
//! builder.declare_constant("a", 3_i64)?;
//! builder.declare_computed("b", &[], |_| Ok(2))?;
//! builder.declare_computed("c", &["a", "b"], |args| Ok(args[0] + args[1]))?;
//!
//! let mut runner = DagRunner::prepare(builder.build())?;
//! let report = runner.run().await;
//! assert!(report.is_success());
//! assert_eq!(*runner.get("c")?, 5);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod report;

pub use crate::dag::{Graph, GraphBuilder, NodeId, NodeState, ReadinessTracker};
pub use crate::engine::{DagRunner, ResultStore, RunReport, RunnerOptions};
pub use crate::errors::{DagError, Result};
pub use crate::report::{
    spawn_reporter, ConsoleSink, NodeProgress, NodeStatus, StatusSink, StatusSnapshot,
};
