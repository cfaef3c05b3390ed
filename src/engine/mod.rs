// src/engine/mod.rs

//! Execution engine for the computation graph.
//!
//! - [`runtime`] contains the [`DagRunner`]: the control loop that pulls
//!   ready nodes from the tracker, dispatches them to the worker pool,
//!   and feeds completions back.
//! - [`store`] is the write-once store of completed node values.

pub mod runtime;
pub mod store;

pub use runtime::{DagRunner, RunReport, RunnerOptions};
pub use store::ResultStore;
