// src/report/mod.rs

//! Status reporting.
//!
//! The runner publishes a [`StatusSnapshot`] into a watch channel after
//! every node state transition; the reporter task polls the channel at a
//! fixed interval and hands the latest snapshot to a [`StatusSink`].
//! Reporting is advisory only and never affects scheduling.

pub mod console;
pub mod reporter;
pub mod snapshot;

pub use console::ConsoleSink;
pub use reporter::{spawn_reporter, StatusSink};
pub use snapshot::{NodeProgress, NodeStatus, StatusSnapshot};
