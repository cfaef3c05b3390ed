// src/errors.rs

//! Crate-wide error types.
//!
//! Structural problems (duplicate ids, dangling dependencies, cycles) are
//! fatal and surface from the builder or from `DagRunner::prepare` before
//! anything runs. Node execution failures are *not* represented here: they
//! are collected per node in [`crate::engine::RunReport`] so that
//! independent branches of the graph can keep making progress.

use thiserror::Error;

use crate::dag::NodeId;

#[derive(Error, Debug)]
pub enum DagError {
    #[error("duplicate node id: {0}")]
    DuplicateNode(NodeId),

    #[error("node '{node}' depends on unknown node '{dependency}'")]
    MissingDependency { node: NodeId, dependency: NodeId },

    #[error("cycle detected in dependency graph involving node '{0}'")]
    Cycle(NodeId),

    #[error("node not found: {0}")]
    NotFound(NodeId),

    #[error("node '{0}' has no result yet")]
    NotReady(NodeId),
}

pub type Result<T> = std::result::Result<T, DagError>;
