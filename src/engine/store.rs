// src/engine/store.rs

//! Write-once store of completed node values.

use std::collections::HashMap;

use tracing::warn;

use crate::dag::NodeId;

/// Maps node id to its computed/constant value.
///
/// Entries are written exactly when a node reaches `Done`, and only by
/// the runner's control loop. Writes are once-only; a second write for
/// the same id is ignored with a warning, keeping the first value.
#[derive(Debug)]
pub struct ResultStore<V> {
    values: HashMap<NodeId, V>,
}

impl<V> Default for ResultStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ResultStore<V> {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, id: NodeId, value: V) {
        if self.values.contains_key(&id) {
            warn!(node = %id, "result already stored for node; keeping first value");
            return;
        }
        self.values.insert(id, value);
    }

    pub fn get(&self, id: &str) -> Option<&V> {
        self.values.get(id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
