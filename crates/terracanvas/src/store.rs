//! Per-diagram graph storage.

use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use log::{trace, warn};

use terracanvas_core::graph::Graph;

/// Holds one graph per diagram id.
///
/// Implementations only need to make each call atomic; sequencing of
/// read-modify-write cycles is the caller's job.
pub trait GraphStore: Send + Sync {
    /// A copy of the graph stored under `id`.
    fn get(&self, id: &str) -> Option<Graph>;

    /// Store `graph` under `id`, replacing any previous graph.
    fn set(&self, id: &str, graph: Graph);

    /// Remove the graph stored under `id`. Returns whether one existed.
    fn delete(&self, id: &str) -> bool;

    /// Number of stored graphs.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}

/// In-memory store that keeps at most `capacity` diagrams, evicting the
/// least recently used one on overflow.
pub struct MemoryStore {
    capacity: usize,
    // Least recently used first.
    entries: Mutex<IndexMap<String, Graph>>,
}

impl MemoryStore {
    /// Create a store. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(IndexMap::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn entries(&self) -> MutexGuard<'_, IndexMap<String, Graph>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(64)
    }
}

impl GraphStore for MemoryStore {
    fn get(&self, id: &str) -> Option<Graph> {
        let mut entries = self.entries();
        let index = entries.get_index_of(id)?;
        let last = entries.len() - 1;
        entries.move_index(index, last);
        entries.get(id).cloned()
    }

    fn set(&self, id: &str, graph: Graph) {
        let mut entries = self.entries();
        entries.shift_remove(id);
        entries.insert(id.to_string(), graph);
        trace!(diagram_id = id; "Diagram stored");

        while entries.len() > self.capacity {
            if let Some((evicted, _)) = entries.shift_remove_index(0) {
                warn!(diagram_id = evicted, capacity = self.capacity; "Evicted least recently used diagram");
            }
        }
    }

    fn delete(&self, id: &str) -> bool {
        self.entries().shift_remove(id).is_some()
    }

    fn len(&self) -> usize {
        self.entries().len()
    }

    fn contains(&self, id: &str) -> bool {
        self.entries().contains_key(id)
    }
}
