//! In-memory worker registry

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};

use super::WorkerRegistry;

/// Tracks registered workers and their last heartbeat
#[derive(Debug, Default)]
pub struct InMemoryWorkerRegistry {
    workers: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl InMemoryWorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a worker, recording now as its last activity
    pub fn register(&self, worker_id: impl Into<String>) {
        self.workers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(worker_id.into(), Utc::now());
    }

    /// Updates the last activity of a registered worker
    ///
    /// Returns false if the worker is not registered.
    pub fn heartbeat(&self, worker_id: &str) -> bool {
        let mut workers = self.workers.write().unwrap_or_else(PoisonError::into_inner);
        match workers.get_mut(worker_id) {
            Some(last) => {
                *last = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn deregister(&self, worker_id: &str) -> bool {
        self.workers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(worker_id)
            .is_some()
    }
}

impl WorkerRegistry for InMemoryWorkerRegistry {
    fn is_registered(&self, worker_id: &str) -> bool {
        self.workers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(worker_id)
    }

    fn last_activity(&self, worker_id: &str) -> Option<DateTime<Utc>> {
        self.workers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(worker_id)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_heartbeat_deregister() {
        let registry = InMemoryWorkerRegistry::new();
        assert!(!registry.is_registered("indexer"));
        assert!(!registry.heartbeat("indexer"));

        registry.register("indexer");
        assert!(registry.is_registered("indexer"));
        let first = registry.last_activity("indexer").unwrap();

        assert!(registry.heartbeat("indexer"));
        assert!(registry.last_activity("indexer").unwrap() >= first);

        assert!(registry.deregister("indexer"));
        assert!(!registry.is_registered("indexer"));
        assert_eq!(registry.last_activity("indexer"), None);
    }
}
