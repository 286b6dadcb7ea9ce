//! Per-entity sequencing
//!
//! Serializes mutations that target the same entity (a book id, a list id)
//! so two rapid toggles of one book cannot interleave their remote write and
//! in-memory update. Mutations on different keys still run concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Lazily creates one async mutex per key
#[derive(Default)]
pub struct KeyedSequencer {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

/// Held while a mutation on one key is in progress
pub struct SequenceGuard {
    _guard: OwnedMutexGuard<()>,
}

impl KeyedSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for every earlier holder of `key` to finish, then hold it
    pub async fn acquire(&self, key: &str) -> SequenceGuard {
        let lock = {
            let mut locks = self.locks.lock();
            // Drop entries nobody is holding or waiting on
            locks.retain(|k, l| k == key || Arc::strong_count(l) > 1);
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        SequenceGuard {
            _guard: lock.lock_owned().await,
        }
    }

    /// Number of keys currently tracked
    pub fn tracked(&self) -> usize {
        self.locks.lock().len()
    }
}
