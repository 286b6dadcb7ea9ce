//! Durable per-device storage using redb.
//!
//! This module provides the local key-value store consumed by:
//! - The guest saved-books cache ([`LocalCache`])
//! - The cached session identifier
//! - The embedded authentication provider's accounts

use crate::error::ClioError;
use parking_lot::RwLock;
use redb::{Database, ReadableTable, TableDefinition};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

// Submodules
mod local_cache;

pub use local_cache::LocalCache;

// Table definitions
const KV_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

/// Minimal durable key-value interface
///
/// Synchronous on purpose: local reads and writes are not suspension points.
pub trait KeyValueStore: Send + Sync {
    /// Read the bytes stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ClioError>;

    /// Store `value` under `key`, overwriting any previous value
    fn set(&self, key: &str, value: &[u8]) -> Result<(), ClioError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), ClioError>;
}

/// Storage layer using redb for ACID-compliant persistence
#[derive(Clone)]
pub struct Storage {
    db: Arc<RwLock<Database>>,
}

impl Storage {
    /// Create a new storage instance at the given path.
    ///
    /// This will:
    /// - Create the database directory if it doesn't exist
    /// - Initialize the database file
    /// - Create the key-value table
    pub fn new(path: impl AsRef<Path>) -> Result<Self, ClioError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::create(path)?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(KV_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self {
            db: Arc::new(RwLock::new(db)),
        })
    }

    /// List every key currently stored
    pub fn keys(&self) -> Result<Vec<String>, ClioError> {
        let db = self.db.read();
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(KV_TABLE)?;

        let mut keys = Vec::new();
        for entry in table.iter()? {
            let (key, _) = entry?;
            keys.push(key.value().to_string());
        }
        Ok(keys)
    }
}

impl KeyValueStore for Storage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ClioError> {
        let db = self.db.read();
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(KV_TABLE)?;

        Ok(table.get(key)?.map(|v| v.value().to_vec()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), ClioError> {
        let db = self.db.read();
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(KV_TABLE)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ClioError> {
        let db = self.db.read();
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(KV_TABLE)?;
            table.remove(key)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

/// HashMap-backed key-value store for tests and ephemeral sessions
#[derive(Clone, Default)]
pub struct MemoryKv {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ClioError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), ClioError> {
        self.entries.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ClioError> {
        self.entries.write().remove(key);
        Ok(())
    }
}
