//! MemoryStore - BTreeMap-backed remote store for tests and development.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use ulid::Ulid;

use super::batch::{matches_all, stage, FieldFilter, WriteBatch};
use super::path::{CollectionPath, DocPath};
use super::RemoteStore;
use crate::error::{ClioError, ClioResult};

/// In-memory remote store. Clone-friendly via Arc.
///
/// Two switches simulate transport trouble: `set_offline` fails every call,
/// `set_read_only` fails only writes.
#[derive(Clone, Default)]
pub struct MemoryStore {
    docs: Arc<RwLock<BTreeMap<DocPath, Value>>>,
    offline: Arc<AtomicBool>,
    read_only: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every subsequent call with `RemoteIo` until switched back
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Fail every subsequent write with `RemoteIo` until switched back
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    /// Synchronous peek used by tests
    pub fn snapshot(&self, path: &DocPath) -> Option<Value> {
        self.docs.read().get(path).cloned()
    }

    fn check_online(&self) -> ClioResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ClioError::RemoteIo("store unreachable".into()));
        }
        Ok(())
    }

    fn check_writable(&self) -> ClioResult<()> {
        self.check_online()?;
        if self.read_only.load(Ordering::SeqCst) {
            return Err(ClioError::RemoteIo("write rejected".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn get(&self, path: &DocPath) -> ClioResult<Option<Value>> {
        self.check_online()?;
        Ok(self.docs.read().get(path).cloned())
    }

    async fn list(&self, collection: &CollectionPath) -> ClioResult<Vec<(DocPath, Value)>> {
        self.check_online()?;
        let docs = self.docs.read();
        Ok(docs
            .iter()
            .filter(|(path, _)| collection.contains(path))
            .map(|(path, doc)| (path.clone(), doc.clone()))
            .collect())
    }

    async fn query_group(
        &self,
        group: &str,
        filters: &[FieldFilter],
    ) -> ClioResult<Vec<(DocPath, Value)>> {
        self.check_online()?;
        let docs = self.docs.read();
        Ok(docs
            .iter()
            .filter(|(path, doc)| path.parent().name() == group && matches_all(filters, doc))
            .map(|(path, doc)| (path.clone(), doc.clone()))
            .collect())
    }

    async fn add(&self, collection: &CollectionPath, doc: Value) -> ClioResult<DocPath> {
        self.check_writable()?;
        let path = collection.doc(&Ulid::new().to_string())?;
        self.docs.write().insert(path.clone(), doc);
        Ok(path)
    }

    async fn commit(&self, batch: WriteBatch) -> ClioResult<()> {
        self.check_writable()?;
        let mut docs = self.docs.write();
        let staged = stage(batch.ops(), |path| Ok(docs.get(path).cloned()))?;
        for (path, value) in staged {
            match value {
                Some(doc) => {
                    docs.insert(path, doc);
                }
                None => {
                    docs.remove(&path);
                }
            }
        }
        Ok(())
    }
}
