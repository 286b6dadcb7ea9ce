//! Remote collection store
//!
//! Document-oriented, path-addressed store holding every owner-scoped
//! collection (saved books, reading lists and their nested books, followed
//! lists). The trait is the seam; two backends implement it:
//!
//! - [`MemoryStore`]: in-process map, used by tests and ephemeral sessions
//! - [`RedbStore`]: embedded file-backed store used by the command-line harness
//!
//! Every call is a suspension point. Failures surface as
//! [`ClioError::RemoteIo`]; callers log them and keep their previous state.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ClioError, ClioResult};

mod batch;
mod memory;
pub mod path;
mod redb_store;

pub use batch::{matches_all, FieldFilter, WriteBatch, WriteOp};
pub use memory::MemoryStore;
pub use path::{CollectionPath, DocPath};
pub use redb_store::RedbStore;

/// Interface to the remote document store
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch one document
    async fn get(&self, path: &DocPath) -> ClioResult<Option<Value>>;

    /// Fetch every direct child document of a collection
    async fn list(&self, collection: &CollectionPath) -> ClioResult<Vec<(DocPath, Value)>>;

    /// Query every collection named `group`, across all owners, for documents
    /// matching all `filters`
    async fn query_group(
        &self,
        group: &str,
        filters: &[FieldFilter],
    ) -> ClioResult<Vec<(DocPath, Value)>>;

    /// Create a document with a store-assigned id
    async fn add(&self, collection: &CollectionPath, doc: Value) -> ClioResult<DocPath>;

    /// Apply every op of `batch` atomically
    async fn commit(&self, batch: WriteBatch) -> ClioResult<()>;

    /// Create or overwrite one document
    async fn set(&self, path: &DocPath, doc: Value) -> ClioResult<()> {
        self.commit(WriteBatch::new().set(path.clone(), doc)).await
    }

    /// Delete one document
    async fn delete(&self, path: &DocPath) -> ClioResult<()> {
        self.commit(WriteBatch::new().delete(path.clone())).await
    }
}

/// Encode a value as a store document
pub(crate) fn encode<T: Serialize>(value: &T) -> ClioResult<Value> {
    serde_json::to_value(value).map_err(|e| ClioError::Serialization(e.to_string()))
}

/// Decode a store document, reporting the path on shape mismatch
pub(crate) fn decode<T: DeserializeOwned>(path: &DocPath, doc: Value) -> ClioResult<T> {
    serde_json::from_value(doc).map_err(|e| ClioError::DecodeFailure(format!("{}: {}", path, e)))
}

/// Decode every document, skipping (and logging) the ones that do not fit
pub(crate) fn decode_all<T: DeserializeOwned>(docs: Vec<(DocPath, Value)>) -> Vec<(DocPath, T)> {
    docs.into_iter()
        .filter_map(|(path, doc)| match decode(&path, doc) {
            Ok(value) => Some((path, value)),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping undecodable document");
                None
            }
        })
        .collect()
}
