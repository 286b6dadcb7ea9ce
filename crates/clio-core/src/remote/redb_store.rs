//! Embedded remote store backed by redb.
//!
//! Stands in for the hosted document database when running the command-line
//! harness: every document lives in one table keyed by its full path, values
//! are JSON bytes. Batches commit inside one write transaction.
//!
//! Paths sort so that a collection's documents (and their sub-collections)
//! form one contiguous key range, `"{collection}/"` up to `"{collection}0"`.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use redb::{Database, ReadableTable, TableDefinition};
use serde_json::Value;
use tracing::warn;
use ulid::Ulid;

use super::batch::{matches_all, stage, FieldFilter, WriteBatch};
use super::path::{CollectionPath, DocPath};
use super::RemoteStore;
use crate::error::{ClioError, ClioResult};

/// Table for documents (key: full document path, value: JSON bytes)
const DOCUMENTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("documents");

/// File-backed document store
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<RwLock<Database>>,
}

impl RedbStore {
    /// Open (or create) the store at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ClioError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::create(path)?;
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(DOCUMENTS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self {
            db: Arc::new(RwLock::new(db)),
        })
    }

    /// Documents accepted by `keep`, read from everything under `within`
    /// (or the whole table). Values that are not JSON are skipped.
    fn scan<F>(
        &self,
        within: Option<&CollectionPath>,
        mut keep: F,
    ) -> ClioResult<Vec<(DocPath, Value)>>
    where
        F: FnMut(&DocPath, &Value) -> bool,
    {
        let db = self.db.read();
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(DOCUMENTS_TABLE)?;

        let bounds = within.map(|c| (format!("{}/", c), format!("{}0", c)));
        let entries = match &bounds {
            Some((start, end)) => table.range(start.as_str()..end.as_str())?,
            None => table.iter()?,
        };

        let mut docs = Vec::new();
        for entry in entries {
            let (key, value) = entry?;
            let Some(path) = DocPath::parse(key.value()) else {
                continue;
            };
            let doc: Value = match serde_json::from_slice(value.value()) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!(%path, error = %e, "Skipping stored document that is not JSON");
                    continue;
                }
            };
            if keep(&path, &doc) {
                docs.push((path, doc));
            }
        }
        Ok(docs)
    }

    fn read_one(&self, path: &DocPath) -> ClioResult<Option<Value>> {
        let db = self.db.read();
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(DOCUMENTS_TABLE)?;

        match table.get(path.as_str())? {
            Some(v) => {
                let doc = serde_json::from_slice(v.value())
                    .map_err(|e| ClioError::DecodeFailure(format!("{}: {}", path, e)))?;
                Ok(Some(doc))
            }
            None => Ok(None),
        }
    }

    fn apply(&self, batch: &WriteBatch) -> ClioResult<()> {
        let db = self.db.read();
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(DOCUMENTS_TABLE)?;

            let staged = stage(batch.ops(), |path| {
                match table.get(path.as_str())? {
                    Some(v) => serde_json::from_slice(v.value())
                        .map(Some)
                        .map_err(|e| ClioError::DecodeFailure(format!("{}: {}", path, e))),
                    None => Ok(None),
                }
            })?;

            for (path, value) in staged {
                match value {
                    Some(doc) => {
                        let bytes = serde_json::to_vec(&doc)
                            .map_err(|e| ClioError::Serialization(e.to_string()))?;
                        table.insert(path.as_str(), bytes.as_slice())?;
                    }
                    None => {
                        table.remove(path.as_str())?;
                    }
                }
            }
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for RedbStore {
    async fn get(&self, path: &DocPath) -> ClioResult<Option<Value>> {
        self.read_one(path).map_err(ClioError::into_remote)
    }

    async fn list(&self, collection: &CollectionPath) -> ClioResult<Vec<(DocPath, Value)>> {
        self.scan(Some(collection), |path, _| collection.contains(path))
            .map_err(ClioError::into_remote)
    }

    async fn query_group(
        &self,
        group: &str,
        filters: &[FieldFilter],
    ) -> ClioResult<Vec<(DocPath, Value)>> {
        self.scan(None, |path, doc| {
            path.parent().name() == group && matches_all(filters, doc)
        })
            .map_err(ClioError::into_remote)
    }

    async fn add(&self, collection: &CollectionPath, doc: Value) -> ClioResult<DocPath> {
        let path = collection.doc(&Ulid::new().to_string())?;
        self.apply(&WriteBatch::new().set(path.clone(), doc))
            .map_err(ClioError::into_remote)?;
        Ok(path)
    }

    async fn commit(&self, batch: WriteBatch) -> ClioResult<()> {
        self.apply(&batch).map_err(ClioError::into_remote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_store() -> (RedbStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = RedbStore::open(temp_dir.path().join("remote.redb")).unwrap();
        (store, temp_dir)
    }

    fn lists(uid: &str) -> CollectionPath {
        CollectionPath::root("users").doc(uid).unwrap().collection("readingLists")
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let (store, _temp) = create_test_store();
        let path = lists("u1").doc("L1").unwrap();

        assert!(store.get(&path).await.unwrap().is_none());
        store.set(&path, json!({"title": "A"})).await.unwrap();
        assert_eq!(store.get(&path).await.unwrap(), Some(json!({"title": "A"})));
        store.delete(&path).await.unwrap();
        assert!(store.get(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_batch_is_atomic() {
        let (store, _temp) = create_test_store();
        let list = lists("u1").doc("L1").unwrap();
        store.set(&list, json!({"bookIDs": []})).await.unwrap();

        let ok = WriteBatch::new()
            .set(list.collection("books").doc("b1").unwrap(), json!({"id": "b1"}))
            .array_union(list.clone(), "bookIDs", vec![json!("b1")]);
        store.commit(ok).await.unwrap();
        assert_eq!(
            store.get(&list).await.unwrap(),
            Some(json!({"bookIDs": ["b1"]}))
        );

        let bad = WriteBatch::new()
            .set(list.collection("books").doc("b2").unwrap(), json!({"id": "b2"}))
            .array_union(lists("u1").doc("missing").unwrap(), "bookIDs", vec![json!("b2")]);
        assert!(matches!(store.commit(bad).await, Err(ClioError::RemoteIo(_))));
        assert!(store
            .get(&list.collection("books").doc("b2").unwrap())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_and_group_query() {
        let (store, _temp) = create_test_store();
        let a = store
            .add(&lists("u1"), json!({"shareToken": "t1", "isPublic": true}))
            .await
            .unwrap();
        store
            .add(&lists("u2"), json!({"shareToken": "t2", "isPublic": false}))
            .await
            .unwrap();
        store
            .set(&a.collection("books").doc("b1").unwrap(), json!({"id": "b1"}))
            .await
            .unwrap();

        assert_eq!(store.list(&lists("u1")).await.unwrap().len(), 1);

        let hits = store
            .query_group(
                "readingLists",
                &[FieldFilter::eq("shareToken", "t2"), FieldFilter::eq("isPublic", true)],
            )
            .await
            .unwrap();
        assert!(hits.is_empty());

        let hits = store
            .query_group("readingLists", &[FieldFilter::eq("shareToken", "t1")])
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, a);
    }

    #[tokio::test]
    async fn test_list_reads_only_its_collection() {
        let (store, _temp) = create_test_store();
        store.set(&lists("u1").doc("L1").unwrap(), json!({"n": 1})).await.unwrap();
        store.set(&lists("u10").doc("L2").unwrap(), json!({"n": 2})).await.unwrap();
        store.set(&lists("u1").doc("L3").unwrap(), json!({"n": 3})).await.unwrap();

        let listed = store.list(&lists("u1")).await.unwrap();
        let ids: Vec<_> = listed.iter().map(|(p, _)| p.id().to_string()).collect();
        assert_eq!(ids, vec!["L1", "L3"]);
    }

    #[tokio::test]
    async fn test_corrupt_value_does_not_break_queries() {
        let (store, _temp) = create_test_store();
        store
            .set(&lists("u1").doc("L1").unwrap(), json!({"shareToken": "t1"}))
            .await
            .unwrap();
        {
            let db = store.db.read();
            let write_txn = db.begin_write().unwrap();
            {
                let mut table = write_txn.open_table(DOCUMENTS_TABLE).unwrap();
                table
                    .insert("users/u2/readingLists/L9", b"{not json".as_slice())
                    .unwrap();
            }
            write_txn.commit().unwrap();
        }

        assert_eq!(store.list(&lists("u1")).await.unwrap().len(), 1);
        let hits = store
            .query_group("readingLists", &[FieldFilter::eq("shareToken", "t1")])
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert!(store.list(&lists("u2")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_documents_persist_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("remote.redb");
        let path = lists("u1").doc("L1").unwrap();

        {
            let store = RedbStore::open(&db_path).unwrap();
            store.set(&path, json!({"title": "Kept"})).await.unwrap();
        }

        let store = RedbStore::open(&db_path).unwrap();
        assert_eq!(store.get(&path).await.unwrap(), Some(json!({"title": "Kept"})));
    }
}
