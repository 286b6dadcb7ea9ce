//! Guest saved-books cache
//!
//! The whole guest set lives under one fixed key as a JSON array. Reads never
//! fail: missing or corrupt data degrades to an empty set.

use std::sync::Arc;

use tracing::warn;

use super::KeyValueStore;
use crate::error::{ClioError, ClioResult};
use crate::types::Book;

/// Local cache of the guest's saved books
#[derive(Clone)]
pub struct LocalCache {
    kv: Arc<dyn KeyValueStore>,
    key: String,
}

impl LocalCache {
    pub fn new(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    /// Load the cached set, or an empty one if nothing usable is stored
    pub fn load(&self) -> Vec<Book> {
        let bytes = match self.kv.get(&self.key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read guest saved books");
                return Vec::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(books) => books,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to decode guest saved books");
                Vec::new()
            }
        }
    }

    /// Persist the full set, replacing whatever was stored
    pub fn save(&self, books: &[Book]) {
        if let Err(e) = self.try_save(books) {
            warn!(key = %self.key, error = %e, "Failed to persist guest saved books");
        }
    }

    /// Like [`save`](Self::save), but reports the failure
    pub fn try_save(&self, books: &[Book]) -> ClioResult<()> {
        let bytes =
            serde_json::to_vec(books).map_err(|e| ClioError::Serialization(e.to_string()))?;
        self.kv.set(&self.key, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKv;

    fn cache() -> (LocalCache, MemoryKv) {
        let kv = MemoryKv::new();
        (LocalCache::new(Arc::new(kv.clone()), "guest_saved_books_v1"), kv)
    }

    #[test]
    fn test_missing_key_loads_empty() {
        let (cache, _kv) = cache();
        assert!(cache.load().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let (cache, _kv) = cache();
        let books = vec![
            Book::new("b1", "Dune", "Frank Herbert"),
            Book::new("b2", "Emma", "Jane Austen"),
        ];
        cache.save(&books);
        assert_eq!(cache.load(), books);
    }

    #[test]
    fn test_corrupt_data_loads_empty() {
        let (cache, kv) = cache();
        kv.set("guest_saved_books_v1", b"{not json").unwrap();
        assert!(cache.load().is_empty());
    }
}
