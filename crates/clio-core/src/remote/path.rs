//! Path addressing for the remote document store
//!
//! Paths alternate collection and document segments, starting with a
//! collection: `users/{uid}/readingLists/{listId}/books/{bookId}`.
//! Document ids must be non-empty and must not contain `/`; [`CollectionPath::doc`]
//! rejects anything else with [`ClioError::InvalidId`].

use crate::error::{ClioError, ClioResult};
use crate::types::UserId;

/// Root collection holding one document per account
pub const USERS: &str = "users";
/// Per-user saved books
pub const SAVED_BOOKS: &str = "savedBooks";
/// Per-user reading lists (also the collection-group name for share lookups)
pub const READING_LISTS: &str = "readingLists";
/// Nested books of one reading list
pub const LIST_BOOKS: &str = "books";
/// Per-user followed-list references, keyed by share token
pub const FOLLOWED_LISTS: &str = "followedLists";

/// Address of a collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// A top-level collection
    pub fn root(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Address of the document `id` inside this collection
    pub fn doc(&self, id: &str) -> ClioResult<DocPath> {
        if id.is_empty() || id.contains('/') {
            return Err(ClioError::InvalidId(id.to_string()));
        }
        Ok(DocPath(format!("{}/{}", self.0, id)))
    }

    /// The collection's own name (its last segment)
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Whether `path` is a direct child document of this collection
    pub fn contains(&self, path: &DocPath) -> bool {
        path.parent() == *self
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Address of a single document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocPath(String);

impl DocPath {
    /// Parse a stored path string. Returns `None` unless it has an even
    /// number of non-empty segments.
    pub fn parse(raw: &str) -> Option<Self> {
        let segments = raw.split('/').count();
        if raw.is_empty() || segments % 2 != 0 || raw.split('/').any(str::is_empty) {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    /// A sub-collection of this document
    pub fn collection(&self, name: &str) -> CollectionPath {
        CollectionPath(format!("{}/{}", self.0, name))
    }

    /// The document id (last segment)
    pub fn id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// The collection containing this document
    pub fn parent(&self) -> CollectionPath {
        match self.0.rsplit_once('/') {
            Some((parent, _)) => CollectionPath(parent.to_string()),
            None => CollectionPath(String::new()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// `users/{uid}`
///
/// User ids come from the authentication provider and are taken as valid.
pub fn user_doc(uid: &UserId) -> DocPath {
    DocPath(format!("{}/{}", USERS, uid.as_str()))
}

/// `users/{uid}/savedBooks`
pub fn saved_books(uid: &UserId) -> CollectionPath {
    user_doc(uid).collection(SAVED_BOOKS)
}

/// `users/{uid}/readingLists`
pub fn reading_lists(uid: &UserId) -> CollectionPath {
    user_doc(uid).collection(READING_LISTS)
}

/// `users/{uid}/readingLists/{listId}/books`
pub fn list_books(uid: &UserId, list_id: &str) -> ClioResult<CollectionPath> {
    Ok(reading_lists(uid).doc(list_id)?.collection(LIST_BOOKS))
}

/// `users/{uid}/followedLists`
pub fn followed_lists(uid: &UserId) -> CollectionPath {
    user_doc(uid).collection(FOLLOWED_LISTS)
}

/// The account whose namespace contains `path`, if it is user-scoped
pub fn owner_of(path: &DocPath) -> Option<UserId> {
    let mut segments = path.as_str().split('/');
    match (segments.next(), segments.next()) {
        (Some(USERS), Some(uid)) if !uid.is_empty() => Some(UserId::from(uid)),
        _ => None,
    }
}
