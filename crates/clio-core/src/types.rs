//! Core types for Clio

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

pub mod book_list;
pub mod mood;

pub use book_list::BookList;
pub use mood::MoodTag;

/// Identifier of an authenticated account
///
/// Opaque string issued by the authentication provider. Every owner-scoped
/// remote collection lives under `users/{UserId}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Create a new random UserId (ULID, time-ordered)
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A book as saved by an actor or placed on a reading list
///
/// `id` is the only identity that matters: two books with the same `id` are
/// the same book for every membership check, whatever their other fields say.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Stable identifier, the sole de-duplication key
    pub id: String,
    pub title: String,
    pub author: String,
    /// Cover image reference (asset name or URL)
    #[serde(default, alias = "coverImageName")]
    pub cover_image_ref: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
}

impl Book {
    /// Create a book with the required fields; optional metadata starts empty
    pub fn new(id: impl Into<String>, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            cover_image_ref: String::new(),
            description: String::new(),
            page_count: None,
            categories: None,
            published_date: None,
            publisher: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_cover(mut self, cover_image_ref: impl Into<String>) -> Self {
        self.cover_image_ref = cover_image_ref.into();
        self
    }

    pub fn with_page_count(mut self, page_count: u32) -> Self {
        self.page_count = Some(page_count);
        self
    }
}

/// A reading list owned by one signed-in account
///
/// Lifecycle: a draft (`id == None`) is built client-side, becomes persisted
/// once the remote store assigns an `id`, and is deleted by its owner.
/// `id` and `share_token` never change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingList {
    /// Remote document id. Not stored in the owner's own list document;
    /// filled in from the document path on read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub created_at: DateTime<Utc>,
    /// Ids of the books in the list's nested book collection
    #[serde(rename = "bookIDs", default)]
    pub book_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_ref: Option<String>,
    pub is_public: bool,
    /// Public sharing identifier, independent of `id`
    pub share_token: String,
    #[serde(rename = "ownerID", default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<UserId>,
}

impl ReadingList {
    /// Build an unsaved list: public by default, no books, no id yet
    pub fn draft(
        title: impl Into<String>,
        description: Option<String>,
        cover_image_ref: Option<String>,
        share_token: impl Into<String>,
        owner_id: UserId,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            created_at: Utc::now(),
            book_ids: Vec::new(),
            description,
            cover_image_ref,
            is_public: true,
            share_token: share_token.into(),
            owner_id: Some(owner_id),
        }
    }

    /// Whether the remote store has assigned this list an id
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Whether `book_id` is a member of this list
    pub fn contains(&self, book_id: &str) -> bool {
        self.book_ids.iter().any(|id| id == book_id)
    }

    /// Whether `uid` owns this list
    pub fn is_owned_by(&self, uid: &UserId) -> bool {
        self.owner_id.as_ref() == Some(uid)
    }
}

/// A shared list as seen by a visitor: the public header plus the owner's
/// nested book collection, fetched read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedList {
    pub list: ReadingList,
    pub books: Vec<Book>,
}
