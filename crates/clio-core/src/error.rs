//! Error types for Clio

use thiserror::Error;

/// Main error type for Clio operations
#[derive(Error, Debug)]
pub enum ClioError {
    /// Actor lacks permission (guest attempting an owner-only mutation)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Share token resolution found nothing accessible.
    ///
    /// Deliberately carries no detail: an unknown token and a private list
    /// produce the same value.
    #[error("List not found or is private")]
    NotFoundOrPrivate,

    /// Transport or remote store failure
    #[error("Remote I/O error: {0}")]
    RemoteIo(String),

    /// Stored document does not match the expected shape
    #[error("Decode failure: {0}")]
    DecodeFailure(String),

    /// No actor has been chosen yet (session not bootstrapped, or no
    /// guest/sign-in decision made)
    #[error("Session not ready")]
    NotReady,

    /// A response arrived after the active identity changed and was dropped
    #[error("Identity changed while the request was in flight")]
    IdentityChanged,

    /// Owner-side lookup of a reading list that does not exist
    #[error("Reading list not found: {0}")]
    ListNotFound(String),

    /// Authentication provider rejected the request
    #[error("Authentication error: {0}")]
    Auth(String),

    /// An id cannot address a document: it is empty or contains `/`
    #[error("Invalid document id: {0:?}")]
    InvalidId(String),

    /// Error during serialization of local data
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Database creation/opening error
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    /// Transaction error
    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    /// Table error
    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    /// Storage operation error
    #[error("Storage operation error: {0}")]
    StorageOp(#[from] redb::StorageError),

    /// Commit error
    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClioError {
    /// Whether this is an expected outcome the UI should show as a message,
    /// as opposed to a failure that is logged and degraded.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            ClioError::Unauthorized(_)
                | ClioError::NotFoundOrPrivate
                | ClioError::Auth(_)
                | ClioError::NotReady
                | ClioError::ListNotFound(_)
                | ClioError::InvalidId(_)
        )
    }

    /// Fold local database failures into `RemoteIo`.
    ///
    /// Used by store backends that sit behind the remote interface but are
    /// implemented on top of local storage.
    pub fn into_remote(self) -> ClioError {
        match self {
            ClioError::Database(_)
            | ClioError::Transaction(_)
            | ClioError::Table(_)
            | ClioError::StorageOp(_)
            | ClioError::Commit(_)
            | ClioError::Io(_)
            | ClioError::Serialization(_) => ClioError::RemoteIo(self.to_string()),
            other => other,
        }
    }
}

/// Result type alias using ClioError
pub type ClioResult<T> = Result<T, ClioError>;
