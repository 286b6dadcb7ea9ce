//! Saved-books synchronizer
//!
//! Holds the single in-memory set of books the current actor has saved and
//! keeps it in step with whichever store backs that actor:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  SavedBooks                                                       │
//! │  ├── books: Vec<Book>          (unique by id, current actor only) │
//! │  ├── sequencer: per-book-id    (one mutation per book at a time)  │
//! │  └── backend_for(identity)                                        │
//! │      ├── Guest        → GuestBackend   (whole set in LocalCache)  │
//! │      └── SignedIn(u)  → AccountBackend (users/u/savedBooks/{id})  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every write lands in the backing store before the in-memory set changes,
//! so a failed write never shows up as saved. Guest writes read, modify and
//! rewrite the cached set, never the in-memory view, so a view that was
//! discarded or not yet loaded cannot overwrite what the device holds.
//! A mutation on a view not yet loaded for the current identity loads it first.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::error::{ClioError, ClioResult};
use crate::events::{emit, ClioEvent, EventSender};
use crate::remote::{self, path, RemoteStore};
use crate::sequencer::KeyedSequencer;
use crate::session::{Identity, Session, SessionSnapshot};
use crate::storage::LocalCache;
use crate::types::{Book, UserId};

/// Store backing the saved set for one identity
#[async_trait]
trait SavedBooksBackend: Send + Sync {
    /// Full set as currently persisted
    async fn load(&self) -> ClioResult<Vec<Book>>;

    /// Durable write of one addition, before the in-memory set changes
    async fn put(&self, book: &Book) -> ClioResult<()>;

    /// Durable removal of one book, before the in-memory set changes
    async fn delete(&self, book_id: &str) -> ClioResult<()>;
}

struct GuestBackend {
    cache: LocalCache,
    /// Serializes read-modify-write cycles on the cached set
    write_lock: Arc<Mutex<()>>,
}

#[async_trait]
impl SavedBooksBackend for GuestBackend {
    async fn load(&self) -> ClioResult<Vec<Book>> {
        Ok(self.cache.load())
    }

    async fn put(&self, book: &Book) -> ClioResult<()> {
        let _lock = self.write_lock.lock();
        let mut books = self.cache.load();
        if books.iter().any(|b| b.id == book.id) {
            return Ok(());
        }
        books.push(book.clone());
        self.cache.try_save(&books)
    }

    async fn delete(&self, book_id: &str) -> ClioResult<()> {
        let _lock = self.write_lock.lock();
        let mut books = self.cache.load();
        let before = books.len();
        books.retain(|b| b.id != book_id);
        if books.len() == before {
            return Ok(());
        }
        self.cache.try_save(&books)
    }
}

struct AccountBackend {
    remote: Arc<dyn RemoteStore>,
    uid: UserId,
}

#[async_trait]
impl SavedBooksBackend for AccountBackend {
    async fn load(&self) -> ClioResult<Vec<Book>> {
        let docs = self.remote.list(&path::saved_books(&self.uid)).await?;
        Ok(remote::decode_all::<Book>(docs)
            .into_iter()
            .map(|(_, book)| book)
            .collect())
    }

    async fn put(&self, book: &Book) -> ClioResult<()> {
        let doc = remote::encode(book)?;
        self.remote
            .set(&path::saved_books(&self.uid).doc(&book.id)?, doc)
            .await
    }

    async fn delete(&self, book_id: &str) -> ClioResult<()> {
        self.remote
            .delete(&path::saved_books(&self.uid).doc(book_id)?)
            .await
    }
}

struct SavedState {
    books: Vec<Book>,
    /// Session generation the view belongs to
    generation: u64,
    /// Whether `books` was loaded from the store for `generation`
    loaded: bool,
    /// Bumped by every applied mutation
    revision: u64,
}

/// Single source of truth for the current actor's saved books
pub struct SavedBooks {
    session: Arc<Session>,
    cache: LocalCache,
    remote: Arc<dyn RemoteStore>,
    state: RwLock<SavedState>,
    sequencer: KeyedSequencer,
    guest_write_lock: Arc<Mutex<()>>,
    events: EventSender,
}

impl SavedBooks {
    pub fn new(session: Arc<Session>, cache: LocalCache, remote: Arc<dyn RemoteStore>) -> Self {
        let events = session.events();
        Self {
            session,
            cache,
            remote,
            state: RwLock::new(SavedState {
                books: Vec::new(),
                generation: 0,
                loaded: false,
                revision: 0,
            }),
            sequencer: KeyedSequencer::new(),
            guest_write_lock: Arc::new(Mutex::new(())),
            events,
        }
    }

    fn backend_for(&self, identity: &Identity) -> ClioResult<Box<dyn SavedBooksBackend>> {
        match identity {
            Identity::Guest => Ok(Box::new(GuestBackend {
                cache: self.cache.clone(),
                write_lock: self.guest_write_lock.clone(),
            })),
            Identity::SignedIn(uid) => Ok(Box::new(AccountBackend {
                remote: self.remote.clone(),
                uid: uid.clone(),
            })),
            Identity::Uninitialized => Err(ClioError::NotReady),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Reads
    // ═══════════════════════════════════════════════════════════════════════

    /// Current in-memory set
    pub fn books(&self) -> Vec<Book> {
        self.state.read().books.clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().books.is_empty()
    }

    pub fn is_saved(&self, book_id: &str) -> bool {
        self.state.read().books.iter().any(|b| b.id == book_id)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Refresh
    // ═══════════════════════════════════════════════════════════════════════

    /// Rebuild the set from the current identity's store.
    ///
    /// Call on every identity change. A set loaded for an earlier identity is
    /// discarded before the load starts; on failure the set stays as it is.
    /// A mutation applied while the load was in flight wins over the loaded
    /// result. Returns the number of saved books.
    pub async fn refresh(&self) -> ClioResult<usize> {
        let snapshot = self.session.snapshot();
        let revision = self.discard_if_stale(&snapshot);

        if snapshot.identity == Identity::Uninitialized {
            return Ok(0);
        }

        let backend = self.backend_for(&snapshot.identity)?;
        let loaded = match backend.load().await {
            Ok(books) => books,
            Err(e) => {
                warn!(identity = %snapshot.identity, error = %e, "Failed to load saved books");
                return Err(e);
            }
        };

        if !self.session.is_current(&snapshot) {
            debug!(identity = %snapshot.identity, "Dropping saved books loaded for a previous identity");
            return Err(ClioError::IdentityChanged);
        }

        let count = {
            let mut state = self.state.write();
            if state.generation != snapshot.generation {
                return Err(ClioError::IdentityChanged);
            }
            if state.revision == revision {
                state.books = dedup_by_id(loaded);
                state.loaded = true;
            }
            state.books.len()
        };
        debug!(identity = %snapshot.identity, count, "Saved books refreshed");
        emit(&self.events, ClioEvent::SavedBooksChanged { count });
        Ok(count)
    }

    /// Drop a view that belongs to an earlier identity. Returns the view's
    /// revision.
    fn discard_if_stale(&self, snapshot: &SessionSnapshot) -> u64 {
        let mut state = self.state.write();
        if state.generation != snapshot.generation {
            state.books.clear();
            state.generation = snapshot.generation;
            state.loaded = false;
        }
        state.revision
    }

    /// Load the view from the store unless it is already loaded for this identity
    async fn ensure_loaded(&self, snapshot: &SessionSnapshot) -> ClioResult<()> {
        if self.state.read().loaded {
            return Ok(());
        }
        let backend = self.backend_for(&snapshot.identity)?;
        let books = match backend.load().await {
            Ok(books) => books,
            Err(e) => {
                warn!(identity = %snapshot.identity, error = %e, "Failed to load saved books before mutation");
                return Err(e);
            }
        };

        let count = {
            let mut state = self.state.write();
            if !self.session.is_current(snapshot) || state.generation != snapshot.generation {
                return Err(ClioError::IdentityChanged);
            }
            if state.loaded {
                return Ok(());
            }
            state.books = dedup_by_id(books);
            state.loaded = true;
            state.books.len()
        };
        debug!(identity = %snapshot.identity, count, "Saved books loaded on first mutation");
        emit(&self.events, ClioEvent::SavedBooksChanged { count });
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Mutations
    // ═══════════════════════════════════════════════════════════════════════

    /// Save `book`. Returns `false` if it was already saved.
    pub async fn save(&self, book: Book) -> ClioResult<bool> {
        let snapshot = self.session.require_actor()?;
        self.discard_if_stale(&snapshot);
        let _guard = self.sequencer.acquire(&book.id).await;
        self.ensure_loaded(&snapshot).await?;
        if self.is_saved(&book.id) {
            return Ok(false);
        }
        self.save_locked(&snapshot, book).await?;
        Ok(true)
    }

    /// Save `book` unless it is already saved
    pub async fn save_if_needed(&self, book: Book) -> ClioResult<()> {
        self.save(book).await.map(|_| ())
    }

    /// Remove `book_id`. Returns `false` if it was not saved.
    pub async fn remove(&self, book_id: &str) -> ClioResult<bool> {
        let snapshot = self.session.require_actor()?;
        self.discard_if_stale(&snapshot);
        let _guard = self.sequencer.acquire(book_id).await;
        self.ensure_loaded(&snapshot).await?;
        if !self.is_saved(book_id) {
            return Ok(false);
        }
        self.remove_locked(&snapshot, book_id).await?;
        Ok(true)
    }

    /// Save if absent, remove if present. Returns whether the book is saved
    /// afterwards.
    pub async fn toggle(&self, book: Book) -> ClioResult<bool> {
        let snapshot = self.session.require_actor()?;
        self.discard_if_stale(&snapshot);
        let _guard = self.sequencer.acquire(&book.id).await;
        self.ensure_loaded(&snapshot).await?;
        if self.is_saved(&book.id) {
            self.remove_locked(&snapshot, &book.id).await?;
            Ok(false)
        } else {
            self.save_locked(&snapshot, book).await?;
            Ok(true)
        }
    }

    async fn save_locked(&self, snapshot: &SessionSnapshot, book: Book) -> ClioResult<()> {
        self.ensure_current(snapshot)?;
        let backend = self.backend_for(&snapshot.identity)?;

        if let Err(e) = backend.put(&book).await {
            warn!(book_id = %book.id, error = %e, "Failed to save book");
            return Err(e);
        }
        self.ensure_current(snapshot)?;

        let count = {
            let mut state = self.state.write();
            if !state.books.iter().any(|b| b.id == book.id) {
                state.books.push(book);
            }
            state.revision += 1;
            state.books.len()
        };
        emit(&self.events, ClioEvent::SavedBooksChanged { count });
        Ok(())
    }

    async fn remove_locked(&self, snapshot: &SessionSnapshot, book_id: &str) -> ClioResult<()> {
        self.ensure_current(snapshot)?;
        let backend = self.backend_for(&snapshot.identity)?;

        if let Err(e) = backend.delete(book_id).await {
            warn!(%book_id, error = %e, "Failed to remove saved book");
            return Err(e);
        }
        self.ensure_current(snapshot)?;

        let count = {
            let mut state = self.state.write();
            state.books.retain(|b| b.id != book_id);
            state.revision += 1;
            state.books.len()
        };
        emit(&self.events, ClioEvent::SavedBooksChanged { count });
        Ok(())
    }

    fn ensure_current(&self, snapshot: &SessionSnapshot) -> ClioResult<()> {
        if self.session.is_current(snapshot) && self.state.read().generation == snapshot.generation
        {
            Ok(())
        } else {
            debug!(identity = %snapshot.identity, "Identity changed; dropping saved-books mutation");
            Err(ClioError::IdentityChanged)
        }
    }
}

/// Keep the first occurrence of each id
fn dedup_by_id(books: Vec<Book>) -> Vec<Book> {
    let mut seen = std::collections::HashSet::new();
    books
        .into_iter()
        .filter(|b| seen.insert(b.id.clone()))
        .collect()
}
