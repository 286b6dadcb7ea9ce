//! Reading-list manager
//!
//! Owns the signed-in actor's reading lists, their nested book collections,
//! and the lists the actor follows.
//!
//! ```text
//! users/{uid}/readingLists/{listId}             list document (bookIDs, shareToken, ...)
//! users/{uid}/readingLists/{listId}/books/{id}  one document per member book
//! users/{uid}/followedLists/{shareToken}        snapshot of a followed list
//! ```
//!
//! Membership changes write the nested book document and the `bookIDs` array
//! in one atomic batch, so the two never drift. Mutations on one list are
//! sequenced by list id. Every mutation requires the signed-in owner and
//! fails before touching the store otherwise.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ClioConfig;
use crate::error::{ClioError, ClioResult};
use crate::events::{emit, ClioEvent, EventSender};
use crate::remote::{self, path, DocPath, RemoteStore, WriteBatch};
use crate::sequencer::KeyedSequencer;
use crate::session::{Session, SessionSnapshot};
use crate::sharing::{generate_share_token, token_in_use};
use crate::types::{Book, ReadingList, UserId};

/// Field of a list document holding its member ids
const BOOK_IDS_FIELD: &str = "bookIDs";

#[derive(Default)]
struct ListsState {
    /// Session generation the cached data belongs to
    generation: u64,
    /// Own lists, newest first
    lists: Vec<ReadingList>,
    /// Last-fetched nested books per list id
    books: HashMap<String, Vec<Book>>,
    /// Followed list snapshots
    followed: Vec<ReadingList>,
}

struct Inner {
    session: Arc<Session>,
    remote: Arc<dyn RemoteStore>,
    share_token_len: usize,
    share_token_attempts: usize,
    state: RwLock<ListsState>,
    sequencer: KeyedSequencer,
    events: EventSender,
}

/// Reading-list manager. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ReadingLists {
    inner: Arc<Inner>,
}

/// Fill in the fields a list document does not store itself
fn hydrate(doc_path: &DocPath, mut list: ReadingList) -> ReadingList {
    list.id = Some(doc_path.id().to_string());
    if list.owner_id.is_none() {
        list.owner_id = path::owner_of(doc_path);
    }
    list
}

fn sort_newest_first(lists: &mut [ReadingList]) {
    lists.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

fn list_id_of(list: &ReadingList) -> ClioResult<&str> {
    list.id
        .as_deref()
        .ok_or_else(|| ClioError::ListNotFound(format!("'{}' has not been saved", list.title)))
}

impl ReadingLists {
    pub fn new(session: Arc<Session>, remote: Arc<dyn RemoteStore>, config: &ClioConfig) -> Self {
        let events = session.events();
        Self {
            inner: Arc::new(Inner {
                session,
                remote,
                share_token_len: config.share_token_len,
                share_token_attempts: config.share_token_attempts,
                state: RwLock::new(ListsState::default()),
                sequencer: KeyedSequencer::new(),
                events,
            }),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Cached views
    // ═══════════════════════════════════════════════════════════════════════

    /// Own lists as last fetched, newest first
    pub fn lists(&self) -> Vec<ReadingList> {
        self.inner.state.read().lists.clone()
    }

    /// Last-fetched books of `list_id`; empty until fetched
    pub fn books_for(&self, list_id: &str) -> Vec<Book> {
        self.inner
            .state
            .read()
            .books
            .get(list_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Followed list snapshots as last fetched
    pub fn followed(&self) -> Vec<ReadingList> {
        self.inner.state.read().followed.clone()
    }

    /// Pure lookup against the cached followed set
    pub fn is_following(&self, share_token: &str) -> bool {
        self.inner
            .state
            .read()
            .followed
            .iter()
            .any(|l| l.share_token == share_token)
    }

    /// Drop every cached list, book and followed reference
    pub fn reset(&self) {
        let generation = self.inner.session.generation();
        let mut state = self.inner.state.write();
        *state = ListsState {
            generation,
            ..ListsState::default()
        };
        debug!(generation, "Reading-list caches cleared");
    }

    fn adopt(&self, snapshot: &SessionSnapshot) {
        let stale = self.inner.state.read().generation != snapshot.generation;
        if stale {
            let mut state = self.inner.state.write();
            if state.generation != snapshot.generation {
                *state = ListsState {
                    generation: snapshot.generation,
                    ..ListsState::default()
                };
            }
        }
    }

    fn ensure_current(&self, snapshot: &SessionSnapshot) -> ClioResult<()> {
        if self.inner.session.is_current(snapshot)
            && self.inner.state.read().generation == snapshot.generation
        {
            Ok(())
        } else {
            debug!(identity = %snapshot.identity, "Identity changed; dropping reading-list response");
            Err(ClioError::IdentityChanged)
        }
    }

    fn require_owner(&self, action: &str, list: &ReadingList) -> ClioResult<(UserId, SessionSnapshot)> {
        let (uid, snapshot) = self.inner.session.require_signed_in(action)?;
        if !list.is_owned_by(&uid) {
            return Err(ClioError::Unauthorized(format!(
                "only the owner can {}",
                action
            )));
        }
        self.adopt(&snapshot);
        Ok((uid, snapshot))
    }

    fn notify_lists(&self) {
        let count = self.inner.state.read().lists.len();
        emit(&self.inner.events, ClioEvent::ReadingListsChanged { count });
    }

    fn notify_followed(&self) {
        let count = self.inner.state.read().followed.len();
        emit(&self.inner.events, ClioEvent::FollowedListsChanged { count });
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Own lists
    // ═══════════════════════════════════════════════════════════════════════

    /// Fetch the actor's own lists, newest first.
    ///
    /// Also starts a background prefetch of every list's books.
    pub async fn list(&self) -> ClioResult<Vec<ReadingList>> {
        let (uid, snapshot) = self.inner.session.require_signed_in("view reading lists")?;
        self.adopt(&snapshot);

        let docs = self
            .inner
            .remote
            .list(&path::reading_lists(&uid))
            .await
            .inspect_err(|e| warn!(%uid, error = %e, "Failed to fetch reading lists"))?;
        let mut lists: Vec<ReadingList> = remote::decode_all::<ReadingList>(docs)
            .into_iter()
            .map(|(doc_path, list)| hydrate(&doc_path, list))
            .collect();
        sort_newest_first(&mut lists);

        self.ensure_current(&snapshot)?;
        self.inner.state.write().lists = lists.clone();
        debug!(%uid, count = lists.len(), "Reading lists refreshed");
        self.notify_lists();

        for list in &lists {
            let this = self.clone();
            let list = list.clone();
            tokio::spawn(async move {
                if let Err(e) = this.fetch_books(&list).await {
                    debug!(list_id = ?list.id, error = %e, "Book prefetch skipped");
                }
            });
        }

        Ok(lists)
    }

    /// Fetch one of the actor's own lists by id, together with its books
    pub async fn get(&self, list_id: &str) -> ClioResult<ReadingList> {
        let (uid, snapshot) = self.inner.session.require_signed_in("open reading lists")?;
        self.adopt(&snapshot);

        let doc_path = path::reading_lists(&uid).doc(list_id)?;
        let doc = self
            .inner
            .remote
            .get(&doc_path)
            .await?
            .ok_or_else(|| ClioError::ListNotFound(list_id.to_string()))?;
        let list = hydrate(&doc_path, remote::decode(&doc_path, doc)?);

        self.ensure_current(&snapshot)?;
        self.upsert(list.clone());
        self.fetch_books(&list).await?;
        Ok(list)
    }

    /// Fetch the nested books of `list` from its owner's namespace
    pub async fn fetch_books(&self, list: &ReadingList) -> ClioResult<Vec<Book>> {
        let snapshot = self.inner.session.require_actor()?;
        self.adopt(&snapshot);
        let list_id = list_id_of(list)?;
        let owner = match (&list.owner_id, snapshot.identity.user_id()) {
            (Some(owner), _) => owner.clone(),
            (None, Some(uid)) => uid.clone(),
            (None, None) => return Ok(Vec::new()),
        };

        let docs = self
            .inner
            .remote
            .list(&path::list_books(&owner, list_id)?)
            .await?;
        let books: Vec<Book> = remote::decode_all::<Book>(docs)
            .into_iter()
            .map(|(_, book)| book)
            .collect();

        self.ensure_current(&snapshot)?;
        self.inner
            .state
            .write()
            .books
            .insert(list_id.to_string(), books.clone());
        Ok(books)
    }

    /// Create a public, empty list owned by the signed-in actor
    pub async fn create(
        &self,
        title: &str,
        description: Option<String>,
        cover_image_ref: Option<String>,
    ) -> ClioResult<ReadingList> {
        let (uid, snapshot) = self.inner.session.require_signed_in("create reading lists")?;
        self.adopt(&snapshot);

        let token = self.unique_share_token().await?;
        let mut list = ReadingList::draft(title, description, cover_image_ref, token, uid.clone());
        let doc = remote::encode(&list)?;

        let doc_path = self
            .inner
            .remote
            .add(&path::reading_lists(&uid), doc)
            .await
            .inspect_err(|e| warn!(%uid, error = %e, "Failed to create reading list"))?;
        list.id = Some(doc_path.id().to_string());

        self.ensure_current(&snapshot)?;
        self.upsert(list.clone());
        info!(list_id = %doc_path.id(), share_token = %list.share_token, "Created reading list");
        Ok(list)
    }

    async fn unique_share_token(&self) -> ClioResult<String> {
        for attempt in 1..=self.inner.share_token_attempts {
            let token = generate_share_token(self.inner.share_token_len);
            if !token_in_use(self.inner.remote.as_ref(), &token).await? {
                return Ok(token);
            }
            debug!(attempt, "Share token collision; regenerating");
        }
        Err(ClioError::RemoteIo(format!(
            "no unused share token after {} attempts",
            self.inner.share_token_attempts
        )))
    }

    /// Add `book` to `list`: nested document and `bookIDs` in one batch
    pub async fn add_book(&self, list: &ReadingList, book: &Book) -> ClioResult<ReadingList> {
        let (uid, snapshot) = self.require_owner("edit this list", list)?;
        let list_id = list_id_of(list)?;
        let _guard = self.inner.sequencer.acquire(list_id).await;
        self.ensure_current(&snapshot)?;

        let list_doc = path::reading_lists(&uid).doc(list_id)?;
        let batch = WriteBatch::new()
            .set(
                path::list_books(&uid, list_id)?.doc(&book.id)?,
                remote::encode(book)?,
            )
            .array_union(list_doc, BOOK_IDS_FIELD, vec![Value::from(book.id.clone())]);

        if let Err(e) = self.inner.remote.commit(batch).await {
            warn!(%list_id, book_id = %book.id, error = %e, "Failed to add book to list");
            self.resync(&uid, list_id, &snapshot).await;
            return Err(e);
        }
        self.ensure_current(&snapshot)?;

        let updated = {
            let mut state = self.inner.state.write();
            let books = state.books.entry(list_id.to_string()).or_default();
            books.retain(|b| b.id != book.id);
            books.push(book.clone());
            Self::patch(&mut state.lists, list, |l| {
                if !l.contains(&book.id) {
                    l.book_ids.push(book.id.clone());
                }
            })
        };
        debug!(%list_id, book_id = %book.id, "Book added to list");
        self.notify_lists();
        Ok(updated)
    }

    /// Remove `book_id` from `list`: nested document and `bookIDs` in one batch
    pub async fn remove_book(&self, list: &ReadingList, book_id: &str) -> ClioResult<ReadingList> {
        let (uid, snapshot) = self.require_owner("edit this list", list)?;
        let list_id = list_id_of(list)?;
        let _guard = self.inner.sequencer.acquire(list_id).await;
        self.ensure_current(&snapshot)?;

        let list_doc = path::reading_lists(&uid).doc(list_id)?;
        let batch = WriteBatch::new()
            .delete(path::list_books(&uid, list_id)?.doc(book_id)?)
            .array_remove(list_doc, BOOK_IDS_FIELD, vec![Value::from(book_id)]);

        if let Err(e) = self.inner.remote.commit(batch).await {
            warn!(%list_id, %book_id, error = %e, "Failed to remove book from list");
            self.resync(&uid, list_id, &snapshot).await;
            return Err(e);
        }
        self.ensure_current(&snapshot)?;

        let updated = {
            let mut state = self.inner.state.write();
            if let Some(books) = state.books.get_mut(list_id) {
                books.retain(|b| b.id != book_id);
            }
            Self::patch(&mut state.lists, list, |l| l.book_ids.retain(|id| id != book_id))
        };
        debug!(%list_id, %book_id, "Book removed from list");
        self.notify_lists();
        Ok(updated)
    }

    /// Delete `list` together with the member documents it knows about
    pub async fn delete(&self, list: &ReadingList) -> ClioResult<()> {
        let (uid, snapshot) = self.require_owner("delete this list", list)?;
        let list_id = list_id_of(list)?;
        let _guard = self.inner.sequencer.acquire(list_id).await;
        self.ensure_current(&snapshot)?;

        let books = path::list_books(&uid, list_id)?;
        let mut batch = WriteBatch::new().delete(path::reading_lists(&uid).doc(list_id)?);
        for book_id in &list.book_ids {
            match books.doc(book_id) {
                Ok(book_doc) => batch = batch.delete(book_doc),
                Err(e) => debug!(%list_id, error = %e, "Skipping member that has no document"),
            }
        }
        self.inner
            .remote
            .commit(batch)
            .await
            .inspect_err(|e| warn!(%list_id, error = %e, "Failed to delete reading list"))?;
        self.ensure_current(&snapshot)?;

        {
            let mut state = self.inner.state.write();
            state.lists.retain(|l| l.id.as_deref() != Some(list_id));
            state.books.remove(list_id);
        }
        info!(%list_id, "Deleted reading list");
        self.notify_lists();
        Ok(())
    }

    /// Re-read one list after a failed write so the cached view matches the store
    async fn resync(&self, uid: &UserId, list_id: &str, snapshot: &SessionSnapshot) {
        let Ok(doc_path) = path::reading_lists(uid).doc(list_id) else {
            return;
        };
        let fetched = match self.inner.remote.get(&doc_path).await {
            Ok(doc) => doc,
            Err(e) => {
                debug!(%list_id, error = %e, "Resync skipped");
                return;
            }
        };
        if self.ensure_current(snapshot).is_err() {
            return;
        }

        match fetched.map(|doc| remote::decode::<ReadingList>(&doc_path, doc)) {
            Some(Ok(list)) => {
                let list = hydrate(&doc_path, list);
                self.upsert(list.clone());
                if let Err(e) = self.fetch_books(&list).await {
                    debug!(%list_id, error = %e, "Resync of list books failed");
                }
            }
            Some(Err(e)) => warn!(error = %e, "Resynced list did not decode"),
            None => {
                let mut state = self.inner.state.write();
                state.lists.retain(|l| l.id.as_deref() != Some(list_id));
                state.books.remove(list_id);
            }
        }
    }

    fn upsert(&self, list: ReadingList) {
        {
            let mut state = self.inner.state.write();
            state.lists.retain(|l| l.id != list.id);
            state.lists.push(list);
            sort_newest_first(&mut state.lists);
        }
        self.notify_lists();
    }

    /// Apply `f` to the cached copy of `list` (or to `list` itself when it is
    /// not cached) and return the result
    fn patch(
        lists: &mut [ReadingList],
        list: &ReadingList,
        f: impl FnOnce(&mut ReadingList),
    ) -> ReadingList {
        match lists.iter_mut().find(|l| l.id == list.id) {
            Some(cached) => {
                f(cached);
                cached.clone()
            }
            None => {
                let mut updated = list.clone();
                f(&mut updated);
                updated
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Followed lists
    // ═══════════════════════════════════════════════════════════════════════

    /// Store a snapshot of `list` under the actor's followed lists
    pub async fn follow(&self, list: &ReadingList) -> ClioResult<()> {
        let (uid, snapshot) = self.inner.session.require_signed_in("follow lists")?;
        self.adopt(&snapshot);
        if list.share_token.is_empty() {
            return Err(ClioError::NotFoundOrPrivate);
        }

        let doc = remote::encode(list)?;
        self.inner
            .remote
            .set(&path::followed_lists(&uid).doc(&list.share_token)?, doc)
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to follow list"))?;
        self.ensure_current(&snapshot)?;

        {
            let mut state = self.inner.state.write();
            state.followed.retain(|l| l.share_token != list.share_token);
            state.followed.push(list.clone());
        }
        info!(share_token = %list.share_token, "Following list");
        self.notify_followed();
        Ok(())
    }

    /// Remove the followed reference for `share_token`
    pub async fn unfollow(&self, share_token: &str) -> ClioResult<()> {
        let (uid, snapshot) = self.inner.session.require_signed_in("unfollow lists")?;
        self.adopt(&snapshot);

        self.inner
            .remote
            .delete(&path::followed_lists(&uid).doc(share_token)?)
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to unfollow list"))?;
        self.ensure_current(&snapshot)?;

        self.inner
            .state
            .write()
            .followed
            .retain(|l| l.share_token != share_token);
        info!(%share_token, "Unfollowed list");
        self.notify_followed();
        Ok(())
    }

    /// Replace the followed cache with the actor's stored references
    pub async fn refresh_followed(&self) -> ClioResult<Vec<ReadingList>> {
        let (uid, snapshot) = self.inner.session.require_signed_in("view followed lists")?;
        self.adopt(&snapshot);

        let docs = self
            .inner
            .remote
            .list(&path::followed_lists(&uid))
            .await
            .inspect_err(|e| warn!(%uid, error = %e, "Failed to fetch followed lists"))?;
        let followed: Vec<ReadingList> = remote::decode_all::<ReadingList>(docs)
            .into_iter()
            .map(|(doc_path, mut list)| {
                if list.share_token.is_empty() {
                    list.share_token = doc_path.id().to_string();
                }
                list
            })
            .collect();

        self.ensure_current(&snapshot)?;
        self.inner.state.write().followed = followed.clone();
        self.notify_followed();
        Ok(followed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::LocalAuth;
    use crate::remote::MemoryStore;
    use crate::storage::MemoryKv;

    async fn setup() -> (Arc<Session>, ReadingLists, MemoryStore) {
        let kv = MemoryKv::new();
        let remote = MemoryStore::new();
        let session = Arc::new(Session::new(
            Arc::new(LocalAuth::new(Arc::new(kv.clone()))),
            Arc::new(kv),
        ));
        session.bootstrap().await;
        let lists = ReadingLists::new(
            session.clone(),
            Arc::new(remote.clone()),
            &ClioConfig::default(),
        );
        (session, lists, remote)
    }

    #[tokio::test]
    async fn test_guest_cannot_create() {
        let (session, lists, remote) = setup().await;
        session.start_as_guest();
        let err = lists.create("Summer Reads", None, None).await.unwrap_err();
        assert!(matches!(err, ClioError::Unauthorized(_)));
        assert!(remote.is_empty());
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_token() {
        let (session, lists, remote) = setup().await;
        let uid = UserId::from("u1");
        session.complete_sign_in(uid.clone());

        let list = lists.create("Summer Reads", None, None).await.unwrap();
        let id = list.id.clone().unwrap();
        assert!(!id.is_empty());
        assert_eq!(list.share_token.len(), 10);
        assert!(list.book_ids.is_empty());
        assert!(list.is_public);

        let stored = remote.snapshot(&path::reading_lists(&uid).doc(&id).unwrap()).unwrap();
        assert!(stored.get("id").is_none());
        assert_eq!(stored["ownerID"], "u1");
        assert_eq!(lists.lists(), vec![list]);
    }

    #[tokio::test]
    async fn test_add_and_remove_keep_ids_and_books_in_step() {
        let (session, lists, remote) = setup().await;
        let uid = UserId::from("u1");
        session.complete_sign_in(uid.clone());
        let list = lists.create("Summer Reads", None, None).await.unwrap();
        let id = list.id.clone().unwrap();

        let dune = Book::new("b1", "Dune", "Frank Herbert");
        let list = lists.add_book(&list, &dune).await.unwrap();
        let list = lists.add_book(&list, &dune).await.unwrap();
        assert_eq!(list.book_ids, vec!["b1".to_string()]);
        assert_eq!(lists.books_for(&id), vec![dune.clone()]);

        let stored = remote.snapshot(&path::reading_lists(&uid).doc(&id).unwrap()).unwrap();
        assert_eq!(stored["bookIDs"], serde_json::json!(["b1"]));

        let list = lists.remove_book(&list, "b1").await.unwrap();
        assert!(list.book_ids.is_empty());
        assert!(lists.books_for(&id).is_empty());
        assert!(remote
            .snapshot(&path::list_books(&uid, &id).unwrap().doc("b1").unwrap())
            .is_none());
    }

    #[tokio::test]
    async fn test_non_owner_fails_fast() {
        let (session, lists, remote) = setup().await;
        session.complete_sign_in(UserId::from("u1"));
        let list = lists.create("Mine", None, None).await.unwrap();
        let docs_before = remote.len();

        session.complete_sign_in(UserId::from("u2"));
        let book = Book::new("b1", "Dune", "Frank Herbert");
        assert!(matches!(
            lists.add_book(&list, &book).await,
            Err(ClioError::Unauthorized(_))
        ));
        assert!(matches!(
            lists.delete(&list).await,
            Err(ClioError::Unauthorized(_))
        ));
        assert_eq!(remote.len(), docs_before);
    }

    #[tokio::test]
    async fn test_failed_batch_leaves_list_consistent() {
        let (session, lists, remote) = setup().await;
        session.complete_sign_in(UserId::from("u1"));
        let list = lists.create("Summer Reads", None, None).await.unwrap();
        let id = list.id.clone().unwrap();

        remote.set_read_only(true);
        let book = Book::new("b1", "Dune", "Frank Herbert");
        assert!(matches!(
            lists.add_book(&list, &book).await,
            Err(ClioError::RemoteIo(_))
        ));
        let cached = lists.lists().into_iter().find(|l| l.id.as_deref() == Some(id.as_str()));
        assert!(cached.unwrap().book_ids.is_empty());
        assert!(lists.books_for(&id).is_empty());
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let (session, lists, _remote) = setup().await;
        session.complete_sign_in(UserId::from("u1"));
        lists.create("First", None, None).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        lists.create("Second", None, None).await.unwrap();

        lists.reset();
        let fetched = lists.list().await.unwrap();
        let titles: Vec<_> = fetched.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Second", "First"]);
    }

    #[tokio::test]
    async fn test_get_missing_list() {
        let (session, lists, _remote) = setup().await;
        session.complete_sign_in(UserId::from("u1"));
        assert!(matches!(
            lists.get("nope").await,
            Err(ClioError::ListNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_follow_cycle() {
        let (session, lists, _remote) = setup().await;
        session.complete_sign_in(UserId::from("owner"));
        let list = lists.create("Shared", None, None).await.unwrap();

        session.start_as_guest();
        assert!(matches!(
            lists.follow(&list).await,
            Err(ClioError::Unauthorized(_))
        ));

        session.complete_sign_in(UserId::from("reader"));
        lists.follow(&list).await.unwrap();
        assert!(lists.is_following(&list.share_token));

        lists.reset();
        assert!(!lists.is_following(&list.share_token));
        lists.refresh_followed().await.unwrap();
        assert!(lists.is_following(&list.share_token));

        lists.unfollow(&list.share_token).await.unwrap();
        assert!(!lists.is_following(&list.share_token));
    }

    #[tokio::test]
    async fn test_identity_change_clears_caches() {
        let (session, lists, _remote) = setup().await;
        session.complete_sign_in(UserId::from("u1"));
        lists.create("Mine", None, None).await.unwrap();
        assert_eq!(lists.lists().len(), 1);

        session.complete_sign_in(UserId::from("u2"));
        assert!(lists.list().await.unwrap().is_empty());
        assert!(lists.lists().is_empty());
    }
}
