//! ClioEngine - the primary entry point for Clio
//!
//! ClioEngine wires one session context to every component built on it:
//! - Saved books for the current actor (guest cache or account collection)
//! - The signed-in actor's reading lists and followed lists
//! - Share-token resolution for any actor
//! - The pending deep-link intent
//!
//! Identity transitions go through the engine so each one is followed by a
//! refresh of every identity-scoped view.
//!
//! # Example
//!
//! ```ignore
//! use clio_core::{ClioConfig, ClioEngine};
//!
//! let engine = ClioEngine::open(ClioConfig::with_data_dir("~/.clio/data"))?;
//! engine.bootstrap().await;
//! engine.continue_as_guest().await;
//!
//! engine.saved().toggle(book).await?;
//! let shared = engine.sharing().resolve("abc123XYZ0").await?;
//! ```

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::auth::LocalAuth;
use crate::config::ClioConfig;
use crate::error::ClioResult;
use crate::events::ClioEvent;
use crate::links::{LinkRouter, PendingIntent};
use crate::reading_lists::ReadingLists;
use crate::remote::{RedbStore, RemoteStore};
use crate::saved_books::SavedBooks;
use crate::session::{AuthProvider, Identity, Session};
use crate::sharing::{share_link, ShareResolver};
use crate::storage::{KeyValueStore, LocalCache, Storage};
use crate::types::{ReadingList, SharedList, UserId};

/// Main entry point for Clio
pub struct ClioEngine {
    config: ClioConfig,
    session: Arc<Session>,
    saved: SavedBooks,
    lists: ReadingLists,
    sharing: ShareResolver,
    links: LinkRouter,
}

impl ClioEngine {
    /// Open an engine on the embedded file-backed collaborators under
    /// `config.data_dir`
    pub fn open(config: ClioConfig) -> ClioResult<Self> {
        let kv: Arc<dyn KeyValueStore> = Arc::new(Storage::new(config.local_db_path())?);
        let remote: Arc<dyn RemoteStore> = Arc::new(RedbStore::open(config.remote_db_path())?);
        let auth: Arc<dyn AuthProvider> = Arc::new(LocalAuth::new(kv.clone()));
        debug!(data_dir = %config.data_dir.display(), "Opened local stores");
        Ok(Self::with_backends(config, kv, remote, auth))
    }

    /// Build an engine on caller-supplied collaborators
    pub fn with_backends(
        config: ClioConfig,
        kv: Arc<dyn KeyValueStore>,
        remote: Arc<dyn RemoteStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        let session = Arc::new(Session::new(auth, kv.clone()));
        let cache = LocalCache::new(kv, config.guest_cache_key.clone());
        let saved = SavedBooks::new(session.clone(), cache, remote.clone());
        let lists = ReadingLists::new(session.clone(), remote.clone(), &config);
        let sharing = ShareResolver::new(session.clone(), remote);
        let links = LinkRouter::with_events(session.events());

        Self {
            config,
            session,
            saved,
            lists,
            sharing,
            links,
        }
    }

    pub fn config(&self) -> &ClioConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn identity(&self) -> Identity {
        self.session.identity()
    }

    pub fn saved(&self) -> &SavedBooks {
        &self.saved
    }

    pub fn lists(&self) -> &ReadingLists {
        &self.lists
    }

    pub fn sharing(&self) -> &ShareResolver {
        &self.sharing
    }

    pub fn links(&self) -> &LinkRouter {
        &self.links
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<ClioEvent> {
        self.session.subscribe()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Identity Operations
    // ═══════════════════════════════════════════════════════════════════════

    /// Restore any active account session and load its views
    pub async fn bootstrap(&self) {
        self.session.bootstrap().await;
        self.sync_identity().await;
    }

    pub async fn continue_as_guest(&self) {
        self.session.start_as_guest();
        self.sync_identity().await;
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ClioResult<UserId> {
        let uid = self.session.sign_in(email, password).await?;
        self.sync_identity().await;
        Ok(uid)
    }

    pub async fn create_account(&self, email: &str, password: &str) -> ClioResult<UserId> {
        let uid = self.session.create_account(email, password).await?;
        self.sync_identity().await;
        Ok(uid)
    }

    pub async fn sign_out(&self) {
        self.session.sign_out().await;
        self.sync_identity().await;
    }

    /// Rebuild every identity-scoped view for the current identity.
    ///
    /// Failures are logged; each view keeps whatever it had.
    async fn sync_identity(&self) {
        let identity = self.session.identity();

        if let Err(e) = self.saved.refresh().await {
            warn!(%identity, error = %e, "Saved books not refreshed");
        }

        self.lists.reset();
        if identity.is_signed_in() {
            if let Err(e) = self.lists.list().await {
                warn!(%identity, error = %e, "Reading lists not refreshed");
            }
            if let Err(e) = self.lists.refresh_followed().await {
                warn!(%identity, error = %e, "Followed lists not refreshed");
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Sharing and links
    // ═══════════════════════════════════════════════════════════════════════

    /// Outbound link for `list`
    pub fn share_link(&self, list: &ReadingList) -> String {
        share_link(&self.config.app_domain, &list.share_token)
    }

    /// Open the pending intent and clear it.
    ///
    /// A list intent opens one of the actor's own lists; a shared intent
    /// resolves the share token. Returns `None` when nothing is pending.
    pub async fn open_pending(&self) -> ClioResult<Option<SharedList>> {
        let Some(intent) = self.links.pending() else {
            return Ok(None);
        };

        let opened = match &intent {
            PendingIntent::List(list_id) => {
                self.links.clear_list();
                let list = self.lists.get(list_id).await?;
                let books = self.lists.books_for(list_id);
                SharedList { list, books }
            }
            PendingIntent::Shared(token) => {
                self.links.clear_shared();
                self.sharing.resolve(token).await?
            }
        };
        debug!(?intent, "Opened pending intent");
        Ok(Some(opened))
    }

    /// Resolve `token` and follow it in one step
    pub async fn follow_shared(&self, token: &str) -> ClioResult<ReadingList> {
        self.session.require_signed_in("follow lists")?;
        let list = self.sharing.resolve_header(token).await?;
        self.lists.follow(&list).await?;
        Ok(list)
    }
}
