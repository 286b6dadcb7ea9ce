//! Session context: who the current actor is
//!
//! One `Session` is created at process start and shared (`Arc<Session>`) with
//! every component. It is mutated only through its transition methods, each
//! of which publishes [`ClioEvent::IdentityChanged`] before returning.
//!
//! ```text
//!                 bootstrap()
//! Uninitialized ───────────────► SignedIn(uid)   (provider has a session)
//!       │                              ▲   │
//!       │ start_as_guest()             │   │ sign_out()
//!       ▼        complete_sign_in(uid) │   ▼
//!     Guest ───────────────────────────┘ Guest
//! ```
//!
//! Every transition bumps a generation counter. Components take a
//! [`SessionSnapshot`] before a remote call and drop the response if the
//! generation moved while the call was in flight.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::{ClioError, ClioResult};
use crate::events::{emit, ClioEvent, EventSender, EVENT_CHANNEL_CAPACITY};
use crate::storage::KeyValueStore;
use crate::types::UserId;

/// Local key remembering the last signed-in account
const CACHED_UID_KEY: &str = "session/uid";

/// The current actor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Identity {
    /// Nobody chosen yet; no remote call may be issued
    Uninitialized,
    /// Unauthenticated actor whose data lives only on this device
    Guest,
    /// Authenticated account
    SignedIn(UserId),
}

impl Identity {
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Identity::SignedIn(uid) => Some(uid),
            _ => None,
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Identity::Guest)
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, Identity::SignedIn(_))
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identity::Uninitialized => write!(f, "Uninitialized"),
            Identity::Guest => write!(f, "Guest"),
            Identity::SignedIn(uid) => write!(f, "SignedIn({})", uid),
        }
    }
}

/// Point-in-time view of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub identity: Identity,
    pub generation: u64,
    pub ready: bool,
}

/// Authentication collaborator
///
/// Consumed by [`Session`] only.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Register a new account and sign it in
    async fn create_account(&self, email: &str, password: &str) -> ClioResult<UserId>;

    /// Sign an existing account in
    async fn sign_in(&self, email: &str, password: &str) -> ClioResult<UserId>;

    /// End the provider-side session
    async fn sign_out(&self) -> ClioResult<()>;

    /// The account with an active provider session, if any
    async fn current_user_id(&self) -> Option<UserId>;
}

struct SessionState {
    identity: Identity,
    ready: bool,
    generation: u64,
}

/// Explicitly owned identity/session context
pub struct Session {
    state: RwLock<SessionState>,
    auth: Arc<dyn AuthProvider>,
    kv: Arc<dyn KeyValueStore>,
    event_tx: EventSender,
}

impl Session {
    /// Create a session in the `Uninitialized`, not-ready state
    pub fn new(auth: Arc<dyn AuthProvider>, kv: Arc<dyn KeyValueStore>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: RwLock::new(SessionState {
                identity: Identity::Uninitialized,
                ready: false,
                generation: 0,
            }),
            auth,
            kv,
            event_tx,
        }
    }

    /// Subscribe to change notifications from the session and every
    /// component built on it
    pub fn subscribe(&self) -> broadcast::Receiver<ClioEvent> {
        self.event_tx.subscribe()
    }

    pub(crate) fn events(&self) -> EventSender {
        self.event_tx.clone()
    }

    pub fn identity(&self) -> Identity {
        self.state.read().identity.clone()
    }

    /// Whether bootstrap has completed
    pub fn is_ready(&self) -> bool {
        self.state.read().ready
    }

    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read();
        SessionSnapshot {
            identity: state.identity.clone(),
            generation: state.generation,
            ready: state.ready,
        }
    }

    /// Whether no transition happened since `snapshot` was taken
    pub fn is_current(&self, snapshot: &SessionSnapshot) -> bool {
        self.generation() == snapshot.generation
    }

    /// The last signed-in account remembered on this device
    pub fn cached_user_id(&self) -> Option<UserId> {
        match self.kv.get(CACHED_UID_KEY) {
            Ok(Some(bytes)) => String::from_utf8(bytes).ok().map(UserId::from),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read cached user id");
                None
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Transitions
    // ═══════════════════════════════════════════════════════════════════════

    /// Run once at process start.
    ///
    /// An active provider session becomes `SignedIn`; otherwise the cached
    /// identifier is discarded and the identity stays undecided until the
    /// actor picks Guest or signs in. Marks the session ready either way.
    pub async fn bootstrap(&self) {
        if self.is_ready() {
            debug!("Session already bootstrapped");
            return;
        }

        match self.auth.current_user_id().await {
            Some(uid) => {
                info!(%uid, "Restored signed-in session");
                self.remember(&uid);
                self.transition(Identity::SignedIn(uid));
            }
            None => {
                if let Err(e) = self.kv.remove(CACHED_UID_KEY) {
                    warn!(error = %e, "Failed to clear cached user id");
                }
                debug!("No active session; waiting for guest or sign-in");
            }
        }

        self.state.write().ready = true;
        emit(&self.event_tx, ClioEvent::Ready);
    }

    /// Continue without an account
    pub fn start_as_guest(&self) {
        self.transition(Identity::Guest);
    }

    /// Record a sign-in the provider has already confirmed
    pub fn complete_sign_in(&self, uid: UserId) {
        self.remember(&uid);
        self.transition(Identity::SignedIn(uid));
    }

    /// End the account session and fall back to Guest.
    ///
    /// A provider failure is logged; the local transition happens regardless.
    pub async fn sign_out(&self) {
        if let Err(e) = self.auth.sign_out().await {
            warn!(error = %e, "Provider sign-out failed");
        }
        if let Err(e) = self.kv.remove(CACHED_UID_KEY) {
            warn!(error = %e, "Failed to clear cached user id");
        }
        self.transition(Identity::Guest);
    }

    /// Sign in through the provider, then transition
    pub async fn sign_in(&self, email: &str, password: &str) -> ClioResult<UserId> {
        let uid = self.auth.sign_in(email, password).await?;
        self.complete_sign_in(uid.clone());
        Ok(uid)
    }

    /// Create an account through the provider, then transition
    pub async fn create_account(&self, email: &str, password: &str) -> ClioResult<UserId> {
        let uid = self.auth.create_account(email, password).await?;
        self.complete_sign_in(uid.clone());
        Ok(uid)
    }

    fn remember(&self, uid: &UserId) {
        if let Err(e) = self.kv.set(CACHED_UID_KEY, uid.as_str().as_bytes()) {
            warn!(error = %e, "Failed to cache user id");
        }
    }

    fn transition(&self, identity: Identity) {
        {
            let mut state = self.state.write();
            if state.identity == identity {
                return;
            }
            state.identity = identity.clone();
            state.generation += 1;
        }
        info!(%identity, "Identity changed");
        emit(&self.event_tx, ClioEvent::IdentityChanged { identity });
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Gates
    // ═══════════════════════════════════════════════════════════════════════

    /// Snapshot of a decided actor (Guest or SignedIn) after bootstrap
    pub(crate) fn require_actor(&self) -> ClioResult<SessionSnapshot> {
        let snapshot = self.snapshot();
        if !snapshot.ready || snapshot.identity == Identity::Uninitialized {
            return Err(ClioError::NotReady);
        }
        Ok(snapshot)
    }

    /// Snapshot of a signed-in actor; guests get `Unauthorized`
    pub(crate) fn require_signed_in(&self, action: &str) -> ClioResult<(UserId, SessionSnapshot)> {
        let snapshot = self.require_actor()?;
        match snapshot.identity.user_id() {
            Some(uid) => Ok((uid.clone(), snapshot)),
            None => Err(ClioError::Unauthorized(format!(
                "sign in to {}",
                action
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::LocalAuth;
    use crate::storage::MemoryKv;

    fn session() -> (Session, Arc<LocalAuth>, MemoryKv) {
        let kv = MemoryKv::new();
        let auth = Arc::new(LocalAuth::new(Arc::new(kv.clone())));
        (Session::new(auth.clone(), Arc::new(kv.clone())), auth, kv)
    }

    #[tokio::test]
    async fn test_bootstrap_without_session_stays_undecided() {
        let (session, _auth, kv) = session();
        kv.set(CACHED_UID_KEY, b"stale").unwrap();

        assert!(!session.is_ready());
        session.bootstrap().await;

        assert!(session.is_ready());
        assert_eq!(session.identity(), Identity::Uninitialized);
        assert!(session.cached_user_id().is_none());
        assert!(matches!(session.require_actor(), Err(ClioError::NotReady)));
    }

    #[tokio::test]
    async fn test_bootstrap_restores_provider_session() {
        let (session, auth, _kv) = session();
        let uid = auth.create_account("a@example.com", "secret1").await.unwrap();

        session.bootstrap().await;
        assert_eq!(session.identity(), Identity::SignedIn(uid.clone()));
        assert_eq!(session.cached_user_id(), Some(uid));
    }

    #[tokio::test]
    async fn test_transitions_emit_before_returning() {
        let (session, _auth, _kv) = session();
        let mut events = session.subscribe();
        session.bootstrap().await;
        assert_eq!(events.try_recv().unwrap(), ClioEvent::Ready);

        session.start_as_guest();
        assert_eq!(
            events.try_recv().unwrap(),
            ClioEvent::IdentityChanged {
                identity: Identity::Guest
            }
        );

        // Same identity again: no event, no generation bump
        let generation = session.generation();
        session.start_as_guest();
        assert!(events.try_recv().is_err());
        assert_eq!(session.generation(), generation);
    }

    #[tokio::test]
    async fn test_sign_out_returns_to_guest() {
        let (session, _auth, _kv) = session();
        session.bootstrap().await;
        let uid = session.create_account("b@example.com", "secret1").await.unwrap();
        assert_eq!(session.identity(), Identity::SignedIn(uid));

        let before = session.snapshot();
        session.sign_out().await;
        assert_eq!(session.identity(), Identity::Guest);
        assert!(!session.is_current(&before));
        assert!(session.cached_user_id().is_none());
    }

    #[tokio::test]
    async fn test_gates() {
        let (session, _auth, _kv) = session();
        session.bootstrap().await;
        session.start_as_guest();
        assert!(session.require_actor().is_ok());
        assert!(matches!(
            session.require_signed_in("create lists"),
            Err(ClioError::Unauthorized(_))
        ));

        session.complete_sign_in(UserId::from("u1"));
        let (uid, snapshot) = session.require_signed_in("create lists").unwrap();
        assert_eq!(uid, UserId::from("u1"));
        assert!(session.is_current(&snapshot));
    }
}
