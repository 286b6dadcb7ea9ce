//! Deep-link intent router
//!
//! Holds at most one pending navigation intent. The link source hands over an
//! already-parsed target; the router accepts it only while nothing is pending
//! and the UI clears the field it handled once the view is dismissed.
//!
//! ```text
//! emit(target)        pending_list_id   pending_shared_token
//! ─────────────────   ───────────────   ────────────────────
//! {shared, "abc"}     None              Some("abc")          accepted
//! {list, "X"}         None              Some("abc")          dropped
//! clear_shared()      None              None
//! {list, "X"}         Some("X")         None                 accepted
//! ```

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::events::{emit, ClioEvent, EventSender};

/// Kind of an incoming deep link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// Open one of the actor's own lists by id
    List,
    /// Open someone's public list by share token
    Shared,
}

/// A parsed deep link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTarget {
    pub kind: LinkKind,
    pub token: String,
}

impl LinkTarget {
    pub fn list(id: impl Into<String>) -> Self {
        Self {
            kind: LinkKind::List,
            token: id.into(),
        }
    }

    pub fn shared(token: impl Into<String>) -> Self {
        Self {
            kind: LinkKind::Shared,
            token: token.into(),
        }
    }
}

/// The accepted intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingIntent {
    List(String),
    Shared(String),
}

#[derive(Default)]
struct Pending {
    list_id: Option<String>,
    shared_token: Option<String>,
}

impl Pending {
    fn is_empty(&self) -> bool {
        self.list_id.is_none() && self.shared_token.is_none()
    }
}

/// Single-slot pending intent holder
#[derive(Default)]
pub struct LinkRouter {
    pending: Mutex<Pending>,
    events: Option<EventSender>,
}

impl LinkRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Router that announces accepted intents as [`ClioEvent::LinkReceived`]
    pub(crate) fn with_events(events: EventSender) -> Self {
        Self {
            pending: Mutex::new(Pending::default()),
            events: Some(events),
        }
    }

    /// Offer a parsed target. Returns whether it became the pending intent.
    ///
    /// Dropped when nothing was parsed, the token is empty, or an intent is
    /// still pending.
    pub fn emit(&self, target: Option<LinkTarget>) -> bool {
        let Some(target) = target else {
            return false;
        };
        if target.token.is_empty() {
            debug!(kind = ?target.kind, "Ignoring link with empty token");
            return false;
        }

        let intent = {
            let mut pending = self.pending.lock();
            if !pending.is_empty() {
                debug!(kind = ?target.kind, "Intent already pending; dropping link");
                return false;
            }
            match target.kind {
                LinkKind::List => {
                    pending.list_id = Some(target.token.clone());
                    PendingIntent::List(target.token)
                }
                LinkKind::Shared => {
                    pending.shared_token = Some(target.token.clone());
                    PendingIntent::Shared(target.token)
                }
            }
        };

        info!(?intent, "Link accepted");
        if let Some(events) = &self.events {
            emit(events, ClioEvent::LinkReceived { intent });
        }
        true
    }

    /// Offer every target derived from one delivery; a shared target wins
    /// over a list target.
    pub fn emit_candidates(&self, targets: &[LinkTarget]) -> bool {
        let best = targets
            .iter()
            .find(|t| t.kind == LinkKind::Shared && !t.token.is_empty())
            .or_else(|| targets.iter().find(|t| !t.token.is_empty()));
        self.emit(best.cloned())
    }

    pub fn pending_list_id(&self) -> Option<String> {
        self.pending.lock().list_id.clone()
    }

    pub fn pending_shared_token(&self) -> Option<String> {
        self.pending.lock().shared_token.clone()
    }

    pub fn pending(&self) -> Option<PendingIntent> {
        let pending = self.pending.lock();
        match (&pending.list_id, &pending.shared_token) {
            (Some(id), _) => Some(PendingIntent::List(id.clone())),
            (None, Some(token)) => Some(PendingIntent::Shared(token.clone())),
            (None, None) => None,
        }
    }

    pub fn clear_list(&self) {
        self.pending.lock().list_id = None;
    }

    pub fn clear_shared(&self) {
        self.pending.lock().shared_token = None;
    }

    /// Consume the pending list id, clearing it
    pub fn take_list(&self) -> Option<String> {
        self.pending.lock().list_id.take()
    }

    /// Consume the pending share token, clearing it
    pub fn take_shared(&self) -> Option<String> {
        self.pending.lock().shared_token.take()
    }
}
