//! Change notifications
//!
//! Components publish on one broadcast channel owned by the session; the UI
//! and any other listener subscribe through [`crate::Session::subscribe`].
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  ClioEvent                                                    │
//! │  ├── Ready: bootstrap finished                                │
//! │  ├── IdentityChanged: guest / signed-in / undecided           │
//! │  ├── SavedBooksChanged: in-memory saved set replaced/mutated  │
//! │  ├── ReadingListsChanged: own lists replaced/mutated          │
//! │  ├── FollowedListsChanged: followed refs replaced/mutated     │
//! │  └── LinkReceived: a deep link became the pending intent      │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use tokio::sync::broadcast;

use crate::links::PendingIntent;
use crate::session::Identity;

/// Default capacity for the event broadcast channel
pub(crate) const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Events emitted by the core components
#[derive(Debug, Clone, PartialEq)]
pub enum ClioEvent {
    /// Bootstrap completed; dependent views may leave their loading state
    Ready,
    /// The active identity changed
    IdentityChanged {
        /// The new identity
        identity: Identity,
    },
    /// The in-memory saved-books set changed
    SavedBooksChanged {
        /// Number of books now saved
        count: usize,
    },
    /// The actor's own reading lists changed
    ReadingListsChanged {
        /// Number of lists now held
        count: usize,
    },
    /// The actor's followed-list references changed
    FollowedListsChanged {
        /// Number of followed lists now held
        count: usize,
    },
    /// A deep link was accepted as the pending intent
    LinkReceived {
        /// The accepted intent
        intent: PendingIntent,
    },
}

/// Publishing half of the event channel, cloned into each component
pub(crate) type EventSender = broadcast::Sender<ClioEvent>;

/// Send an event, ignoring the "no subscribers" case
pub(crate) fn emit(tx: &EventSender, event: ClioEvent) {
    let _ = tx.send(event);
}
