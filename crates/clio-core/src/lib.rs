//! Clio Core Library
//!
//! Saved books, reading lists and share links for a mood-based book
//! discovery client, kept consistent across guest and signed-in sessions.
//!
//! ## Overview
//!
//! An actor is either a guest, whose saved books live only on this device, or
//! a signed-in account, whose saved books and reading lists live in
//! owner-scoped remote collections. Any actor can open someone else's public
//! list through its share token; signed-in actors can follow it.
//!
//! ## Core Principles
//!
//! - **One view per identity**: switching identity rebuilds every view from
//!   that identity's store, never merges
//! - **No optimistic writes**: account data changes in memory only after the
//!   remote write succeeded
//! - **Stale responses are dropped**: a response that arrives after the
//!   identity changed is discarded
//!
//! ## Quick Start
//!
//! ```ignore
//! use clio_core::{Book, ClioConfig, ClioEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = ClioEngine::open(ClioConfig::with_data_dir("~/.clio/data"))?;
//!     engine.bootstrap().await;
//!     engine.sign_in("reader@example.com", "secret1").await?;
//!
//!     let list = engine.lists().create("Summer Reads", None, None).await?;
//!     engine
//!         .lists()
//!         .add_book(&list, &Book::new("b1", "Dune", "Frank Herbert"))
//!         .await?;
//!     println!("{}", engine.share_link(&list));
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod links;
pub mod reading_lists;
pub mod remote;
pub mod saved_books;
pub mod sequencer;
pub mod session;
pub mod sharing;
pub mod storage;
pub mod types;

// Re-exports
pub use auth::LocalAuth;
pub use config::ClioConfig;
pub use engine::ClioEngine;
pub use error::{ClioError, ClioResult};
pub use events::ClioEvent;
pub use links::{LinkKind, LinkRouter, LinkTarget, PendingIntent};
pub use reading_lists::ReadingLists;
pub use remote::{MemoryStore, RedbStore, RemoteStore};
pub use saved_books::SavedBooks;
pub use session::{AuthProvider, Identity, Session, SessionSnapshot};
pub use sharing::{generate_share_token, share_link, ShareResolver};
pub use storage::{KeyValueStore, LocalCache, MemoryKv, Storage};
pub use types::*;
