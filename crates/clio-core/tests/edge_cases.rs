//! Edge case and boundary condition tests
//!
//! Corrupt data, undecided identity, token exhaustion and stale responses.

use std::sync::Arc;

use serde_json::json;

use clio_core::remote::path;
use clio_core::{
    Book, ClioConfig, ClioEngine, ClioError, Identity, KeyValueStore, LocalAuth, MemoryKv,
    MemoryStore, ReadingList, RemoteStore, UserId,
};

fn engine_on(config: ClioConfig, kv: &MemoryKv, remote: &MemoryStore) -> ClioEngine {
    let kv: Arc<dyn KeyValueStore> = Arc::new(kv.clone());
    let auth = Arc::new(LocalAuth::new(kv.clone()));
    ClioEngine::with_backends(config, kv, Arc::new(remote.clone()), auth)
}

// ============================================================================
// Undecided Identity
// ============================================================================

/// Nothing reaches the remote store before an actor is chosen
#[tokio::test]
async fn test_uninitialized_issues_no_remote_calls() {
    let kv = MemoryKv::new();
    let remote = MemoryStore::new();
    let engine = engine_on(ClioConfig::default(), &kv, &remote);

    // Before bootstrap
    assert!(matches!(
        engine.saved().save(Book::new("b1", "Dune", "Frank Herbert")).await,
        Err(ClioError::NotReady)
    ));

    engine.bootstrap().await;
    assert_eq!(engine.identity(), Identity::Uninitialized);
    remote.set_offline(true);

    assert!(matches!(
        engine.saved().toggle(Book::new("b1", "Dune", "Frank Herbert")).await,
        Err(ClioError::NotReady)
    ));
    assert!(matches!(
        engine.sharing().resolve("abc123XYZ0").await,
        Err(ClioError::NotReady)
    ));
    assert!(matches!(
        engine.lists().create("x", None, None).await,
        Err(ClioError::NotReady)
    ));
}

/// A stale cached uid is discarded when the provider has no session
#[tokio::test]
async fn test_stale_cached_uid_is_cleared() {
    let kv = MemoryKv::new();
    kv.set("session/uid", b"ghost").unwrap();
    let remote = MemoryStore::new();
    let engine = engine_on(ClioConfig::default(), &kv, &remote);

    engine.bootstrap().await;
    assert!(engine.session().is_ready());
    assert!(engine.session().cached_user_id().is_none());
    assert_eq!(engine.identity(), Identity::Uninitialized);
}

// ============================================================================
// Corrupt Data
// ============================================================================

/// A corrupt guest cache degrades to an empty set
#[tokio::test]
async fn test_corrupt_guest_cache() {
    let kv = MemoryKv::new();
    kv.set("guest_saved_books_v1", b"{not json").unwrap();
    let remote = MemoryStore::new();
    let engine = engine_on(ClioConfig::default(), &kv, &remote);

    engine.bootstrap().await;
    engine.continue_as_guest().await;
    assert!(engine.saved().is_empty());

    // And saving overwrites the corrupt value with a good one
    engine
        .saved()
        .save(Book::new("b1", "Dune", "Frank Herbert"))
        .await
        .unwrap();
    engine.saved().refresh().await.unwrap();
    assert!(engine.saved().is_saved("b1"));
}

/// Undecodable remote documents are skipped, the rest still load
#[tokio::test]
async fn test_undecodable_documents_are_skipped() {
    let kv = MemoryKv::new();
    let remote = MemoryStore::new();
    let engine = engine_on(ClioConfig::default(), &kv, &remote);
    engine.bootstrap().await;
    let uid = engine.create_account("a@example.com", "secret1").await.unwrap();

    remote
        .set(&path::saved_books(&uid).doc("bad").unwrap(), json!({"title": 42}))
        .await
        .unwrap();
    remote
        .set(
            &path::saved_books(&uid).doc("b1").unwrap(),
            json!({"id": "b1", "title": "Dune", "author": "Frank Herbert"}),
        )
        .await
        .unwrap();
    remote
        .set(&path::reading_lists(&uid).doc("broken").unwrap(), json!({"title": "No token"}))
        .await
        .unwrap();

    assert_eq!(engine.saved().refresh().await.unwrap(), 1);
    assert!(engine.lists().list().await.unwrap().is_empty());
}

/// A malformed public header reads as not found
#[tokio::test]
async fn test_malformed_shared_header() {
    let kv = MemoryKv::new();
    let remote = MemoryStore::new();
    remote
        .set(
            &path::reading_lists(&UserId::from("owner")).doc("L1").unwrap(),
            json!({"shareToken": "tok0000000", "isPublic": true}),
        )
        .await
        .unwrap();

    let engine = engine_on(ClioConfig::default(), &kv, &remote);
    engine.bootstrap().await;
    engine.continue_as_guest().await;
    assert!(matches!(
        engine.sharing().resolve("tok0000000").await,
        Err(ClioError::NotFoundOrPrivate)
    ));
    assert!(matches!(
        engine.sharing().resolve("").await,
        Err(ClioError::NotFoundOrPrivate)
    ));
}

// ============================================================================
// Document Ids
// ============================================================================

/// A saved book whose id holds a `/` is refused, not stored out of reach
#[tokio::test]
async fn test_saved_book_id_with_slash_is_rejected() {
    let kv = MemoryKv::new();
    let remote = MemoryStore::new();
    let engine = engine_on(ClioConfig::default(), &kv, &remote);
    engine.bootstrap().await;
    engine.create_account("a@example.com", "secret1").await.unwrap();

    for id in ["isbn/978-0", ""] {
        assert!(matches!(
            engine.saved().save(Book::new(id, "Dune", "Frank Herbert")).await,
            Err(ClioError::InvalidId(bad)) if bad == id
        ));
        assert!(!engine.saved().is_saved(id));
    }
    assert!(remote.is_empty());
    assert_eq!(engine.saved().refresh().await.unwrap(), 0);
}

/// add_book refuses a member id with a `/` and leaves the list untouched
#[tokio::test]
async fn test_list_member_id_with_slash_is_rejected() {
    let kv = MemoryKv::new();
    let remote = MemoryStore::new();
    let engine = engine_on(ClioConfig::default(), &kv, &remote);
    engine.bootstrap().await;
    let uid = engine.create_account("a@example.com", "secret1").await.unwrap();
    let list = engine.lists().create("Classics", None, None).await.unwrap();
    let before = remote.len();

    let err = engine
        .lists()
        .add_book(&list, &Book::new("isbn/978-0", "Dune", "Frank Herbert"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClioError::InvalidId(_)));
    assert_eq!(remote.len(), before);

    let stored = remote
        .snapshot(&path::reading_lists(&uid).doc(list.id.as_deref().unwrap()).unwrap())
        .unwrap();
    assert_eq!(stored["bookIDs"], json!([]));
    assert!(engine.lists().fetch_books(&list).await.unwrap().is_empty());
}

/// Following a list whose token holds a `/` is refused
#[tokio::test]
async fn test_follow_token_with_slash_is_rejected() {
    let kv = MemoryKv::new();
    let remote = MemoryStore::new();
    let engine = engine_on(ClioConfig::default(), &kv, &remote);
    engine.bootstrap().await;
    engine.create_account("a@example.com", "secret1").await.unwrap();

    let mut foreign =
        ReadingList::draft("Odd", None, None, "ab/cd", UserId::from("someone-else"));
    foreign.id = Some("L1".into());
    assert!(matches!(
        engine.lists().follow(&foreign).await,
        Err(ClioError::InvalidId(_))
    ));
    assert!(!engine.lists().is_following("ab/cd"));
    assert!(matches!(
        engine.lists().unfollow("ab/cd").await,
        Err(ClioError::InvalidId(_))
    ));
    assert!(remote.is_empty());
}

// ============================================================================
// Share Tokens
// ============================================================================

/// When every token is taken, creation fails after the configured attempts
#[tokio::test]
async fn test_share_token_exhaustion() {
    let kv = MemoryKv::new();
    let remote = MemoryStore::new();
    let owner = UserId::from("squatter");
    let alphabet = ('a'..='z').chain('A'..='Z').chain('0'..='9');
    for (i, c) in alphabet.enumerate() {
        remote
            .set(
                &path::reading_lists(&owner).doc(&format!("L{}", i)).unwrap(),
                json!({
                    "title": "taken",
                    "createdAt": "2024-01-01T00:00:00Z",
                    "isPublic": false,
                    "shareToken": c.to_string(),
                }),
            )
            .await
            .unwrap();
    }

    let config = ClioConfig {
        share_token_len: 1,
        share_token_attempts: 2,
        ..ClioConfig::default()
    };
    let engine = engine_on(config, &kv, &remote);
    engine.bootstrap().await;
    engine.create_account("a@example.com", "secret1").await.unwrap();

    let before = remote.len();
    assert!(matches!(
        engine.lists().create("Doomed", None, None).await,
        Err(ClioError::RemoteIo(_))
    ));
    assert_eq!(remote.len(), before);
    assert!(engine.lists().lists().is_empty());
}

// ============================================================================
// Remote Failures
// ============================================================================

/// A failed create leaves nothing behind locally
#[tokio::test]
async fn test_failed_create_is_not_added() {
    let kv = MemoryKv::new();
    let remote = MemoryStore::new();
    let engine = engine_on(ClioConfig::default(), &kv, &remote);
    engine.bootstrap().await;
    engine.create_account("a@example.com", "secret1").await.unwrap();

    remote.set_read_only(true);
    assert!(matches!(
        engine.lists().create("Offline", None, None).await,
        Err(ClioError::RemoteIo(_))
    ));
    assert!(engine.lists().lists().is_empty());
}

/// A failed refresh keeps the previous set for the same identity
#[tokio::test]
async fn test_failed_refresh_keeps_previous_set() {
    let kv = MemoryKv::new();
    let remote = MemoryStore::new();
    let engine = engine_on(ClioConfig::default(), &kv, &remote);
    engine.bootstrap().await;
    engine.create_account("a@example.com", "secret1").await.unwrap();
    engine
        .saved()
        .save(Book::new("b1", "Dune", "Frank Herbert"))
        .await
        .unwrap();

    remote.set_offline(true);
    assert!(engine.saved().refresh().await.is_err());
    assert!(engine.saved().is_saved("b1"));
}

/// Removing or saving twice is harmless
#[tokio::test]
async fn test_idempotent_save_and_remove() {
    let kv = MemoryKv::new();
    let remote = MemoryStore::new();
    let engine = engine_on(ClioConfig::default(), &kv, &remote);
    engine.bootstrap().await;
    engine.continue_as_guest().await;

    let dune = Book::new("b1", "Dune", "Frank Herbert");
    engine.saved().save_if_needed(dune.clone()).await.unwrap();
    engine.saved().save_if_needed(dune.clone()).await.unwrap();
    assert_eq!(engine.saved().len(), 1);

    assert!(engine.saved().remove("b1").await.unwrap());
    assert!(!engine.saved().remove("b1").await.unwrap());
    assert!(engine.saved().is_empty());
}

/// Book identity is the id alone
#[tokio::test]
async fn test_same_id_different_content_is_one_book() {
    let kv = MemoryKv::new();
    let remote = MemoryStore::new();
    let engine = engine_on(ClioConfig::default(), &kv, &remote);
    engine.bootstrap().await;
    engine.continue_as_guest().await;

    engine
        .saved()
        .save(Book::new("b1", "Dune", "Frank Herbert"))
        .await
        .unwrap();
    let saved = engine
        .saved()
        .save(Book::new("b1", "Dune (Deluxe)", "F. Herbert"))
        .await
        .unwrap();
    assert!(!saved);
    assert_eq!(engine.saved().books()[0].title, "Dune");
}
