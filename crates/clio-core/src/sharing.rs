//! Share resolution
//!
//! Two-phase lookup from an opaque share token to a readable list:
//!
//! 1. `resolve_header`: collection-group query over every owner's
//!    `readingLists` for `shareToken == token AND isPublic == true`
//! 2. `fetch_owner_books`: read the list's nested books under the owner's
//!    namespace (read-only for the visitor)
//!
//! An unknown token and a private list produce the same
//! [`ClioError::NotFoundOrPrivate`].

use std::sync::Arc;

use rand::distr::Alphanumeric;
use rand::Rng;
use tracing::{debug, warn};

use crate::error::{ClioError, ClioResult};
use crate::remote::{self, path, FieldFilter, RemoteStore};
use crate::session::Session;
use crate::types::{Book, ReadingList, SharedList};

/// Random share token over `[A-Za-z0-9]`.
///
/// Not a secret: anyone holding the token can read the list while it is
/// public.
pub fn generate_share_token(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Outbound link for a share token
pub fn share_link(app_domain: &str, token: &str) -> String {
    format!("https://{}/#/list/{}", app_domain, token)
}

/// Whether any list, public or not, already uses `token`
pub(crate) async fn token_in_use(remote: &dyn RemoteStore, token: &str) -> ClioResult<bool> {
    let hits = remote
        .query_group(path::READING_LISTS, &[FieldFilter::eq("shareToken", token)])
        .await?;
    Ok(!hits.is_empty())
}

/// Public lookup path, open to guests and signed-in actors alike
pub struct ShareResolver {
    session: Arc<Session>,
    remote: Arc<dyn RemoteStore>,
}

impl ShareResolver {
    pub fn new(session: Arc<Session>, remote: Arc<dyn RemoteStore>) -> Self {
        Self { session, remote }
    }

    /// Find the public list header for `token`
    pub async fn resolve_header(&self, token: &str) -> ClioResult<ReadingList> {
        self.session.require_actor()?;
        if token.is_empty() {
            return Err(ClioError::NotFoundOrPrivate);
        }

        let hits = self
            .remote
            .query_group(
                path::READING_LISTS,
                &[
                    FieldFilter::eq("shareToken", token),
                    FieldFilter::eq("isPublic", true),
                ],
            )
            .await
            .inspect_err(|e| warn!(error = %e, "Share lookup failed"))?;

        if hits.len() > 1 {
            warn!(matches = hits.len(), "Share token matched more than one list");
        }

        let Some((doc_path, doc)) = hits.into_iter().next() else {
            debug!("No public list for share token");
            return Err(ClioError::NotFoundOrPrivate);
        };

        let mut list: ReadingList = match remote::decode(&doc_path, doc) {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, "Shared list header did not decode");
                return Err(ClioError::NotFoundOrPrivate);
            }
        };
        list.id = Some(doc_path.id().to_string());
        if list.owner_id.is_none() {
            list.owner_id = path::owner_of(&doc_path);
        }
        Ok(list)
    }

    /// Fetch a shared list's books from its owner's namespace.
    ///
    /// A header without an owner or id has no reachable books.
    pub async fn fetch_owner_books(&self, list: &ReadingList) -> ClioResult<Vec<Book>> {
        self.session.require_actor()?;
        let (Some(owner), Some(list_id)) = (&list.owner_id, &list.id) else {
            debug!(title = %list.title, "Shared list has no owner; showing no books");
            return Ok(Vec::new());
        };

        let docs = self
            .remote
            .list(&path::list_books(owner, list_id)?)
            .await
            .inspect_err(|e| warn!(%list_id, error = %e, "Failed to fetch shared list books"))?;
        Ok(remote::decode_all::<Book>(docs)
            .into_iter()
            .map(|(_, book)| book)
            .collect())
    }

    /// Header plus books
    pub async fn resolve(&self, token: &str) -> ClioResult<SharedList> {
        let list = self.resolve_header(token).await?;
        let books = self.fetch_owner_books(&list).await?;
        Ok(SharedList { list, books })
    }
}
