//! The session store trait and its subscription handle.
//!
//! Models a document-oriented key-value store: create/overwrite, partial
//! merge, idempotent delete, listing, and a subscription primitive that
//! delivers the full current document on every mutation. Delivery is
//! at-least-once with no ordering guarantee across rapid successive
//! writes beyond "latest write wins".

use std::future::Future;

use devduel_protocol::SessionId;
use tokio::sync::broadcast;

use crate::{PlayerEntry, SessionDoc, StoreError};

/// A document-oriented store holding one [`SessionDoc`] per session id.
///
/// Implementations provide **no transactional isolation**: concurrent
/// writers may race, and the API is shaped so that every multi-writer
/// field is either owned by a single writer ([`merge_player`]) or
/// idempotent ([`delete`]).
///
/// [`merge_player`]: SessionStore::merge_player
/// [`delete`]: SessionStore::delete
pub trait SessionStore: Send + Sync + 'static {
    /// Creates (or overwrites) the full session document.
    fn create(&self, doc: SessionDoc) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Reads the current document.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] once the session has been deleted.
    fn get(
        &self,
        id: &SessionId,
    ) -> impl Future<Output = Result<SessionDoc, StoreError>> + Send;

    /// Merges one player's entry into the document and returns the
    /// updated document.
    ///
    /// If an entry with the same `player_id` exists it is replaced in
    /// place (join order preserved); otherwise the entry is appended.
    ///
    /// # Errors
    /// - [`StoreError::NotFound`] — session deleted concurrently.
    /// - [`StoreError::Full`] — two other players already present. A
    ///   racing joiner must treat this as a normal outcome and fall
    ///   back to discovery.
    fn merge_player(
        &self,
        id: &SessionId,
        entry: PlayerEntry,
    ) -> impl Future<Output = Result<SessionDoc, StoreError>> + Send;

    /// Deletes the document. Idempotent: deleting a session that does
    /// not exist is not an error.
    fn delete(&self, id: &SessionId) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Lists all current session documents.
    fn list(&self) -> impl Future<Output = Result<Vec<SessionDoc>, StoreError>> + Send;

    /// Subscribes to the document. The returned watch yields the full
    /// document after every mutation until the session is deleted.
    fn subscribe(
        &self,
        id: &SessionId,
    ) -> impl Future<Output = Result<SessionWatch, StoreError>> + Send;
}

// ---------------------------------------------------------------------------
// SessionWatch
// ---------------------------------------------------------------------------

/// A live subscription to one session document.
///
/// Wraps a broadcast receiver so that a slow consumer skips to the
/// newest snapshot instead of erroring: intermediate documents carry no
/// information the latest one doesn't.
pub struct SessionWatch {
    rx: broadcast::Receiver<SessionDoc>,
}

impl SessionWatch {
    pub fn new(rx: broadcast::Receiver<SessionDoc>) -> Self {
        Self { rx }
    }

    /// Waits for the next document snapshot.
    ///
    /// Returns `None` once the session has been deleted and no further
    /// snapshots can arrive.
    pub async fn changed(&mut self) -> Option<SessionDoc> {
        loop {
            match self.rx.recv().await {
                Ok(doc) => return Some(doc),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "subscription lagged, skipping to latest");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
