//! Error types for the store layer.

use devduel_protocol::SessionId;

/// Errors that can occur talking to a backing store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The session document does not exist (never created, or already
    /// deleted). Deletion is terminal: callers must treat this as "the
    /// session is gone", never as "the opponent has zero players".
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// The session already holds two players; a third cannot be merged.
    #[error("session {0} is full")]
    Full(SessionId),

    /// Transient connectivity failure. Callers on a routine poll or
    /// subscription tick log this and keep their previous state — it is
    /// never grounds for a match-ending decision.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
