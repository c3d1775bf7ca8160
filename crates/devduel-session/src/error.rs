//! Error types for the session layer.

use devduel_protocol::{Difficulty, SessionId};
use devduel_store::StoreError;

/// Errors that can occur during session lifecycle operations.
///
/// `NotFound` and `Full` are surfaced to the caller to drive a fallback
/// to discovery — they are expected outcomes under racing clients, never
/// retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session was deleted (or never existed). Terminal: not the
    /// same thing as a session with zero players.
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// Two players are already present; this client lost the join race.
    #[error("session {0} is full")]
    Full(SessionId),

    /// The problem store had nothing matching the requested difficulty.
    #[error("no problem available for difficulty {0}")]
    ProblemUnavailable(Difficulty),

    /// An underlying store failure that isn't one of the above.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    /// Lifts a store error into the session taxonomy, translating the
    /// variants that have a session-level meaning.
    pub(crate) fn from_store(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::Full(id) => Self::Full(id),
            other => Self::Store(other),
        }
    }
}
