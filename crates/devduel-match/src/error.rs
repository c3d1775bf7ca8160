//! Error types for the match layer.

use devduel_protocol::Score;
use devduel_store::StoreError;

/// Errors that can occur interacting with a running match.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// The match already resolved; further updates are ignored.
    #[error("match already finished")]
    Finished,

    /// The offered score is below the player's current stored score.
    /// Submissions are monotone: a worse run never replaces a better one.
    #[error("submission {offered} is below current score {current}")]
    ScoreRegression { current: Score, offered: Score },

    /// The submission would carry an earlier timestamp than the stored
    /// one. Out-of-order local writes are rejected.
    #[error("submission timestamp out of order")]
    OutOfOrder,

    /// The coordinator task is gone (dropped or crashed).
    #[error("match coordinator unavailable")]
    Unavailable,

    /// An underlying store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}
