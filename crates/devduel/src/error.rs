//! Unified error type for the DevDuel stack.

use devduel_match::MatchError;
use devduel_protocol::ScoreError;
use devduel_session::SessionError;
use devduel_store::StoreError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `devduel` meta-crate you deal with this single type;
/// the `#[from]` impls let `?` convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum DevduelError {
    /// A session lifecycle error (not found, full, no problem).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A match coordination error (finished, regression, task gone).
    #[error(transparent)]
    Match(#[from] MatchError),

    /// A store error that reached the caller directly.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A malformed score string on the strict parsing path.
    #[error(transparent)]
    Score(#[from] ScoreError),
}
