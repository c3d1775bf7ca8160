//! Shared vocabulary for DevDuel.
//!
//! This crate defines the types every other layer speaks:
//!
//! - **Identities** ([`PlayerId`], [`SessionId`], [`ProblemId`],
//!   [`PlayerIdentity`]) — newtype wrappers over the opaque strings that
//!   cross the store boundary.
//! - **Time** ([`Timestamp`]) — wall-clock milliseconds since the Unix
//!   epoch. Wall clock, not a monotonic instant, because anchors and
//!   submission times must survive a client reload.
//! - **Scores** ([`Score`]) — the `"solved/total"` fraction both players
//!   report, with a strict parser for our own writes and a
//!   degrade-to-zero one for whatever the opponent wrote.
//!
//! It sits below everything else and knows nothing about stores, clocks,
//! or match rules.

mod error;
mod score;
mod types;

pub use error::ScoreError;
pub use score::Score;
pub use types::{
    Difficulty, PlayerId, PlayerIdentity, ProblemId, SessionId, Timestamp,
};
