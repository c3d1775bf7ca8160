//! Score synchronization and outcome determination for DevDuel.
//!
//! This crate is the reason the rest of the stack exists: two clients,
//! each running this code independently against the same session
//! record, must converge on a single consistent match result without a
//! referee.
//!
//! Two pieces:
//!
//! - [`resolver`] — the pure comparison that turns two score fractions
//!   (plus tie-break timestamps) into a win/lose verdict. Symmetric by
//!   construction: both clients apply the same rule to the same stored
//!   values, so they agree without coordinating.
//! - the match coordinator ([`spawn_match`] / [`MatchHandle`]) — the
//!   per-client actor that feeds the resolver. It owns the store
//!   subscription (push path), the local clock (expiry path), and the
//!   player's submissions, funnelling all three into one
//!   single-threaded loop guarded by a one-shot `finished` flag.

mod coordinator;
mod error;
pub mod resolver;

pub use coordinator::{
    spawn_match, MatchCommand, MatchHandle, MatchOutcome, MatchView, ResolvedBy,
};
pub use error::MatchError;
