//! Session lifecycle management for DevDuel.
//!
//! This crate owns the shared session record's lifecycle:
//!
//! 1. **Creation** — a client picks a problem, generates a session id,
//!    and persists the record with itself as the only player.
//! 2. **Joining** — a second client merges its own entry; a third is
//!    turned away with [`SessionError::Full`].
//! 3. **Leaving** — idempotent deletion, from either client.
//! 4. **Discovery** — listing joinable sessions and sweeping abandoned
//!    ones ([`Discovery`]).
//!
//! # How it fits in the stack
//!
//! ```text
//! Match layer (above)   ← coordinates scores and outcomes per match
//!     ↕
//! Session layer (this crate)   ← creates/joins/deletes the shared record
//!     ↕
//! Store layer (below)   ← the document store both clients write through
//! ```

mod discovery;
mod error;
mod manager;

pub use discovery::{joinable, Discovery, DiscoveryConfig};
pub use error::SessionError;
pub use manager::{SessionManager, MAX_DURATION_SECS};
