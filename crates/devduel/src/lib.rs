//! # DevDuel
//!
//! Two-player competitive coding duels over a shared session store.
//!
//! Two clients join one session, solve the same problem against the
//! clock, and converge on a single match result — with no authoritative
//! server driving the match. Each client runs its own countdown off a
//! persisted anchor, watches the shared record for the opponent's
//! scores, and applies the same deterministic resolution rules, so both
//! sides agree on the winner without coordinating.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use devduel::prelude::*;
//! use devduel::{MemoryAnchors, MemoryHistory, MemoryProblems, MemoryStore};
//!
//! # async fn run(problems: Vec<devduel::Problem>) -> Result<(), DevduelError> {
//! let store = Arc::new(MemoryStore::new());
//! let history = Arc::new(MemoryHistory::new());
//! let problems = Arc::new(MemoryProblems::new(problems));
//! let anchors = Arc::new(MemoryAnchors::new());
//!
//! let client = DuelClient::new(
//!     PlayerIdentity::guest("alice"),
//!     store, problems, history, anchors,
//! );
//!
//! // Open a room; the match (and the clock) starts once someone joins.
//! let open = client.create_match(Difficulty::Easy, 600).await?;
//! let mut game = open.wait_for_opponent().await?;
//!
//! game.submit(Score { solved: 10, total: 10 }, "...".into()).await?;
//! let _outcome = game.outcome().await;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;

pub use client::{DuelClient, OpenMatch};
pub use error::DevduelError;

pub use devduel_clock::{AnchorStore, ClockState, MatchClock, MemoryAnchors};
pub use devduel_match::{
    resolver, MatchError, MatchHandle, MatchOutcome, MatchView, ResolvedBy,
};
pub use devduel_protocol::{
    Difficulty, PlayerId, PlayerIdentity, ProblemId, Score, ScoreError,
    SessionId, Timestamp,
};
pub use devduel_session::{
    joinable, Discovery, DiscoveryConfig, SessionError, SessionManager,
};
pub use devduel_store::{
    CodeRunner, HistoryStore, MatchRecord, MemoryHistory, MemoryProblems,
    MemoryStore, PlayerEntry, Problem, ProblemStore, RunReport, RunRequest,
    Runtime, ScriptedRunner, SessionDoc, SessionStatus, SessionStore,
    StoreError, TestCase,
};

/// The types most integrations need.
pub mod prelude {
    pub use crate::{
        DevduelError, Difficulty, DuelClient, MatchHandle, MatchOutcome,
        PlayerIdentity, Score, SessionId,
    };
}
