//! External collaborator interfaces for DevDuel.
//!
//! The match core never talks to a concrete backend. Everything it needs
//! from the outside world is one of four traits defined here, each with
//! an in-memory reference implementation used by tests and the demo:
//!
//! - [`SessionStore`] / [`MemoryStore`] — the shared mutable session
//!   document, with a push subscription that delivers the full document
//!   on every mutation (at-least-once, unordered; latest write wins).
//! - [`HistoryStore`] / [`MemoryHistory`] — append-only match history
//!   and the cumulative-wins leaderboard.
//! - [`ProblemStore`] / [`MemoryProblems`] — problem definitions keyed
//!   by id, picked by difficulty.
//! - [`CodeRunner`] / [`ScriptedRunner`] — the sandboxed execution
//!   service, a black box that classifies each run as success, bug, or
//!   infrastructure failure.
//!
//! # Concurrency contract
//!
//! The session store offers **no transactional isolation and no
//! locking**. Two clients write concurrently and safety comes from the
//! shape of the data instead: each player merges only their own
//! [`PlayerEntry`] ([`SessionStore::merge_player`]), and deletion is
//! idempotent. The one invariant the store itself upholds is the
//! two-player cap — a third distinct player is rejected with
//! [`StoreError::Full`].

#![allow(async_fn_in_trait)]

mod error;
mod history;
mod memory;
mod problems;
mod runner;
mod session;
mod store;

pub use error::StoreError;
pub use history::{HistoryStore, MatchRecord, MemoryHistory};
pub use memory::MemoryStore;
pub use problems::{MemoryProblems, Problem, ProblemStore, TestCase, MAX_SAMPLE_TESTS};
pub use runner::{CodeRunner, RunReport, RunRequest, Runtime, ScriptedRunner, TestResult};
pub use session::{PlayerEntry, SessionDoc, SessionStatus, MAX_PLAYERS};
pub use store::{SessionStore, SessionWatch};
