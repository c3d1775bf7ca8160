//! The shared session document and its player entries.
//!
//! One `SessionDoc` is the entire shared state of a match. Both clients
//! read it, both clients write it — but each player only ever writes
//! their own entry, which is what makes lock-free merging safe.

use std::time::Duration;

use devduel_protocol::{
    Difficulty, PlayerId, PlayerIdentity, ProblemId, Score, SessionId, Timestamp,
};
use serde::{Deserialize, Serialize};

/// Hard cap on players per session. A duel is exactly two.
pub const MAX_PLAYERS: usize = 2;

// ---------------------------------------------------------------------------
// PlayerEntry
// ---------------------------------------------------------------------------

/// One player's state within a session.
///
/// `score` is kept as the raw stored string rather than a parsed
/// [`Score`]: the other entry was written by a process we don't control,
/// and a malformed value must degrade to `0/total` instead of poisoning
/// the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub player_id: PlayerId,
    pub display_name: String,
    /// String-encoded fraction, e.g. `"3/10"`.
    pub score: String,
    /// When the submission that produced `score` was accepted.
    /// Non-decreasing over the session lifetime.
    pub submitted_at: Timestamp,
}

impl PlayerEntry {
    /// A fresh entry with a zero score over the session's denominator.
    pub fn joining(identity: &PlayerIdentity, total_tests: u32, now: Timestamp) -> Self {
        Self {
            player_id: identity.player_id.clone(),
            display_name: identity.display_name.clone(),
            score: Score::zero(total_tests).to_string(),
            submitted_at: now,
        }
    }

    /// The entry's score; garbage becomes `0/total_hint`.
    pub fn score_or_zero(&self, total_hint: u32) -> Score {
        Score::parse_or_zero(&self.score, total_hint)
    }

    /// Time from session creation to this entry's last accepted
    /// submission. Saturates to zero under clock skew.
    pub fn elapsed(&self, created_at: Timestamp) -> Duration {
        self.submitted_at.since(created_at)
    }
}

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// Session status, derived from player cardinality — never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Zero players: abandoned, awaiting cleanup.
    Dead,
    /// One player: open and joinable.
    Open,
    /// Two players: full, match in progress.
    Full,
}

// ---------------------------------------------------------------------------
// SessionDoc
// ---------------------------------------------------------------------------

/// The shared, mutable record representing one two-player match.
///
/// `session_id`, `problem_id`, `difficulty`, `duration_secs`, and
/// `created_at` are fixed at creation; only `players` mutates afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDoc {
    pub session_id: SessionId,
    /// Display label for discovery listings (the creator's name).
    pub room_name: String,
    pub problem_id: ProblemId,
    pub difficulty: Difficulty,
    /// Match length, fixed at creation.
    pub duration_secs: u32,
    pub created_at: Timestamp,
    /// At most [`MAX_PLAYERS`] entries; insertion order is join order
    /// (meaningful for display, not for outcome logic).
    #[serde(default)]
    pub players: Vec<PlayerEntry>,
}

impl SessionDoc {
    pub fn status(&self) -> SessionStatus {
        match self.players.len() {
            0 => SessionStatus::Dead,
            1 => SessionStatus::Open,
            _ => SessionStatus::Full,
        }
    }

    pub fn is_joinable(&self) -> bool {
        self.status() == SessionStatus::Open
    }

    pub fn is_full(&self) -> bool {
        self.status() == SessionStatus::Full
    }

    /// Looks up a player's entry by id, falling back to display name.
    ///
    /// The fallback matters for guest sessions, where the id *is* the
    /// chosen name and either may be the only correlation key present.
    pub fn entry_for(&self, identity: &PlayerIdentity) -> Option<&PlayerEntry> {
        self.players
            .iter()
            .find(|p| p.player_id == identity.player_id)
            .or_else(|| {
                self.players
                    .iter()
                    .find(|p| p.display_name == identity.display_name)
            })
    }

    /// The entry that is not this player's, if a second player joined.
    pub fn opponent_of(&self, identity: &PlayerIdentity) -> Option<&PlayerEntry> {
        let mine = self.entry_for(identity)?;
        let mine_id = mine.player_id.clone();
        self.players.iter().find(|p| p.player_id != mine_id)
    }

    /// How long ago this session was created.
    pub fn age(&self, now: Timestamp) -> Duration {
        now.since(self.created_at)
    }
}

// =========================================================================
// Tests
// =========================================================================
