//! Match history and the cumulative-wins leaderboard.
//!
//! Write-only append from the match core's point of view; reads serve a
//! player's past submissions and a leaderboard ranked by total wins.

use std::collections::HashMap;
use std::future::Future;

use devduel_protocol::{PlayerId, ProblemId, Score, Timestamp};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::StoreError;

/// One finished match from one player's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub player_id: PlayerId,
    pub problem_id: ProblemId,
    pub date: Timestamp,
    /// Final score as stored, e.g. `"7/10"`.
    pub score: String,
    /// The player's final code.
    pub code: String,
    pub won: bool,
}

/// Persistent per-player match history.
pub trait HistoryStore: Send + Sync + 'static {
    /// Appends a finished match.
    ///
    /// Per (player, problem) only the best submission is kept: a new
    /// record replaces the stored one when its score is greater or
    /// equal (ties prefer the newer code). A win increments the
    /// player's cumulative win count either way.
    fn append(&self, record: MatchRecord) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// A player's stored submissions, most recent first.
    fn submissions(
        &self,
        player: &PlayerId,
    ) -> impl Future<Output = Result<Vec<MatchRecord>, StoreError>> + Send;

    /// All players ranked by cumulative win count, descending.
    fn leaderboard(
        &self,
    ) -> impl Future<Output = Result<Vec<(PlayerId, u64)>, StoreError>> + Send;
}

// ---------------------------------------------------------------------------
// MemoryHistory
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Profile {
    wins: u64,
    best: HashMap<ProblemId, MatchRecord>,
}

/// A [`HistoryStore`] backed by a process-local map.
#[derive(Default)]
pub struct MemoryHistory {
    profiles: Mutex<HashMap<PlayerId, Profile>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistory {
    async fn append(&self, record: MatchRecord) -> Result<(), StoreError> {
        let mut profiles = self.profiles.lock().await;
        let profile = profiles.entry(record.player_id.clone()).or_default();

        if record.won {
            profile.wins += 1;
        }

        match profile.best.get(&record.problem_id) {
            Some(existing) => {
                let old = Score::parse_or_zero(&existing.score, 1).fraction();
                let new = Score::parse_or_zero(&record.score, 1).fraction();
                if new >= old {
                    profile.best.insert(record.problem_id.clone(), record);
                }
            }
            None => {
                profile.best.insert(record.problem_id.clone(), record);
            }
        }
        Ok(())
    }

    async fn submissions(&self, player: &PlayerId) -> Result<Vec<MatchRecord>, StoreError> {
        let profiles = self.profiles.lock().await;
        let mut records: Vec<MatchRecord> = profiles
            .get(player)
            .map(|p| p.best.values().cloned().collect())
            .unwrap_or_default();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    async fn leaderboard(&self) -> Result<Vec<(PlayerId, u64)>, StoreError> {
        let profiles = self.profiles.lock().await;
        let mut board: Vec<(PlayerId, u64)> = profiles
            .iter()
            .map(|(id, p)| (id.clone(), p.wins))
            .collect();
        // Wins descending; ties broken by id so the order is stable.
        board.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(board)
    }
}

// =========================================================================
// Tests
// =========================================================================
