//! Room discovery and stale-session cleanup.
//!
//! Discovery is how a player finds a match: list the sessions, show the
//! joinable ones. The same pass doubles as the garbage collector for
//! abandoned records — there is no server-side sweeper, so whichever
//! client happens to refresh its lobby does the pruning. Two clients may
//! prune the same session concurrently; deletion is idempotent, so the
//! race is safe, just not efficient.

use std::sync::Arc;
use std::time::Duration;

use devduel_protocol::Timestamp;
use devduel_store::{SessionDoc, SessionStatus, SessionStore};

use crate::SessionError;

/// Discovery tuning.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Age past which a full (two-player) session counts as abandoned.
    pub stale_after: Duration,
    /// Suggested lobby refresh cadence for callers' poll loops.
    pub refresh_interval: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(6 * 60 * 60),
            refresh_interval: Duration::from_secs(5),
        }
    }
}

/// Lists live sessions and prunes abandoned ones.
pub struct Discovery<S> {
    store: Arc<S>,
    config: DiscoveryConfig,
}

impl<S: SessionStore> Discovery<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, DiscoveryConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: DiscoveryConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// One discovery pass: lists all sessions, deletes the abandoned
    /// ones, and returns the survivors (open and in-progress).
    ///
    /// Pruning is advisory — a failed delete is logged and the session
    /// simply stays out of this pass's results; some later pass will
    /// retry.
    pub async fn refresh(&self, now: Timestamp) -> Result<Vec<SessionDoc>, SessionError> {
        let sessions = self.store.list().await?;
        let mut live = Vec::with_capacity(sessions.len());

        for doc in sessions {
            if self.is_abandoned(&doc, now) {
                tracing::info!(
                    session_id = %doc.session_id,
                    players = doc.players.len(),
                    age_secs = doc.age(now).as_secs(),
                    "pruning abandoned session"
                );
                if let Err(e) = self.store.delete(&doc.session_id).await {
                    tracing::warn!(
                        session_id = %doc.session_id,
                        error = %e,
                        "failed to prune session"
                    );
                }
                continue;
            }
            live.push(doc);
        }

        Ok(live)
    }

    /// A session is abandoned when nobody is in it, or when a full
    /// match has sat around past the staleness threshold (both players
    /// long gone without tearing it down).
    fn is_abandoned(&self, doc: &SessionDoc, now: Timestamp) -> bool {
        match doc.status() {
            SessionStatus::Dead => true,
            SessionStatus::Full => doc.age(now) > self.config.stale_after,
            // An open room is someone actively waiting for an opponent.
            SessionStatus::Open => false,
        }
    }
}

/// Filters a refresh result down to the sessions a player can join.
pub fn joinable(sessions: &[SessionDoc]) -> Vec<&SessionDoc> {
    sessions.iter().filter(|doc| doc.is_joinable()).collect()
}

// =========================================================================
// Tests
// =========================================================================
