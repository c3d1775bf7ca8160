//! The session lifecycle manager: create, join, leave.

use std::sync::Arc;

use devduel_protocol::{Difficulty, PlayerIdentity, SessionId, Timestamp};
use devduel_store::{PlayerEntry, ProblemStore, SessionDoc, SessionStore};
use rand::Rng;

use crate::SessionError;

/// Upper bound on match length (one hour). Requests above it are
/// clamped, requests of zero are raised to one second.
pub const MAX_DURATION_SECS: u32 = 3_600;

/// Fallback score denominator when a session's existing entries don't
/// reveal one (a malformed creator entry).
const DEFAULT_TOTAL_TESTS: u32 = 10;

/// Creates, joins, and deletes shared session records.
///
/// One per client. Stateless apart from its store handles — everything
/// authoritative lives in the session store, because the other player
/// mutates the same record concurrently.
pub struct SessionManager<S, P> {
    store: Arc<S>,
    problems: Arc<P>,
}

impl<S: SessionStore, P: ProblemStore> SessionManager<S, P> {
    pub fn new(store: Arc<S>, problems: Arc<P>) -> Self {
        Self { store, problems }
    }

    /// Creates a session: picks a problem for `difficulty`, persists the
    /// record with the creator as its only player, and returns it.
    ///
    /// # Errors
    /// [`SessionError::ProblemUnavailable`] if no problem matches.
    pub async fn create(
        &self,
        identity: &PlayerIdentity,
        difficulty: Difficulty,
        duration_secs: u32,
    ) -> Result<SessionDoc, SessionError> {
        let duration_secs = clamp_duration(duration_secs);

        let problem = self
            .problems
            .pick(difficulty)
            .await?
            .ok_or(SessionError::ProblemUnavailable(difficulty))?;

        let session_id = generate_session_id();
        let created_at = Timestamp::now();
        let doc = SessionDoc {
            session_id: session_id.clone(),
            room_name: identity.display_name.clone(),
            problem_id: problem.problem_id.clone(),
            difficulty,
            duration_secs,
            created_at,
            players: vec![PlayerEntry::joining(
                identity,
                problem.total_tests,
                created_at,
            )],
        };

        self.store.create(doc.clone()).await?;
        tracing::info!(
            %session_id,
            player_id = %identity.player_id,
            %difficulty,
            duration_secs,
            "session created"
        );
        Ok(doc)
    }

    /// Joins an open session as the second player.
    ///
    /// Joining with a player id already present refreshes that entry
    /// instead of failing, so a reloading client can re-enter its own
    /// session.
    ///
    /// # Errors
    /// - [`SessionError::Full`] — two other players already present
    ///   (lost the join race; fall back to discovery).
    /// - [`SessionError::NotFound`] — deleted concurrently.
    pub async fn join(
        &self,
        session_id: &SessionId,
        identity: &PlayerIdentity,
    ) -> Result<SessionDoc, SessionError> {
        let doc = self
            .store
            .get(session_id)
            .await
            .map_err(SessionError::from_store)?;

        // Both players score over the same denominator; read it off the
        // creator's entry rather than re-fetching the problem.
        let total_tests = doc
            .players
            .first()
            .map(|p| p.score_or_zero(DEFAULT_TOTAL_TESTS).total)
            .unwrap_or(DEFAULT_TOTAL_TESTS);

        let entry = PlayerEntry::joining(identity, total_tests, Timestamp::now());
        let joined = self
            .store
            .merge_player(session_id, entry)
            .await
            .map_err(SessionError::from_store)?;

        tracing::info!(
            %session_id,
            player_id = %identity.player_id,
            players = joined.players.len(),
            "player joined session"
        );
        Ok(joined)
    }

    /// Deletes a session. Idempotent — deleting a session that is
    /// already gone is not an error.
    pub async fn leave(&self, session_id: &SessionId) -> Result<(), SessionError> {
        self.store.delete(session_id).await?;
        tracing::info!(%session_id, "session left/deleted");
        Ok(())
    }
}

fn clamp_duration(duration_secs: u32) -> u32 {
    if duration_secs == 0 {
        tracing::warn!("zero match duration requested — raising to 1s");
        1
    } else if duration_secs > MAX_DURATION_SECS {
        tracing::warn!(
            requested = duration_secs,
            max = MAX_DURATION_SECS,
            "match duration exceeds maximum — clamping"
        );
        MAX_DURATION_SECS
    } else {
        duration_secs
    }
}

/// Generates a 6-character base-36 session id.
///
/// Client-generated, like the rest of the session record. Six base-36
/// characters give ~2 billion combinations — plenty for the number of
/// concurrently open rooms, and short enough to share by hand.
fn generate_session_id() -> SessionId {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    let id: String = (0..6)
        .map(|_| {
            let idx = rng.random_range(0..ALPHABET.len());
            ALPHABET[idx] as char
        })
        .collect();
    SessionId(id)
}

// =========================================================================
// Tests
// =========================================================================
