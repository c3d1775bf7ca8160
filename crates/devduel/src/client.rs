//! `DuelClient`: one player's wiring of the full stack.
//!
//! A `DuelClient` is what an application embeds per player: it holds
//! the player's identity and the collaborator handles, and turns the
//! lifecycle operations (create, join, lobby) into running matches.

use std::sync::Arc;

use devduel_clock::{AnchorStore, MatchClock};
use devduel_match::{spawn_match, MatchHandle};
use devduel_protocol::{Difficulty, PlayerIdentity, ProblemId, SessionId, Timestamp};
use devduel_session::{Discovery, SessionError, SessionManager};
use devduel_store::{
    HistoryStore, Problem, ProblemStore, SessionDoc, SessionStore, SessionWatch,
};

use crate::DevduelError;

/// One player's client: identity plus collaborator handles.
///
/// Both players of a duel construct their own `DuelClient` against the
/// same (shared) session store; nothing else is shared between them.
pub struct DuelClient<S, P, H, A> {
    identity: PlayerIdentity,
    store: Arc<S>,
    problems: Arc<P>,
    history: Arc<H>,
    anchors: Arc<A>,
    manager: SessionManager<S, P>,
    discovery: Discovery<S>,
}

impl<S, P, H, A> DuelClient<S, P, H, A>
where
    S: SessionStore,
    P: ProblemStore,
    H: HistoryStore,
    A: AnchorStore,
{
    pub fn new(
        identity: PlayerIdentity,
        store: Arc<S>,
        problems: Arc<P>,
        history: Arc<H>,
        anchors: Arc<A>,
    ) -> Self {
        let manager =
            SessionManager::new(Arc::clone(&store), Arc::clone(&problems));
        let discovery = Discovery::new(Arc::clone(&store));
        Self {
            identity,
            store,
            problems,
            history,
            anchors,
            manager,
            discovery,
        }
    }

    pub fn identity(&self) -> &PlayerIdentity {
        &self.identity
    }

    pub fn discovery(&self) -> &Discovery<S> {
        &self.discovery
    }

    /// Creates a session and returns the waiting room.
    ///
    /// The creator's match (and clock) does not start until an opponent
    /// arrives — call [`OpenMatch::wait_for_opponent`] to block until
    /// then, or [`OpenMatch::cancel`] to tear the room down.
    pub async fn create_match(
        &self,
        difficulty: Difficulty,
        duration_secs: u32,
    ) -> Result<OpenMatch<'_, S, P, H, A>, DevduelError> {
        let doc = self
            .manager
            .create(&self.identity, difficulty, duration_secs)
            .await?;
        let watch = self.store.subscribe(&doc.session_id).await?;
        tracing::info!(
            session_id = %doc.session_id,
            player_id = %self.identity.player_id,
            "match created, waiting for opponent"
        );
        Ok(OpenMatch {
            client: self,
            doc,
            watch,
        })
    }

    /// Joins an open session and starts this player's match coordinator.
    ///
    /// On [`SessionError::Full`](devduel_session::SessionError::Full)
    /// the caller should go back to [`lobby`](Self::lobby) and pick
    /// another room.
    pub async fn join_match(
        &self,
        session_id: &SessionId,
    ) -> Result<MatchHandle, DevduelError> {
        let doc = self.manager.join(session_id, &self.identity).await?;
        tracing::info!(
            %session_id,
            player_id = %self.identity.player_id,
            "joined match"
        );
        Ok(self.start(doc).await)
    }

    /// One discovery pass: live sessions, with abandoned ones pruned.
    pub async fn lobby(&self) -> Result<Vec<SessionDoc>, DevduelError> {
        Ok(self.discovery.refresh(Timestamp::now()).await?)
    }

    /// Fetches a problem definition for display.
    pub async fn problem(&self, id: &ProblemId) -> Result<Option<Problem>, DevduelError> {
        Ok(self.problems.get(id).await?)
    }

    async fn start(&self, doc: SessionDoc) -> MatchHandle {
        let clock = MatchClock::start(
            &*self.anchors,
            &self.identity.player_id,
            &doc.session_id,
            doc.duration_secs,
        )
        .await;
        spawn_match(
            Arc::clone(&self.store),
            Arc::clone(&self.history),
            self.identity.clone(),
            doc,
            clock,
        )
    }
}

// ---------------------------------------------------------------------------
// OpenMatch
// ---------------------------------------------------------------------------

/// A created session still waiting for its second player.
///
/// The creator's clock is anchored when the match actually begins
/// (opponent joined), not when the room was opened — time spent waiting
/// in the lobby doesn't eat match time.
pub struct OpenMatch<'a, S, P, H, A> {
    client: &'a DuelClient<S, P, H, A>,
    doc: SessionDoc,
    watch: SessionWatch,
}

impl<S, P, H, A> OpenMatch<'_, S, P, H, A>
where
    S: SessionStore,
    P: ProblemStore,
    H: HistoryStore,
    A: AnchorStore,
{
    pub fn session_id(&self) -> &SessionId {
        &self.doc.session_id
    }

    /// Waits until a second player joins, then starts this player's
    /// match coordinator.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if the session disappears while
    /// waiting (swept as stale, or deleted elsewhere).
    pub async fn wait_for_opponent(mut self) -> Result<MatchHandle, DevduelError> {
        let mut doc = self.doc.clone();
        while !doc.is_full() {
            match self.watch.changed().await {
                Some(updated) => doc = updated,
                None => {
                    return Err(SessionError::NotFound(
                        self.doc.session_id.clone(),
                    )
                    .into());
                }
            }
        }
        tracing::info!(
            session_id = %doc.session_id,
            player_id = %self.client.identity.player_id,
            "opponent joined, match starting"
        );
        Ok(self.client.start(doc).await)
    }

    /// Tears the room down without playing (the waiting player gave up).
    pub async fn cancel(self) -> Result<(), DevduelError> {
        // The subscription drops with `self`; deletion is idempotent.
        self.client.manager.leave(&self.doc.session_id).await?;
        Ok(())
    }
}
