//! The match coordinator: one actor task per client per match.
//!
//! The coordinator is the single-threaded funnel the whole design
//! hinges on. Three event sources feed it — the store subscription
//! (push path), the local clock (expiry path), and the player's own
//! commands — and all of them converge on one `finished` flag, so
//! resolution runs at most once per client no matter which paths fire
//! or in what order.
//!
//! ```text
//!  store subscription ──┐
//!  clock expiry ────────┼──→ select! loop ──→ resolve (once) ──→ outcome
//!  player commands ─────┘                        │
//!                                                ├── history append
//!                                                └── session delete
//! ```
//!
//! Communication follows the actor pattern: [`spawn_match`] starts the
//! task and returns a cheap-to-clone [`MatchHandle`]; commands carry
//! `oneshot` reply channels; the terminal outcome is published on a
//! `watch` channel.

use std::sync::Arc;
use std::time::Duration;

use devduel_clock::MatchClock;
use devduel_protocol::{PlayerIdentity, ProblemId, Score, SessionId, Timestamp};
use devduel_store::{
    HistoryStore, MatchRecord, PlayerEntry, SessionDoc, SessionStore, SessionWatch,
};
use tokio::sync::{mpsc, oneshot, watch};

use crate::{resolver, MatchError};

/// Command channel depth. Submissions are human-paced; this never fills
/// in practice.
const COMMAND_CHANNEL_SIZE: usize = 32;

/// Which signal path produced the resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ResolvedBy {
    /// A perfect score ended the match before the clock ran out.
    Push,
    /// The local clock expired and the match resolved on a final read.
    Expiry,
}

/// The terminal result of a match, from this client's perspective.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MatchOutcome {
    pub won: bool,
    pub my_score: Score,
    pub opponent_score: Score,
    pub resolved_by: ResolvedBy,
}

/// A point-in-time view of the match for UI rendering.
#[derive(Debug, Clone)]
pub struct MatchView {
    /// Time left on this client's countdown.
    pub remaining: Duration,
    /// Player entries as last seen, in join order.
    pub players: Vec<PlayerEntry>,
    pub finished: bool,
}

/// Commands sent to the coordinator through its channel.
pub enum MatchCommand {
    /// Submit a new score (from a successful run) and the code that
    /// produced it.
    Submit {
        score: Score,
        code: String,
        reply: oneshot::Sender<Result<(), MatchError>>,
    },
    /// Request the current view.
    Snapshot { reply: oneshot::Sender<MatchView> },
    /// Leave voluntarily: cancel the subscription and clock, delete the
    /// session, produce no outcome.
    Abandon { reply: oneshot::Sender<()> },
}

// ---------------------------------------------------------------------------
// MatchHandle
// ---------------------------------------------------------------------------

/// Handle to a running match coordinator.
#[derive(Clone)]
pub struct MatchHandle {
    session_id: SessionId,
    commands: mpsc::Sender<MatchCommand>,
    outcome: watch::Receiver<Option<MatchOutcome>>,
}

impl MatchHandle {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Submits a score update for this player.
    ///
    /// # Errors
    /// - [`MatchError::ScoreRegression`] — below the current score.
    /// - [`MatchError::Finished`] — the match already resolved.
    pub async fn submit(&self, score: Score, code: String) -> Result<(), MatchError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(MatchCommand::Submit {
                score,
                code,
                reply: reply_tx,
            })
            .await
            .map_err(|_| MatchError::Unavailable)?;
        reply_rx.await.map_err(|_| MatchError::Unavailable)?
    }

    /// Requests the current match view.
    pub async fn snapshot(&self) -> Result<MatchView, MatchError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(MatchCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| MatchError::Unavailable)?;
        reply_rx.await.map_err(|_| MatchError::Unavailable)
    }

    /// Leaves the match without resolving it.
    pub async fn abandon(&self) -> Result<(), MatchError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(MatchCommand::Abandon { reply: reply_tx })
            .await
            .map_err(|_| MatchError::Unavailable)?;
        reply_rx.await.map_err(|_| MatchError::Unavailable)
    }

    /// Waits for the match to resolve.
    ///
    /// Returns `None` if the coordinator went away without an outcome
    /// (abandoned match).
    pub async fn outcome(&mut self) -> Option<MatchOutcome> {
        loop {
            let current: Option<MatchOutcome> = self.outcome.borrow().clone();
            if current.is_some() {
                return current;
            }
            if self.outcome.changed().await.is_err() {
                // Coordinator gone; report whatever it last published.
                let last: Option<MatchOutcome> = self.outcome.borrow().clone();
                return last;
            }
        }
    }

    /// The outcome, if the match has already resolved.
    pub fn try_outcome(&self) -> Option<MatchOutcome> {
        let current: Option<MatchOutcome> = self.outcome.borrow().clone();
        current
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

struct MatchActor<S: SessionStore, H: HistoryStore> {
    store: Arc<S>,
    history: Arc<H>,
    identity: PlayerIdentity,
    session_id: SessionId,
    problem_id: ProblemId,
    created_at: Timestamp,
    total_tests: u32,
    clock: MatchClock,
    /// Most recent document this client has seen. The fallback when a
    /// fresh read fails at expiry: the match must still resolve.
    last_seen: SessionDoc,
    /// Latest code accepted alongside a score submission; written to
    /// history at resolution.
    code: String,
    finished: bool,
    commands: mpsc::Receiver<MatchCommand>,
    outcome_tx: watch::Sender<Option<MatchOutcome>>,
}

/// Spawns a coordinator for one client's view of one match.
///
/// `doc` is the session record as of entry (creation or join); `clock`
/// is this client's anchored countdown.
pub fn spawn_match<S: SessionStore, H: HistoryStore>(
    store: Arc<S>,
    history: Arc<H>,
    identity: PlayerIdentity,
    doc: SessionDoc,
    clock: MatchClock,
) -> MatchHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
    let (outcome_tx, outcome_rx) = watch::channel(None);

    let total_tests = doc
        .entry_for(&identity)
        .or_else(|| doc.players.first())
        .map(|e| e.score_or_zero(1).total)
        .unwrap_or(1);

    let actor = MatchActor {
        store,
        history,
        identity,
        session_id: doc.session_id.clone(),
        problem_id: doc.problem_id.clone(),
        created_at: doc.created_at,
        total_tests,
        clock,
        last_seen: doc.clone(),
        code: String::new(),
        finished: false,
        commands: cmd_rx,
        outcome_tx,
    };

    tokio::spawn(actor.run());

    MatchHandle {
        session_id: doc.session_id,
        commands: cmd_tx,
        outcome: outcome_rx,
    }
}

impl<S: SessionStore, H: HistoryStore> MatchActor<S, H> {
    async fn run(mut self) {
        tracing::info!(
            session_id = %self.session_id,
            player_id = %self.identity.player_id,
            "match coordinator started"
        );

        // The push path. If the subscription can't be established the
        // match still terminates through the expiry path.
        let mut push: Option<SessionWatch> =
            match self.store.subscribe(&self.session_id).await {
                Ok(watch) => Some(watch),
                Err(e) => {
                    tracing::warn!(
                        session_id = %self.session_id,
                        error = %e,
                        "subscription unavailable, relying on expiry path"
                    );
                    None
                }
            };

        while !self.finished {
            tokio::select! {
                tick = self.clock.wait_for_tick() => {
                    if tick.expired {
                        self.resolve_on_expiry().await;
                    }
                }
                snapshot = next_snapshot(&mut push) => {
                    match snapshot {
                        Some(doc) => self.on_push(doc).await,
                        // Subscription closed: the session was deleted,
                        // most likely by the opponent resolving first.
                        // The expiry path still resolves us from
                        // last-known state.
                        None => {}
                    }
                }
                cmd = self.commands.recv() => {
                    match cmd {
                        Some(MatchCommand::Abandon { reply }) => {
                            // Cancel the subscription and clock before
                            // deleting, so nothing here reacts to our
                            // own removal.
                            drop(push.take());
                            self.abandon().await;
                            let _ = reply.send(());
                            return;
                        }
                        Some(cmd) => self.handle_command(cmd).await,
                        // Handle dropped without abandoning: tear down
                        // silently (a crashed client just leaves its
                        // session behind for the sweep).
                        None => return,
                    }
                }
            }
        }

        // Finished: the subscription and clock are no longer needed,
        // but keep answering commands until the handle goes away.
        drop(push);
        while let Some(cmd) = self.commands.recv().await {
            self.handle_command(cmd).await;
        }
    }

    /// Push path: a fresh document snapshot arrived.
    async fn on_push(&mut self, doc: SessionDoc) {
        self.last_seen = doc;

        // Early finish: either player at a perfect score ends the match
        // now, without waiting for the clock.
        let perfect = self
            .last_seen
            .players
            .iter()
            .any(|p| p.score_or_zero(self.total_tests).is_perfect());
        if perfect {
            let doc = self.last_seen.clone();
            self.finish(&doc, ResolvedBy::Push).await;
        }
    }

    /// Expiry path: one fresh read, then resolve with whatever we have.
    async fn resolve_on_expiry(&mut self) {
        let doc = match self.store.get(&self.session_id).await {
            Ok(doc) => doc,
            Err(e) => {
                // A failed read never blocks termination: fall back to
                // the last state this client saw.
                tracing::warn!(
                    session_id = %self.session_id,
                    error = %e,
                    "final read failed, resolving from last-known state"
                );
                self.last_seen.clone()
            }
        };
        self.finish(&doc, ResolvedBy::Expiry).await;
    }

    async fn handle_command(&mut self, cmd: MatchCommand) {
        match cmd {
            MatchCommand::Submit { score, code, reply } => {
                let result = self.submit(score, code).await;
                let _ = reply.send(result);
            }
            MatchCommand::Snapshot { reply } => {
                let _ = reply.send(self.view());
            }
            MatchCommand::Abandon { reply } => {
                // Reached only after resolution (the main loop handles
                // the live case): the session is already deleted, so
                // just acknowledge.
                let _ = reply.send(());
            }
        }
    }

    /// Validates and persists this player's score update.
    async fn submit(&mut self, score: Score, code: String) -> Result<(), MatchError> {
        if self.finished {
            return Err(MatchError::Finished);
        }

        let now = Timestamp::now();
        if let Some(current) = self.last_seen.entry_for(&self.identity) {
            let stored = current.score_or_zero(self.total_tests);
            if score.fraction() < stored.fraction() {
                return Err(MatchError::ScoreRegression {
                    current: stored,
                    offered: score,
                });
            }
            if now < current.submitted_at {
                return Err(MatchError::OutOfOrder);
            }
        }

        let entry = PlayerEntry {
            player_id: self.identity.player_id.clone(),
            display_name: self.identity.display_name.clone(),
            score: score.to_string(),
            submitted_at: now,
        };

        let updated = self.store.merge_player(&self.session_id, entry).await?;
        self.last_seen = updated;
        self.code = code;

        tracing::info!(
            session_id = %self.session_id,
            player_id = %self.identity.player_id,
            score = %score,
            "score submitted"
        );

        // Our own perfect run ends the match immediately; the echoed
        // push snapshot is absorbed by the finished flag.
        if score.is_perfect() {
            let doc = self.last_seen.clone();
            self.finish(&doc, ResolvedBy::Push).await;
        }
        Ok(())
    }

    /// Resolves the match from `doc`. One-shot: every caller goes
    /// through the `finished` guard, so push and expiry firing in the
    /// same loop cannot double-resolve.
    async fn finish(&mut self, doc: &SessionDoc, resolved_by: ResolvedBy) {
        if self.finished {
            return;
        }
        self.finished = true;

        let me = doc.entry_for(&self.identity).cloned().unwrap_or_else(|| {
            // We never managed to write an entry; we are scored 0.
            PlayerEntry::joining(&self.identity, self.total_tests, self.created_at)
        });
        let opponent: Option<PlayerEntry> = doc
            .players
            .iter()
            .find(|p| p.player_id != me.player_id)
            .cloned();

        let won = resolver::resolve(
            &me,
            opponent.as_ref(),
            self.created_at,
            self.total_tests,
        );

        let outcome = MatchOutcome {
            won,
            my_score: me.score_or_zero(self.total_tests),
            opponent_score: opponent
                .as_ref()
                .map(|o| o.score_or_zero(self.total_tests))
                .unwrap_or_else(|| Score::zero(self.total_tests)),
            resolved_by,
        };

        tracing::info!(
            session_id = %self.session_id,
            player_id = %self.identity.player_id,
            won,
            my_score = %outcome.my_score,
            opponent_score = %outcome.opponent_score,
            ?resolved_by,
            "match resolved"
        );

        // Side effects. Both are tolerated-idempotent and neither may
        // block termination, so failures are logged and swallowed.
        let record = MatchRecord {
            player_id: self.identity.player_id.clone(),
            problem_id: self.problem_id.clone(),
            date: Timestamp::now(),
            score: me.score.clone(),
            code: std::mem::take(&mut self.code),
            won,
        };
        if let Err(e) = self.history.append(record).await {
            tracing::warn!(
                session_id = %self.session_id,
                error = %e,
                "failed to record match history"
            );
        }
        if let Err(e) = self.store.delete(&self.session_id).await {
            tracing::warn!(
                session_id = %self.session_id,
                error = %e,
                "failed to delete session after resolution"
            );
        }

        self.outcome_tx.send_replace(Some(outcome));
    }

    /// Voluntary exit: delete the session, produce no outcome.
    async fn abandon(&mut self) {
        self.finished = true;
        if let Err(e) = self.store.delete(&self.session_id).await {
            tracing::warn!(
                session_id = %self.session_id,
                error = %e,
                "failed to delete session on abandon"
            );
        }
        tracing::info!(
            session_id = %self.session_id,
            player_id = %self.identity.player_id,
            "match abandoned"
        );
    }

    fn view(&self) -> MatchView {
        MatchView {
            remaining: self.clock.remaining_at(Timestamp::now()),
            players: self.last_seen.players.clone(),
            finished: self.finished,
        }
    }
}

/// Next push snapshot, or pend forever once the subscription is gone —
/// `select!` keeps the other branches live either way.
async fn next_snapshot(push: &mut Option<SessionWatch>) -> Option<SessionDoc> {
    match push {
        Some(watch) => {
            let snapshot = watch.changed().await;
            if snapshot.is_none() {
                *push = None;
            }
            snapshot
        }
        None => std::future::pending().await,
    }
}
