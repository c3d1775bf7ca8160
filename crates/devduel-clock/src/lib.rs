//! Local match clock for DevDuel.
//!
//! Each client counts down its own copy of the match timer. The clock is
//! anchored to a persisted wall-clock instant captured at first render,
//! so a player who reloads mid-match resumes where they were instead of
//! getting a fresh timer. The two clients never reconcile anchors — both
//! count down the same nominal duration, and small skew between them
//! affects only the exact expiry instant, never the score.
//!
//! # Integration
//!
//! The clock is designed to sit inside the match coordinator's
//! `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         tick = clock.wait_for_tick() => {
//!             if tick.expired { /* run the expiry resolution path */ }
//!         }
//!         snapshot = watch.changed() => { /* push path */ }
//!     }
//! }
//! ```
//!
//! After the `Expired` tick has been delivered once, `wait_for_tick`
//! pends forever — `select!` keeps servicing the other branches, and no
//! further transitions occur.

use std::collections::HashMap;
use std::time::Duration;

use devduel_protocol::{PlayerId, SessionId, Timestamp};
use tokio::sync::Mutex;
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, info};

/// Persistence for clock anchors, keyed by (player, session).
///
/// `get_or_create` has identical semantics on first call and on reload:
/// the first caller stores `now` and every later caller for the same
/// key gets that original instant back.
#[allow(async_fn_in_trait)]
pub trait AnchorStore: Send + Sync + 'static {
    async fn get_or_create(
        &self,
        player: &PlayerId,
        session: &SessionId,
        now: Timestamp,
    ) -> Timestamp;
}

/// An [`AnchorStore`] backed by a process-local map. Stands in for the
/// browser-local storage a real client would persist anchors to.
#[derive(Default)]
pub struct MemoryAnchors {
    anchors: Mutex<HashMap<(PlayerId, SessionId), Timestamp>>,
}

impl MemoryAnchors {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnchorStore for MemoryAnchors {
    async fn get_or_create(
        &self,
        player: &PlayerId,
        session: &SessionId,
        now: Timestamp,
    ) -> Timestamp {
        let mut anchors = self.anchors.lock().await;
        *anchors
            .entry((player.clone(), session.clone()))
            .or_insert(now)
    }
}

// ---------------------------------------------------------------------------
// MatchClock
// ---------------------------------------------------------------------------

/// Fixed tick period: the countdown recomputes once per second.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// The clock's lifecycle state.
///
/// ```text
/// Running ──(remaining hits 0)──→ Expired
/// ```
///
/// The transition happens exactly once; there is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Running,
    Expired,
}

/// One delivered tick.
#[derive(Debug, Clone, Copy)]
pub struct ClockTick {
    /// Time left on this client's countdown.
    pub remaining: Duration,
    /// `true` exactly once, on the tick that crossed zero.
    pub expired: bool,
}

/// A countdown over a persisted anchor.
///
/// Purely local: `remaining = max(0, duration - (now - anchor))`,
/// recomputed from the wall clock on every tick so the value stays
/// correct across suspends and reloads rather than drifting with the
/// tick cadence.
pub struct MatchClock {
    anchor: Timestamp,
    duration: Duration,
    state: ClockState,
    /// When the next tick fires. `None` once expired — the clock then
    /// pends forever.
    next_tick: Option<TokioInstant>,
}

impl MatchClock {
    /// Resolves the anchor through the store and starts the countdown.
    ///
    /// First activation for this (player, session) persists `now` as the
    /// anchor; a reload reuses the stored one, so refreshing cannot
    /// reset the timer.
    pub async fn start<A: AnchorStore>(
        anchors: &A,
        player: &PlayerId,
        session: &SessionId,
        duration_secs: u32,
    ) -> Self {
        let anchor = anchors
            .get_or_create(player, session, Timestamp::now())
            .await;
        Self::with_anchor(anchor, duration_secs)
    }

    /// Builds a clock on an already-resolved anchor.
    pub fn with_anchor(anchor: Timestamp, duration_secs: u32) -> Self {
        let duration = Duration::from_secs(u64::from(duration_secs));
        let remaining = remaining_at(anchor, duration, Timestamp::now());

        // A reload after expiry must deliver the Expired tick promptly,
        // not one period later.
        let next_tick = if remaining.is_zero() {
            Some(TokioInstant::now())
        } else {
            Some(TokioInstant::now() + TICK_PERIOD)
        };

        debug!(
            anchor = anchor.as_millis(),
            remaining_secs = remaining.as_secs(),
            "match clock started"
        );

        Self {
            anchor,
            duration,
            state: ClockState::Running,
            next_tick,
        }
    }

    pub fn anchor(&self) -> Timestamp {
        self.anchor
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_expired(&self) -> bool {
        self.state == ClockState::Expired
    }

    /// Remaining time as of `now`. Pure; never negative.
    pub fn remaining_at(&self, now: Timestamp) -> Duration {
        remaining_at(self.anchor, self.duration, now)
    }

    /// Waits until the next tick is due and delivers it.
    ///
    /// The tick whose recomputed remaining time is zero transitions the
    /// clock `Running -> Expired` and is flagged `expired` — that flag
    /// fires exactly once. Afterwards this future pends forever, so an
    /// owning `select!` loop keeps running its other branches; dropping
    /// the owner cancels the clock outright.
    pub async fn wait_for_tick(&mut self) -> ClockTick {
        let Some(next) = self.next_tick else {
            std::future::pending::<()>().await;
            unreachable!()
        };

        time::sleep_until(next).await;

        let remaining = self.remaining_at(Timestamp::now());
        if remaining.is_zero() {
            self.state = ClockState::Expired;
            self.next_tick = None;
            info!("match clock expired");
            ClockTick {
                remaining: Duration::ZERO,
                expired: true,
            }
        } else {
            self.next_tick = Some(TokioInstant::now() + TICK_PERIOD);
            ClockTick {
                remaining,
                expired: false,
            }
        }
    }
}

fn remaining_at(anchor: Timestamp, duration: Duration, now: Timestamp) -> Duration {
    duration.saturating_sub(now.since(anchor))
}

// =========================================================================
// Tests
// =========================================================================
