//! Long-Poll Coordinator
//!
//! Holds a client's request open until the board differs from the
//! fingerprint the client last saw, the wait budget runs out, or the caller
//! cancels.
//!
//! ```text
//!          ┌──────────────── board already differs ───────────────┐
//!          │                                                      ▼
//!   Idle ──┴──► WaitingForChange ──┬── new board delivered ──► Delivered
//!                                  ├── wait budget elapsed ──► TimedOut
//!                                  └── caller cancelled ─────► Cancelled
//! ```
//!
//! Whatever the exit path, including the future being dropped mid-wait,
//! the listener registered for the wait is removed again.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

use crate::game::error::GameError;
use crate::game::events::{EventKind, GameState};
use crate::network::registry::GameRegistry;
use crate::network::session::GameSession;

/// Coordinator lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LongPollState {
    /// Created, not yet run.
    Idle,
    /// Subscribed and waiting.
    WaitingForChange,
    /// Returned a changed snapshot.
    Delivered,
    /// Wait budget elapsed.
    TimedOut,
    /// Caller went away.
    Cancelled,
}

impl LongPollState {
    /// Whether the coordinator has finished.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::TimedOut | Self::Cancelled)
    }
}

/// Result of a long-poll. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The board differs from the client's fingerprint, or the game ended.
    Changed(GameState),
    /// Nothing changed within the wait budget; the client should retry.
    TimedOut,
    /// The caller cancelled the wait.
    Cancelled,
}

impl PollOutcome {
    /// Terminal coordinator state this outcome corresponds to.
    pub fn final_state(&self) -> LongPollState {
        match self {
            Self::Changed(_) => LongPollState::Delivered,
            Self::TimedOut => LongPollState::TimedOut,
            Self::Cancelled => LongPollState::Cancelled,
        }
    }
}

/// Unsubscribes its listener when dropped.
struct ListenerGuard {
    session: Arc<GameSession>,
    listener_id: String,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.session.unsubscribe(&self.listener_id);
        trace!(game_id = %self.session.id(), listener_id = %self.listener_id, "Listener released");
    }
}

/// One long-poll request. Built per call and consumed by [`LongPoll::run`].
pub struct LongPoll<'a> {
    registry: &'a GameRegistry,
    game_id: String,
    fingerprint: String,
    wait: Duration,
    state: LongPollState,
}

impl<'a> LongPoll<'a> {
    /// Prepare a long-poll for `game_id` given the client's last fingerprint.
    pub fn new(
        registry: &'a GameRegistry,
        game_id: impl Into<String>,
        fingerprint: impl Into<String>,
        wait: Duration,
    ) -> Self {
        Self {
            registry,
            game_id: game_id.into(),
            fingerprint: fingerprint.into(),
            wait,
            state: LongPollState::Idle,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LongPollState {
        self.state
    }

    fn transition(&mut self, next: LongPollState) {
        debug!(game_id = %self.game_id, from = ?self.state, to = ?next, "Long-poll transition");
        self.state = next;
    }

    fn finish(&mut self, outcome: PollOutcome) -> PollOutcome {
        self.transition(outcome.final_state());
        outcome
    }

    /// Run the poll until the board changes, the budget elapses, or `cancel`
    /// completes.
    ///
    /// Errors only when the game is unknown, or is ended and torn down
    /// before its `Ended` snapshot could be delivered.
    pub async fn run<F>(mut self, cancel: F) -> Result<PollOutcome, GameError>
    where
        F: Future<Output = ()>,
    {
        let session = self.registry.session(&self.game_id)?;
        let listener_id = uuid::Uuid::new_v4().to_string();
        let (mut handle, current) = session.subscribe_with_snapshot(listener_id.as_str())?;
        let _guard = ListenerGuard {
            session,
            listener_id,
        };

        // Subscribed and read under one lock: a move lands either before the
        // read or after the listener is registered.
        if current.fingerprint() != self.fingerprint {
            return Ok(self.finish(PollOutcome::Changed(current)));
        }

        self.transition(LongPollState::WaitingForChange);

        let timeout = tokio::time::sleep(self.wait);
        tokio::pin!(timeout);
        tokio::pin!(cancel);

        loop {
            tokio::select! {
                biased;

                delivered = handle.recv() => match delivered {
                    Some(state) if self.is_echo(&state) => {
                        trace!(game_id = %self.game_id, "Ignoring unchanged board");
                    }
                    Some(state) => return Ok(self.finish(PollOutcome::Changed(state))),
                    None => return Err(GameError::GameNotFound),
                },
                _ = &mut timeout => return Ok(self.finish(PollOutcome::TimedOut)),
                _ = &mut cancel => return Ok(self.finish(PollOutcome::Cancelled)),
            }
        }
    }

    // Same board as the client already holds. `Ended` always goes through
    // since it carries news even when the board did not move.
    fn is_echo(&self, state: &GameState) -> bool {
        state.event != EventKind::Ended && state.fingerprint() == self.fingerprint
    }
}

/// Run a single long-poll against `registry`.
pub async fn long_poll<F>(
    registry: &GameRegistry,
    game_id: &str,
    fingerprint: &str,
    wait: Duration,
    cancel: F,
) -> Result<PollOutcome, GameError>
where
    F: Future<Output = ()>,
{
    LongPoll::new(registry, game_id, fingerprint, wait).run(cancel).await
}
