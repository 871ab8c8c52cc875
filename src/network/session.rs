//! Game Session
//!
//! One game record together with the listeners watching it. Every mutating
//! operation runs under the session's own lock, so move application, win
//! detection, turn advancement and the broadcast that follows happen as one
//! unit, and no listener joins or leaves halfway through a broadcast.

use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

use crate::core::board::Symbol;
use crate::game::error::GameError;
use crate::game::events::{EventKind, GameId, GameState, JoinResponse};
use crate::game::state::GameRecord;
use crate::network::fanout::{BroadcastReport, ListenerHandle, ListenerSet};

struct SessionInner {
    record: GameRecord,
    listeners: ListenerSet,
    /// Set once the session was ended; all later calls report `GameNotFound`.
    ended: bool,
}

/// A live game and its listeners.
pub struct GameSession {
    id: GameId,
    inner: Mutex<SessionInner>,
}

impl GameSession {
    /// Create a session whose creator plays `first` and moves first.
    pub fn create(id: GameId, first: Symbol) -> Result<Self, GameError> {
        let record = GameRecord::new(id.clone(), first)?;

        Ok(Self {
            id,
            inner: Mutex::new(SessionInner {
                record,
                listeners: ListenerSet::new(),
                ended: false,
            }),
        })
    }

    /// Game identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    // Record transitions validate before mutating, so a guard recovered from
    // a panicked holder still sees a consistent record.
    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn live(&self) -> Result<MutexGuard<'_, SessionInner>, GameError> {
        let inner = self.lock();
        if inner.ended {
            return Err(GameError::GameNotFound);
        }
        Ok(inner)
    }

    /// Claim the next free seat and return it with the current state.
    ///
    /// Joining is not broadcast; the board does not change.
    pub fn join(&self) -> Result<JoinResponse, GameError> {
        let mut inner = self.live()?;
        let symbol = inner.record.join()?;

        info!(game_id = %self.id, %symbol, "Player joined");

        Ok(JoinResponse {
            symbol,
            state: inner.record.snapshot(),
        })
    }

    /// Apply a move and broadcast the resulting state.
    pub fn make_move(&self, symbol: Symbol, index: usize) -> Result<GameState, GameError> {
        let mut inner = self.live()?;
        let state = inner.record.apply_move(symbol, index)?;
        let report = inner.listeners.broadcast(&state);

        debug!(
            game_id = %self.id,
            %symbol,
            index,
            event = ?state.event,
            delivered = report.delivered,
            dropped = report.dropped,
            "Move applied"
        );

        Ok(state)
    }

    /// Current state with no event attached.
    pub fn snapshot(&self) -> Result<GameState, GameError> {
        Ok(self.live()?.record.snapshot())
    }

    /// Register a listener.
    pub fn subscribe(&self, listener_id: impl Into<String>) -> Result<ListenerHandle, GameError> {
        Ok(self.live()?.listeners.subscribe(listener_id))
    }

    /// Register a listener and read the state under the same lock, so no
    /// broadcast can fall between the read and the registration.
    pub fn subscribe_with_snapshot(
        &self,
        listener_id: impl Into<String>,
    ) -> Result<(ListenerHandle, GameState), GameError> {
        let mut inner = self.live()?;
        let handle = inner.listeners.subscribe(listener_id);
        Ok((handle, inner.record.snapshot()))
    }

    /// Push a snapshot to the current listeners without touching the record.
    pub(crate) fn broadcast(&self, state: &GameState) -> BroadcastReport {
        self.lock().listeners.broadcast(state)
    }

    /// Remove a listener. Unknown ids are ignored.
    pub fn unsubscribe(&self, listener_id: &str) -> bool {
        self.lock().listeners.unsubscribe(listener_id)
    }

    /// End the game: broadcast `Ended`, then drop every listener.
    pub fn end(&self) -> Result<GameState, GameError> {
        let mut inner = self.live()?;
        let state = inner.record.state_with(EventKind::Ended);
        let report = inner.listeners.broadcast(&state);
        inner.listeners.clear();
        inner.ended = true;

        info!(game_id = %self.id, notified = report.delivered, "Game ended");

        Ok(state)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }
}
