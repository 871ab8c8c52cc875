//! Game Registry
//!
//! Maps game ids to sessions. The map lock is only held to look up, insert
//! or remove a session; everything else runs under the per-game session
//! lock, so independent games never wait on each other.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, instrument, warn};

use crate::core::board::{Board, Symbol};
use crate::core::fingerprint;
use crate::game::error::GameError;
use crate::game::events::{GameId, GameState, JoinResponse};
use crate::network::fanout::ListenerHandle;
use crate::network::session::GameSession;

/// All games hosted by this process.
#[derive(Default)]
pub struct GameRegistry {
    games: RwLock<BTreeMap<GameId, Arc<GameSession>>>,
}

impl GameRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<GameId, Arc<GameSession>>> {
        self.games.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<GameId, Arc<GameSession>>> {
        self.games.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a session.
    pub fn session(&self, id: &str) -> Result<Arc<GameSession>, GameError> {
        self.read().get(id).cloned().ok_or(GameError::GameNotFound)
    }

    /// Ids of all games, sorted.
    pub fn list_games(&self) -> Vec<GameId> {
        self.read().keys().cloned().collect()
    }

    /// Number of registered games.
    pub fn game_count(&self) -> usize {
        self.read().len()
    }

    /// Register a new game. The creator plays `symbol` and moves first.
    #[instrument(skip(self))]
    pub fn create_game(&self, id: &str, symbol: Symbol) -> Result<(), GameError> {
        let mut games = self.write();
        if games.contains_key(id) {
            warn!("Game already exists");
            return Err(GameError::GameExists);
        }

        let session = GameSession::create(id.to_string(), symbol)?;
        games.insert(id.to_string(), Arc::new(session));

        info!("Created game");
        Ok(())
    }

    /// Take the next free seat in a game.
    #[instrument(skip(self))]
    pub fn join_game(&self, id: &str) -> Result<JoinResponse, GameError> {
        self.session(id)?.join()
    }

    /// Remove a game, notifying and dropping its listeners.
    #[instrument(skip(self))]
    pub fn end_game(&self, id: &str) -> Result<(), GameError> {
        let session = self.write().remove(id).ok_or(GameError::GameNotFound)?;
        session.end()?;
        Ok(())
    }

    /// Current state of a game.
    pub fn get_game(&self, id: &str) -> Result<GameState, GameError> {
        self.session(id)?.snapshot()
    }

    /// Place `symbol` at `index` in a game.
    #[instrument(skip(self))]
    pub fn make_move(&self, id: &str, symbol: Symbol, index: usize) -> Result<GameState, GameError> {
        self.session(id)?.make_move(symbol, index)
    }

    /// Subscribe a listener to a game's updates.
    pub fn open_stream(&self, id: &str, listener_id: &str) -> Result<ListenerHandle, GameError> {
        self.session(id)?.subscribe(listener_id)
    }

    /// Unsubscribe a listener. Closing an unknown or already closed stream
    /// succeeds as long as the game exists.
    pub fn close_stream(&self, id: &str, listener_id: &str) -> Result<(), GameError> {
        self.session(id)?.unsubscribe(listener_id);
        Ok(())
    }

    /// Listeners currently registered on a game.
    pub fn listener_count(&self, id: &str) -> Result<usize, GameError> {
        Ok(self.session(id)?.listener_count())
    }

    /// Board fingerprint, as compared by the long-poll path.
    pub fn fingerprint(board: &Board) -> String {
        fingerprint::fingerprint(board)
    }
}
