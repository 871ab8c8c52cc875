//! Game Events
//!
//! Snapshots pushed through the fan-out and returned from queries.
//! A `GameState` is always a value copy; later mutations of the game are
//! not visible through it.

use serde::{Serialize, Deserialize};

use crate::core::board::{Board, Symbol};
use crate::core::fingerprint::fingerprint;

/// Unique game identifier, chosen by the creating client.
pub type GameId = String;

/// What produced a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum EventKind {
    /// Plain read, nothing happened.
    #[default]
    None,
    /// A move completed a line.
    Win,
    /// A move was placed and the game goes on.
    Move,
    /// The last empty cell was filled without a winner.
    Draw,
    /// The game was ended and removed from the registry.
    Ended,
}

impl EventKind {
    /// Whether the game is over once this event is observed.
    pub fn is_terminal(self) -> bool {
        matches!(self, EventKind::Win | EventKind::Draw | EventKind::Ended)
    }
}

/// Transfer snapshot of one game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Game the snapshot belongs to.
    pub id: GameId,
    /// Event that produced this snapshot.
    pub event: EventKind,
    /// Board contents.
    pub board: Board,
    /// Symbol holding the turn.
    pub turn: Symbol,
    /// Winning symbol, if any.
    #[serde(default)]
    pub winner: Option<Symbol>,
}

impl GameState {
    /// Fingerprint of the snapshot's board.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.board)
    }
}

/// Result of joining a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinResponse {
    /// Symbol assigned to the joining player.
    pub symbol: Symbol,
    /// Game state at the time of joining.
    pub state: GameState,
}
