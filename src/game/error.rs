//! Game errors.

use crate::core::board::IllegalMove;

/// Errors returned by registry and game operations.
///
/// All of these are recoverable; the caller gets them synchronously.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// Unknown game id.
    #[error("Game not found")]
    GameNotFound,

    /// A game with that id is already registered.
    #[error("Game with that name already exists")]
    GameExists,

    /// Both symbol slots are taken.
    #[error("Too many players in this game to join")]
    TooManyPlayers,

    /// The other symbol holds the turn.
    #[error("Not your turn")]
    NotYourTurn,

    /// Occupied cell or index outside the board.
    #[error("Illegal move")]
    IllegalMove,

    /// The game was already won.
    #[error("Game is over")]
    GameOver,

    /// `Empty` used where a player symbol is required.
    #[error("Invalid symbol")]
    InvalidSymbol,
}

impl From<IllegalMove> for GameError {
    fn from(_: IllegalMove) -> Self {
        GameError::IllegalMove
    }
}
