//! Protocol Messages
//!
//! Wire format shared by the HTTP server and client. Game snapshots travel
//! as [`GameState`](crate::game::events::GameState) JSON; failures travel
//! as a [`ServerError`] body next to a status code.

use serde::{Serialize, Deserialize};

use crate::core::board::Symbol;
use crate::game::error::GameError;

/// Seconds a long-poll waits before reporting a timeout.
pub const LONG_POLL_MAX_WAIT_SECS: u64 = 30;

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerError {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

impl ServerError {
    /// Build an error body.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl From<&GameError> for ServerError {
    fn from(err: &GameError) -> Self {
        Self::new(ErrorCode::from(err), err.to_string())
    }
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Unknown game.
    GameNotFound,
    /// Game id already taken.
    GameExists,
    /// Both seats taken.
    TooManyPlayers,
    /// Wrong player moved.
    NotYourTurn,
    /// Occupied or out-of-range cell.
    IllegalMove,
    /// Game already won or drawn.
    GameOver,
    /// Symbol not `x` or `o`.
    InvalidSymbol,
    /// Malformed request.
    InvalidInput,
    /// Long-poll reached its wait budget.
    PollTimedOut,
    /// Long-poll cancelled by the server.
    PollCancelled,
}

impl From<&GameError> for ErrorCode {
    fn from(err: &GameError) -> Self {
        match err {
            GameError::GameNotFound => ErrorCode::GameNotFound,
            GameError::GameExists => ErrorCode::GameExists,
            GameError::TooManyPlayers => ErrorCode::TooManyPlayers,
            GameError::NotYourTurn => ErrorCode::NotYourTurn,
            GameError::IllegalMove => ErrorCode::IllegalMove,
            GameError::GameOver => ErrorCode::GameOver,
            GameError::InvalidSymbol => ErrorCode::InvalidSymbol,
        }
    }
}

/// Path segment naming a player symbol.
pub fn symbol_segment(symbol: Symbol) -> &'static str {
    match symbol {
        Symbol::X => "x",
        Symbol::O => "o",
        Symbol::Empty => "-",
    }
}
