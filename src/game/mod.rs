//! Game Logic Module
//!
//! Single-game state and the snapshots it produces. Synchronous and
//! lock-free; concurrency lives in `network/`.
//!
//! ## Module Structure
//!
//! - `state`: seats, turn, move application
//! - `events`: snapshots and event kinds
//! - `error`: game errors

pub mod error;
pub mod events;
pub mod state;

// Re-export key types
pub use error::GameError;
pub use events::{EventKind, GameId, GameState, JoinResponse};
pub use state::GameRecord;
