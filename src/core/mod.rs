//! Pure game primitives.
//!
//! Board rules and fingerprinting. No locking, no async, no I/O.

pub mod board;
pub mod fingerprint;

// Re-export core types
pub use board::{Board, Symbol, IllegalMove, next_turn, BOARD_CELLS, WIN_LINES};
pub use fingerprint::{fingerprint, empty_fingerprint};
