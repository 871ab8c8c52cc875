//! Board Fingerprints
//!
//! A fingerprint is the board spelled out cell by cell, one character per
//! cell in board order:
//!
//! ```text
//! Empty -> '-'    X -> 'X'    O -> 'O'
//! ```
//!
//! Clients send the fingerprint of the last board they saw; the long-poll
//! path compares it against the live board to decide whether to wait.

use super::board::{Board, BOARD_CELLS};

/// Encode a board as its fingerprint string.
pub fn fingerprint(board: &Board) -> String {
    let mut out = String::with_capacity(BOARD_CELLS);
    out.extend(board.cells().iter().map(|s| s.as_char()));
    out
}

/// Fingerprint of the empty board.
pub fn empty_fingerprint() -> String {
    fingerprint(&Board::new())
}
