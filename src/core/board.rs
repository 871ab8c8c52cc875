//! Board and Turn Rules
//!
//! Pure tic-tac-toe rules: cell placement, turn alternation and win
//! detection. Nothing in here locks, allocates per move, or performs I/O.
//!
//! ## Layout
//!
//! ```text
//!  0 | 1 | 2
//! ---+---+---
//!  3 | 4 | 5
//! ---+---+---
//!  6 | 7 | 8
//! ```

use std::fmt;
use serde::{Serialize, Deserialize};

/// Number of cells on the board.
pub const BOARD_CELLS: usize = 9;

/// Every line that wins the game when filled with one symbol.
pub const WIN_LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

// =============================================================================
// SYMBOL
// =============================================================================

/// Cell occupant or player assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum Symbol {
    /// Unoccupied cell.
    #[default]
    #[serde(rename = "")]
    Empty,
    /// First player slot.
    X,
    /// Second player slot.
    O,
}

impl Symbol {
    /// Both player symbols, in join order.
    pub const PLAYERS: [Symbol; 2] = [Symbol::X, Symbol::O];

    /// True for `X` and `O`.
    #[inline]
    pub fn is_player(self) -> bool {
        self != Symbol::Empty
    }

    /// Parse a player symbol from user input (`x`, `X`, `o`, `O`).
    pub fn parse_player(s: &str) -> Option<Symbol> {
        match s {
            "x" | "X" => Some(Symbol::X),
            "o" | "O" => Some(Symbol::O),
            _ => None,
        }
    }

    /// Single character used when rendering or fingerprinting.
    #[inline]
    pub fn as_char(self) -> char {
        match self {
            Symbol::Empty => '-',
            Symbol::X => 'X',
            Symbol::O => 'O',
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// The other player symbol. `Empty` has no opponent and maps to itself.
#[inline]
pub fn next_turn(symbol: Symbol) -> Symbol {
    match symbol {
        Symbol::X => Symbol::O,
        Symbol::O => Symbol::X,
        Symbol::Empty => Symbol::Empty,
    }
}

// =============================================================================
// BOARD
// =============================================================================

/// Move rejected by the board: out of range or onto an occupied cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Illegal move at index {index}")]
pub struct IllegalMove {
    /// Index the move targeted.
    pub index: usize,
}

/// Fixed 3×3 board, row-major.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board(pub [Symbol; BOARD_CELLS]);

impl Board {
    /// Empty board.
    pub const fn new() -> Self {
        Self([Symbol::Empty; BOARD_CELLS])
    }

    /// Cell contents, `None` when out of range.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Symbol> {
        self.0.get(index).copied()
    }

    /// Read-only view of all cells.
    #[inline]
    pub fn cells(&self) -> &[Symbol; BOARD_CELLS] {
        &self.0
    }

    /// Place `symbol` at `index`, returning the new board.
    ///
    /// Fails if `index` is outside `0..9` or the cell is already taken.
    /// `self` is left untouched either way.
    pub fn apply_move(&self, symbol: Symbol, index: usize) -> Result<Board, IllegalMove> {
        match self.get(index) {
            Some(Symbol::Empty) => {
                let mut next = *self;
                next.0[index] = symbol;
                Ok(next)
            }
            _ => Err(IllegalMove { index }),
        }
    }

    /// Whether the move just placed at `index` completed a line of `symbol`.
    ///
    /// Only lines through `index` are inspected.
    pub fn is_winning_move(&self, symbol: Symbol, index: usize) -> bool {
        if !symbol.is_player() {
            return false;
        }

        WIN_LINES
            .iter()
            .filter(|line| line.contains(&index))
            .any(|line| line.iter().all(|&i| self.0[i] == symbol))
    }

    /// No empty cells remain.
    pub fn is_full(&self) -> bool {
        self.0.iter().all(|s| s.is_player())
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize {
        self.0.iter().filter(|s| s.is_player()).count()
    }
}

impl From<[Symbol; BOARD_CELLS]> for Board {
    fn from(cells: [Symbol; BOARD_CELLS]) -> Self {
        Self(cells)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.0.chunks(3).enumerate() {
            if row > 0 {
                writeln!(f, "---+---+---")?;
            }
            let render = |s: Symbol| if s.is_player() { s.as_char() } else { ' ' };
            writeln!(f, " {} | {} | {} ", render(cells[0]), render(cells[1]), render(cells[2]))?;
        }
        Ok(())
    }
}
