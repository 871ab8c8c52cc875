//! Game Record
//!
//! Board, turn and seat bookkeeping for a single game. Transitions are pure:
//! a failed call leaves the record exactly as it was.

use crate::core::board::{Board, Symbol, next_turn};
use crate::game::error::GameError;
use crate::game::events::{EventKind, GameId, GameState};

/// State of one game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameRecord {
    id: GameId,
    board: Board,
    turn: Symbol,
    /// Seats taken, indexed in `Symbol::PLAYERS` order.
    occupied: [bool; 2],
    winner: Option<Symbol>,
}

fn seat(symbol: Symbol) -> Option<usize> {
    Symbol::PLAYERS.iter().position(|s| *s == symbol)
}

impl GameRecord {
    /// Create a game whose creator holds `first` and moves first.
    pub fn new(id: GameId, first: Symbol) -> Result<Self, GameError> {
        let seat = seat(first).ok_or(GameError::InvalidSymbol)?;
        let mut occupied = [false; 2];
        occupied[seat] = true;

        Ok(Self {
            id,
            board: Board::new(),
            turn: first,
            occupied,
            winner: None,
        })
    }

    /// Game identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Symbol holding the turn.
    pub fn turn(&self) -> Symbol {
        self.turn
    }

    /// Winner, once a line is complete.
    pub fn winner(&self) -> Option<Symbol> {
        self.winner
    }

    /// Whether a seat has been claimed.
    pub fn is_occupied(&self, symbol: Symbol) -> bool {
        seat(symbol).map(|i| self.occupied[i]).unwrap_or(false)
    }

    /// No further moves can be made.
    pub fn is_finished(&self) -> bool {
        self.winner.is_some() || self.board.is_full()
    }

    /// Claim the first free seat, X before O.
    ///
    /// Every call consumes a seat; there is no notion of the same player
    /// joining twice.
    pub fn join(&mut self) -> Result<Symbol, GameError> {
        let free = self.occupied
            .iter()
            .position(|taken| !taken)
            .ok_or(GameError::TooManyPlayers)?;

        self.occupied[free] = true;
        Ok(Symbol::PLAYERS[free])
    }

    /// Place `symbol` at `index`.
    ///
    /// The turn passes to the opponent unless the move wins. A move onto the
    /// last empty cell without a win reports `Draw`.
    pub fn apply_move(&mut self, symbol: Symbol, index: usize) -> Result<GameState, GameError> {
        if self.is_finished() {
            return Err(GameError::GameOver);
        }

        if !symbol.is_player() {
            return Err(GameError::InvalidSymbol);
        }

        if symbol != self.turn {
            return Err(GameError::NotYourTurn);
        }

        let board = self.board.apply_move(symbol, index)?;
        self.board = board;

        let event = if board.is_winning_move(symbol, index) {
            self.winner = Some(symbol);
            EventKind::Win
        } else {
            self.turn = next_turn(symbol);
            if board.is_full() {
                EventKind::Draw
            } else {
                EventKind::Move
            }
        };

        Ok(self.state_with(event))
    }

    /// Snapshot with no event attached.
    pub fn snapshot(&self) -> GameState {
        self.state_with(EventKind::None)
    }

    /// Snapshot tagged with `event`.
    pub fn state_with(&self, event: EventKind) -> GameState {
        GameState {
            id: self.id.clone(),
            event,
            board: self.board,
            turn: self.turn,
            winner: self.winner,
        }
    }
}
