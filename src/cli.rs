//! Command-Line Client Support
//!
//! Command grammar and local game tracking for the `ttt` binary. The binary
//! owns the terminal and the HTTP calls; everything here is plain data so it
//! can be tested without either.

use std::str::FromStr;

use crate::core::board::{Symbol, BOARD_CELLS};
use crate::game::events::{EventKind, GameId, GameState};

/// Help text printed by `help`.
pub const HELP: &str = "\
Commands:
  list                  list games on the server
  create <game> <x|o>   create a game and play the given symbol
  join <game>           join a game as the remaining symbol
  move <index>          place your symbol at cell 0-8
  end <game>            end a game
  show                  print the tracked board
  help                  print this help
  quit                  exit";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List games.
    List,
    /// Create a game.
    Create {
        /// Game id.
        game: GameId,
        /// Symbol the creator plays.
        symbol: Symbol,
    },
    /// Join a game.
    Join {
        /// Game id.
        game: GameId,
    },
    /// Move in the tracked game.
    Move {
        /// Cell index.
        index: usize,
    },
    /// End a game.
    End {
        /// Game id.
        game: GameId,
    },
    /// Print the tracked board.
    Show,
    /// Print help.
    Help,
    /// Exit.
    Quit,
}

/// Input line errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// Blank line.
    #[error("Empty command")]
    Empty,

    /// Unknown command word.
    #[error("Unknown command '{0}', try 'help'")]
    Unknown(String),

    /// Wrong number of arguments.
    #[error("Usage: {0}")]
    Usage(&'static str),

    /// Symbol other than x or o.
    #[error("Invalid symbol '{0}', expected x or o")]
    InvalidSymbol(String),

    /// Index not a cell number.
    #[error("Invalid index '{0}', expected 0-8")]
    InvalidIndex(String),

    /// Create or join while another game is still being played.
    #[error("There is already a game in progress ({0})")]
    GameInProgress(GameId),

    /// Move without a tracked game.
    #[error("Not in a game. Create or join one first.")]
    NoGame,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let (&name, args) = words.split_first().ok_or(CommandError::Empty)?;

        match (name.to_ascii_lowercase().as_str(), args) {
            ("list", []) => Ok(Command::List),
            ("list", _) => Err(CommandError::Usage("list")),

            ("create", [game, symbol]) => {
                let symbol = Symbol::parse_player(symbol)
                    .ok_or_else(|| CommandError::InvalidSymbol(symbol.to_string()))?;
                Ok(Command::Create { game: game.to_string(), symbol })
            }
            ("create", _) => Err(CommandError::Usage("create <game> <x|o>")),

            ("join", [game]) => Ok(Command::Join { game: game.to_string() }),
            ("join", _) => Err(CommandError::Usage("join <game>")),

            ("move", [index]) => match index.parse::<usize>() {
                Ok(i) if i < BOARD_CELLS => Ok(Command::Move { index: i }),
                _ => Err(CommandError::InvalidIndex(index.to_string())),
            },
            ("move", _) => Err(CommandError::Usage("move <index>")),

            ("end", [game]) => Ok(Command::End { game: game.to_string() }),
            ("end", _) => Err(CommandError::Usage("end <game>")),

            ("show", _) => Ok(Command::Show),
            ("help" | "?", _) => Ok(Command::Help),
            ("quit" | "exit", _) => Ok(Command::Quit),

            (other, _) => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

impl Command {
    /// Check the command against the game being tracked, if any.
    ///
    /// A finished game no longer blocks `create` or `join`.
    pub fn check_tracked(&self, tracked: Option<&TrackedGame>) -> Result<(), CommandError> {
        match (self, tracked) {
            (Command::Create { .. } | Command::Join { .. }, Some(game)) if !game.is_finished() => {
                Err(CommandError::GameInProgress(game.id().to_string()))
            }
            (Command::Move { .. }, None) => Err(CommandError::NoGame),
            _ => Ok(()),
        }
    }
}

/// The game this client is playing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedGame {
    id: GameId,
    symbol: Symbol,
    state: GameState,
}

impl TrackedGame {
    /// Start tracking `state` while playing `symbol`.
    pub fn new(id: GameId, symbol: Symbol, state: GameState) -> Self {
        Self { id, symbol, state }
    }

    /// Game id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Symbol this client plays.
    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    /// Last known state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Fingerprint of the last known board.
    pub fn fingerprint(&self) -> String {
        self.state.fingerprint()
    }

    /// Whether the game was won, drawn or ended.
    pub fn is_finished(&self) -> bool {
        self.state.winner.is_some() || self.state.event.is_terminal()
    }

    /// Whether this client should move next.
    pub fn is_my_turn(&self) -> bool {
        !self.is_finished() && self.state.turn == self.symbol
    }

    /// Replace the known state. Returns false when the board and event are
    /// unchanged.
    pub fn update(&mut self, state: GameState) -> bool {
        let changed = state.board != self.state.board || state.event != self.state.event;
        self.state = state;
        changed
    }

    /// One-line status for the prompt.
    pub fn status(&self) -> String {
        match (self.state.event, self.state.winner) {
            (_, Some(winner)) if winner == self.symbol => "You won!".to_string(),
            (_, Some(winner)) => format!("{winner} won."),
            (EventKind::Draw, _) => "Draw.".to_string(),
            (EventKind::Ended, _) => "Game ended.".to_string(),
            _ if self.is_my_turn() => format!("Your move ({}).", self.symbol),
            _ => format!("Waiting for {}.", self.state.turn),
        }
    }

    /// Board grid with cell numbers in the free cells, then the status line.
    pub fn render(&self) -> String {
        let mut out = format!("Game {} - you are {}\n", self.id, self.symbol);
        for row in 0..3 {
            out.push(' ');
            for col in 0..3 {
                let index = row * 3 + col;
                let cell = match self.state.board.get(index) {
                    Some(Symbol::Empty) | None => char::from(b'0' + index as u8),
                    Some(symbol) => symbol.as_char(),
                };
                out.push(cell);
                out.push_str(if col < 2 { " | " } else { "\n" });
            }
            if row < 2 {
                out.push_str("---+---+---\n");
            }
        }
        out.push_str(&self.status());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::board::Board;

    fn state(board: Board, event: EventKind, turn: Symbol, winner: Option<Symbol>) -> GameState {
        GameState {
            id: "g1".to_string(),
            event,
            board,
            turn,
            winner,
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("list".parse::<Command>(), Ok(Command::List));
        assert_eq!(
            "create g1 X".parse::<Command>(),
            Ok(Command::Create { game: "g1".to_string(), symbol: Symbol::X })
        );
        assert_eq!("  join   g1 ".parse::<Command>(), Ok(Command::Join { game: "g1".to_string() }));
        assert_eq!("move 8".parse::<Command>(), Ok(Command::Move { index: 8 }));
        assert_eq!("END g1".parse::<Command>(), Ok(Command::End { game: "g1".to_string() }));
        assert_eq!("show".parse::<Command>(), Ok(Command::Show));
        assert_eq!("help".parse::<Command>(), Ok(Command::Help));
        assert_eq!("quit".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!("dance".parse::<Command>(), Err(CommandError::Unknown("dance".to_string())));
        assert!(matches!("create g1".parse::<Command>(), Err(CommandError::Usage(_))));
        assert_eq!(
            "create g1 z".parse::<Command>(),
            Err(CommandError::InvalidSymbol("z".to_string()))
        );
        assert_eq!("move 9".parse::<Command>(), Err(CommandError::InvalidIndex("9".to_string())));
        assert_eq!("move -1".parse::<Command>(), Err(CommandError::InvalidIndex("-1".to_string())));
    }

    #[test]
    fn test_tracked_game_blocks_create_and_join() {
        let create = Command::Create { game: "g2".to_string(), symbol: Symbol::O };
        let join = Command::Join { game: "g2".to_string() };
        let mv = Command::Move { index: 0 };

        assert_eq!(create.check_tracked(None), Ok(()));
        assert_eq!(join.check_tracked(None), Ok(()));
        assert_eq!(mv.check_tracked(None), Err(CommandError::NoGame));

        let playing = TrackedGame::new(
            "g1".to_string(),
            Symbol::X,
            state(Board::new(), EventKind::None, Symbol::X, None),
        );
        assert_eq!(
            create.check_tracked(Some(&playing)),
            Err(CommandError::GameInProgress("g1".to_string()))
        );
        assert_eq!(
            join.check_tracked(Some(&playing)),
            Err(CommandError::GameInProgress("g1".to_string()))
        );
        assert_eq!(mv.check_tracked(Some(&playing)), Ok(()));
        assert_eq!(Command::List.check_tracked(Some(&playing)), Ok(()));

        let ended = TrackedGame::new(
            "g1".to_string(),
            Symbol::X,
            state(Board::new(), EventKind::Ended, Symbol::X, None),
        );
        assert_eq!(create.check_tracked(Some(&ended)), Ok(()));
    }

    #[test]
    fn test_tracking_turns() {
        let mut game = TrackedGame::new(
            "g1".to_string(),
            Symbol::O,
            state(Board::new(), EventKind::None, Symbol::X, None),
        );
        assert!(!game.is_my_turn());
        assert_eq!(game.status(), "Waiting for X.");

        let board = Board::new().apply_move(Symbol::X, 4).unwrap();
        assert!(game.update(state(board, EventKind::Move, Symbol::O, None)));
        assert!(game.is_my_turn());

        // Same board again is not a change.
        assert!(!game.update(state(board, EventKind::Move, Symbol::O, None)));
    }

    #[test]
    fn test_finished_game() {
        let board = Board::from([
            Symbol::X, Symbol::X, Symbol::X,
            Symbol::O, Symbol::O, Symbol::Empty,
            Symbol::Empty, Symbol::Empty, Symbol::Empty,
        ]);
        let game = TrackedGame::new(
            "g1".to_string(),
            Symbol::O,
            state(board, EventKind::Win, Symbol::X, Some(Symbol::X)),
        );
        assert!(game.is_finished());
        assert!(!game.is_my_turn());
        assert_eq!(game.status(), "X won.");

        let ended = TrackedGame::new(
            "g1".to_string(),
            Symbol::X,
            state(Board::new(), EventKind::Ended, Symbol::X, None),
        );
        assert!(ended.is_finished());
        assert_eq!(ended.status(), "Game ended.");
    }

    #[test]
    fn test_render_numbers_free_cells() {
        let board = Board::new().apply_move(Symbol::X, 0).unwrap();
        let game = TrackedGame::new(
            "g1".to_string(),
            Symbol::X,
            state(board, EventKind::Move, Symbol::O, None),
        );
        let rendered = game.render();

        assert!(rendered.starts_with("Game g1 - you are X\n"));
        assert!(rendered.contains(" X | 1 | 2\n"));
        assert!(rendered.contains(" 6 | 7 | 8\n"));
        assert!(rendered.ends_with("Waiting for O."));
    }
}
