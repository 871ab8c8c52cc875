//! # Tic-Tac-Toe Long-Poll Server
//!
//! In-memory registry of two-player tic-tac-toe games. Clients learn about
//! their opponent's moves by long-polling with the fingerprint of the last
//! board they saw.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TTT SERVER                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/            - Pure board rules                         │
//! │  ├── board.rs     - Symbols, cells, win lines                │
//! │  └── fingerprint.rs - 9-char board encoding                  │
//! │                                                              │
//! │  game/            - Single game (synchronous)                │
//! │  ├── state.rs     - Seats, turn, move application            │
//! │  ├── events.rs    - Snapshots and event kinds                │
//! │  └── error.rs     - Game errors                              │
//! │                                                              │
//! │  network/         - Shared state and transport               │
//! │  ├── registry.rs  - Game id -> session map                   │
//! │  ├── session.rs   - Game + listeners under one lock          │
//! │  ├── fanout.rs    - Single-slot listener channels            │
//! │  ├── long_poll.rs - Wait for a board change                  │
//! │  ├── protocol.rs  - Error bodies and path segments           │
//! │  ├── server.rs    - axum HTTP routes                         │
//! │  └── client.rs    - reqwest HTTP client                      │
//! │                                                              │
//! │  cli.rs           - Command grammar for the `ttt` client     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Delivery
//!
//! Each listener owns a channel with room for one snapshot. A broadcast
//! never waits: if the slot is still full, that listener misses the update
//! and catches up on its next poll, since polls compare fingerprints
//! rather than counting events.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod core;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use crate::core::board::{Board, Symbol};
pub use crate::core::fingerprint::fingerprint;
pub use crate::game::error::GameError;
pub use crate::game::events::{EventKind, GameId, GameState, JoinResponse};
pub use crate::network::long_poll::PollOutcome;
pub use crate::network::protocol::LONG_POLL_MAX_WAIT_SECS;
pub use crate::network::registry::GameRegistry;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
