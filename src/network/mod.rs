//! Network Layer
//!
//! Game registry, per-game listener fan-out, the long-poll coordinator and
//! the HTTP transport built on them.

pub mod client;
pub mod fanout;
pub mod long_poll;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod session;

pub use client::{ClientError, GameClient};
pub use fanout::{BroadcastReport, ListenerHandle, ListenerSet};
pub use long_poll::{long_poll, LongPoll, LongPollState, PollOutcome};
pub use protocol::{ErrorCode, ServerError};
pub use registry::GameRegistry;
pub use server::{GameServer, GameServerError, ServerConfig};
pub use session::GameSession;
