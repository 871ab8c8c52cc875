//! HTTP Game Client
//!
//! Typed wrapper over the server's routes, used by the `ttt` command-line
//! client.

use reqwest::{Response, StatusCode, Url};
use tracing::debug;

use crate::core::board::Symbol;
use crate::game::events::{GameId, GameState, JoinResponse};
use crate::network::long_poll::PollOutcome;
use crate::network::protocol::{symbol_segment, ErrorCode, ServerError};

/// Client errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport or decoding failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Host is not a usable base URL.
    #[error("Invalid host URL: {0}")]
    InvalidHost(String),

    /// Server answered with an error status.
    #[error("{message} (status {status})")]
    Server {
        /// HTTP status.
        status: u16,
        /// Error code, when the body carried one.
        code: Option<ErrorCode>,
        /// Server or status message.
        message: String,
    },
}

impl ClientError {
    /// Error code returned by the server, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Server { code, .. } => *code,
            _ => None,
        }
    }
}

/// HTTP client for one server.
#[derive(Debug, Clone)]
pub struct GameClient {
    http: reqwest::Client,
    base: Url,
}

impl GameClient {
    /// Create a client for `host`, e.g. `http://localhost:8080`.
    pub fn new(host: &str) -> Result<Self, ClientError> {
        let base = Url::parse(host).map_err(|e| ClientError::InvalidHost(format!("{host}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidHost(host.to_string()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    /// Base URL requests are built from.
    pub fn base(&self) -> &Url {
        &self.base
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidHost(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let (code, message) = match ServerError::from_json(&text) {
            Ok(err) => (Some(err.code), err.message),
            Err(_) if text.is_empty() => (None, status.to_string()),
            Err(_) => (None, text),
        };

        Err(ClientError::Server {
            status: status.as_u16(),
            code,
            message,
        })
    }

    /// List game ids.
    pub async fn list_games(&self) -> Result<Vec<GameId>, ClientError> {
        let response = self.http.get(self.url(&[])?).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Create a game, playing `symbol`.
    pub async fn create_game(&self, id: &str, symbol: Symbol) -> Result<(), ClientError> {
        let url = self.url(&[id, "create", symbol_segment(symbol)])?;
        Self::check(self.http.post(url).send().await?).await?;
        Ok(())
    }

    /// Join a game.
    pub async fn join_game(&self, id: &str) -> Result<JoinResponse, ClientError> {
        let url = self.url(&[id, "join"])?;
        Ok(Self::check(self.http.post(url).send().await?).await?.json().await?)
    }

    /// End a game.
    pub async fn end_game(&self, id: &str) -> Result<(), ClientError> {
        let url = self.url(&[id, "end"])?;
        Self::check(self.http.delete(url).send().await?).await?;
        Ok(())
    }

    /// Current state of a game.
    pub async fn get_game(&self, id: &str) -> Result<GameState, ClientError> {
        let url = self.url(&[id])?;
        Ok(Self::check(self.http.get(url).send().await?).await?.json().await?)
    }

    /// Long-poll a game until its board differs from `fingerprint`.
    pub async fn poll_game(&self, id: &str, fingerprint: &str) -> Result<PollOutcome, ClientError> {
        let url = self.url(&[id, fingerprint])?;
        let response = self.http.get(url).send().await?;

        match response.status() {
            StatusCode::REQUEST_TIMEOUT => Ok(PollOutcome::TimedOut),
            StatusCode::GATEWAY_TIMEOUT => Ok(PollOutcome::Cancelled),
            status => {
                debug!(game_id = id, %status, "Long-poll answered");
                let state = Self::check(response).await?.json().await?;
                Ok(PollOutcome::Changed(state))
            }
        }
    }

    /// Place `symbol` at `index`.
    pub async fn make_move(&self, id: &str, symbol: Symbol, index: usize) -> Result<GameState, ClientError> {
        let index = index.to_string();
        let url = self.url(&[id, "move", symbol_segment(symbol), index.as_str()])?;
        Ok(Self::check(self.http.post(url).send().await?).await?.json().await?)
    }
}
