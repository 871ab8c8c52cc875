//! HTTP Game Server
//!
//! Thin axum layer over [`GameRegistry`]. Each request runs in its own task;
//! long-polls hold their request open through [`long_poll`] and are
//! cancelled when the server shuts down.
//!
//! | Method | Path                          | Success            |
//! |--------|-------------------------------|--------------------|
//! | GET    | `/`                           | 200 game ids       |
//! | POST   | `/:id/create/:symbol`         | 204                |
//! | GET    | `/:id`                        | 200 `GameState`    |
//! | GET    | `/:id/:fingerprint`           | 200 `GameState`    |
//! | POST   | `/:id/join`                   | 200 `JoinResponse` |
//! | POST   | `/:id/move/:symbol/:index`    | 200 `GameState`    |
//! | DELETE | `/:id/end`                    | 204                |

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::core::board::Symbol;
use crate::game::error::GameError;
use crate::game::events::{GameId, GameState, JoinResponse};
use crate::network::long_poll::{long_poll, PollOutcome};
use crate::network::protocol::{ErrorCode, ServerError, LONG_POLL_MAX_WAIT_SECS};
use crate::network::registry::GameRegistry;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// How long a long-poll waits for a change.
    pub long_poll_wait: Duration,
    /// Server version string.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            long_poll_wait: Duration::from_secs(LONG_POLL_MAX_WAIT_SECS),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Game server errors.
#[derive(Debug, thiserror::Error)]
pub enum GameServerError {
    /// Failed to bind to address.
    #[error("Failed to bind {addr}: {source}")]
    BindFailed {
        /// Address that could not be bound.
        addr: SocketAddr,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Accept loop failed.
    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Error response: status code plus JSON body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ServerError,
}

impl ApiError {
    fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ServerError::new(code, message),
        }
    }

    fn bad_request(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }
}

/// HTTP status for a game error.
pub fn status_for(err: &GameError) -> StatusCode {
    match err {
        GameError::GameNotFound => StatusCode::NOT_FOUND,
        GameError::GameExists
        | GameError::TooManyPlayers
        | GameError::NotYourTurn
        | GameError::GameOver => StatusCode::CONFLICT,
        GameError::IllegalMove | GameError::InvalidSymbol => StatusCode::BAD_REQUEST,
    }
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        Self {
            status: status_for(&err),
            body: ServerError::from(&err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Clone)]
struct AppState {
    registry: Arc<GameRegistry>,
    long_poll_wait: Duration,
    shutdown_tx: broadcast::Sender<()>,
}

/// The game server.
pub struct GameServer {
    /// Server configuration.
    config: ServerConfig,
    /// Game registry shared by all request handlers.
    registry: Arc<GameRegistry>,
    /// Shutdown signal.
    shutdown_tx: broadcast::Sender<()>,
}

impl GameServer {
    /// Create a server with an empty registry.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_registry(config, Arc::new(GameRegistry::new()))
    }

    /// Create a server over an existing registry.
    pub fn with_registry(config: ServerConfig, registry: Arc<GameRegistry>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            registry,
            shutdown_tx,
        }
    }

    /// Server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Shared registry.
    pub fn registry(&self) -> &Arc<GameRegistry> {
        &self.registry
    }

    /// Build the HTTP router.
    pub fn router(&self) -> Router {
        let state = AppState {
            registry: self.registry.clone(),
            long_poll_wait: self.config.long_poll_wait,
            shutdown_tx: self.shutdown_tx.clone(),
        };

        Router::new()
            .route("/", get(list_games))
            .route("/:id", get(get_game))
            .route("/:id/create/:symbol", post(create_game))
            .route("/:id/join", post(join_game))
            .route("/:id/move/:symbol/:index", post(make_move))
            .route("/:id/end", delete(end_game))
            .route("/:id/:fingerprint", get(poll_game))
            .with_state(state)
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> Result<TcpListener, GameServerError> {
        let addr = self.config.bind_addr;
        TcpListener::bind(addr)
            .await
            .map_err(|source| GameServerError::BindFailed { addr, source })
    }

    /// Serve requests on `listener` until [`GameServer::shutdown`] is called.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), GameServerError> {
        info!("Game server v{} listening on {}", self.config.version, listener.local_addr()?);

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("Shutdown signal received");
            })
            .await?;

        Ok(())
    }

    /// Bind and serve.
    #[instrument(skip(self), fields(addr = %self.config.bind_addr))]
    pub async fn run(&self) -> Result<(), GameServerError> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Shutdown the server. Pending long-polls are cancelled.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Get active game count.
    pub fn game_count(&self) -> usize {
        self.registry.game_count()
    }
}

fn parse_symbol(raw: &str) -> Result<Symbol, ApiError> {
    Symbol::parse_player(raw).ok_or_else(|| {
        ApiError::bad_request(ErrorCode::InvalidSymbol, format!("Unknown symbol '{raw}', expected x or o"))
    })
}

fn parse_index(raw: &str) -> Result<usize, ApiError> {
    raw.parse().map_err(|_| {
        ApiError::bad_request(ErrorCode::InvalidInput, format!("Could not parse index '{raw}'"))
    })
}

async fn list_games(State(state): State<AppState>) -> Json<Vec<GameId>> {
    Json(state.registry.list_games())
}

async fn create_game(
    State(state): State<AppState>,
    Path((id, symbol)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let symbol = parse_symbol(&symbol)?;
    state.registry.create_game(&id, symbol)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GameState>, ApiError> {
    Ok(Json(state.registry.get_game(&id)?))
}

async fn join_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JoinResponse>, ApiError> {
    Ok(Json(state.registry.join_game(&id)?))
}

async fn make_move(
    State(state): State<AppState>,
    Path((id, symbol, index)): Path<(String, String, String)>,
) -> Result<Json<GameState>, ApiError> {
    let symbol = parse_symbol(&symbol)?;
    let index = parse_index(&index)?;
    Ok(Json(state.registry.make_move(&id, symbol, index)?))
}

async fn end_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.registry.end_game(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Long-poll: answers once the board differs from `fingerprint`.
async fn poll_game(
    State(state): State<AppState>,
    Path((id, fingerprint)): Path<(String, String)>,
) -> Result<Json<GameState>, ApiError> {
    let mut shutdown_rx = state.shutdown_tx.subscribe();
    let cancel = async move {
        let _ = shutdown_rx.recv().await;
    };

    match long_poll(&state.registry, &id, &fingerprint, state.long_poll_wait, cancel).await? {
        PollOutcome::Changed(game) => {
            debug!(game_id = %id, event = ?game.event, "Long-poll delivered");
            Ok(Json(game))
        }
        PollOutcome::TimedOut => Err(ApiError::new(
            StatusCode::REQUEST_TIMEOUT,
            ErrorCode::PollTimedOut,
            "Long poll request timed out",
        )),
        PollOutcome::Cancelled => {
            warn!(game_id = %id, "Long-poll cancelled by shutdown");
            Err(ApiError::new(
                StatusCode::GATEWAY_TIMEOUT,
                ErrorCode::PollCancelled,
                "Request context has timed out",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use tower::ServiceExt;
    use crate::game::events::EventKind;

    fn create_test_server() -> GameServer {
        GameServer::new(ServerConfig {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            long_poll_wait: Duration::from_secs(30),
            ..Default::default()
        })
    }

    async fn send(server: &GameServer, method: Method, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn error_code(body: &[u8]) -> ErrorCode {
        serde_json::from_slice::<ServerError>(body).unwrap().code
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.long_poll_wait, Duration::from_secs(LONG_POLL_MAX_WAIT_SECS));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&GameError::GameNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&GameError::GameExists), StatusCode::CONFLICT);
        assert_eq!(status_for(&GameError::TooManyPlayers), StatusCode::CONFLICT);
        assert_eq!(status_for(&GameError::NotYourTurn), StatusCode::CONFLICT);
        assert_eq!(status_for(&GameError::IllegalMove), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_server_creation() {
        let server = create_test_server();
        assert_eq!(server.game_count(), 0);
        server.shutdown();
    }

    #[tokio::test]
    async fn test_create_list_and_join() {
        let server = create_test_server();

        let (status, _) = send(&server, Method::POST, "/g1/create/x").await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&server, Method::POST, "/g1/create/o").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(error_code(&body), ErrorCode::GameExists);

        let (status, body) = send(&server, Method::GET, "/").await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<String> = serde_json::from_slice(&body).unwrap();
        assert_eq!(ids, vec!["g1".to_string()]);

        let (status, body) = send(&server, Method::POST, "/g1/join").await;
        assert_eq!(status, StatusCode::OK);
        let joined: JoinResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(joined.symbol, Symbol::O);
        assert_eq!(joined.state.turn, Symbol::X);

        let (status, body) = send(&server, Method::POST, "/g1/join").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(error_code(&body), ErrorCode::TooManyPlayers);
    }

    #[tokio::test]
    async fn test_move_errors() {
        let server = create_test_server();
        send(&server, Method::POST, "/g1/create/x").await;

        let (status, body) = send(&server, Method::POST, "/g1/move/x/9").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&body), ErrorCode::IllegalMove);

        let (status, body) = send(&server, Method::POST, "/g1/move/x/-1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&body), ErrorCode::InvalidInput);

        let (status, body) = send(&server, Method::POST, "/g1/move/z/0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&body), ErrorCode::InvalidSymbol);

        let (status, body) = send(&server, Method::POST, "/g1/move/o/0").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(error_code(&body), ErrorCode::NotYourTurn);

        let (status, body) = send(&server, Method::POST, "/nope/move/x/0").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error_code(&body), ErrorCode::GameNotFound);
    }

    #[tokio::test]
    async fn test_move_and_get() {
        let server = create_test_server();
        send(&server, Method::POST, "/g1/create/x").await;

        let (status, body) = send(&server, Method::POST, "/g1/move/X/4").await;
        assert_eq!(status, StatusCode::OK);
        let state: GameState = serde_json::from_slice(&body).unwrap();
        assert_eq!(state.event, EventKind::Move);
        assert_eq!(state.turn, Symbol::O);

        let (status, body) = send(&server, Method::GET, "/g1").await;
        assert_eq!(status, StatusCode::OK);
        let current: GameState = serde_json::from_slice(&body).unwrap();
        assert_eq!(current.board, state.board);
        assert_eq!(current.event, EventKind::None);
    }

    #[tokio::test]
    async fn test_poll_with_stale_fingerprint() {
        let server = create_test_server();
        send(&server, Method::POST, "/g1/create/x").await;
        send(&server, Method::POST, "/g1/move/x/0").await;

        let (status, body) = send(&server, Method::GET, "/g1/---------").await;
        assert_eq!(status, StatusCode::OK);
        let state: GameState = serde_json::from_slice(&body).unwrap();
        assert_eq!(state.fingerprint(), "X--------");
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_times_out() {
        let server = create_test_server();
        send(&server, Method::POST, "/g1/create/x").await;

        let (status, body) = send(&server, Method::GET, "/g1/---------").await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(error_code(&body), ErrorCode::PollTimedOut);
        assert_eq!(server.registry().listener_count("g1"), Ok(0));
    }

    #[tokio::test]
    async fn test_poll_cancelled_by_shutdown() {
        let server = Arc::new(create_test_server());
        send(&server, Method::POST, "/g1/create/x").await;

        let poll = {
            let server = server.clone();
            tokio::spawn(async move { send(&server, Method::GET, "/g1/---------").await })
        };

        while server.registry().listener_count("g1") != Ok(1) {
            tokio::task::yield_now().await;
        }
        server.shutdown();

        let (status, body) = poll.await.unwrap();
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(error_code(&body), ErrorCode::PollCancelled);
    }

    #[tokio::test]
    async fn test_end_game() {
        let server = create_test_server();
        send(&server, Method::POST, "/g1/create/o").await;

        let (status, _) = send(&server, Method::DELETE, "/g1/end").await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&server, Method::DELETE, "/g1/end").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error_code(&body), ErrorCode::GameNotFound);
    }
}
