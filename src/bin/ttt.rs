//! Tic-tac-toe command-line client.
//!
//! Reads commands from stdin and long-polls the server in the background
//! for the opponent's moves.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use ttt::cli::{Command, CommandError, TrackedGame, HELP};
use ttt::network::client::GameClient;
use ttt::network::long_poll::PollOutcome;
use ttt::network::protocol::ErrorCode;

/// Tic-tac-toe client
#[derive(Parser, Debug)]
#[command(name = "ttt", version, about)]
struct Args {
    /// Server base URL
    #[arg(long, env = "TTT_HOST", default_value = "http://localhost:8080")]
    host: String,

    /// Seconds to wait before re-polling after a timeout or error
    #[arg(long, default_value_t = 2)]
    retry_secs: u64,

    /// Log level for client diagnostics (written to stderr)
    #[arg(long, env = "TTT_LOG", default_value = "warn")]
    log_level: String,
}

type Tracked = Arc<Mutex<Option<TrackedGame>>>;

struct Repl {
    client: GameClient,
    tracked: Tracked,
    poller: Option<JoinHandle<()>>,
    retry: Duration,
}

impl Repl {
    async fn handle(&mut self, command: Command) -> anyhow::Result<()> {
        command.check_tracked(self.tracked.lock().await.as_ref())?;

        match command {
            Command::List => {
                let games = self.client.list_games().await?;
                if games.is_empty() {
                    println!("No games.");
                }
                for game in games {
                    println!("  {game}");
                }
            }
            Command::Create { game, symbol } => {
                self.client.create_game(&game, symbol).await?;
                let state = self.client.get_game(&game).await?;
                self.track(TrackedGame::new(game, symbol, state)).await;
            }
            Command::Join { game } => {
                let joined = self.client.join_game(&game).await?;
                self.track(TrackedGame::new(game, joined.symbol, joined.state)).await;
            }
            Command::Move { index } => {
                let (game, symbol) = match self.tracked.lock().await.as_ref() {
                    Some(tracked) => (tracked.id().to_string(), tracked.symbol()),
                    None => return Err(CommandError::NoGame.into()),
                };
                let state = self.client.make_move(&game, symbol, index).await?;
                self.track(TrackedGame::new(game, symbol, state)).await;
            }
            Command::End { game } => {
                self.client.end_game(&game).await?;
                println!("Ended {game}.");
            }
            Command::Show => match self.tracked.lock().await.as_ref() {
                Some(tracked) => println!("{}", tracked.render()),
                None => println!("Not in a game."),
            },
            Command::Help => println!("{HELP}"),
            Command::Quit => {}
        }
        Ok(())
    }

    /// Replace the tracked game, print it, and restart the background poll.
    async fn track(&mut self, game: TrackedGame) {
        println!("{}", game.render());
        let finished = game.is_finished();
        *self.tracked.lock().await = Some(game);

        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
        if !finished {
            self.poller = Some(tokio::spawn(watch(
                self.client.clone(),
                self.tracked.clone(),
                self.retry,
            )));
        }
    }
}

/// Long-poll the tracked game until it finishes or stops being tracked.
async fn watch(client: GameClient, tracked: Tracked, retry: Duration) {
    loop {
        let (game, fingerprint) = match tracked.lock().await.as_ref() {
            Some(t) if !t.is_finished() => (t.id().to_string(), t.fingerprint()),
            _ => return,
        };

        match client.poll_game(&game, &fingerprint).await {
            Ok(PollOutcome::Changed(state)) => {
                let mut guard = tracked.lock().await;
                let Some(t) = guard.as_mut().filter(|t| t.id() == game) else {
                    return;
                };
                if t.update(state) {
                    println!("\n{}", t.render());
                }
                if t.is_finished() {
                    *guard = None;
                    return;
                }
            }
            Ok(outcome) => {
                debug!(game_id = %game, ?outcome, "Poll returned without change");
                tokio::time::sleep(retry).await;
            }
            Err(e) if e.code() == Some(ErrorCode::GameNotFound) => {
                println!("\nGame {game} is gone.");
                let mut guard = tracked.lock().await;
                if guard.as_ref().is_some_and(|t| t.id() == game) {
                    *guard = None;
                }
                return;
            }
            Err(e) => {
                warn!(game_id = %game, error = %e, "Poll failed, retrying");
                tokio::time::sleep(retry).await;
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log_level))
        .with_writer(std::io::stderr)
        .init();

    let client = GameClient::new(&args.host)?;
    println!("Connected to {}. Type 'help' for commands.", client.base());

    let mut repl = Repl {
        client,
        tracked: Arc::new(Mutex::new(None)),
        poller: None,
        retry: Duration::from_secs(args.retry_secs),
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }

        if let Err(e) = repl.handle(command).await {
            println!("Error: {e}");
        }
    }

    if let Some(poller) = repl.poller.take() {
        poller.abort();
    }
    Ok(())
}
