//! Tic-Tac-Toe Game Server
//!
//! Serves the game registry over HTTP until interrupted.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ttt::{
    network::{GameServer, ServerConfig},
    LONG_POLL_MAX_WAIT_SECS, VERSION,
};

/// Tic-tac-toe long-poll server
#[derive(Parser, Debug)]
#[command(name = "ttt-server", version, about)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "TTT_BIND", default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// Seconds a long-poll waits before answering with a timeout
    #[arg(long, env = "TTT_LONG_POLL_SECS", default_value_t = LONG_POLL_MAX_WAIT_SECS)]
    long_poll_secs: u64,

    /// Log filter, used when RUST_LOG is unset
    #[arg(long, env = "TTT_LOG", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ServerConfig {
        bind_addr: args.bind,
        long_poll_wait: Duration::from_secs(args.long_poll_secs),
        ..Default::default()
    };
    let server = Arc::new(GameServer::new(config));

    info!("Tic-tac-toe server v{}", VERSION);
    info!("Long-poll wait: {:?}", server.config().long_poll_wait);

    let signal_server = server.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, shutting down");
                signal_server.shutdown();
            }
            Err(e) => error!("Failed to listen for ctrl-c: {}", e),
        }
    });

    server.run().await?;

    info!("Server stopped with {} games open", server.game_count());
    Ok(())
}
