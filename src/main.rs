//! Skirmish - Unified CLI
//!
//! Runs the game server or prints the move table.

#![warn(missing_docs)]

use anyhow::{Context, Result};
use clap::Parser;
use skirmish::ServerConfig;
use skirmish::cli::{Cli, Command, render_moves};
use std::path::PathBuf;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            host,
            port,
            turn_timeout,
        } => run_server(config, host, port, turn_timeout).await,
        Command::Moves { side } => {
            print!("{}", render_moves(side));
            Ok(())
        }
    }
}

/// Run the WebSocket game server
#[instrument(skip_all)]
async fn run_server(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    turn_timeout: Option<u64>,
) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,skirmish=debug")),
        )
        .init();

    let config = match &config_path {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("Loading {}", path.display()))?,
        None => ServerConfig::default(),
    };
    let config = config
        .with_env(|key| std::env::var(key).ok())?
        .with_overrides(host, port, turn_timeout);

    info!(
        address = %config.bind_address(),
        spectator_path = %config.spectator_path(),
        turn_timeout = ?config.turn_timeout(),
        "Starting skirmish server"
    );
    skirmish::serve(config).await
}
