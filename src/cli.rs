//! Command-line interface for skirmish.

use crate::games::skirmish::{PieceKind, Side, offset};
use clap::{Parser, Subcommand};
use strum::IntoEnumIterator;

/// Skirmish - authoritative two-player grid combat over WebSocket
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(about = "Authoritative 5x5 skirmish game server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the game server
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Seconds per turn before it passes (0 disables the clock)
        #[arg(long)]
        turn_timeout: Option<u64>,
    },

    /// Print every piece's move tokens and grid offsets
    Moves {
        /// Side whose orientation to use
        #[arg(long, default_value = "player1")]
        side: Side,
    },
}

/// Renders the move table for one side, one piece kind per block.
pub fn render_moves(side: Side) -> String {
    let mut out = format!("Moves for {side} (row, col):\n");
    for kind in PieceKind::iter() {
        out.push_str(&format!("{} ({}):\n", kind, kind.code()));
        for token in kind.vocabulary() {
            if let Some((d_row, d_col)) = offset(side, kind, token) {
                out.push_str(&format!("  {:<2} {:+}, {:+}\n", token.as_ref(), d_row, d_col));
            }
        }
    }
    out
}
