//! Skirmish - authoritative two-player grid combat
//!
//! A 5x5 turn-based game played over WebSocket. The server owns the only
//! copy of the game, validates every request and pushes full snapshots to
//! players and read-only spectators.
//!
//! # Architecture
//!
//! - **Games**: board model, piece registries, move resolver and turn machine
//! - **Protocol**: JSON messages exchanged with clients
//! - **Engine**: the task that owns the game and serializes all requests
//! - **Session**: connection table and audience fan-out
//! - **Server**: axum WebSocket routes
//!
//! # Example
//!
//! ```no_run
//! use skirmish::{ServerConfig, serve};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::default().with_overrides(None, Some(9000), None);
//! serve(config).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
mod config;
mod engine;
pub mod games;
mod protocol;
mod server;
mod session;

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - Engine
pub use engine::{Engine, EngineClosed, EngineEvent, EngineHandle};

// Crate-level exports - Wire protocol
pub use protocol::{ClientMessage, GameSnapshot, LastMove, PieceRef, ServerMessage};

// Crate-level exports - Transport
pub use server::{AppState, router, serve, serve_on};

// Crate-level exports - Connections
pub use session::{Audience, ConnectionId, ConnectionRegistry, Role};

// Crate-level exports - Game types
pub use games::skirmish::{
    Accepted, BOARD_SIZE, Board, Cell, DEFAULT_PLAYER1_SETUP, DEFAULT_PLAYER2_SETUP, Game,
    MoveError, MoveRecord, MoveToken, Occupant, Piece, PieceKind, PieceRegistry, PieceSelector,
    Players, Side, TurnState, ViolationKind,
};
