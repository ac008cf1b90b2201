//! Rules engine for the 5×5 skirmish game.

mod action;
mod game;
mod invariants;
mod movement;
mod registry;
mod turn;
mod types;

pub use action::{MoveError, MoveRecord, ViolationKind};
pub use game::{Accepted, Game};
pub use invariants::{
    BoardProjectionInvariant, HistoryConsistentInvariant, Invariant, InvariantSet,
    InvariantViolation, SkirmishInvariants, TerminalInvariant,
};
pub use movement::{MoveToken, PieceSelector, ResolvedMove, offset, resolve};
pub use registry::{DEFAULT_PLAYER1_SETUP, DEFAULT_PLAYER2_SETUP, PieceRegistry, Players};
pub use turn::TurnState;
pub use types::{BOARD_SIZE, Board, Cell, Occupant, Piece, PieceKind, Side};
