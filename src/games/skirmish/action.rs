//! First-class action types for skirmish.
//!
//! A committed move becomes a [`MoveRecord`]: append-only history kept for
//! display and audit, never replayed to rebuild state.

use super::types::{Cell, PieceKind, Side};
use serde::Serialize;

/// A committed move as it appears in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    /// Side that moved.
    pub player: Side,
    /// Kind of the moved piece.
    pub piece_type: PieceKind,
    /// Move token as submitted.
    #[serde(rename = "move")]
    pub token: String,
    /// Cell the piece landed on.
    #[serde(flatten)]
    pub resulting: Cell,
}

impl std::fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} moved {} {} to {}",
            self.player, self.piece_type, self.token, self.resulting
        )
    }
}

/// Broad class of a rejected request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ViolationKind {
    /// The request arrived out of turn or after the game ended.
    #[display("turn violation")]
    Turn,
    /// The request broke a movement or setup rule.
    #[display("rule violation")]
    Rule,
}

/// Error that can occur when validating or applying a request.
///
/// The `Display` text is the human-readable reason sent to the client.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The game has a winner; only a restart continues play.
    #[display("game is over")]
    GameOver,

    /// The declared side is not the side to move.
    #[display("not your turn")]
    NotYourTurn,

    /// The acting side has no such piece.
    #[display("piece not found")]
    PieceNotFound,

    /// The token is not in this piece kind's vocabulary.
    #[display("invalid move for {}", _0)]
    InvalidMove(PieceKind),

    /// The target cell is off the board.
    #[display("out of bounds")]
    OutOfBounds,

    /// The target cell holds one of the mover's own pieces.
    #[display("cannot capture own piece")]
    OwnPieceCapture,

    /// The move history is empty.
    #[display("nothing to undo")]
    NothingToUndo,

    /// A setup list cannot be placed on the home row.
    #[display("invalid setup for {side}: expected 1 to 5 pieces, got {len}")]
    InvalidSetup {
        /// Side whose setup was rejected.
        side: Side,
        /// Number of pieces supplied.
        len: usize,
    },

    /// Both sides were given a piece on the same cell.
    #[display("invalid setup: both sides occupy {}", _0)]
    SharedCell(Cell),
}

impl MoveError {
    /// Classifies the error for logging.
    pub fn kind(&self) -> ViolationKind {
        match self {
            MoveError::GameOver | MoveError::NotYourTurn => ViolationKind::Turn,
            _ => ViolationKind::Rule,
        }
    }
}

impl std::error::Error for MoveError {}
