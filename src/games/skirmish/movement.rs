//! Movement rules: token vocabularies, offset table and move resolution.
//!
//! Offsets are written from Player1's point of view, where "forward" means
//! increasing row. The row component is multiplied by
//! [`Side::forward_sign`] for the acting side; columns are never mirrored.

use super::action::MoveError;
use super::registry::Players;
use super::types::{Cell, Piece, PieceKind, Side};
use tracing::{debug, instrument};

/// A direction or shape of movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumString, strum::AsRefStr, strum::EnumIter)]
pub enum MoveToken {
    /// Left.
    L,
    /// Right.
    R,
    /// Forward.
    F,
    /// Backward.
    B,
    /// Forward-left.
    FL,
    /// Forward-right.
    FR,
    /// Backward-left.
    BL,
    /// Backward-right.
    BR,
    /// Right then forward.
    RF,
    /// Right then backward.
    RB,
    /// Left then forward.
    LF,
    /// Left then backward.
    LB,
}

/// One row of the offset table: `(kind, token, forward, lateral)`.
type OffsetEntry = (PieceKind, MoveToken, isize, isize);

const OFFSETS: [OffsetEntry; 20] = [
    (PieceKind::Pawn, MoveToken::L, 0, -1),
    (PieceKind::Pawn, MoveToken::R, 0, 1),
    (PieceKind::Pawn, MoveToken::F, 1, 0),
    (PieceKind::Pawn, MoveToken::B, -1, 0),
    (PieceKind::Hero1, MoveToken::L, 0, -2),
    (PieceKind::Hero1, MoveToken::R, 0, 2),
    (PieceKind::Hero1, MoveToken::F, 2, 0),
    (PieceKind::Hero1, MoveToken::B, -2, 0),
    (PieceKind::Hero2, MoveToken::FL, 2, -2),
    (PieceKind::Hero2, MoveToken::FR, 2, 2),
    (PieceKind::Hero2, MoveToken::BL, -2, -2),
    (PieceKind::Hero2, MoveToken::BR, -2, 2),
    (PieceKind::Hero3, MoveToken::FL, 2, -1),
    (PieceKind::Hero3, MoveToken::FR, 2, 1),
    (PieceKind::Hero3, MoveToken::BL, -2, -1),
    (PieceKind::Hero3, MoveToken::BR, -2, 1),
    (PieceKind::Hero3, MoveToken::RF, 1, 2),
    (PieceKind::Hero3, MoveToken::RB, -1, 2),
    (PieceKind::Hero3, MoveToken::LF, 1, -2),
    (PieceKind::Hero3, MoveToken::LB, -1, -2),
];

impl PieceKind {
    /// Tokens this kind may use, in table order.
    pub fn vocabulary(self) -> Vec<MoveToken> {
        OFFSETS
            .iter()
            .filter(|(kind, ..)| *kind == self)
            .map(|(_, token, ..)| *token)
            .collect()
    }
}

/// Looks up the grid offset `(d_row, d_col)` of a token for a side.
///
/// Returns `None` if the token is not in the kind's vocabulary.
pub fn offset(side: Side, kind: PieceKind, token: MoveToken) -> Option<(isize, isize)> {
    OFFSETS
        .iter()
        .find(|(k, t, ..)| *k == kind && *t == token)
        .map(|&(_, _, forward, lateral)| (forward * side.forward_sign(), lateral))
}

/// Identifies which of the acting side's pieces a request means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSelector {
    /// Kind of the piece.
    pub kind: PieceKind,
    /// Optional `(row, col)` of the piece, to tell apart pieces of the same
    /// kind. Unchecked: an off-board position matches nothing.
    pub at: Option<(usize, usize)>,
}

impl PieceSelector {
    /// Selects the first piece of a kind.
    pub fn kind(kind: PieceKind) -> Self {
        Self { kind, at: None }
    }

    /// Selects the piece of a kind standing on a cell.
    pub fn at(kind: PieceKind, cell: Cell) -> Self {
        Self {
            kind,
            at: Some((cell.row(), cell.col())),
        }
    }
}

/// A validated move, ready to commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMove {
    /// Acting side.
    pub side: Side,
    /// Index of the moving piece in the side's registry.
    pub index: usize,
    /// The moving piece before the move.
    pub piece: Piece,
    /// Destination cell.
    pub target: Cell,
    /// Registry index of the opposing piece on the target, if any.
    pub capture: Option<usize>,
    /// Token as submitted.
    pub token: String,
}

/// Validates a move against the registries without mutating anything.
///
/// Checks run in order: piece lookup, token vocabulary, bounds, occupancy.
///
/// # Errors
///
/// Returns the first rule the request breaks.
#[instrument(skip(players))]
pub fn resolve(
    side: Side,
    selector: PieceSelector,
    token: &str,
    players: &Players,
) -> Result<ResolvedMove, MoveError> {
    let own = players.get(side);
    let index = own
        .find(selector.kind, selector.at)
        .ok_or(MoveError::PieceNotFound)?;
    let piece = *own.get(index).ok_or(MoveError::PieceNotFound)?;

    let (d_row, d_col) = token
        .parse::<MoveToken>()
        .ok()
        .and_then(|t| offset(side, piece.kind, t))
        .ok_or(MoveError::InvalidMove(piece.kind))?;

    let target = piece.cell.offset(d_row, d_col).ok_or(MoveError::OutOfBounds)?;

    if own.index_at(target).is_some() {
        return Err(MoveError::OwnPieceCapture);
    }
    let capture = players.get(side.opponent()).index_at(target);

    debug!(from = %piece.cell, to = %target, captures = capture.is_some(), "Move resolved");

    Ok(ResolvedMove {
        side,
        index,
        piece,
        target,
        capture,
        token: token.to_string(),
    })
}
