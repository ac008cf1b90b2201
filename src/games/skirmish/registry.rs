//! Per-side piece registries: the true state of a game.
//!
//! The board is only a projection of these collections. Pieces keep their
//! setup order for deterministic enumeration; order carries no rule meaning.

use super::action::MoveError;
use super::types::{BOARD_SIZE, Cell, Piece, PieceKind, Side};
use serde::Serialize;
use tracing::{debug, instrument};

/// Default setup for Player1, left to right along the home row.
pub const DEFAULT_PLAYER1_SETUP: [PieceKind; 5] = [
    PieceKind::Pawn,
    PieceKind::Hero1,
    PieceKind::Hero2,
    PieceKind::Hero3,
    PieceKind::Pawn,
];

/// Default setup for Player2, left to right along the home row.
pub const DEFAULT_PLAYER2_SETUP: [PieceKind; 5] = [
    PieceKind::Pawn,
    PieceKind::Hero2,
    PieceKind::Hero1,
    PieceKind::Hero3,
    PieceKind::Pawn,
];

/// Ordered pieces of one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieceRegistry {
    pieces: Vec<Piece>,
}

impl PieceRegistry {
    /// Places a setup list along the side's home row, one column per entry.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::InvalidSetup`] if the list is empty or longer
    /// than the board is wide.
    #[instrument]
    pub fn from_setup(side: Side, setup: &[PieceKind]) -> Result<Self, MoveError> {
        if setup.is_empty() || setup.len() > BOARD_SIZE {
            return Err(MoveError::InvalidSetup {
                side,
                len: setup.len(),
            });
        }

        let registry = Self::place(side, setup);
        debug!(%side, count = registry.len(), "Placed setup pieces");
        Ok(registry)
    }

    fn place(side: Side, setup: &[PieceKind]) -> Self {
        let row = side.home_row();
        let pieces = setup
            .iter()
            .zip(0..)
            .filter_map(|(&kind, col)| Cell::new(row, col).map(|cell| Piece::new(kind, cell)))
            .collect();
        Self { pieces }
    }

    /// Finds a piece by kind, optionally pinned to a `(row, col)` position.
    ///
    /// Without a position the first piece of that kind in setup order wins.
    pub fn find(&self, kind: PieceKind, at: Option<(usize, usize)>) -> Option<usize> {
        self.pieces.iter().position(|p| {
            p.kind == kind && at.is_none_or(|pos| (p.cell.row(), p.cell.col()) == pos)
        })
    }

    /// Index of the piece standing on `cell`, if any.
    pub fn index_at(&self, cell: Cell) -> Option<usize> {
        self.pieces.iter().position(|p| p.cell == cell)
    }

    /// Returns the piece at an index.
    pub fn get(&self, index: usize) -> Option<&Piece> {
        self.pieces.get(index)
    }

    /// Moves the piece at `index` to `cell`.
    pub(super) fn relocate(&mut self, index: usize, cell: Cell) {
        if let Some(piece) = self.pieces.get_mut(index) {
            piece.cell = cell;
        }
    }

    /// Permanently removes the piece at `index`.
    pub(super) fn remove(&mut self, index: usize) -> Piece {
        self.pieces.remove(index)
    }

    /// Puts a previously removed piece back at its old index.
    pub(super) fn restore(&mut self, index: usize, piece: Piece) {
        let index = index.min(self.pieces.len());
        self.pieces.insert(index, piece);
    }

    /// Iterates pieces in setup order.
    pub fn iter(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter()
    }

    /// Number of live pieces.
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// Whether every piece of this side has been captured.
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }
}

/// Both sides' registries, serialized as `{ "player1": ..., "player2": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Players {
    player1: PieceRegistry,
    player2: PieceRegistry,
}

impl Players {
    /// Builds both registries from their setup lists.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::InvalidSetup`] if either list is unusable.
    #[instrument]
    pub fn from_setups(player1: &[PieceKind], player2: &[PieceKind]) -> Result<Self, MoveError> {
        Ok(Self {
            player1: PieceRegistry::from_setup(Side::Player1, player1)?,
            player2: PieceRegistry::from_setup(Side::Player2, player2)?,
        })
    }

    /// The default opening position.
    pub fn standard() -> Self {
        Self {
            player1: PieceRegistry::place(Side::Player1, &DEFAULT_PLAYER1_SETUP),
            player2: PieceRegistry::place(Side::Player2, &DEFAULT_PLAYER2_SETUP),
        }
    }

    /// Assembles registries directly, for positions that no setup list can
    /// express.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::SharedCell`] if a cell is claimed by both sides.
    pub fn from_registries(player1: PieceRegistry, player2: PieceRegistry) -> Result<Self, MoveError> {
        if let Some(piece) = player1
            .iter()
            .find(|a| player2.iter().any(|b| a.cell == b.cell))
        {
            return Err(MoveError::SharedCell(piece.cell));
        }
        Ok(Self { player1, player2 })
    }

    /// Registry of one side.
    pub fn get(&self, side: Side) -> &PieceRegistry {
        match side {
            Side::Player1 => &self.player1,
            Side::Player2 => &self.player2,
        }
    }

    pub(super) fn get_mut(&mut self, side: Side) -> &mut PieceRegistry {
        match side {
            Side::Player1 => &mut self.player1,
            Side::Player2 => &mut self.player2,
        }
    }

    /// Iterates `(side, registry)` pairs, Player1 first.
    pub fn iter(&self) -> impl Iterator<Item = (Side, &PieceRegistry)> {
        [(Side::Player1, &self.player1), (Side::Player2, &self.player2)].into_iter()
    }
}

impl PieceRegistry {
    /// Builds a registry from explicit pieces.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::InvalidSetup`] if two pieces share a cell or the
    /// list is empty.
    pub fn from_pieces(side: Side, pieces: Vec<Piece>) -> Result<Self, MoveError> {
        let mut seen = std::collections::HashSet::new();
        if pieces.is_empty() || !pieces.iter().all(|p| seen.insert(p.cell)) {
            return Err(MoveError::InvalidSetup {
                side,
                len: pieces.len(),
            });
        }
        Ok(Self { pieces })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_places_on_home_rows() {
        let players = Players::from_setups(&DEFAULT_PLAYER1_SETUP, &DEFAULT_PLAYER2_SETUP).unwrap();

        let p1: Vec<_> = players.get(Side::Player1).iter().collect();
        assert_eq!(p1.len(), 5);
        assert!(p1.iter().all(|p| p.cell.row() == 0));
        assert_eq!(p1[2].kind, PieceKind::Hero2);
        assert_eq!(p1[2].cell.col(), 2);

        let p2: Vec<_> = players.get(Side::Player2).iter().collect();
        assert!(p2.iter().all(|p| p.cell.row() == BOARD_SIZE - 1));
        assert_eq!(p2[1].kind, PieceKind::Hero2);
    }

    #[test]
    fn test_setup_rejects_bad_lengths() {
        assert!(PieceRegistry::from_setup(Side::Player1, &[]).is_err());
        let too_many = [PieceKind::Pawn; BOARD_SIZE + 1];
        assert!(matches!(
            PieceRegistry::from_setup(Side::Player2, &too_many),
            Err(MoveError::InvalidSetup { side: Side::Player2, len: 6 })
        ));
    }

    #[test]
    fn test_find_first_match_in_setup_order() {
        let registry = PieceRegistry::from_setup(Side::Player1, &DEFAULT_PLAYER1_SETUP).unwrap();
        assert_eq!(registry.find(PieceKind::Pawn, None), Some(0));
        assert_eq!(registry.find(PieceKind::Pawn, Some((0, 4))), Some(4));
        assert_eq!(registry.find(PieceKind::Pawn, Some((0, 2))), None);
        assert_eq!(registry.find(PieceKind::Pawn, Some((0, 9))), None);
    }

    #[test]
    fn test_remove_then_restore_keeps_order() {
        let mut registry = PieceRegistry::from_setup(Side::Player2, &DEFAULT_PLAYER2_SETUP).unwrap();
        let before = registry.clone();
        let piece = registry.remove(2);
        assert_eq!(registry.len(), 4);
        registry.restore(2, piece);
        assert_eq!(registry, before);
    }

    #[test]
    fn test_from_pieces_rejects_stacked_cells() {
        let cell = Cell::new(2, 2).unwrap();
        let pieces = vec![Piece::new(PieceKind::Pawn, cell), Piece::new(PieceKind::Hero1, cell)];
        assert!(PieceRegistry::from_pieces(Side::Player1, pieces).is_err());
    }

    #[test]
    fn test_from_registries_rejects_cells_held_by_both_sides() {
        let cell = Cell::new(2, 3).unwrap();
        let p1 = PieceRegistry::from_pieces(Side::Player1, vec![Piece::new(PieceKind::Pawn, cell)]).unwrap();
        let p2 = PieceRegistry::from_pieces(Side::Player2, vec![Piece::new(PieceKind::Hero1, cell)]).unwrap();
        let err = Players::from_registries(p1.clone(), p2).unwrap_err();
        assert_eq!(err, MoveError::SharedCell(cell));
        assert_eq!(err.to_string(), "invalid setup: both sides occupy (2, 3)");

        let apart = PieceRegistry::from_pieces(
            Side::Player2,
            vec![Piece::new(PieceKind::Hero1, Cell::new(4, 3).unwrap())],
        )
        .unwrap();
        assert!(Players::from_registries(p1, apart).is_ok());
    }
}
