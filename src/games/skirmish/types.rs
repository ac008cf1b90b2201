//! Core domain types for the skirmish board.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::registry::Players;

/// Width and height of the square board.
pub const BOARD_SIZE: usize = 5;

/// One of the two competing players.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
    strum::EnumString,
)]
pub enum Side {
    /// First player; home row is row 0 and moves first.
    #[serde(rename = "player1")]
    #[strum(serialize = "player1")]
    #[display("player1")]
    Player1,
    /// Second player; home row is the last row.
    #[serde(rename = "player2")]
    #[strum(serialize = "player2")]
    #[display("player2")]
    Player2,
}

impl Side {
    /// Returns the opposing side.
    pub fn opponent(self) -> Self {
        match self {
            Side::Player1 => Side::Player2,
            Side::Player2 => Side::Player1,
        }
    }

    /// Row direction of "forward" for this side.
    ///
    /// Player1 advances towards higher rows, Player2 towards lower rows.
    pub fn forward_sign(self) -> isize {
        match self {
            Side::Player1 => 1,
            Side::Player2 => -1,
        }
    }

    /// Row the side's pieces are placed on at setup.
    pub fn home_row(self) -> usize {
        match self {
            Side::Player1 => 0,
            Side::Player2 => BOARD_SIZE - 1,
        }
    }
}

/// Movement class of a piece.
///
/// Serialized with the short codes used on the wire (`P`, `H1`, `H2`, `H3`);
/// displayed with the long name used in rejection reasons.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
    strum::EnumString,
)]
pub enum PieceKind {
    /// Orthogonal steps of one cell.
    #[serde(rename = "P")]
    #[strum(serialize = "P")]
    Pawn,
    /// Orthogonal jumps of two cells.
    #[serde(rename = "H1")]
    #[strum(serialize = "H1")]
    Hero1,
    /// Diagonal jumps of two cells.
    #[serde(rename = "H2")]
    #[strum(serialize = "H2")]
    Hero2,
    /// Knight-like jumps.
    #[serde(rename = "H3")]
    #[strum(serialize = "H3")]
    Hero3,
}

impl PieceKind {
    /// Short wire code for this kind.
    pub fn code(self) -> &'static str {
        match self {
            PieceKind::Pawn => "P",
            PieceKind::Hero1 => "H1",
            PieceKind::Hero2 => "H2",
            PieceKind::Hero3 => "H3",
        }
    }
}

/// A cell on the board. Always within `[0, BOARD_SIZE)` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[display("({row}, {col})")]
pub struct Cell {
    row: usize,
    col: usize,
}

impl Cell {
    /// Creates a cell, or `None` if either coordinate is off the board.
    pub fn new(row: usize, col: usize) -> Option<Self> {
        (row < BOARD_SIZE && col < BOARD_SIZE).then_some(Self { row, col })
    }

    /// Row index.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Column index.
    pub fn col(&self) -> usize {
        self.col
    }

    /// Shifts the cell by a signed offset, returning `None` when the result
    /// leaves the board.
    pub fn offset(self, d_row: isize, d_col: isize) -> Option<Self> {
        let row = self.row.checked_add_signed(d_row)?;
        let col = self.col.checked_add_signed(d_col)?;
        Self::new(row, col)
    }
}

/// A piece owned by one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Piece {
    /// Movement class.
    #[serde(rename = "type")]
    pub kind: PieceKind,
    /// Current position.
    #[serde(flatten)]
    pub cell: Cell,
}

impl Piece {
    /// Creates a piece at the given cell.
    pub fn new(kind: PieceKind, cell: Cell) -> Self {
        Self { kind, cell }
    }
}

/// What the board shows in an occupied cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occupant {
    /// Owning side.
    pub player: Side,
    /// Piece kind.
    #[serde(rename = "type")]
    pub kind: PieceKind,
}

/// N×N board projection of the piece registries.
///
/// Never edited cell by cell; always rebuilt from the registries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Option<Occupant>; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            cells: [[None; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Rebuilds the board from both sides' registries.
    #[instrument(skip(players))]
    pub fn rebuild(players: &Players) -> Self {
        let mut board = Self::new();
        for (side, registry) in players.iter() {
            for piece in registry.iter() {
                board.cells[piece.cell.row()][piece.cell.col()] = Some(Occupant {
                    player: side,
                    kind: piece.kind,
                });
            }
        }
        board
    }

    /// Returns the occupant of a cell.
    pub fn get(&self, cell: Cell) -> Option<Occupant> {
        self.cells[cell.row()][cell.col()]
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    /// Formats the board as a human-readable grid, Player1 pieces in upper
    /// case and Player2 pieces in lower case.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for (row, cols) in self.cells.iter().enumerate() {
            let line: Vec<String> = cols
                .iter()
                .map(|cell| match cell {
                    None => ".".to_string(),
                    Some(Occupant { player: Side::Player1, kind }) => kind.code().to_string(),
                    Some(Occupant { player: Side::Player2, kind }) => kind.code().to_lowercase(),
                })
                .map(|s| format!("{s:>2}"))
                .collect();
            result.push_str(&line.join(" "));
            if row + 1 < BOARD_SIZE {
                result.push('\n');
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
