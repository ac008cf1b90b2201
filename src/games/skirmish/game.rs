//! The authoritative game state and its transitions.
//!
//! [`Game`] is owned by exactly one task. Every request is checked in full
//! before anything is written, so a rejected request leaves the game
//! untouched.

use super::action::{MoveError, MoveRecord};
use super::invariants::assert_invariants;
use super::movement::{PieceSelector, resolve};
use super::registry::Players;
use super::turn::TurnState;
use super::types::{Board, Cell, Piece, PieceKind, Side};
use tracing::{debug, info, instrument};

/// What undo needs to invert one committed move.
#[derive(Debug, Clone, PartialEq, Eq)]
struct UndoEntry {
    side: Side,
    index: usize,
    from: Cell,
    to: Cell,
    captured: Option<(usize, Piece)>,
}

/// Result of an accepted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    /// The history entry that was appended.
    pub record: MoveRecord,
    /// Opposing piece removed by this move.
    pub captured: Option<Piece>,
    /// Set when the move captured the opponent's last piece.
    pub winner: Option<Side>,
}

impl Accepted {
    /// Whether this move ended the game.
    pub fn is_terminal(&self) -> bool {
        self.winner.is_some()
    }
}

/// Complete state of one match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    players: Players,
    turn: TurnState,
    moves: Vec<MoveRecord>,
    undo_log: Vec<UndoEntry>,
}

impl Game {
    /// Starts a game from two setup lists.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::InvalidSetup`] if a list is empty or wider than
    /// the board.
    #[instrument]
    pub fn new(player1: &[PieceKind], player2: &[PieceKind]) -> Result<Self, MoveError> {
        let players = Players::from_setups(player1, player2)?;
        info!("Starting new game");
        Ok(Self::from_players(players, Side::Player1))
    }

    /// Starts a game with the default setups.
    pub fn standard() -> Self {
        Self::from_players(Players::standard(), Side::Player1)
    }

    /// Starts a game from arbitrary registries with `first` to move.
    pub fn from_players(players: Players, first: Side) -> Self {
        let game = Self {
            board: Board::rebuild(&players),
            players,
            turn: TurnState::ToMove(first),
            moves: Vec::new(),
            undo_log: Vec::new(),
        };
        assert_invariants(&game);
        game
    }

    /// Validates and commits a move for `side`.
    ///
    /// Order of checks: game over, turn, then the movement rules. Nothing is
    /// written unless every check passes.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule; the game is unchanged.
    #[instrument(skip(self), fields(turn = ?self.turn))]
    pub fn apply_move(
        &mut self,
        side: Side,
        selector: PieceSelector,
        token: &str,
    ) -> Result<Accepted, MoveError> {
        self.turn.authorize(side)?;
        let resolved = resolve(side, selector, token, &self.players)?;

        let opponent = side.opponent();
        let captured = resolved
            .capture
            .map(|index| (index, self.players.get_mut(opponent).remove(index)));
        self.players
            .get_mut(side)
            .relocate(resolved.index, resolved.target);
        self.board = Board::rebuild(&self.players);

        let record = MoveRecord {
            player: side,
            piece_type: resolved.piece.kind,
            token: resolved.token,
            resulting: resolved.target,
        };
        self.moves.push(record.clone());
        self.undo_log.push(UndoEntry {
            side,
            index: resolved.index,
            from: resolved.piece.cell,
            to: resolved.target,
            captured,
        });

        let exhausted = self.players.get(opponent).is_empty();
        self.turn = self.turn.after_move(side, exhausted);
        assert_invariants(self);

        info!(%record, captured = captured.is_some(), game_over = exhausted, "Move committed");
        debug!("Board:\n{}", self.board.display());

        Ok(Accepted {
            record,
            captured: captured.map(|(_, piece)| piece),
            winner: self.turn.winner(),
        })
    }

    /// Reverts the most recent move: the piece returns to its previous cell,
    /// any captured piece is restored and the mover is to move again.
    ///
    /// # Errors
    ///
    /// [`MoveError::GameOver`] once the game has ended,
    /// [`MoveError::NothingToUndo`] on an empty history.
    #[instrument(skip(self))]
    pub fn undo(&mut self) -> Result<MoveRecord, MoveError> {
        if self.turn.is_over() {
            return Err(MoveError::GameOver);
        }
        let (Some(entry), Some(record)) = (self.undo_log.pop(), self.moves.pop()) else {
            return Err(MoveError::NothingToUndo);
        };

        self.players.get_mut(entry.side).relocate(entry.index, entry.from);
        if let Some((index, piece)) = entry.captured {
            self.players.get_mut(entry.side.opponent()).restore(index, piece);
        }
        self.board = Board::rebuild(&self.players);
        self.turn = TurnState::ToMove(entry.side);
        assert_invariants(self);

        info!(%record, "Move undone");
        Ok(record)
    }

    /// Passes the turn to the other side without a move.
    ///
    /// # Errors
    ///
    /// [`MoveError::GameOver`] once the game has ended.
    #[instrument(skip(self))]
    pub fn pass_turn(&mut self) -> Result<Side, MoveError> {
        self.turn = self.turn.pass()?;
        let next = self.turn.to_move().ok_or(MoveError::GameOver)?;
        debug!(%next, "Turn passed");
        Ok(next)
    }

    /// The derived board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Both piece registries.
    pub fn players(&self) -> &Players {
        &self.players
    }

    /// Current turn state.
    pub fn turn(&self) -> TurnState {
        self.turn
    }

    /// Committed moves, oldest first.
    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    /// Origin and destination of the most recent move.
    pub fn last_move(&self) -> Option<(Cell, Cell)> {
        self.undo_log.last().map(|e| (e.from, e.to))
    }

    pub(super) fn undo_depth(&self) -> usize {
        self.undo_log.len()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::standard()
    }
}
