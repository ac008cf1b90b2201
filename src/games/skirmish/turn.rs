//! Turn sequencing and terminal detection.

use super::action::MoveError;
use super::types::Side;
use tracing::{debug, instrument};

/// Whose turn it is, or who won.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// The given side may move.
    ToMove(Side),
    /// Terminal: no transition leaves this state.
    GameOver {
        /// Side that captured the last opposing piece.
        winner: Side,
    },
}

impl TurnState {
    /// State at the start of every game.
    pub fn opening() -> Self {
        TurnState::ToMove(Side::Player1)
    }

    /// Checks that `side` may act now.
    ///
    /// The game-over check comes first, so a finished game rejects every
    /// request whatever side it declares.
    ///
    /// # Errors
    ///
    /// [`MoveError::GameOver`] after a win, [`MoveError::NotYourTurn`] when
    /// the other side is to move.
    pub fn authorize(self, side: Side) -> Result<(), MoveError> {
        match self {
            TurnState::GameOver { .. } => Err(MoveError::GameOver),
            TurnState::ToMove(current) if current != side => Err(MoveError::NotYourTurn),
            TurnState::ToMove(_) => Ok(()),
        }
    }

    /// Transition after an accepted move by `mover`.
    #[instrument]
    pub fn after_move(self, mover: Side, opponent_exhausted: bool) -> Self {
        let next = if opponent_exhausted {
            TurnState::GameOver { winner: mover }
        } else {
            TurnState::ToMove(mover.opponent())
        };
        debug!(?next, "Turn advanced");
        next
    }

    /// Passes the turn without a move, as when the clock runs out.
    ///
    /// # Errors
    ///
    /// [`MoveError::GameOver`] once the game has ended.
    pub fn pass(self) -> Result<Self, MoveError> {
        match self {
            TurnState::ToMove(side) => Ok(TurnState::ToMove(side.opponent())),
            TurnState::GameOver { .. } => Err(MoveError::GameOver),
        }
    }

    /// Side to move, if the game is in progress.
    pub fn to_move(self) -> Option<Side> {
        match self {
            TurnState::ToMove(side) => Some(side),
            TurnState::GameOver { .. } => None,
        }
    }

    /// Winner, if the game is over.
    pub fn winner(self) -> Option<Side> {
        match self {
            TurnState::GameOver { winner } => Some(winner),
            TurnState::ToMove(_) => None,
        }
    }

    /// Whether the game has ended.
    pub fn is_over(self) -> bool {
        matches!(self, TurnState::GameOver { .. })
    }
}

impl Default for TurnState {
    fn default() -> Self {
        Self::opening()
    }
}
