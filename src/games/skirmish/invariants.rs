//! First-class invariants for skirmish.
//!
//! Invariants are logical properties that must hold after every committed
//! change to a [`Game`]. They are checked in debug builds and tested
//! independently.

use super::game::Game;
use super::types::Board;
use tracing::warn;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let violations: Vec<_> = [
            (I1::holds(state), I1::description()),
            (I2::holds(state), I2::description()),
            (I3::holds(state), I3::description()),
        ]
        .into_iter()
        .filter(|(holds, _)| !holds)
        .map(|(_, description)| InvariantViolation::new(description))
        .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Invariant: the board is exactly the projection of the registries.
///
/// Every piece shows on its own cell with its owner and kind, and no two
/// pieces share a cell.
pub struct BoardProjectionInvariant;

impl Invariant<Game> for BoardProjectionInvariant {
    fn holds(game: &Game) -> bool {
        let pieces: usize = game.players().iter().map(|(_, r)| r.len()).sum();
        let projected = Board::rebuild(game.players());
        *game.board() == projected && projected.occupied() == pieces
    }

    fn description() -> &'static str {
        "Board matches piece registries with one piece per cell"
    }
}

/// Invariant: the game is over exactly when the loser has no pieces.
pub struct TerminalInvariant;

impl Invariant<Game> for TerminalInvariant {
    fn holds(game: &Game) -> bool {
        match game.turn().winner() {
            Some(winner) => game.players().get(winner.opponent()).is_empty(),
            None => game.players().iter().all(|(_, r)| !r.is_empty()),
        }
    }

    fn description() -> &'static str {
        "Game over if and only if one side has no pieces left"
    }
}

/// Invariant: every history record can be undone.
///
/// Records and undo entries are pushed and popped together.
pub struct HistoryConsistentInvariant;

impl Invariant<Game> for HistoryConsistentInvariant {
    fn holds(game: &Game) -> bool {
        game.moves().len() == game.undo_depth()
    }

    fn description() -> &'static str {
        "Every history record has a matching undo entry"
    }
}

/// All skirmish invariants as a composable set.
pub type SkirmishInvariants = (
    BoardProjectionInvariant,
    TerminalInvariant,
    HistoryConsistentInvariant,
);

/// Asserts that all game invariants hold (panics on violation in debug builds).
pub fn assert_invariants(game: &Game) {
    if let Err(violations) = SkirmishInvariants::check_all(game) {
        for v in &violations {
            warn!(description = %v.description, "Invariant violated");
        }
        debug_assert!(violations.is_empty(), "Game invariants violated: {violations:?}");
    }
}
