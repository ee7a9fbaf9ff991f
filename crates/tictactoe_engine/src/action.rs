//! First-class move actions.
//!
//! A move is the intent to place a mark; it is validated by the
//! contracts before the typestate game applies it.

use super::{Cell, Mark};
use serde::{Deserialize, Serialize};

/// A mark placed at a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
pub struct Move {
    /// The mark being placed.
    pub mark: Mark,
    /// Where the mark goes.
    pub cell: Cell,
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.mark, self.cell.label())
    }
}

/// Error that can occur when validating or applying a move.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MoveError {
    /// The cell is already occupied.
    #[display("Cell {} is already occupied", _0)]
    CellOccupied(#[error(not(source))] Cell),

    /// The game is already over.
    #[display("Game is already over")]
    GameOver,

    /// It is not this mark's turn.
    #[display("It's not {}'s turn", _0)]
    WrongMark(#[error(not(source))] Mark),
}
