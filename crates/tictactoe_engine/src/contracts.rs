//! Move preconditions.
//!
//! Each precondition is a small named check; [`LegalMove`] composes them.

use super::action::{Move, MoveError};
use super::typestate::GameInProgress;
use tracing::{instrument, warn};

/// Precondition: the target cell must be empty.
pub struct CellIsEmpty;

impl CellIsEmpty {
    /// Checks the precondition.
    #[instrument(skip(game))]
    pub fn check(mov: &Move, game: &GameInProgress) -> Result<(), MoveError> {
        if game.board().is_empty(mov.cell) {
            Ok(())
        } else {
            warn!(cell = %mov.cell, "Move targets an occupied cell");
            Err(MoveError::CellOccupied(mov.cell))
        }
    }
}

/// Precondition: the mark must be the one to move.
pub struct MarksTurn;

impl MarksTurn {
    /// Checks the precondition.
    #[instrument(skip(game))]
    pub fn check(mov: &Move, game: &GameInProgress) -> Result<(), MoveError> {
        if mov.mark == game.to_move() {
            Ok(())
        } else {
            warn!(mark = %mov.mark, expected = %game.to_move(), "Move out of turn");
            Err(MoveError::WrongMark(mov.mark))
        }
    }
}

/// Composite precondition: a move is legal if the cell is empty and it's the mark's turn.
pub struct LegalMove;

impl LegalMove {
    /// Validates all preconditions for a move.
    #[instrument(skip(game))]
    pub fn check(mov: &Move, game: &GameInProgress) -> Result<(), MoveError> {
        CellIsEmpty::check(mov, game)?;
        MarksTurn::check(mov, game)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cell, GameResult, GameSetup, Mark};

    #[test]
    fn test_precondition_empty_cell() {
        let game = GameSetup::new().start(Mark::Cross);
        let action = Move::new(Mark::Cross, Cell::Center);
        assert!(LegalMove::check(&action, &game).is_ok());
    }

    #[test]
    fn test_precondition_occupied_cell() {
        let game = GameSetup::new().start(Mark::Cross);
        let Ok(GameResult::InProgress(game)) = game.make_move(Move::new(Mark::Cross, Cell::Center))
        else {
            panic!("Expected in-progress game");
        };
        assert_eq!(
            LegalMove::check(&Move::new(Mark::Nought, Cell::Center), &game),
            Err(MoveError::CellOccupied(Cell::Center))
        );
    }

    #[test]
    fn test_precondition_wrong_turn() {
        let game = GameSetup::new().start(Mark::Cross);
        let action = Move::new(Mark::Nought, Cell::Center);
        assert_eq!(
            LegalMove::check(&action, &game),
            Err(MoveError::WrongMark(Mark::Nought))
        );
    }
}
