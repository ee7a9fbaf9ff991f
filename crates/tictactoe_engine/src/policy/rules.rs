use super::Policy;
use crate::rules::winning_cell;
use crate::{Board, Cell, Mark, Square};
use tracing::debug;

/// Rule-based agent.
///
/// In priority order: complete a line, block the opponent's line, take the
/// center, take the corner opposite an opponent corner, take any corner,
/// take any side.
#[derive(Debug, Default)]
pub struct RulesPolicy;

impl RulesPolicy {
    /// Creates the policy.
    pub fn new() -> Self {
        Self
    }
}

impl Policy for RulesPolicy {
    fn choose(&mut self, board: &Board, mark: Mark) -> Option<Cell> {
        if let Some(cell) = winning_cell(board, mark) {
            debug!(%cell, "Rule: win");
            return Some(cell);
        }
        if let Some(cell) = winning_cell(board, mark.opponent()) {
            debug!(%cell, "Rule: block");
            return Some(cell);
        }
        if board.is_empty(Cell::Center) {
            return Some(Cell::Center);
        }
        let opponent = Square::Occupied(mark.opponent());
        let opposite = Cell::CORNERS.into_iter().find_map(|corner| {
            corner
                .opposite_corner()
                .filter(|opp| board.get(corner) == opponent && board.is_empty(*opp))
        });
        if opposite.is_some() {
            return opposite;
        }
        Cell::CORNERS
            .into_iter()
            .find(|c| board.is_empty(*c))
            .or_else(|| board.empty_cells().into_iter().next())
    }

    fn name(&self) -> &str {
        "rules"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_win_over_block() {
        let mut board = Board::new();
        // X X . / O O . / . . .
        board.set(Cell::TopLeft, Square::Occupied(Mark::Cross));
        board.set(Cell::TopCenter, Square::Occupied(Mark::Cross));
        board.set(Cell::MiddleLeft, Square::Occupied(Mark::Nought));
        board.set(Cell::Center, Square::Occupied(Mark::Nought));
        assert_eq!(RulesPolicy::new().choose(&board, Mark::Nought), Some(Cell::MiddleRight));
    }

    #[test]
    fn test_takes_center_on_empty_board() {
        assert_eq!(RulesPolicy::new().choose(&Board::new(), Mark::Cross), Some(Cell::Center));
    }

    #[test]
    fn test_answers_corner_with_opposite_corner() {
        let mut board = Board::new();
        board.set(Cell::Center, Square::Occupied(Mark::Nought));
        board.set(Cell::TopRight, Square::Occupied(Mark::Cross));
        assert_eq!(RulesPolicy::new().choose(&board, Mark::Nought), Some(Cell::BottomLeft));
    }
}
