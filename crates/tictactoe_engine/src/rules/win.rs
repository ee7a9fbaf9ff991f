//! Win detection logic for tic-tac-toe.

use crate::{Board, Cell, Mark, Square};
use tracing::instrument;

/// The eight winning lines: rows, columns, diagonals.
pub const LINES: [[Cell; 3]; 8] = [
    // Rows
    [Cell::TopLeft, Cell::TopCenter, Cell::TopRight],
    [Cell::MiddleLeft, Cell::Center, Cell::MiddleRight],
    [Cell::BottomLeft, Cell::BottomCenter, Cell::BottomRight],
    // Columns
    [Cell::TopLeft, Cell::MiddleLeft, Cell::BottomLeft],
    [Cell::TopCenter, Cell::Center, Cell::BottomCenter],
    [Cell::TopRight, Cell::MiddleRight, Cell::BottomRight],
    // Diagonals
    [Cell::TopLeft, Cell::Center, Cell::BottomRight],
    [Cell::TopRight, Cell::Center, Cell::BottomLeft],
];

/// Checks if there is a winner on the board.
///
/// Returns `Some(mark)` if the mark has three in a row,
/// `None` otherwise.
#[instrument(skip(board))]
pub fn check_winner(board: &Board) -> Option<Mark> {
    for [a, b, c] in LINES {
        let sq = board.get(a);
        if let Square::Occupied(mark) = sq
            && sq == board.get(b)
            && sq == board.get(c)
        {
            return Some(mark);
        }
    }

    None
}

/// Returns a cell that would complete a line for `mark`, if any.
///
/// Lines are scanned in [`LINES`] order so the answer is deterministic.
pub fn winning_cell(board: &Board, mark: Mark) -> Option<Cell> {
    LINES.iter().find_map(|line| {
        let own = line
            .iter()
            .filter(|c| board.get(**c) == Square::Occupied(mark))
            .count();
        let empty: Vec<Cell> = line.iter().copied().filter(|c| board.is_empty(*c)).collect();
        (own == 2 && empty.len() == 1).then(|| empty[0])
    })
}
