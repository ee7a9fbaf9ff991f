//! Core domain types for tic-tac-toe.

use super::cell::Cell;
use serde::{Deserialize, Serialize};

/// Mark placed on the board.
///
/// Seat one always plays crosses, seat two noughts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    /// Cross (X).
    Cross,
    /// Nought (O).
    Nought,
}

impl Mark {
    /// Returns the opposing mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::Cross => Mark::Nought,
            Mark::Nought => Mark::Cross,
        }
    }

    /// Single-character symbol used in board displays.
    pub fn symbol(self) -> char {
        match self {
            Mark::Cross => 'X',
            Mark::Nought => 'O',
        }
    }
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A square on the tic-tac-toe board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Square {
    /// Empty square.
    #[default]
    Empty,
    /// Square occupied by a mark.
    Occupied(Mark),
}

/// 3x3 tic-tac-toe board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Board {
    /// Squares in row-major order (0-8).
    squares: [Square; 9],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the square at the given cell.
    pub fn get(&self, cell: Cell) -> Square {
        self.squares[cell.index()]
    }

    /// Sets the square at the given cell.
    pub fn set(&mut self, cell: Cell, square: Square) {
        self.squares[cell.index()] = square;
    }

    /// Checks if a cell is empty.
    pub fn is_empty(&self, cell: Cell) -> bool {
        self.get(cell) == Square::Empty
    }

    /// Returns all squares as a slice.
    pub fn squares(&self) -> &[Square; 9] {
        &self.squares
    }

    /// Returns the empty cells in row-major order.
    pub fn empty_cells(&self) -> Vec<Cell> {
        Cell::ALL.into_iter().filter(|c| self.is_empty(*c)).collect()
    }

    /// Number of squares carrying the given mark.
    pub fn count(&self, mark: Mark) -> usize {
        self.squares
            .iter()
            .filter(|s| **s == Square::Occupied(mark))
            .count()
    }

    /// Number of occupied squares.
    pub fn filled(&self) -> usize {
        self.squares.iter().filter(|s| **s != Square::Empty).count()
    }

    /// Compact nine-character key (`X`, `O`, `.`), row-major.
    pub fn key(&self) -> String {
        self.squares
            .iter()
            .map(|s| match s {
                Square::Empty => '.',
                Square::Occupied(mark) => mark.symbol(),
            })
            .collect()
    }

    /// Formats the board as a human-readable string.
    ///
    /// Empty squares show their cell number (1-9).
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let pos = row * 3 + col;
                let symbol = match self.squares[pos] {
                    Square::Empty => char::from(b'1' + pos as u8),
                    Square::Occupied(mark) => mark.symbol(),
                };
                result.push(symbol);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_tracks_marks() {
        let mut board = Board::new();
        board.set(Cell::TopLeft, Square::Occupied(Mark::Cross));
        board.set(Cell::Center, Square::Occupied(Mark::Nought));
        assert_eq!(board.key(), "X...O....");
        assert_eq!(board.filled(), 2);
        assert_eq!(board.count(Mark::Cross), 1);
    }

    #[test]
    fn test_display_numbers_empty_squares() {
        let mut board = Board::new();
        board.set(Cell::BottomRight, Square::Occupied(Mark::Cross));
        assert_eq!(board.display(), "1|2|3\n-+-+-\n4|5|6\n-+-+-\n7|8|X");
    }

    #[test]
    fn test_empty_cells_skips_occupied() {
        let mut board = Board::new();
        board.set(Cell::Center, Square::Occupied(Mark::Nought));
        let empty = board.empty_cells();
        assert_eq!(empty.len(), 8);
        assert!(!empty.contains(&Cell::Center));
    }
}
