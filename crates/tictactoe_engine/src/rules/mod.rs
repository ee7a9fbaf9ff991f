//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`](crate::Board), separated from board
//! storage so policies and the typestate game share them.

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::{LINES, check_winner, winning_cell};
