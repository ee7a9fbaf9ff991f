//! Phase-specific typestate structs for tic-tac-toe.
//!
//! Each phase is its own type. A finished game always carries its
//! [`Finish`], never an `Option`.

use super::action::{Move, MoveError};
use super::contracts::LegalMove;
use super::rules;
use super::{Board, Cell, Mark, Square};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

// ─────────────────────────────────────────────────────────────
//  Setup Phase
// ─────────────────────────────────────────────────────────────

/// Game in setup phase: the board is empty and nobody has moved.
#[derive(Debug, Clone, Default)]
pub struct GameSetup {
    board: Board,
}

impl GameSetup {
    /// Creates a new game in setup phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Starts the game with the given mark to move first.
    #[instrument(skip(self))]
    pub fn start(self, first: Mark) -> GameInProgress {
        GameInProgress {
            board: self.board,
            history: Vec::new(),
            to_move: first,
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  InProgress Phase
// ─────────────────────────────────────────────────────────────

/// Game in progress - can accept moves.
#[derive(Debug, Clone)]
pub struct GameInProgress {
    board: Board,
    history: Vec<Move>,
    to_move: Mark,
}

impl GameInProgress {
    /// Makes a move, consuming self and transitioning to the next phase.
    ///
    /// Preconditions are checked by [`LegalMove`] before anything changes.
    #[instrument(skip(self))]
    pub fn make_move(self, action: Move) -> Result<GameResult, MoveError> {
        LegalMove::check(&action, &self)?;

        let mut game = self;
        game.board.set(action.cell, Square::Occupied(action.mark));
        game.history.push(action);
        debug_assert!(game.history.len() == game.board.filled());

        if let Some(winner) = rules::check_winner(&game.board) {
            debug!(%winner, "Line completed");
            return Ok(GameResult::Finished(GameFinished {
                board: game.board,
                history: game.history,
                finish: Finish::Winner(winner),
            }));
        }

        if rules::is_draw(&game.board) {
            debug!("Board full without a line");
            return Ok(GameResult::Finished(GameFinished {
                board: game.board,
                history: game.history,
                finish: Finish::Draw,
            }));
        }

        game.to_move = game.to_move.opponent();
        Ok(GameResult::InProgress(game))
    }

    /// Returns the mark to move.
    pub fn to_move(&self) -> Mark {
        self.to_move
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns move history.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Returns the empty cells.
    pub fn valid_moves(&self) -> Vec<Cell> {
        self.board.empty_cells()
    }
}

// ─────────────────────────────────────────────────────────────
//  Finished Phase
// ─────────────────────────────────────────────────────────────

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Finish {
    /// A mark completed a line.
    Winner(Mark),
    /// Board full, no line.
    Draw,
}

impl std::fmt::Display for Finish {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Finish::Winner(mark) => write!(f, "{mark} wins"),
            Finish::Draw => write!(f, "Draw"),
        }
    }
}

/// Game finished - finish determined.
#[derive(Debug, Clone)]
pub struct GameFinished {
    board: Board,
    history: Vec<Move>,
    finish: Finish,
}

impl GameFinished {
    /// Returns how the game ended.
    pub fn finish(&self) -> Finish {
        self.finish
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns move history.
    pub fn history(&self) -> &[Move] {
        &self.history
    }
}

// ─────────────────────────────────────────────────────────────
//  Result Type
// ─────────────────────────────────────────────────────────────

/// Result of making a move.
#[derive(Debug)]
pub enum GameResult {
    /// Game continues.
    InProgress(GameInProgress),
    /// Game finished.
    Finished(GameFinished),
}
