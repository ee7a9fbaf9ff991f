//! Session states, the calibration retry budget and the audit log.

use crate::probe::CoarseDirection;
use crate::shapes::DataShape;
use crate::validator::Validation;
use serde::{Deserialize, Serialize};
use strum::Display;
use tictactoe_engine::{Cell, Outcome, Seat};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum SessionState {
    /// Connecting and building the game.
    Initializing,
    /// Retracting, moving the stage and approaching.
    Calibrating,
    /// Checking the freshly approached surface.
    Validating,
    /// Board drawn; display not yet bound.
    Ready,
    /// Waiting for the player holding the turn.
    AwaitingMove,
    /// Drawing and committing a chosen move.
    ApplyingMove,
    /// The game ended normally.
    GameOver,
    /// A fatal error ended the session.
    Failed,
}

impl SessionState {
    /// True for `GameOver` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::GameOver | SessionState::Failed)
    }
}

/// Calibration attempts left before the surface is given up on.
///
/// Every attempt counts, the first included: a budget of three allows three
/// scans of freshly approached surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryBudget {
    initial: u32,
    remaining: u32,
}

impl RetryBudget {
    /// A full budget.
    pub fn new(attempts: u32) -> Self {
        Self {
            initial: attempts,
            remaining: attempts,
        }
    }

    /// Budget the session started with.
    pub fn initial(&self) -> u32 {
        self.initial
    }

    /// Attempts left.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Attempts spent.
    pub fn used(&self) -> u32 {
        self.initial - self.remaining
    }

    /// Spends one attempt. Returns `false` once nothing is left.
    pub fn consume(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining > 0
    }

    /// True when no attempts remain.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// One entry in a session's audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// The state machine moved.
    StateChanged {
        /// Previous state.
        from: SessionState,
        /// New state.
        to: SessionState,
    },
    /// The tip was withdrawn.
    Retracted,
    /// The stage made one coarse step.
    CoarseMoved(CoarseDirection),
    /// The tip reached the surface.
    Approached,
    /// A frame was acquired.
    Scanned,
    /// A calibration scan was judged.
    Validated(Validation),
    /// A shape was drawn, in a cell unless it was the board.
    Drew {
        /// What was drawn.
        shape: DataShape,
        /// Target cell.
        cell: Option<Cell>,
    },
    /// A human gesture was refused.
    Rejected(String),
    /// The engine accepted a move.
    MoveCommitted {
        /// Who moved.
        seat: Seat,
        /// Where.
        cell: Cell,
        /// What the move led to.
        outcome: Outcome,
    },
    /// The probe was released.
    Disconnected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_exhausts_at_zero() {
        let mut budget = RetryBudget::new(3);
        assert!(budget.consume());
        assert!(budget.consume());
        assert!(!budget.consume());
        assert!(budget.is_exhausted());
        assert_eq!(budget.used(), 3);
        assert!(!budget.consume());
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_terminal_states() {
        assert!(SessionState::GameOver.is_terminal());
        assert!(SessionState::Failed.is_terminal());
        assert!(!SessionState::Validating.is_terminal());
        assert_eq!(SessionState::AwaitingMove.to_string(), "AwaitingMove");
    }
}
