//! Session error taxonomy.

use crate::config::ConfigError;
use crate::input::InputError;
use crate::mapper::OutOfBoundsError;
use crate::probe::HardwareError;
use crate::session::SessionState;
use derive_more::{Display, Error, From};
use tictactoe_engine::EngineError;

/// Everything that ends a session.
///
/// Rejected human input is not here: the controller re-prompts on an
/// [`InputRejection`](crate::InputRejection) and the session goes on.
#[derive(Debug, Display, Error, From)]
pub enum SessionError {
    /// Bad session parameters.
    #[display("{_0}")]
    Configuration(ConfigError),

    /// The instrument failed.
    #[display("hardware error: {_0}")]
    Hardware(HardwareError),

    /// Every calibration attempt found a rough surface.
    #[display("no flat surface found after {attempts} calibration attempts")]
    #[from(ignore)]
    SurfaceNotFlat {
        /// Attempts made.
        attempts: u32,
    },

    /// A draw target left the scan frame.
    #[display("{_0}")]
    OutOfBounds(OutOfBoundsError),

    /// The game engine refused a move or produced none.
    #[display("engine error: {_0}")]
    Engine(EngineError),

    /// The human input source closed.
    #[display("{_0}")]
    Input(InputError),

    /// An operation was requested after the session ended.
    #[display("session already ended in state {_0}")]
    #[from(ignore)]
    Terminated(#[error(not(source))] SessionState),

    /// A physical action was attempted in a state that forbids it.
    #[display("{action} is not permitted in state {state}")]
    #[from(ignore)]
    IllegalPhysicalAction {
        /// What was attempted.
        action: &'static str,
        /// State at the time.
        state: SessionState,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use tictactoe_engine::{Cell, MoveError};

    #[test]
    fn test_source_chain() {
        let err = SessionError::from(HardwareError::NoContact("tip".into()));
        assert_eq!(err.to_string(), "hardware error: auto-approach made no contact: tip");
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "auto-approach made no contact: tip");
        assert!(source.source().is_none());
    }

    #[test]
    fn test_engine_errors_chain_to_the_move() {
        let err = SessionError::from(EngineError::from(MoveError::CellOccupied(Cell::Center)));
        assert!(matches!(err, SessionError::Engine(EngineError::Move(_))));
        let cause = err.source().and_then(|e| e.source()).unwrap();
        assert_eq!(cause.to_string(), "Cell Center (4) is already occupied");
    }

    #[test]
    fn test_state_errors_have_no_source() {
        assert!(SessionError::Terminated(SessionState::Failed).source().is_none());
        assert!(SessionError::SurfaceNotFlat { attempts: 3 }.source().is_none());
    }
}
