//! Session lifecycle: calibration, validation, turn-taking and drawing.

mod controller;
mod state;

pub use controller::SessionController;
pub use state::{RetryBudget, SessionEvent, SessionState};
