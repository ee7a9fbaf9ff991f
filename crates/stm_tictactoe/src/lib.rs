//! STM tic-tac-toe.
//!
//! Plays tic-tac-toe on a sample surface with a scanning-probe microscope.
//! The [`SessionController`] calibrates the probe on a fresh patch of
//! surface, checks that the patch is flat, draws the board, then alternates
//! the two players, drawing each move with the tip and re-scanning after
//! every draw.
//!
//! - **Instrument**: [`SurfaceProbe`] and the in-memory [`SimulatedProbe`]
//! - **Geometry**: [`CoordinateMapper`], [`DataShape`], [`DrawPath`]
//! - **Surface check**: [`SurfaceValidator`]
//! - **Human input**: [`MoveInputAdapter`], [`HumanInput`]
//! - **Display**: [`Renderer`] and the text renderers
//! - **Session**: [`SessionConfig`], [`SessionController`], [`SessionError`]
//!
//! # Example
//!
//! ```
//! use stm_tictactoe::{
//!     NullRenderer, ScriptedInput, SessionConfig, SessionController, SimulatedProbe,
//!     SimulatorSettings,
//! };
//!
//! let config = SessionConfig::default()
//!     .with_player_1_type("rules")
//!     .with_player_2_type("best")
//!     .with_seed(7u64)
//!     .with_frame_size(96usize)
//!     .with_grid_size(72.0);
//! let probe = SimulatedProbe::new(SimulatorSettings::default().with_frame_size(96).with_seed(7));
//! let mut session = SessionController::new(
//!     config,
//!     probe,
//!     Box::new(NullRenderer),
//!     Box::new(ScriptedInput::default()),
//! )?;
//! let outcome = session.run()?;
//! assert!(outcome.is_final());
//! # Ok::<(), stm_tictactoe::SessionError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod input;
mod mapper;
mod probe;
mod render;
mod scan;
mod session;
mod shapes;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
mod validator;

pub use config::{ConfigError, ResolvedPlayers, SessionConfig};
pub use error::SessionError;
pub use input::{
    HumanInput, InputError, InputRejection, Interaction, MoveInputAdapter, ScriptedInput,
    StdinInput,
};
pub use mapper::{
    CoordinateMapper, NOUGHT_SEGMENTS, OutOfBoundsError, PixelRegion, SHAPE_FILL, TIE_EPSILON,
    Unresolved,
};
pub use probe::{
    CoarseDirection, HardwareError, LithoParameters, ScanParameters, SimulatedProbe,
    SimulatorSettings, SurfaceProbe,
};
pub use render::{
    NullRenderer, PLOT_COLUMNS, PlotRenderer, PrintRenderer, RenderMode, Renderer, build_renderer,
};
pub use scan::{ScanChannel, ScanDirection, ScanImage, ScanTag, ScanTrace};
pub use session::{RetryBudget, SessionController, SessionEvent, SessionState};
pub use shapes::{DataShape, DrawPath, Point};
pub use validator::{
    DEFAULT_MAX_ROUGHNESS, DEFAULT_MIN_SIZE, SurfaceValidator, Validation, Verdict,
};
