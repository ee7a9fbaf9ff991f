//! The instrument seam: everything the session asks of the microscope.

mod simulated;

pub use simulated::{SimulatedProbe, SimulatorSettings};

use crate::scan::{ScanChannel, ScanDirection, ScanImage, ScanTrace};
use crate::shapes::DrawPath;
use derive_more::{Display, Error};
use derive_new::new;
use serde::{Deserialize, Serialize};

/// Direction of a coarse (stepper) move of the sample stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CoarseDirection {
    /// Stage toward negative x.
    XMinus,
    /// Stage toward positive x.
    XPlus,
    /// Stage toward negative y.
    YMinus,
    /// Stage toward positive y.
    YPlus,
}

impl CoarseDirection {
    /// All four directions.
    pub const ALL: [CoarseDirection; 4] = [
        CoarseDirection::XMinus,
        CoarseDirection::XPlus,
        CoarseDirection::YMinus,
        CoarseDirection::YPlus,
    ];

    /// Unit stage offset for one step.
    pub fn delta(self) -> (i32, i32) {
        match self {
            CoarseDirection::XMinus => (-1, 0),
            CoarseDirection::XPlus => (1, 0),
            CoarseDirection::YMinus => (0, -1),
            CoarseDirection::YPlus => (0, 1),
        }
    }
}

/// Imaging bias and setpoint.
#[derive(Debug, Clone, Copy, PartialEq, new, Serialize, Deserialize)]
pub struct ScanParameters {
    /// Sample bias in volts.
    pub bias: f64,
    /// Current setpoint in amperes.
    pub setpoint: f64,
}

/// Tip conditions while drawing.
#[derive(Debug, Clone, Copy, PartialEq, new, Serialize, Deserialize)]
pub struct LithoParameters {
    /// Sample bias in volts.
    pub bias: f64,
    /// Current setpoint in amperes (the passivation setpoint).
    pub setpoint: f64,
}

/// Failures reported by the instrument. All are fatal to a session.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum HardwareError {
    /// The instrument could not be reached.
    #[display("connection failed: {_0}")]
    Connection(#[error(not(source))] String),
    /// Auto-approach found no surface.
    #[display("auto-approach made no contact: {_0}")]
    NoContact(#[error(not(source))] String),
    /// A scan failed or returned malformed data.
    #[display("scan failed: {_0}")]
    Scan(#[error(not(source))] String),
    /// Drawing failed.
    #[display("lithography failed: {_0}")]
    Lithography(#[error(not(source))] String),
    /// The instrument refused an operation that would endanger the tip.
    #[display("refused unsafe operation: {_0}")]
    Unsafe(#[error(not(source))] String),
    /// An operation was issued before `connect`.
    #[display("probe is not connected")]
    NotConnected,
}

/// Operations the session needs from a scanning-probe microscope.
///
/// Calls block until the instrument finishes. Only the session controller
/// calls the mutating operations.
pub trait SurfaceProbe {
    /// Opens the instrument connection. Calling it again is a no-op.
    fn connect(&mut self) -> Result<(), HardwareError>;

    /// True between `connect` and `disconnect`.
    fn is_connected(&self) -> bool;

    /// Releases the instrument. Calling it again is a no-op.
    fn disconnect(&mut self) -> Result<(), HardwareError>;

    /// Applies the imaging bias and setpoint.
    fn set_scan_parameters(&mut self, params: ScanParameters) -> Result<(), HardwareError>;

    /// Withdraws the tip from the surface.
    fn retract(&mut self) -> Result<(), HardwareError>;

    /// Moves the stage one coarse step.
    fn coarse_move(&mut self, direction: CoarseDirection) -> Result<(), HardwareError>;

    /// Brings the tip into tunnelling range. `NoContact` if nothing is found.
    fn auto_approach(&mut self) -> Result<(), HardwareError>;

    /// Acquires one frame.
    fn scan(
        &mut self,
        channel: ScanChannel,
        direction: ScanDirection,
        trace: ScanTrace,
    ) -> Result<ScanImage, HardwareError>;

    /// Traces a path with the tip at the given conditions.
    fn lithograph(&mut self, path: &DrawPath, params: LithoParameters) -> Result<(), HardwareError>;

    /// Frame size in pixels, `(width, height)`.
    fn frame_size(&self) -> (usize, usize);
}

impl<P: SurfaceProbe + ?Sized> SurfaceProbe for Box<P> {
    fn connect(&mut self) -> Result<(), HardwareError> {
        (**self).connect()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn disconnect(&mut self) -> Result<(), HardwareError> {
        (**self).disconnect()
    }

    fn set_scan_parameters(&mut self, params: ScanParameters) -> Result<(), HardwareError> {
        (**self).set_scan_parameters(params)
    }

    fn retract(&mut self) -> Result<(), HardwareError> {
        (**self).retract()
    }

    fn coarse_move(&mut self, direction: CoarseDirection) -> Result<(), HardwareError> {
        (**self).coarse_move(direction)
    }

    fn auto_approach(&mut self) -> Result<(), HardwareError> {
        (**self).auto_approach()
    }

    fn scan(
        &mut self,
        channel: ScanChannel,
        direction: ScanDirection,
        trace: ScanTrace,
    ) -> Result<ScanImage, HardwareError> {
        (**self).scan(channel, direction, trace)
    }

    fn lithograph(
        &mut self,
        path: &DrawPath,
        params: LithoParameters,
    ) -> Result<(), HardwareError> {
        (**self).lithograph(path, params)
    }

    fn frame_size(&self) -> (usize, usize) {
        (**self).frame_size()
    }
}
