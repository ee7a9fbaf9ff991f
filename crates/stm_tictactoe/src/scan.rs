//! Scan images returned by the probe.

use crate::probe::HardwareError;
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Measured quantity of a scan.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ScanChannel {
    /// Topography (tip height).
    #[default]
    Z,
    /// Tunnelling current.
    Current,
}

/// Fast-scan direction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ScanDirection {
    /// Left to right.
    #[default]
    Forward,
    /// Right to left.
    Backward,
}

/// Slow-scan direction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ScanTrace {
    /// Bottom to top.
    #[default]
    Up,
    /// Top to bottom.
    Down,
}

/// Channel, direction and trace a scan was taken with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Getters, new, Serialize, Deserialize)]
pub struct ScanTag {
    channel: ScanChannel,
    direction: ScanDirection,
    trace: ScanTrace,
}

impl std::fmt::Display for ScanTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.channel, self.direction, self.trace)
    }
}

/// One raw scan: a row-major intensity array plus its tag.
///
/// Images are never modified after construction; a new scan replaces the
/// previous one wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanImage {
    width: usize,
    height: usize,
    data: Vec<f64>,
    tag: ScanTag,
}

impl ScanImage {
    /// Wraps raw samples. Fails when `data` does not hold `width * height` samples.
    pub fn new(
        width: usize,
        height: usize,
        data: Vec<f64>,
        tag: ScanTag,
    ) -> Result<Self, HardwareError> {
        if width == 0 || height == 0 || data.len() != width * height {
            return Err(HardwareError::Scan(format!(
                "scan of {}x{} pixels returned {} samples",
                width,
                height,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
            tag,
        })
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Channel, direction and trace.
    pub fn tag(&self) -> ScanTag {
        self.tag
    }

    /// All samples, row-major.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Sample at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        (x < self.width && y < self.height).then(|| self.data[y * self.width + x])
    }

    /// Rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks(self.width)
    }

    /// Smallest and largest finite sample, if any.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
