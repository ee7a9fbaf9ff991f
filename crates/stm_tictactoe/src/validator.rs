//! Surface flatness check on raw scans.

use crate::scan::ScanImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Default RMS roughness (height units) below which a surface counts as flat.
pub const DEFAULT_MAX_ROUGHNESS: f64 = 0.5;

/// Smallest image side that can be judged.
pub const DEFAULT_MIN_SIZE: usize = 8;

/// Whether a surface is fit to draw on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Flat enough.
    Flat,
    /// Too rough, tilted beyond repair, or unreadable.
    NotFlat,
}

/// Verdict plus the roughness it was based on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    /// The verdict.
    pub verdict: Verdict,
    /// RMS residual after plane subtraction; infinite when unmeasurable.
    pub roughness: f64,
}

/// Judges scans by RMS residual after removing the best-fit plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceValidator {
    max_roughness: f64,
    min_size: usize,
}

impl Default for SurfaceValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ROUGHNESS)
    }
}

impl SurfaceValidator {
    /// Creates a validator with the given roughness threshold.
    pub fn new(max_roughness: f64) -> Self {
        Self {
            max_roughness,
            min_size: DEFAULT_MIN_SIZE,
        }
    }

    /// Overrides the minimum image side.
    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    /// Roughness threshold.
    pub fn max_roughness(&self) -> f64 {
        self.max_roughness
    }

    /// Classifies a scan. Pure.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn validate(&self, image: &ScanImage) -> Validation {
        let roughness = self.roughness(image);
        let verdict = if roughness.is_finite() && roughness <= self.max_roughness {
            Verdict::Flat
        } else {
            Verdict::NotFlat
        };
        debug!(roughness, max = self.max_roughness, %verdict, "Surface validated");
        Validation { verdict, roughness }
    }

    /// RMS residual after least-squares plane subtraction.
    ///
    /// Infinite for images that are too small or hold non-finite samples.
    pub fn roughness(&self, image: &ScanImage) -> f64 {
        let (w, h) = (image.width(), image.height());
        if w < self.min_size || h < self.min_size || image.data().iter().any(|v| !v.is_finite()) {
            return f64::INFINITY;
        }

        // Centered coordinates make the plane's x and y terms independent.
        let cx = (w as f64 - 1.0) / 2.0;
        let cy = (h as f64 - 1.0) / 2.0;
        let n = (w * h) as f64;

        let mut sum_z = 0.0;
        let mut sum_xz = 0.0;
        let mut sum_yz = 0.0;
        let mut sum_xx = 0.0;
        let mut sum_yy = 0.0;
        for (y, row) in image.rows().enumerate() {
            let dy = y as f64 - cy;
            for (x, z) in row.iter().enumerate() {
                let dx = x as f64 - cx;
                sum_z += z;
                sum_xz += dx * z;
                sum_yz += dy * z;
                sum_xx += dx * dx;
                sum_yy += dy * dy;
            }
        }
        let mean = sum_z / n;
        let slope_x = sum_xz / sum_xx;
        let slope_y = sum_yz / sum_yy;

        let mut sum_sq = 0.0;
        for (y, row) in image.rows().enumerate() {
            let dy = y as f64 - cy;
            for (x, z) in row.iter().enumerate() {
                let fit = mean + slope_x * (x as f64 - cx) + slope_y * dy;
                sum_sq += (z - fit).powi(2);
            }
        }
        (sum_sq / n).sqrt()
    }
}
