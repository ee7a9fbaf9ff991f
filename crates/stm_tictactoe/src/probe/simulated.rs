//! In-memory microscope used when no instrument is attached.
//!
//! The sample is a tilted plane with a little seeded noise. Each coarse
//! stage position has its own patch of surface, and lithography raises the
//! patch along the drawn path so later scans show the marks. The first
//! `rough_approaches` approaches land on a terraced region that fails
//! validation.

use super::{CoarseDirection, HardwareError, LithoParameters, ScanParameters, SurfaceProbe};
use crate::scan::{ScanChannel, ScanDirection, ScanImage, ScanTag, ScanTrace};
use crate::shapes::{DrawPath, Point};
use derive_getters::Getters;
use derive_setters::Setters;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Knobs for the simulated instrument.
#[derive(Debug, Clone, PartialEq, Getters, Setters)]
#[setters(prefix = "with_")]
pub struct SimulatorSettings {
    /// Frame side in pixels.
    frame_size: usize,
    /// Number of initial approaches that land on rough surface.
    rough_approaches: usize,
    /// Every approach fails to find the surface.
    approach_fails: bool,
    /// Peak amplitude of the per-pixel noise.
    noise: f64,
    /// Height added along drawn lines.
    deposit_height: f64,
    /// Half-width of a drawn line in pixels.
    line_half_width: f64,
    /// Seed for the noise generator.
    #[setters(strip_option)]
    seed: Option<u64>,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            frame_size: 512,
            rough_approaches: 0,
            approach_fails: false,
            noise: 0.05,
            deposit_height: 1.0,
            line_half_width: 1.5,
            seed: None,
        }
    }
}

/// Terrace height of the rough region, well above the default threshold.
const TERRACE_STEP: f64 = 4.0;

/// Simulated scanning-probe microscope.
pub struct SimulatedProbe {
    settings: SimulatorSettings,
    rng: StdRng,
    connected: bool,
    engaged: bool,
    on_rough_patch: bool,
    stage: (i32, i32),
    deposits: HashMap<(i32, i32), Vec<f64>>,
    scan_params: Option<ScanParameters>,
    approaches: usize,
    scans: usize,
    draws: usize,
    coarse_moves: usize,
}

impl SimulatedProbe {
    /// Creates a disconnected simulator.
    #[instrument]
    pub fn new(settings: SimulatorSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        info!(
            frame = settings.frame_size,
            rough = settings.rough_approaches,
            "Simulated probe created"
        );
        Self {
            settings,
            rng,
            connected: false,
            engaged: false,
            on_rough_patch: false,
            stage: (0, 0),
            deposits: HashMap::new(),
            scan_params: None,
            approaches: 0,
            scans: 0,
            draws: 0,
            coarse_moves: 0,
        }
    }

    /// Current coarse stage position in steps.
    pub fn stage(&self) -> (i32, i32) {
        self.stage
    }

    /// Completed approaches.
    pub fn approaches(&self) -> usize {
        self.approaches
    }

    /// Completed scans.
    pub fn scans(&self) -> usize {
        self.scans
    }

    /// Completed lithography runs.
    pub fn draws(&self) -> usize {
        self.draws
    }

    /// Completed coarse moves.
    pub fn coarse_moves(&self) -> usize {
        self.coarse_moves
    }

    /// Last applied scan parameters.
    pub fn scan_parameters(&self) -> Option<ScanParameters> {
        self.scan_params
    }

    fn require_connected(&self) -> Result<(), HardwareError> {
        if self.connected {
            Ok(())
        } else {
            Err(HardwareError::NotConnected)
        }
    }

    fn require_engaged(&self, action: &str) -> Result<(), HardwareError> {
        self.require_connected()?;
        if self.engaged {
            Ok(())
        } else {
            Err(HardwareError::Unsafe(format!("{action} requires an approached tip")))
        }
    }

    fn surface_height(&self, x: usize, y: usize) -> f64 {
        let (sx, sy) = self.stage;
        let tilt = 0.002 * x as f64 + 0.001 * y as f64 + 0.05 * sx as f64 - 0.05 * sy as f64;
        let terrace = if self.on_rough_patch {
            let width = (self.settings.frame_size / 4).max(1);
            (x / width) as f64 * TERRACE_STEP
        } else {
            0.0
        };
        tilt + terrace
    }

    fn deposit(&mut self, path: &DrawPath) {
        let size = self.settings.frame_size;
        let half = self.settings.line_half_width;
        let height = self.settings.deposit_height;
        let overlay = self
            .deposits
            .entry(self.stage)
            .or_insert_with(|| vec![0.0; size * size]);

        for stroke in path.strokes() {
            let segments: Vec<(Point, Point)> = if stroke.len() == 1 {
                vec![(stroke[0], stroke[0])]
            } else {
                stroke.windows(2).map(|w| (w[0], w[1])).collect()
            };
            for (a, b) in segments {
                let x0 = (a.x.min(b.x) - half).floor().max(0.0) as usize;
                let x1 = ((a.x.max(b.x) + half).ceil() as usize).min(size - 1);
                let y0 = (a.y.min(b.y) - half).floor().max(0.0) as usize;
                let y1 = ((a.y.max(b.y) + half).ceil() as usize).min(size - 1);
                for y in y0..=y1 {
                    for x in x0..=x1 {
                        let p = Point::new(x as f64, y as f64);
                        if distance_to_segment(p, a, b) <= half {
                            let cell = &mut overlay[y * size + x];
                            *cell = cell.max(height);
                        }
                    }
                }
            }
        }
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

impl SurfaceProbe for SimulatedProbe {
    #[instrument(skip(self))]
    fn connect(&mut self) -> Result<(), HardwareError> {
        if !self.connected {
            self.connected = true;
            info!("Simulated probe connected");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    #[instrument(skip(self))]
    fn disconnect(&mut self) -> Result<(), HardwareError> {
        if self.connected {
            self.engaged = false;
            self.connected = false;
            info!(scans = self.scans, draws = self.draws, "Simulated probe disconnected");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    fn set_scan_parameters(&mut self, params: ScanParameters) -> Result<(), HardwareError> {
        self.require_connected()?;
        self.scan_params = Some(params);
        Ok(())
    }

    #[instrument(skip(self))]
    fn retract(&mut self) -> Result<(), HardwareError> {
        self.require_connected()?;
        self.engaged = false;
        debug!("Tip retracted");
        Ok(())
    }

    #[instrument(skip(self))]
    fn coarse_move(&mut self, direction: CoarseDirection) -> Result<(), HardwareError> {
        self.require_connected()?;
        if self.engaged {
            warn!(%direction, "Coarse move refused with tip engaged");
            return Err(HardwareError::Unsafe(format!(
                "coarse move {direction} with the tip engaged"
            )));
        }
        let (dx, dy) = direction.delta();
        self.stage = (self.stage.0 + dx, self.stage.1 + dy);
        self.coarse_moves += 1;
        debug!(stage = ?self.stage, "Stage moved");
        Ok(())
    }

    #[instrument(skip(self))]
    fn auto_approach(&mut self) -> Result<(), HardwareError> {
        self.require_connected()?;
        if self.settings.approach_fails {
            return Err(HardwareError::NoContact(format!(
                "no surface found at stage {:?}",
                self.stage
            )));
        }
        self.approaches += 1;
        self.on_rough_patch = self.approaches <= self.settings.rough_approaches;
        self.engaged = true;
        debug!(approach = self.approaches, rough = self.on_rough_patch, "Tip approached");
        Ok(())
    }

    #[instrument(skip(self))]
    fn scan(
        &mut self,
        channel: ScanChannel,
        direction: ScanDirection,
        trace: ScanTrace,
    ) -> Result<ScanImage, HardwareError> {
        self.require_engaged("scan")?;
        let size = self.settings.frame_size;
        let noise = self.settings.noise;
        let setpoint = self.scan_params.map(|p| p.setpoint).unwrap_or(1.0);
        let overlay = self.deposits.get(&self.stage);

        let mut data = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                let jitter = if noise > 0.0 { self.rng.random_range(-noise..noise) } else { 0.0 };
                let deposit = overlay.map_or(0.0, |o| o[y * size + x]);
                let height = self.surface_height(x, y) + deposit + jitter;
                data.push(match channel {
                    ScanChannel::Z => height,
                    ScanChannel::Current => setpoint * (1.0 + jitter),
                });
            }
        }
        self.scans += 1;
        debug!(scan = self.scans, "Frame acquired");
        ScanImage::new(size, size, data, ScanTag::new(channel, direction, trace))
    }

    #[instrument(skip(self, path), fields(strokes = path.strokes().len()))]
    fn lithograph(
        &mut self,
        path: &DrawPath,
        params: LithoParameters,
    ) -> Result<(), HardwareError> {
        self.require_engaged("lithography")?;
        let limit = self.settings.frame_size as f64;
        let outside = |p: &Point| !(0.0..=limit).contains(&p.x) || !(0.0..=limit).contains(&p.y);
        if let Some(p) = path.points().find(outside) {
            return Err(HardwareError::Lithography(format!("point {p} outside the frame")));
        }
        self.deposit(path);
        self.draws += 1;
        info!(draw = self.draws, setpoint = params.setpoint, "Path drawn");
        Ok(())
    }

    fn frame_size(&self) -> (usize, usize) {
        (self.settings.frame_size, self.settings.frame_size)
    }
}

impl std::fmt::Debug for SimulatedProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedProbe")
            .field("connected", &self.connected)
            .field("engaged", &self.engaged)
            .field("stage", &self.stage)
            .field("scans", &self.scans)
            .field("draws", &self.draws)
            .finish()
    }
}
