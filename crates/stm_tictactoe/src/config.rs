//! Session configuration.

use crate::render::RenderMode;
use crate::scan::{ScanChannel, ScanDirection, ScanTrace};
use crate::validator::DEFAULT_MAX_ROUGHNESS;
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tictactoe_engine::{FirstPlayer, PlayerSpec};
use tracing::{debug, info, instrument};

/// Everything needed to construct a session.
///
/// Player, first-player and render-mode strings stay unparsed until the
/// session starts so a bad value fails at construction time.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct SessionConfig {
    /// Imaging bias (volts).
    scan_bias: f64,

    /// Imaging current setpoint (amperes).
    scan_setpoint: f64,

    /// Current setpoint while drawing (amperes).
    passivate_setpoint: f64,

    /// Player one: human, best, mostly_best, random, rules or a model file.
    #[setters(into)]
    player_1_type: String,

    /// Player two, same choices as player one.
    #[setters(into)]
    player_2_type: String,

    /// Who opens: player_1, player_2 or random.
    #[setters(into)]
    first_player: String,

    /// plot, print or none.
    #[setters(into)]
    render_mode: String,

    /// Coarse steps taken in one random direction on every calibration.
    num_coarse_moves_on_reset: usize,

    /// Calibration attempts allowed before giving up on the surface.
    retry_budget: u32,

    /// Seed for coarse-direction, first-player and agent randomness.
    #[setters(strip_option)]
    seed: Option<u64>,

    /// Simulated frame side in pixels.
    frame_size: usize,

    /// Board side in pixels.
    grid_size: f64,

    /// RMS roughness above which a surface is rejected.
    max_roughness: f64,

    /// Channel scanned for validation and display.
    scan_channel: ScanChannel,

    /// Fast-scan direction.
    scan_direction: ScanDirection,

    /// Slow-scan direction.
    scan_trace: ScanTrace,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scan_bias: -2.0,
            scan_setpoint: 50e-12,
            passivate_setpoint: 3e-9,
            player_1_type: "human".to_string(),
            player_2_type: "best".to_string(),
            first_player: "player_1".to_string(),
            render_mode: "plot".to_string(),
            num_coarse_moves_on_reset: 2,
            retry_budget: 3,
            seed: None,
            frame_size: 512,
            grid_size: 384.0,
            max_roughness: DEFAULT_MAX_ROUGHNESS,
            scan_channel: ScanChannel::Z,
            scan_direction: ScanDirection::Forward,
            scan_trace: ScanTrace::Up,
        }
    }
}

/// Parsed player setup.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlayers {
    /// Players one and two.
    pub players: [PlayerSpec; 2],
    /// Who opens, before any coin flip.
    pub first: FirstPlayer,
    /// Display mode.
    pub render_mode: RenderMode,
}

impl SessionConfig {
    /// Creates the default configuration with the three instrument settings.
    #[instrument]
    pub fn new(scan_bias: f64, scan_setpoint: f64, passivate_setpoint: f64) -> Self {
        Self {
            scan_bias,
            scan_setpoint,
            passivate_setpoint,
            ..Self::default()
        }
    }

    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(
            player_1 = %config.player_1_type,
            player_2 = %config.player_2_type,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Parses the player, first-player and render-mode strings.
    #[instrument(skip(self))]
    pub fn resolve(&self) -> Result<ResolvedPlayers, ConfigError> {
        let player_1: PlayerSpec = self
            .player_1_type
            .parse()
            .map_err(|e| ConfigError::new(format!("player_1_type: {}", e)))?;
        let player_2: PlayerSpec = self
            .player_2_type
            .parse()
            .map_err(|e| ConfigError::new(format!("player_2_type: {}", e)))?;
        let first: FirstPlayer = self
            .first_player
            .parse()
            .map_err(|e| ConfigError::new(format!("first_player: {}", e)))?;
        let render_mode: RenderMode = self.render_mode.parse().map_err(|_| {
            ConfigError::new(format!(
                "render_mode: unrecognized '{}' (expected plot, print or none)",
                self.render_mode
            ))
        })?;
        Ok(ResolvedPlayers {
            players: [player_1, player_2],
            first,
            render_mode,
        })
    }

    /// Checks every value and returns the parsed player setup.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<ResolvedPlayers, ConfigError> {
        if !self.scan_bias.is_finite() {
            return Err(ConfigError::new("scan_bias must be a finite voltage".to_string()));
        }
        for (name, value) in [
            ("scan_setpoint", self.scan_setpoint),
            ("passivate_setpoint", self.passivate_setpoint),
            ("grid_size", self.grid_size),
            ("max_roughness", self.max_roughness),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::new(format!("{} must be positive, got {}", name, value)));
            }
        }
        if self.retry_budget == 0 {
            return Err(ConfigError::new(
                "retry_budget must allow at least one attempt".to_string(),
            ));
        }
        if self.frame_size == 0 || self.grid_size > self.frame_size as f64 {
            return Err(ConfigError::new(format!(
                "grid_size {} does not fit a {} pixel frame",
                self.grid_size, self.frame_size
            )));
        }
        self.resolve()
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
