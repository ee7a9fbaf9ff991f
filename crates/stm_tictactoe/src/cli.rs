//! Command-line interface for stm_tictactoe.

use clap::Parser;
use std::path::PathBuf;
use stm_tictactoe::SessionConfig;
use tracing::info;

/// STM Tic-Tac-Toe - play noughts and crosses with a scanning-probe microscope
#[derive(Parser, Debug)]
#[command(name = "stm_tictactoe")]
#[command(about = "Play tic-tac-toe on a sample surface with an STM tip", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML session config (defaults are used if it does not exist)
    #[arg(short, long, default_value = "stm_tictactoe.toml")]
    pub config: PathBuf,

    /// Scan voltage bias (volts)
    #[arg(long, allow_negative_numbers = true)]
    pub scan_bias: Option<f64>,

    /// Scan setpoint current (amperes)
    #[arg(long)]
    pub scan_setpoint: Option<f64>,

    /// Setpoint current used while drawing (amperes)
    #[arg(long)]
    pub passivate_setpoint: Option<f64>,

    /// Player 1: human, best, mostly_best, random, rules or <model>.zip/.json
    #[arg(long = "player-1")]
    pub player_1: Option<String>,

    /// Player 2: human, best, mostly_best, random, rules or <model>.zip/.json
    #[arg(long = "player-2")]
    pub player_2: Option<String>,

    /// Who goes first: player_1, player_2 or random
    #[arg(long)]
    pub first_player: Option<String>,

    /// How to render the game: plot, print or none
    #[arg(long)]
    pub render_mode: Option<String>,

    /// Seed for all session randomness
    #[arg(long)]
    pub seed: Option<u64>,

    /// Calibration attempts before giving up on the surface
    #[arg(long)]
    pub retry_budget: Option<u32>,

    /// Coarse steps per calibration
    #[arg(long)]
    pub coarse_moves: Option<usize>,

    /// Simulator only: number of initial approaches that land on rough surface
    #[arg(long, default_value_t = 0)]
    pub rough_spots: usize,
}

impl Cli {
    /// Applies command-line overrides on top of a loaded config.
    pub fn apply(&self, mut config: SessionConfig) -> SessionConfig {
        if let Some(v) = self.scan_bias {
            config = config.with_scan_bias(v);
        }
        if let Some(v) = self.scan_setpoint {
            config = config.with_scan_setpoint(v);
        }
        if let Some(v) = self.passivate_setpoint {
            config = config.with_passivate_setpoint(v);
        }
        if let Some(v) = &self.player_1 {
            info!(player = %v, "Overriding player 1");
            config = config.with_player_1_type(v.as_str());
        }
        if let Some(v) = &self.player_2 {
            info!(player = %v, "Overriding player 2");
            config = config.with_player_2_type(v.as_str());
        }
        if let Some(v) = &self.first_player {
            config = config.with_first_player(v.as_str());
        }
        if let Some(v) = &self.render_mode {
            config = config.with_render_mode(v.as_str());
        }
        if let Some(v) = self.seed {
            config = config.with_seed(v);
        }
        if let Some(v) = self.retry_budget {
            config = config.with_retry_budget(v);
        }
        if let Some(v) = self.coarse_moves {
            config = config.with_num_coarse_moves_on_reset(v);
        }
        config
    }
}
