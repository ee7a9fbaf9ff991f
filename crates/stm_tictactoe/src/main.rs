//! STM Tic-Tac-Toe - command-line session runner.
//!
//! Runs one game against the simulated probe.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use stm_tictactoe::{
    SessionConfig, SessionController, SimulatedProbe, SimulatorSettings, StdinInput, build_renderer,
};
use tracing::{info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    initialize_tracing();

    let config = load_session_config(&cli)?;
    let resolved = config.validate()?;

    let mut settings = SimulatorSettings::default()
        .with_frame_size(*config.frame_size())
        .with_rough_approaches(cli.rough_spots);
    if let Some(seed) = config.seed() {
        settings = settings.with_seed(*seed);
    }
    let probe = SimulatedProbe::new(settings);

    let renderer = build_renderer(resolved.render_mode, std::io::stdout());
    let input = StdinInput::new(std::io::stdin().lock(), std::io::stdout());

    let mut session = SessionController::new(config, probe, renderer, Box::new(input))?;
    let outcome = session.run()?;

    info!(%outcome, "Session complete");
    println!("Game over: {outcome}");
    Ok(())
}

/// Loads the config file if present and applies command-line overrides.
#[instrument(skip_all, fields(config_path = %cli.config.display()))]
fn load_session_config(cli: &Cli) -> Result<SessionConfig> {
    info!("Loading session configuration");

    let config = if cli.config.exists() {
        SessionConfig::from_file(&cli.config)?
    } else {
        info!(
            "Config file not found at {}, using defaults",
            cli.config.display()
        );
        SessionConfig::default()
    };

    Ok(cli.apply(config))
}

/// Logs go to stderr so they do not interleave with the board display.
fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,stm_tictactoe=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Tracing initialized");
}
