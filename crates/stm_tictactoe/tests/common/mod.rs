//! Shared setup for session tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use stm_tictactoe::testing::{AuditingEngine, EngineAudit, ProbeCall, RecordingProbe};
use stm_tictactoe::{
    HumanInput, NullRenderer, SessionConfig, SessionController, SessionEvent, SessionState,
    SimulatedProbe, SimulatorSettings,
};
use tictactoe_engine::TicTacToeEngine;
use tracing_subscriber::EnvFilter;

/// Frame small enough to keep scans quick.
pub const FRAME: usize = 96;

/// Board side on that frame: regions of 24 pixels, centers at 24, 48 and 72.
pub const GRID: f64 = 72.0;

pub type TestSession = SessionController<RecordingProbe<SimulatedProbe>>;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn config(player_1: &str, player_2: &str, first: &str, seed: u64) -> SessionConfig {
    SessionConfig::default()
        .with_player_1_type(player_1)
        .with_player_2_type(player_2)
        .with_first_player(first)
        .with_render_mode("none")
        .with_seed(seed)
        .with_frame_size(FRAME)
        .with_grid_size(GRID)
}

pub fn probe(rough_approaches: usize, seed: u64) -> RecordingProbe<SimulatedProbe> {
    RecordingProbe::new(SimulatedProbe::new(
        SimulatorSettings::default()
            .with_frame_size(FRAME)
            .with_rough_approaches(rough_approaches)
            .with_seed(seed),
    ))
}

/// Builds a session whose engine logs every query and move.
pub fn audited_session(
    config: SessionConfig,
    probe: RecordingProbe<SimulatedProbe>,
    input: impl HumanInput + 'static,
) -> (TestSession, Rc<RefCell<EngineAudit>>) {
    init_tracing();
    let mut handle = None;
    let session = SessionController::with_engine(
        config,
        probe,
        Box::new(NullRenderer),
        Box::new(input),
        |players, first, seed| {
            let (engine, audit) = AuditingEngine::new(TicTacToeEngine::new(players, first, seed)?);
            handle = Some(audit);
            Ok(Box::new(engine))
        },
    )
    .expect("session should start");
    (session, handle.expect("engine was built"))
}

/// Steps until `target` is reached, failing after `limit` steps.
pub fn step_until(session: &mut TestSession, target: SessionState, limit: usize) {
    for _ in 0..limit {
        if session.state() == target {
            return;
        }
        session.step().expect("step should succeed");
    }
    assert_eq!(session.state(), target, "state not reached within {limit} steps");
}

/// Pairs each event with the session state in force when it was recorded.
pub fn events_with_state(events: &[SessionEvent]) -> Vec<(SessionState, SessionEvent)> {
    let mut state = SessionState::Initializing;
    events
        .iter()
        .map(|event| {
            if let SessionEvent::StateChanged { to, .. } = event {
                state = *to;
            }
            (state, event.clone())
        })
        .collect()
}

/// Probe calls that draw or scan, in order.
pub fn draw_scan_sequence(calls: &[ProbeCall]) -> Vec<&ProbeCall> {
    calls
        .iter()
        .filter(|c| matches!(c, ProbeCall::Scan | ProbeCall::Lithograph(_)))
        .collect()
}
