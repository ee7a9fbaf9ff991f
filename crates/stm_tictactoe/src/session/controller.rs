//! The session state machine.

use super::state::{RetryBudget, SessionEvent, SessionState};
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::input::{HumanInput, MoveInputAdapter};
use crate::mapper::CoordinateMapper;
use crate::probe::{CoarseDirection, LithoParameters, ScanParameters, SurfaceProbe};
use crate::render::Renderer;
use crate::scan::ScanImage;
use crate::shapes::{DataShape, DrawPath};
use crate::validator::{SurfaceValidator, Verdict};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tictactoe_engine::{
    Cell, EngineError, GameEngine, MoveError, Outcome, PlayerSpec, Seat, TicTacToeEngine,
};
use tracing::{debug, error, info, instrument, warn};

/// Offset between the session seed and the engine's agent seed.
const ENGINE_SEED_OFFSET: u64 = 0x5eed;

/// Drives one game on the microscope, from calibration to game over.
///
/// The controller owns the probe for its whole life and is the only caller
/// of the probe's mutating operations. Every draw is followed by exactly one
/// scan before the next draw. A finished or failed session cannot be
/// restarted; build a new controller instead.
pub struct SessionController<P: SurfaceProbe> {
    config: SessionConfig,
    probe: P,
    engine: Box<dyn GameEngine>,
    renderer: Box<dyn Renderer>,
    input: Box<dyn HumanInput>,
    validator: SurfaceValidator,
    rng: StdRng,
    state: SessionState,
    budget: Option<RetryBudget>,
    mapper: Option<CoordinateMapper>,
    latest_scan: Option<ScanImage>,
    pending: Option<(Seat, Cell)>,
    outcome: Option<Outcome>,
    rescan_due: bool,
    grid_drawn: bool,
    draws: usize,
    scans: usize,
    events: Vec<SessionEvent>,
}

impl<P: SurfaceProbe> SessionController<P> {
    /// Builds a session with the built-in engine.
    ///
    /// Validates the configuration, resolves who moves first, connects to
    /// the probe and leaves the session in `Calibrating`.
    #[instrument(skip_all)]
    pub fn new(
        config: SessionConfig,
        probe: P,
        renderer: Box<dyn Renderer>,
        input: Box<dyn HumanInput>,
    ) -> Result<Self, SessionError> {
        Self::with_engine(config, probe, renderer, input, |players, first, seed| {
            let engine_seed = seed.map(|s| s.wrapping_add(ENGINE_SEED_OFFSET));
            let engine = TicTacToeEngine::new(players, first, engine_seed)?;
            Ok(Box::new(engine))
        })
    }

    /// Builds a session with a caller-supplied engine.
    ///
    /// `build_engine` receives the parsed players, the resolved first seat
    /// and the session seed.
    #[instrument(skip_all)]
    pub fn with_engine<F>(
        config: SessionConfig,
        mut probe: P,
        renderer: Box<dyn Renderer>,
        input: Box<dyn HumanInput>,
        build_engine: F,
    ) -> Result<Self, SessionError>
    where
        F: FnOnce([PlayerSpec; 2], Seat, Option<u64>) -> Result<Box<dyn GameEngine>, EngineError>,
    {
        let resolved = config
            .validate()
            .inspect_err(|e| error!(error = %e, "Invalid session configuration"))?;

        let mut rng = match config.seed() {
            Some(seed) => StdRng::seed_from_u64(*seed),
            None => StdRng::from_os_rng(),
        };
        let first = resolved.first.resolve(&mut rng);
        let engine = build_engine(resolved.players.clone(), first, *config.seed())?;

        probe.connect()?;
        let params = ScanParameters::new(*config.scan_bias(), *config.scan_setpoint());
        if let Err(e) = probe.set_scan_parameters(params) {
            let _ = probe.disconnect();
            return Err(e.into());
        }
        info!(
            player_1 = %resolved.players[0],
            player_2 = %resolved.players[1],
            %first,
            "Session initialized"
        );

        let mut session = Self {
            validator: SurfaceValidator::new(*config.max_roughness()),
            budget: None,
            config,
            probe,
            engine,
            renderer,
            input,
            rng,
            state: SessionState::Initializing,
            mapper: None,
            latest_scan: None,
            pending: None,
            outcome: None,
            rescan_due: false,
            grid_drawn: false,
            draws: 0,
            scans: 0,
            events: Vec::new(),
        };
        session.budget = Some(RetryBudget::new(*session.config.retry_budget()));
        session.transition(SessionState::Calibrating);
        Ok(session)
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// How the game ended, once it has.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Calibration budget; present only while calibrating or validating.
    pub fn retry_budget(&self) -> Option<RetryBudget> {
        self.budget
    }

    /// Most recent scan.
    pub fn latest_scan(&self) -> Option<&ScanImage> {
        self.latest_scan.as_ref()
    }

    /// Audit log of everything the session did.
    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    /// The game engine.
    pub fn engine(&self) -> &dyn GameEngine {
        self.engine.as_ref()
    }

    /// The probe.
    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// The board placement, once the grid is drawn.
    pub fn mapper(&self) -> Option<&CoordinateMapper> {
        self.mapper.as_ref()
    }

    /// Shapes drawn so far, board grid included.
    pub fn draws(&self) -> usize {
        self.draws
    }

    /// Frames acquired so far, calibration scans included.
    pub fn scans(&self) -> usize {
        self.scans
    }

    /// Plays until the game ends and returns the outcome.
    #[instrument(skip(self))]
    pub fn run(&mut self) -> Result<Outcome, SessionError> {
        loop {
            if self.step()? == SessionState::GameOver {
                return self.outcome.ok_or(SessionError::Terminated(SessionState::GameOver));
            }
        }
    }

    /// Performs the work of the current state and moves to the next one.
    ///
    /// A fatal error moves the session to `Failed` and releases the probe.
    pub fn step(&mut self) -> Result<SessionState, SessionError> {
        let result = match self.state {
            SessionState::Initializing | SessionState::Calibrating => self.calibrate(),
            SessionState::Validating => self.validate_surface(),
            SessionState::Ready => self.bind_display(),
            SessionState::AwaitingMove => self.await_move(),
            SessionState::ApplyingMove => self.apply_move(),
            SessionState::GameOver => return Ok(SessionState::GameOver),
            SessionState::Failed => return Err(SessionError::Terminated(SessionState::Failed)),
        };

        match result {
            Ok(()) => Ok(self.state),
            Err(err) => {
                error!(error = %err, state = %self.state, "Session failed");
                self.transition(SessionState::Failed);
                self.release();
                Err(err)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // States
    // ─────────────────────────────────────────────────────────────

    #[instrument(skip(self))]
    fn calibrate(&mut self) -> Result<(), SessionError> {
        self.require_state("calibration", SessionState::Calibrating)?;
        self.probe.retract()?;
        self.record(SessionEvent::Retracted);

        let direction = CoarseDirection::ALL[self.rng.random_range(0..CoarseDirection::ALL.len())];
        let moves = *self.config.num_coarse_moves_on_reset();
        info!(%direction, moves, "Moving to fresh surface");
        for _ in 0..moves {
            self.probe.coarse_move(direction)?;
            self.record(SessionEvent::CoarseMoved(direction));
        }

        self.probe.auto_approach()?;
        self.record(SessionEvent::Approached);
        self.transition(SessionState::Validating);
        Ok(())
    }

    #[instrument(skip(self))]
    fn validate_surface(&mut self) -> Result<(), SessionError> {
        self.scan()?;
        let validation = match &self.latest_scan {
            Some(image) => self.validator.validate(image),
            None => return Err(SessionError::Terminated(self.state)),
        };
        self.record(SessionEvent::Validated(validation));

        match validation.verdict {
            Verdict::Flat => {
                let (width, height) = self.probe.frame_size();
                let mapper = CoordinateMapper::centered(width, height, *self.config.grid_size())?;
                let path = mapper.shape_path(DataShape::BoardGrid, mapper.grid_origin())?;
                self.mapper = Some(mapper);
                self.draw(DataShape::BoardGrid, &path, None)?;
                self.scan()?;
                self.budget = None;
                self.transition(SessionState::Ready);
                Ok(())
            }
            Verdict::NotFlat => {
                let mut budget = self
                    .budget
                    .unwrap_or_else(|| RetryBudget::new(*self.config.retry_budget()));
                let more = budget.consume();
                if more {
                    warn!(
                        roughness = validation.roughness,
                        remaining = budget.remaining(),
                        "Game area is not viable, retracting and moving"
                    );
                    self.budget = Some(budget);
                    self.transition(SessionState::Calibrating);
                    Ok(())
                } else {
                    self.budget = None;
                    Err(SessionError::SurfaceNotFlat {
                        attempts: budget.used(),
                    })
                }
            }
        }
    }

    #[instrument(skip(self))]
    fn bind_display(&mut self) -> Result<(), SessionError> {
        if let Err(e) = self.renderer.bind() {
            warn!(error = %e, "Display could not be bound");
        }
        self.refresh_display();
        self.transition(SessionState::AwaitingMove);
        Ok(())
    }

    #[instrument(skip(self))]
    fn await_move(&mut self) -> Result<(), SessionError> {
        let Some(seat) = self.engine.current_seat() else {
            return Err(SessionError::Engine(EngineError::Move(MoveError::GameOver)));
        };

        let cell = if self.engine.player(seat).is_human() {
            self.human_move(seat)?
        } else {
            let cell = self.engine.agent_move()?;
            if !self.engine.board().is_empty(cell) {
                return Err(SessionError::Engine(EngineError::Move(MoveError::CellOccupied(cell))));
            }
            cell
        };

        info!(%seat, %cell, "Move chosen");
        self.pending = Some((seat, cell));
        self.transition(SessionState::ApplyingMove);
        Ok(())
    }

    fn human_move(&mut self, seat: Seat) -> Result<Cell, SessionError> {
        let mapper = self.mapper.ok_or(SessionError::Terminated(self.state))?;
        let adapter = MoveInputAdapter::new(mapper);
        loop {
            let interaction = self.input.next_interaction(&self.engine.render())?;
            let Some(image) = self.latest_scan.as_ref() else {
                return Err(SessionError::Terminated(self.state));
            };
            match adapter.resolve_human_move(image, interaction, self.engine.board()) {
                Ok(cell) => return Ok(cell),
                Err(rejection) => {
                    warn!(%seat, %rejection, "Human move rejected");
                    self.record(SessionEvent::Rejected(rejection.to_string()));
                    self.input.rejected(&rejection)?;
                }
            }
        }
    }

    #[instrument(skip(self))]
    fn apply_move(&mut self) -> Result<(), SessionError> {
        let (seat, cell) = self.pending.take().ok_or(SessionError::Terminated(self.state))?;
        let mapper = self.mapper.ok_or(SessionError::Terminated(self.state))?;

        let region = mapper.cell_to_region(cell)?;
        let shape = DataShape::for_mark(seat.mark());
        let path = mapper.shape_path(shape, region.center())?;
        self.draw(shape, &path, Some(cell))?;

        let outcome = self.engine.apply_move(cell)?;
        self.record(SessionEvent::MoveCommitted { seat, cell, outcome });
        self.scan()?;
        self.refresh_display();

        if outcome.is_final() {
            info!(%outcome, "Game over");
            self.outcome = Some(outcome);
            self.transition(SessionState::GameOver);
            self.release();
        } else {
            self.transition(SessionState::AwaitingMove);
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    // Physical actions
    // ─────────────────────────────────────────────────────────────

    fn draw(
        &mut self,
        shape: DataShape,
        path: &DrawPath,
        cell: Option<Cell>,
    ) -> Result<(), SessionError> {
        let permitted = match self.state {
            SessionState::ApplyingMove => shape != DataShape::BoardGrid,
            SessionState::Validating => shape == DataShape::BoardGrid && !self.grid_drawn,
            _ => false,
        };
        if !permitted {
            return Err(SessionError::IllegalPhysicalAction {
                action: "drawing",
                state: self.state,
            });
        }
        if self.rescan_due {
            return Err(SessionError::IllegalPhysicalAction {
                action: "drawing before the previous draw was scanned",
                state: self.state,
            });
        }

        let params =
            LithoParameters::new(*self.config.scan_bias(), *self.config.passivate_setpoint());
        self.probe.lithograph(path, params)?;
        self.draws += 1;
        self.rescan_due = true;
        if shape == DataShape::BoardGrid {
            self.grid_drawn = true;
        }
        info!(%shape, cell = ?cell, "Drew shape");
        self.record(SessionEvent::Drew { shape, cell });
        if let Err(e) = self.renderer.draw_shape(shape, path) {
            warn!(error = %e, "Display failed to record shape");
        }
        Ok(())
    }

    fn scan(&mut self) -> Result<(), SessionError> {
        let image = self.probe.scan(
            *self.config.scan_channel(),
            *self.config.scan_direction(),
            *self.config.scan_trace(),
        )?;
        self.scans += 1;
        self.rescan_due = false;
        debug!(tag = %image.tag(), "Scan acquired");
        self.latest_scan = Some(image);
        self.record(SessionEvent::Scanned);
        Ok(())
    }

    fn refresh_display(&mut self) {
        let Some(image) = self.latest_scan.as_ref() else {
            return;
        };
        if let Err(e) = self.renderer.show(image, &self.engine.render()) {
            warn!(error = %e, "Display update failed");
        }
    }

    fn release(&mut self) {
        if self.probe.is_connected() {
            match self.probe.disconnect() {
                Ok(()) => self.record(SessionEvent::Disconnected),
                Err(e) => warn!(error = %e, "Probe did not disconnect cleanly"),
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Bookkeeping
    // ─────────────────────────────────────────────────────────────

    fn require_state(
        &self,
        action: &'static str,
        expected: SessionState,
    ) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::IllegalPhysicalAction {
                action,
                state: self.state,
            })
        }
    }

    fn transition(&mut self, to: SessionState) {
        let from = self.state;
        if from != to {
            info!(%from, %to, "Session state changed");
            self.state = to;
            self.record(SessionEvent::StateChanged { from, to });
        }
    }

    fn record(&mut self, event: SessionEvent) {
        self.events.push(event);
    }
}

impl<P: SurfaceProbe> Drop for SessionController<P> {
    fn drop(&mut self) {
        self.release();
    }
}
