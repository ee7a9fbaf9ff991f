//! Test doubles for sessions: a call-recording probe and an auditing engine.
//!
//! Available to unit tests and behind the `testing` feature.

use crate::probe::{CoarseDirection, HardwareError, LithoParameters, ScanParameters, SurfaceProbe};
use crate::scan::{ScanChannel, ScanDirection, ScanImage, ScanTrace};
use crate::shapes::DrawPath;
use std::cell::RefCell;
use std::rc::Rc;
use tictactoe_engine::{Board, Cell, EngineError, GameEngine, Outcome, PlayerSpec, Seat};

/// A call made on a [`RecordingProbe`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeCall {
    /// `connect`
    Connect,
    /// `disconnect`
    Disconnect,
    /// `set_scan_parameters`
    SetScanParameters(ScanParameters),
    /// `retract`
    Retract,
    /// `coarse_move`
    CoarseMove(CoarseDirection),
    /// `auto_approach`
    AutoApproach,
    /// `scan`
    Scan,
    /// `lithograph`, with the stroke count.
    Lithograph(usize),
}

/// Wraps a probe and records every call that reached it.
#[derive(Debug)]
pub struct RecordingProbe<P> {
    inner: P,
    calls: Vec<ProbeCall>,
}

impl<P: SurfaceProbe> RecordingProbe<P> {
    /// Wraps `inner`.
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            calls: Vec::new(),
        }
    }

    /// Calls in order.
    pub fn calls(&self) -> &[ProbeCall] {
        &self.calls
    }

    /// The wrapped probe.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Number of calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&ProbeCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }
}

impl<P: SurfaceProbe> SurfaceProbe for RecordingProbe<P> {
    fn connect(&mut self) -> Result<(), HardwareError> {
        self.calls.push(ProbeCall::Connect);
        self.inner.connect()
    }

    fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    fn disconnect(&mut self) -> Result<(), HardwareError> {
        self.calls.push(ProbeCall::Disconnect);
        self.inner.disconnect()
    }

    fn set_scan_parameters(&mut self, params: ScanParameters) -> Result<(), HardwareError> {
        self.calls.push(ProbeCall::SetScanParameters(params));
        self.inner.set_scan_parameters(params)
    }

    fn retract(&mut self) -> Result<(), HardwareError> {
        self.calls.push(ProbeCall::Retract);
        self.inner.retract()
    }

    fn coarse_move(&mut self, direction: CoarseDirection) -> Result<(), HardwareError> {
        self.calls.push(ProbeCall::CoarseMove(direction));
        self.inner.coarse_move(direction)
    }

    fn auto_approach(&mut self) -> Result<(), HardwareError> {
        self.calls.push(ProbeCall::AutoApproach);
        self.inner.auto_approach()
    }

    fn scan(
        &mut self,
        channel: ScanChannel,
        direction: ScanDirection,
        trace: ScanTrace,
    ) -> Result<ScanImage, HardwareError> {
        self.calls.push(ProbeCall::Scan);
        self.inner.scan(channel, direction, trace)
    }

    fn lithograph(
        &mut self,
        path: &DrawPath,
        params: LithoParameters,
    ) -> Result<(), HardwareError> {
        self.calls.push(ProbeCall::Lithograph(path.strokes().len()));
        self.inner.lithograph(path, params)
    }

    fn frame_size(&self) -> (usize, usize) {
        self.inner.frame_size()
    }
}

/// What an [`AuditingEngine`] saw.
#[derive(Debug, Default, Clone)]
pub struct EngineAudit {
    /// Seat asked for an agent move, in order.
    pub agent_queries: Vec<Seat>,
    /// Cells passed to `apply_move`, with whether they were empty at the time.
    pub applied: Vec<(Cell, bool)>,
}

/// Wraps an engine and logs the queries and moves it receives.
///
/// The log is shared so it stays readable after the engine is boxed.
pub struct AuditingEngine<E> {
    inner: E,
    audit: Rc<RefCell<EngineAudit>>,
}

impl<E: GameEngine> AuditingEngine<E> {
    /// Wraps `inner`, returning the shared log.
    pub fn new(inner: E) -> (Self, Rc<RefCell<EngineAudit>>) {
        let audit = Rc::new(RefCell::new(EngineAudit::default()));
        (
            Self {
                inner,
                audit: Rc::clone(&audit),
            },
            audit,
        )
    }
}

impl<E: GameEngine> GameEngine for AuditingEngine<E> {
    fn current_seat(&self) -> Option<Seat> {
        self.inner.current_seat()
    }

    fn player(&self, seat: Seat) -> &PlayerSpec {
        self.inner.player(seat)
    }

    fn agent_move(&mut self) -> Result<Cell, EngineError> {
        if let Some(seat) = self.inner.current_seat() {
            self.audit.borrow_mut().agent_queries.push(seat);
        }
        self.inner.agent_move()
    }

    fn apply_move(&mut self, cell: Cell) -> Result<Outcome, EngineError> {
        let empty = self.inner.board().is_empty(cell);
        self.audit.borrow_mut().applied.push((cell, empty));
        self.inner.apply_move(cell)
    }

    fn board(&self) -> &Board {
        self.inner.board()
    }

    fn render(&self) -> String {
        self.inner.render()
    }
}
