//! End-to-end session tests against the simulated probe.

mod common;

use common::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stm_tictactoe::testing::ProbeCall;
use stm_tictactoe::{
    DataShape, HardwareError, Interaction, NullRenderer, Point, ScanParameters, ScriptedInput,
    SessionController, SessionError, SessionEvent, SessionState, SimulatedProbe,
    SimulatorSettings, SurfaceProbe,
};
use tictactoe_engine::{Outcome, Seat};

#[test]
fn test_calibration_takes_two_coarse_steps_in_one_direction_before_approach() {
    let (mut session, _) = audited_session(
        config("rules", "best", "player_1", 1),
        probe(0, 1),
        ScriptedInput::default(),
    );
    session.step().unwrap();
    assert_eq!(session.state(), SessionState::Validating);

    let calls = session.probe().calls();
    let start = calls.iter().position(|c| *c == ProbeCall::Retract).unwrap();
    let calibration = &calls[start..];
    assert_eq!(calibration.len(), 4, "{calibration:?}");
    match (&calibration[1], &calibration[2]) {
        (ProbeCall::CoarseMove(a), ProbeCall::CoarseMove(b)) => assert_eq!(a, b),
        other => panic!("expected two coarse moves, got {other:?}"),
    }
    assert_eq!(calibration[3], ProbeCall::AutoApproach);

    let simulator = session.probe().inner();
    assert_eq!(simulator.coarse_moves(), 2);
    assert_eq!(simulator.approaches(), 1);
    assert_eq!(simulator.scan_parameters(), Some(ScanParameters::new(-2.0, 50e-12)));
}

#[test]
fn test_configured_coarse_move_count_is_honoured() {
    let cfg = config("rules", "best", "player_1", 2).with_num_coarse_moves_on_reset(5);
    let (mut session, _) = audited_session(cfg, probe(0, 2), ScriptedInput::default());
    session.step().unwrap();
    assert_eq!(session.probe().count(|c| matches!(c, ProbeCall::CoarseMove(_))), 5);
}

#[test]
fn test_second_player_opens_when_configured() {
    let (mut session, audit) = audited_session(
        config("random", "rules", "player_2", 3),
        probe(0, 3),
        ScriptedInput::default(),
    );
    session.run().unwrap();

    let audit = audit.borrow();
    assert_eq!(audit.agent_queries.first(), Some(&Seat::PlayerTwo));
    assert!(
        audit.agent_queries.windows(2).all(|w| w[0] != w[1]),
        "turns must alternate: {:?}",
        audit.agent_queries
    );
}

#[test]
fn test_boundary_click_is_rejected_and_reprompted() {
    // x = 36 is the border between the top-left and top-center cells.
    let mut script = vec![Interaction::Pointer(Point::new(36.0, 24.0))];
    script.extend((0..9).map(Interaction::Cell));
    let (mut session, audit) = audited_session(
        config("human", "rules", "player_1", 4),
        probe(0, 4),
        ScriptedInput::new(script),
    );

    let outcome = session.run().unwrap();
    assert!(outcome.is_final());

    let rejections: Vec<&String> = session
        .events()
        .iter()
        .filter_map(|e| match e {
            SessionEvent::Rejected(reason) => Some(reason),
            _ => None,
        })
        .collect();
    assert!(rejections[0].contains("ambiguous"), "{rejections:?}");
    assert!(rejections[0].contains("Top-left") && rejections[0].contains("Top-center"));
    assert!(audit.borrow().applied.iter().all(|(_, empty)| *empty));
}

#[test]
fn test_flat_on_third_attempt_reaches_ready() {
    let (mut session, _) = audited_session(
        config("rules", "best", "player_1", 5),
        probe(2, 5),
        ScriptedInput::default(),
    );

    let budget = session.retry_budget().unwrap();
    assert_eq!((budget.initial(), budget.remaining()), (3, 3));
    session.step().unwrap();
    session.step().unwrap();
    assert_eq!(session.state(), SessionState::Calibrating);
    assert_eq!(session.retry_budget().unwrap().remaining(), 2);
    session.step().unwrap();
    session.step().unwrap();
    assert_eq!(session.retry_budget().unwrap().remaining(), 1);
    assert_eq!(session.retry_budget().unwrap().initial(), 3);

    step_until(&mut session, SessionState::Ready, 4);
    assert_eq!(session.probe().count(|c| *c == ProbeCall::AutoApproach), 3);
    assert_eq!(session.probe().count(|c| matches!(c, ProbeCall::Lithograph(4))), 1);
    assert!(session.retry_budget().is_none());
    assert!(session.mapper().is_some());
}

#[test]
fn test_budget_exhaustion_is_fatal_exactly_at_zero() {
    let (mut session, _) = audited_session(
        config("rules", "best", "player_1", 6),
        probe(3, 6),
        ScriptedInput::default(),
    );

    let err = session.run().unwrap_err();
    assert!(matches!(err, SessionError::SurfaceNotFlat { attempts: 3 }), "{err}");
    assert_eq!(session.state(), SessionState::Failed);
    assert_eq!(session.probe().count(|c| *c == ProbeCall::AutoApproach), 3);
    assert_eq!(session.probe().count(|c| matches!(c, ProbeCall::Lithograph(_))), 0);
    assert!(!session.probe().is_connected());
    assert!(matches!(session.step(), Err(SessionError::Terminated(SessionState::Failed))));
}

#[test]
fn test_single_attempt_budget() {
    let cfg = config("rules", "best", "player_1", 7).with_retry_budget(1);
    let (mut session, _) = audited_session(cfg, probe(1, 7), ScriptedInput::default());
    assert!(matches!(session.run(), Err(SessionError::SurfaceNotFlat { attempts: 1 })));
}

#[test]
fn test_every_draw_is_followed_by_one_scan() {
    let (mut session, _) = audited_session(
        config("mostly_best", "random", "random", 8),
        probe(1, 8),
        ScriptedInput::default(),
    );
    session.run().unwrap();

    let sequence = draw_scan_sequence(session.probe().calls());
    let first_draw = sequence.iter().position(|c| matches!(c, ProbeCall::Lithograph(_))).unwrap();
    let play = &sequence[first_draw..];
    let draws = play.iter().filter(|c| matches!(c, ProbeCall::Lithograph(_))).count();
    let scans = play.iter().filter(|c| matches!(c, ProbeCall::Scan)).count();
    assert_eq!(draws, scans);
    for pair in play.chunks(2) {
        assert!(matches!(pair, [ProbeCall::Lithograph(_), ProbeCall::Scan]), "{pair:?}");
    }
    assert_eq!(session.draws(), draws);
}

#[test]
fn test_engine_never_receives_an_occupied_cell() {
    for seed in 0..8u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut script: Vec<Interaction> = (0..200)
            .map(|_| {
                if rng.random_bool(0.5) {
                    Interaction::Cell(rng.random_range(0..10))
                } else {
                    Interaction::Pointer(Point::new(
                        rng.random_range(0.0..FRAME as f64),
                        rng.random_range(0.0..FRAME as f64),
                    ))
                }
            })
            .collect();
        script.extend((0..9).map(Interaction::Cell));

        let (mut session, audit) = audited_session(
            config("human", "random", "random", seed),
            probe(0, seed),
            ScriptedInput::new(script),
        );
        let outcome = session.run().unwrap();
        assert!(outcome.is_final());

        let audit = audit.borrow();
        assert!(!audit.applied.is_empty());
        assert!(audit.applied.iter().all(|(_, empty)| *empty), "seed {seed}: {:?}", audit.applied);
    }
}

#[test]
fn test_physical_actions_only_in_permitted_states() {
    let (mut session, _) = audited_session(
        config("best", "rules", "player_1", 9),
        probe(2, 9),
        ScriptedInput::default(),
    );
    session.run().unwrap();

    for (state, event) in events_with_state(session.events()) {
        match event {
            SessionEvent::Retracted | SessionEvent::CoarseMoved(_) | SessionEvent::Approached => {
                assert_eq!(state, SessionState::Calibrating, "{event:?}")
            }
            SessionEvent::Drew { shape: DataShape::BoardGrid, .. } => {
                assert_eq!(state, SessionState::Validating)
            }
            SessionEvent::Drew { .. } => assert_eq!(state, SessionState::ApplyingMove),
            _ => {}
        }
    }
}

#[test]
fn test_each_seat_draws_its_own_mark() {
    let (mut session, _) = audited_session(
        config("random", "random", "player_2", 10),
        probe(0, 10),
        ScriptedInput::default(),
    );
    session.run().unwrap();

    let events = session.events();
    let mut checked = 0;
    for (i, event) in events.iter().enumerate() {
        if let SessionEvent::Drew { shape, cell: Some(cell) } = event {
            let committed = events[i..].iter().find_map(|e| match e {
                SessionEvent::MoveCommitted { seat, cell: c, .. } => Some((*seat, *c)),
                _ => None,
            });
            let (seat, committed_cell) = committed.unwrap();
            assert_eq!(committed_cell, *cell);
            assert_eq!(*shape, DataShape::for_mark(seat.mark()));
            checked += 1;
        }
    }
    assert!(checked >= 5);
}

#[test]
fn test_game_over_releases_probe_and_stops() {
    let (mut session, _) = audited_session(
        config("best", "best", "player_1", 11),
        probe(0, 11),
        ScriptedInput::default(),
    );
    let outcome = session.run().unwrap();
    assert_eq!(outcome, Outcome::Draw);
    assert_eq!(session.outcome(), Some(Outcome::Draw));
    assert_eq!(session.probe().calls().last(), Some(&ProbeCall::Disconnect));
    assert_eq!(session.engine().current_seat(), None);
    assert_eq!(session.engine().board().filled(), 9);

    let calls = session.probe().calls().len();
    assert_eq!(session.step().unwrap(), SessionState::GameOver);
    assert_eq!(session.probe().calls().len(), calls);
    assert!(session.latest_scan().is_some());
}

#[test]
fn test_no_contact_is_fatal() {
    init_tracing();
    let probe = SimulatedProbe::new(
        SimulatorSettings::default()
            .with_frame_size(FRAME)
            .with_approach_fails(true),
    );
    let mut session = SessionController::new(
        config("rules", "best", "player_1", 12),
        probe,
        Box::new(NullRenderer),
        Box::new(ScriptedInput::default()),
    )
    .unwrap();

    let err = session.step().unwrap_err();
    assert!(matches!(err, SessionError::Hardware(HardwareError::NoContact(_))));
    assert_eq!(session.state(), SessionState::Failed);
    assert!(!session.probe().is_connected());
}

#[test]
fn test_unknown_player_string_is_a_configuration_error() {
    init_tracing();
    let result = SessionController::new(
        config("grandmaster", "best", "player_1", 13),
        SimulatedProbe::new(SimulatorSettings::default().with_frame_size(FRAME)),
        Box::new(NullRenderer),
        Box::new(ScriptedInput::default()),
    );
    assert!(matches!(result, Err(SessionError::Configuration(_))));
}

#[test]
fn test_closed_human_input_is_fatal() {
    let (mut session, _) = audited_session(
        config("human", "best", "player_1", 14),
        probe(0, 14),
        ScriptedInput::default(),
    );
    let err = session.run().unwrap_err();
    assert!(matches!(err, SessionError::Input(_)));
    assert_eq!(session.state(), SessionState::Failed);
}
