use pursuit_core::{Difficulty, Level, PlayerInput, Session, SessionConfig};

fn session(seed: u64) -> Session {
    let config = SessionConfig {
        seed,
        difficulty: Difficulty::Hard,
        async_paths: false,
        ..SessionConfig::default()
    };
    Session::new(Level::builtin(), config).expect("session")
}

/// Input is held for the whole run; frames of different length must see the
/// same input on every tick.
fn steady_input() -> PlayerInput {
    PlayerInput { forward: 1.0, strafe: 0.4, yaw: 2.5, sprint: true }
}

#[test]
fn small_frames_accumulate_to_exact_tick_counts() {
    let mut session = session(1);
    let mut ticks = 0;
    for _ in 0..600 {
        ticks += session.advance(1.0 / 120.0).simulated_ticks;
    }
    assert_eq!(ticks, 300);
    assert_eq!(session.tick(), 300);
}

#[test]
fn simulation_state_depends_on_ticks_not_frame_rate() {
    let mut coarse = session(42);
    coarse.set_input(steady_input());
    while coarse.tick() < 200 {
        coarse.advance(1.0 / 30.0);
    }

    let mut fine = session(42);
    fine.set_input(steady_input());
    while fine.tick() < coarse.tick() {
        let report = fine.advance(1.0 / 144.0);
        assert!(report.simulated_ticks <= 1);
    }

    assert_eq!(fine.tick(), coarse.tick());
    assert_eq!(fine.snapshot_hash(), coarse.snapshot_hash());
}

#[test]
fn alpha_and_accumulator_stay_bounded_under_jittery_frames() {
    let mut session = session(7);
    let step = session.clock().fixed_step();
    for frame in 0..500 {
        let dt = [0.004, 0.016, 0.021, 0.05, 0.0, 0.9][frame % 6];
        let report = session.advance(dt);
        assert!((0.0..=1.0).contains(&report.alpha));
        assert!(report.simulated_ticks <= session.config().max_sub_steps);
        assert!(session.clock().accumulator() < step);
    }
}

#[test]
fn starved_frame_is_recoverable() {
    let mut session = session(3);
    let report = session.advance(30.0);
    assert_eq!(report.simulated_ticks, 8);
    assert!(report.dropped_seconds > 0.0);
    session.restart_clock();
    assert_eq!(session.advance(1.0 / 60.0).simulated_ticks, 1);
}
