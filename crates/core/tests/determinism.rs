use std::f32::consts::FRAC_PI_2;

use pursuit_core::{
    Difficulty, Level, PlayerInput, Session, SessionConfig, SimEvent, StatusEffect,
};

fn scripted_run(seed: u64, difficulty: Difficulty, ticks: u32) -> (Vec<u64>, Vec<SimEvent>) {
    let config = SessionConfig { seed, difficulty, async_paths: false, ..SessionConfig::default() };
    let mut session = Session::new(Level::builtin(), config).expect("session");
    let mut hashes = Vec::new();
    let mut events = Vec::new();
    for tick in 0..ticks {
        session.set_input(PlayerInput {
            forward: 1.0,
            strafe: 0.0,
            yaw: (tick / 120) as f32 * FRAC_PI_2,
            sprint: tick % 300 < 100,
        });
        if tick == 400 {
            session.apply_status(StatusEffect::Blind { seconds: 3.0 });
        }
        if tick == 900 {
            session.apply_status(StatusEffect::Reversal { seconds: 4.0 });
        }
        events.extend(session.run_ticks(1));
        if tick % 60 == 0 {
            hashes.push(session.snapshot_hash());
        }
    }
    (hashes, events)
}

#[test]
fn identical_seeds_produce_identical_traces() {
    let first = scripted_run(12345, Difficulty::Nightmare, 1500);
    let second = scripted_run(12345, Difficulty::Nightmare, 1500);
    assert_eq!(first.0, second.0, "identical runs must produce identical hashes");
    assert_eq!(first.1, second.1);
}

#[test]
fn different_seeds_produce_different_hashes() {
    let (first, _) = scripted_run(123, Difficulty::Standard, 600);
    let (second, _) = scripted_run(456, Difficulty::Standard, 600);
    assert_ne!(first.last(), second.last());
}

#[test]
fn difficulty_change_mid_run_is_deterministic() {
    let run = || {
        let config = SessionConfig { seed: 9, async_paths: false, ..SessionConfig::default() };
        let mut session = Session::new(Level::builtin(), config).expect("session");
        session.run_ticks(300);
        session.set_difficulty(Difficulty::Impossible);
        session.run_ticks(300);
        session.snapshot_hash()
    };
    assert_eq!(run(), run());
}
