use std::f32::consts::TAU;

use pursuit_core::{
    Cell, Difficulty, Level, PlayerInput, Session, SessionConfig, SimEvent, StatusEffect,
};
use proptest::{
    arbitrary::any,
    test_runner::{Config as ProptestConfig, TestCaseError, TestRunner},
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn unit(rng: &mut ChaCha8Rng) -> f32 {
    (rng.next_u32() >> 8) as f32 / (1_u32 << 24) as f32
}

fn run_fuzz_simulation(session_seed: u64, input_seed: u64, frames: u32) -> Result<(), String> {
    let mut rng = ChaCha8Rng::seed_from_u64(input_seed);
    let difficulty = choose(&mut rng, &Difficulty::ALL);
    let config = SessionConfig {
        seed: session_seed,
        difficulty,
        async_paths: false,
        ..SessionConfig::default()
    };
    let mut session = Session::new(Level::builtin(), config).map_err(|err| err.to_string())?;
    let budget = session.config().light_budget;

    for frame in 0..frames {
        if frame % 30 == 0 {
            session.set_input(PlayerInput {
                forward: unit(&mut rng) * 2.0 - 1.0,
                strafe: unit(&mut rng) * 2.0 - 1.0,
                yaw: unit(&mut rng) * TAU,
                sprint: rng.next_u32() % 3 == 0,
            });
        }
        if rng.next_u32() % 400 == 0 {
            let open = session.grid().open_cells();
            let decoy = open[rng.next_u64() as usize % open.len()];
            let stun = 1.4 + unit(&mut rng) * 2.1;
            let effect = choose(
                &mut rng,
                &[
                    StatusEffect::Blind { seconds: 3.0 },
                    StatusEffect::Stun { seconds: stun },
                    StatusEffect::Invulnerable { seconds: 2.2 },
                    StatusEffect::Decoy { cell: decoy, seconds: 6.0 },
                    StatusEffect::Reversal { seconds: 4.0 },
                ],
            );
            session.apply_status(effect);
        }
        if rng.next_u32() % 500 == 0 {
            session.set_blackout(!session.lights().is_blackout());
        }

        let dt = choose(&mut rng, &[1.0 / 60.0, 1.0 / 144.0, 1.0 / 30.0, 0.0, 0.4]);
        let report = session.advance(dt);

        if !(0.0..=1.0).contains(&report.alpha) {
            return Err(format!("Invariant failed: alpha {} on seed {session_seed}", report.alpha));
        }
        if session.clock().accumulator() >= session.clock().fixed_step() {
            return Err(format!("Invariant failed: accumulator overflow on seed {session_seed}"));
        }
        if session.lights().active_count() > budget {
            return Err(format!("Invariant failed: light budget exceeded on seed {session_seed}"));
        }
        if !session.grid().is_open(session.player().cell()) {
            return Err(format!("Invariant failed: player inside wall on seed {session_seed}"));
        }
        for pursuer in session.pursuers() {
            let cell: Cell = pursuer.cell();
            if !session.grid().is_open(cell) {
                return Err(format!(
                    "Invariant failed: pursuer {:?} inside wall at {cell:?} on seed {session_seed}",
                    pursuer.id
                ));
            }
        }
        if session.pursuers().count() > session.pool_capacity() {
            return Err(format!("Invariant failed: pool overflow on seed {session_seed}"));
        }
        for event in &report.events {
            if let SimEvent::ObjectiveCollected { remaining, .. } = event
                && *remaining > session.total_objectives()
            {
                return Err(format!("Invariant failed: objective count on seed {session_seed}"));
            }
        }
    }

    Ok(())
}

#[test]
fn test_fuzz_session_invariants() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(16));
    let seeds = (any::<u64>(), any::<u64>());

    runner
        .run(&seeds, |(session_seed, input_seed)| {
            run_fuzz_simulation(session_seed, input_seed, 1500).map_err(TestCaseError::fail)?;
            Ok(())
        })
        .expect("semantic fuzz simulation should preserve invariants");
}
