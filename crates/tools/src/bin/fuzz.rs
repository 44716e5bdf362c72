use std::f32::consts::TAU;

use anyhow::{Result, ensure};
use clap::Parser;
use pursuit_core::{Difficulty, Level, PlayerInput, Session, SessionConfig, StatusEffect};
use pursuit_tools::Autopilot;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 20_000)]
    frames: u32,
    /// Use the background path worker instead of inline pathing
    #[arg(long)]
    async_paths: bool,
}

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn unit(rng: &mut ChaCha8Rng) -> f32 {
    (rng.next_u32() >> 8) as f32 / (1_u32 << 24) as f32
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
    let args = Args::parse();

    println!("Starting fuzz harness on seed {} for {} frames...", args.seed, args.frames);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let config = SessionConfig {
        seed: args.seed,
        difficulty: choose(&mut rng, &Difficulty::ALL),
        async_paths: args.async_paths,
        ..SessionConfig::default()
    };
    let mut session = Session::new(Level::builtin(), config)?;
    let mut pilot = Autopilot::new(args.seed.rotate_left(17));
    let budget = session.config().light_budget;
    let max_sub_steps = session.config().max_sub_steps;

    for frame in 0..args.frames {
        // Alternate between purposeful wandering and raw random input.
        let input = if (frame / 600) % 2 == 0 {
            pilot.steer(session.grid(), session.player().position)
        } else {
            PlayerInput {
                forward: unit(&mut rng) * 2.0 - 1.0,
                strafe: unit(&mut rng) * 2.0 - 1.0,
                yaw: unit(&mut rng) * TAU,
                sprint: rng.next_u32() % 2 == 0,
            }
        };
        session.set_input(input);

        match rng.next_u32() % 1000 {
            0 => session.apply_status(StatusEffect::Blind { seconds: 3.0 }),
            1 => session.apply_status(StatusEffect::Stun { seconds: 1.4 + unit(&mut rng) * 2.1 }),
            2 => session.apply_status(StatusEffect::Invulnerable { seconds: 2.2 }),
            3 => session.apply_status(StatusEffect::Reversal { seconds: 4.0 }),
            4 => {
                let cell = choose(&mut rng, session.grid().open_cells());
                session.apply_status(StatusEffect::Decoy { cell, seconds: 6.0 });
            }
            5 => session.set_blackout(!session.lights().is_blackout()),
            6 => session.set_difficulty(choose(&mut rng, &Difficulty::ALL)),
            7 => {
                session.pause();
                session.advance(0.5);
                session.resume();
            }
            _ => {}
        }

        let dt = choose(&mut rng, &[1.0 / 60.0, 1.0 / 144.0, 1.0 / 30.0, 0.0, 0.05, 2.0]);
        let report = session.advance(dt);

        ensure!(report.simulated_ticks <= max_sub_steps, "Invariant failed: sub-step cap exceeded");
        ensure!(
            session.clock().accumulator() < session.clock().fixed_step(),
            "Invariant failed: accumulator holds a full step after advance"
        );
        ensure!((0.0..=1.0).contains(&report.alpha), "Invariant failed: alpha out of range");
        ensure!(
            session.lights().active_count() <= budget,
            "Invariant failed: more than {budget} lights active"
        );
        ensure!(
            session.grid().is_open(session.player().cell()),
            "Invariant failed: player inside wall at frame {frame}"
        );
        for pursuer in session.pursuers() {
            ensure!(
                session.grid().is_open(pursuer.cell()),
                "Invariant failed: pursuer {:?} inside wall at frame {frame}",
                pursuer.id
            );
        }
    }

    let stats = session.path_stats();
    println!(
        "Fuzzing completed successfully after {} ticks ({} paths applied, {} stale).",
        session.tick(),
        stats.applied,
        stats.stale
    );
    Ok(())
}
