//! Top-level simulation scheduler: owns the clock, the grid, every pursuer,
//! the light manager and the player, and runs them in a fixed order once per tick.

use std::sync::Arc;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use crate::config::{Difficulty, DifficultyProfile, SessionConfig};
use crate::error::ConfigError;
use crate::grid::{Grid, Level};
use crate::sim::clock::FixedStepClock;
use crate::sim::lights::LightManager;
use crate::sim::path_service::{PathMode, PathService, PathStats};
use crate::sim::player::{PlayerInput, PlayerState, StatusEffect};
use crate::sim::pool::PursuerPool;
use crate::sim::pursuit::{Pursuer, farthest_sampled_cell};
use crate::types::{AgentId, Cell, SimEvent};

mod advance;
mod hash;
mod render;

pub use advance::FrameReport;
pub use render::{LightFrame, PursuerFrame, RenderFrame};


pub struct Session {
    config: SessionConfig,
    profile: DifficultyProfile,
    level: Level,
    grid: Arc<Grid>,
    clock: FixedStepClock,
    paths: PathService,
    pool: PursuerPool,
    lights: LightManager,
    player: PlayerState,
    input: PlayerInput,
    remaining_objectives: Vec<Cell>,
    total_objectives: usize,
    rage: bool,
    tick: u64,
    elapsed: f64,
    next_scheduled_spawn: usize,
    paused: bool,
    rng: ChaCha8Rng,
    events: Vec<SimEvent>,
}

impl Session {
    pub fn new(level: Level, config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let profile = config.difficulty.profile();
        let grid = Arc::new(level.grid.clone());
        let mode = if config.async_paths { PathMode::Asynchronous } else { PathMode::Synchronous };
        let mut session = Self {
            clock: FixedStepClock::new(
                config.tick_rate_hz,
                config.max_sub_steps,
                config.max_frame_delta,
            ),
            paths: PathService::new(Arc::clone(&grid), mode),
            pool: PursuerPool::with_capacity(config.pool_capacity),
            lights: LightManager::from_placements(
                &level.lights,
                config.light_budget,
                config.light_retune_interval,
            ),
            player: PlayerState::spawn(level.player_spawn, profile.stamina),
            input: PlayerInput::default(),
            remaining_objectives: level.objectives.clone(),
            total_objectives: level.objectives.len(),
            rage: false,
            tick: 0,
            elapsed: 0.0,
            next_scheduled_spawn: 0,
            paused: false,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            events: Vec::new(),
            grid,
            level,
            profile,
            config,
        };
        session.populate();
        tracing::info!(
            seed = session.config.seed,
            difficulty = %session.config.difficulty,
            pursuers = session.pool.active_count(),
            objectives = session.total_objectives,
            path_mode = ?session.paths.mode(),
            "session started"
        );
        Ok(session)
    }

    /// Place the level's pursuers plus the difficulty's initial extras.
    fn populate(&mut self) {
        self.update_rage();
        let spawns = self.level.pursuer_spawns.clone();
        for cell in spawns {
            self.spawn_pursuer(cell);
        }
        if self.level.pursuer_spawns.is_empty() {
            self.spawn_extra_pursuer();
        }
        for _ in 0..self.profile.initial_extra_pursuers {
            self.spawn_extra_pursuer();
        }
    }

    /// Rebuild every subsystem for `level`, including a fresh path worker.
    /// Configuration and seed are kept.
    pub fn reset(&mut self, level: Level) -> Result<(), ConfigError> {
        *self = Self::new(level, self.config.clone())?;
        Ok(())
    }

    /// Restart the current level.
    pub fn restart(&mut self) -> Result<(), ConfigError> {
        self.reset(self.level.clone())
    }

    pub fn set_input(&mut self, input: PlayerInput) {
        self.input = input;
    }

    pub fn apply_status(&mut self, effect: StatusEffect) {
        self.player.status.apply(effect);
    }

    /// Switch difficulty mid-session. Pursuer speed and hearing, stamina and
    /// the extra-spawn schedule follow the new preset; nothing else resets.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        let had_stamina = self.profile.stamina.is_some();
        self.config.difficulty = difficulty;
        self.profile = difficulty.profile();
        for pursuer in self.pool.iter_active_mut() {
            pursuer.apply_profile(&self.profile);
        }
        self.player.apply_stamina_rules(had_stamina, self.profile.stamina);
        let elapsed = self.elapsed as f32;
        self.next_scheduled_spawn =
            self.profile.spawn_schedule.iter().take_while(|&&at| at <= elapsed).count();
        tracing::info!(%difficulty, "difficulty changed");
    }

    pub fn set_blackout(&mut self, blackout: bool) {
        self.lights.set_blackout(blackout);
    }

    pub fn set_light_budget(&mut self, budget: usize) {
        self.config.light_budget = budget;
        self.lights.set_budget(budget);
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume after a pause. Time spent paused is not simulated.
    pub fn resume(&mut self) {
        self.paused = false;
        self.clock.reset();
    }

    /// Recovery hook for an external liveness monitor: forget residual time
    /// and carry on from the current state.
    pub fn restart_clock(&mut self) {
        tracing::warn!(tick = self.tick, "scheduler clock restarted");
        self.clock.reset();
    }

    /// Activate a pool slot at `cell`. Returns `None` when the pool is full
    /// or the cell is not open.
    pub fn spawn_pursuer(&mut self, cell: Cell) -> Option<AgentId> {
        if !self.grid.is_open(cell) {
            tracing::warn!(?cell, "refusing to spawn pursuer inside a wall");
            return None;
        }
        let Some(id) = self.pool.acquire() else {
            tracing::warn!(
                capacity = self.pool.capacity(),
                "pursuer pool exhausted; spawn skipped"
            );
            return None;
        };
        let pursuer = self.pool.get_mut(id)?;
        pursuer.place(cell);
        pursuer.apply_profile(&self.profile);
        pursuer.rage = self.rage;
        tracing::info!(agent = id.0, ?cell, "pursuer spawned");
        self.events.push(SimEvent::PursuerSpawned { agent: id, cell });
        Some(id)
    }

    pub fn despawn_pursuer(&mut self, id: AgentId) -> bool {
        if !self.pool.release(id) {
            return false;
        }
        tracing::info!(agent = id.0, "pursuer despawned");
        self.events.push(SimEvent::PursuerDespawned { agent: id });
        true
    }

    /// Spawn at the farthest of a handful of sampled open cells from the player.
    fn spawn_extra_pursuer(&mut self) -> Option<AgentId> {
        let cell = farthest_sampled_cell(
            &self.grid,
            self.player.cell(),
            self.config.ai.spawn_samples,
            &mut self.rng,
        )?;
        self.spawn_pursuer(cell)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn difficulty(&self) -> Difficulty {
        self.config.difficulty
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated game time in seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn input(&self) -> &PlayerInput {
        &self.input
    }

    pub fn pursuer(&self, id: AgentId) -> Option<&Pursuer> {
        self.pool.get(id)
    }

    pub fn pursuers(&self) -> impl Iterator<Item = &Pursuer> {
        self.pool.iter_active()
    }

    pub fn pool_capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn lights(&self) -> &LightManager {
        &self.lights
    }

    pub fn clock(&self) -> &FixedStepClock {
        &self.clock
    }

    pub fn remaining_objectives(&self) -> &[Cell] {
        &self.remaining_objectives
    }

    pub fn total_objectives(&self) -> usize {
        self.total_objectives
    }

    pub fn rage(&self) -> bool {
        self.rage
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn path_mode(&self) -> PathMode {
        self.paths.mode()
    }

    pub fn path_stats(&self) -> PathStats {
        self.paths.stats()
    }
}
