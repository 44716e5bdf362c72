//! Scripted player shared by the headless binaries. It wanders between random
//! open cells along A* routes and sprints in short bursts.

use glam::Vec2;
use pursuit_core::sim::pathfinding::find_path;
use pursuit_core::{Cell, Grid, PlayerInput, cell_center, world_to_cell};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

const ARRIVAL_RADIUS: f32 = 0.5;
const STUCK_TICKS: u32 = 90;
const SPRINT_BURST_TICKS: u32 = 90;

pub struct Autopilot {
    rng: ChaCha8Rng,
    /// Remaining route, next cell last.
    route: Vec<Cell>,
    sprint_ticks: u32,
    stuck_ticks: u32,
    last_position: Option<Vec2>,
}

impl Autopilot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            route: Vec::new(),
            sprint_ticks: 0,
            stuck_ticks: 0,
            last_position: None,
        }
    }

    pub fn destination(&self) -> Option<Cell> {
        self.route.first().copied()
    }

    /// Input for one tick from the player's current position.
    pub fn steer(&mut self, grid: &Grid, position: Vec2) -> PlayerInput {
        match self.last_position {
            Some(last) if last.distance(position) < 1e-3 => self.stuck_ticks += 1,
            _ => self.stuck_ticks = 0,
        }
        self.last_position = Some(position);

        while let Some(&next) = self.route.last()
            && cell_center(next).distance(position) < ARRIVAL_RADIUS
        {
            self.route.pop();
        }
        if self.route.is_empty() || self.stuck_ticks > STUCK_TICKS {
            self.plan(grid, world_to_cell(position));
        }

        let Some(&next) = self.route.last() else {
            return PlayerInput::default();
        };
        let direction = (cell_center(next) - position).normalize_or_zero();
        self.sprint_ticks = self.sprint_ticks.saturating_sub(1);
        PlayerInput {
            forward: 1.0,
            strafe: 0.0,
            yaw: (-direction.x).atan2(-direction.y),
            sprint: self.sprint_ticks > 0,
        }
    }

    fn plan(&mut self, grid: &Grid, from: Cell) {
        self.stuck_ticks = 0;
        self.route.clear();
        let open = grid.open_cells();
        if open.is_empty() {
            return;
        }
        let goal = open[self.rng.next_u64() as usize % open.len()];
        self.route = find_path(grid, from, goal);
        self.route.reverse();
        if self.rng.next_u32() % 3 == 0 {
            self.sprint_ticks = SPRINT_BURST_TICKS;
        }
        tracing::debug!(?from, ?goal, steps = self.route.len(), "autopilot route planned");
    }
}
