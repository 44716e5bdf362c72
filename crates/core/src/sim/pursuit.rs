//! Pursuer agent record and its decision cycle.
//! Mode selection is a pure function with a fixed precedence: forced target,
//! then blindness, then the proximity-driven ambush/chase/patrol choice.
//! Detection is hearing based; line of sight only drives the `muffled` cue.

use glam::Vec2;
use rand_chacha::ChaCha8Rng;

use crate::config::{AiTuning, DifficultyProfile};
use crate::grid::{Grid, cell_center, world_to_cell};
use crate::sim::path_service::PathState;
use crate::sim::{pick, unit_f32};
use crate::types::{AgentId, Cell, Directive, Mode};

#[derive(Clone, Debug)]
pub struct Pursuer {
    pub id: AgentId,
    pub position: Vec2,
    /// Position before the most recent tick, for render interpolation.
    pub previous_position: Vec2,
    pub mode: Mode,
    pub path: PathState,
    pub patrol_target: Option<Cell>,
    pub ambush_cooldown: f32,
    pub decision_timer: f32,
    pub hearing_range: f32,
    pub base_speed: f32,
    pub rage: bool,
    /// No line of sight between this pursuer and the player.
    pub muffled: bool,
    /// Player was within catch distance on the previous tick.
    pub in_contact: bool,
}

impl Pursuer {
    pub fn new(id: AgentId) -> Self {
        Self {
            id,
            position: Vec2::ZERO,
            previous_position: Vec2::ZERO,
            mode: Mode::Patrol,
            path: PathState::default(),
            patrol_target: None,
            ambush_cooldown: 0.0,
            decision_timer: 0.0,
            hearing_range: 0.0,
            base_speed: 0.0,
            rage: false,
            muffled: false,
            in_contact: false,
        }
    }

    /// Back to spawn defaults. Keeps the slot id.
    pub fn reset(&mut self) {
        *self = Self::new(self.id);
    }

    pub fn place(&mut self, cell: Cell) {
        self.position = cell_center(cell);
        self.previous_position = self.position;
    }

    pub fn apply_profile(&mut self, profile: &DifficultyProfile) {
        self.base_speed = profile.pursuer_base_speed();
        self.hearing_range = profile.hearing_range();
    }

    pub fn cell(&self) -> Cell {
        world_to_cell(self.position)
    }

    /// Count down timers and, when the decision timer expires, pick a mode
    /// and return the goal cell to route toward.
    pub fn think(
        &mut self,
        view: &PlayerView,
        grid: &Grid,
        tuning: &AiTuning,
        dt: f32,
        rng: &mut ChaCha8Rng,
    ) -> Option<Cell> {
        self.ambush_cooldown -= dt;
        self.decision_timer -= dt;
        if self.decision_timer > 0.0 {
            return None;
        }

        let hearing_range =
            if view.sprinting { tuning.sprint_hearing_range } else { self.hearing_range };
        let perception = Perception {
            distance: self.position.distance(view.position),
            hearing_range,
            rage: self.rage,
            blinded: view.blinded,
            directive: view.directive,
            ambush_ready: self.ambush_cooldown <= 0.0,
        };
        let decision = decide(&perception, tuning, || unit_f32(rng));
        if decision == Decision::Ambush {
            self.ambush_cooldown =
                tuning.ambush_cooldown_min + unit_f32(rng) * tuning.ambush_cooldown_jitter;
        }
        self.mode = decision.mode();
        self.decision_timer = match decision {
            Decision::Blinded => tuning.blinded_decision_interval,
            _ if self.rage => tuning.rage_decision_interval,
            _ => tuning.decision_interval,
        };

        let goal = match decision {
            Decision::Forced(Directive::Decoy(cell)) => cell,
            Decision::Forced(Directive::Flee) => {
                farthest_sampled_cell(grid, view.cell, tuning.flee_samples, rng)?
            }
            Decision::Blinded | Decision::Patrol => self.patrol_goal(grid, tuning, rng)?,
            Decision::Chase => view.cell,
            Decision::Ambush => {
                let predicted =
                    predict_ambush_cell(grid, view.cell, view.yaw, tuning.ambush_lookahead);
                if grid.is_open(predicted) { predicted } else { view.cell }
            }
        };
        Some(goal)
    }

    fn patrol_goal(
        &mut self,
        grid: &Grid,
        tuning: &AiTuning,
        rng: &mut ChaCha8Rng,
    ) -> Option<Cell> {
        let here = self.cell();
        let reached = self.patrol_target.is_some_and(|target| {
            here.row.abs_diff(target.row) < tuning.patrol_arrival_cells.unsigned_abs()
                && here.col.abs_diff(target.col) < tuning.patrol_arrival_cells.unsigned_abs()
        });
        if self.patrol_target.is_none() || reached {
            self.patrol_target = pick(rng, grid.open_cells());
        }
        self.patrol_target
    }

    /// Move toward the next waypoint, popping it once within `arrival_tolerance`.
    /// With no waypoint the pursuer holds position.
    pub fn follow_path(&mut self, speed: f32, arrival_tolerance: f32, dt: f32) {
        let Some(next) = self.path.next_waypoint() else {
            return;
        };
        let delta = cell_center(next) - self.position;
        let distance = delta.length();
        if distance < arrival_tolerance {
            self.path.pop_waypoint();
            return;
        }
        let step = (speed * dt).min(distance);
        self.position += delta / distance * step;
    }

    /// World-units-per-second speed for the current mode.
    pub fn move_speed(&self, profile: &DifficultyProfile, tuning: &AiTuning, blinded: bool) -> f32 {
        let mode_multiplier = if self.rage {
            tuning.rage_speed
        } else if self.mode == Mode::Patrol {
            tuning.patrol_speed
        } else {
            tuning.pursuit_speed
        };
        let speed = self.base_speed * profile.multiplier * mode_multiplier;
        if blinded { speed * tuning.blinded_speed } else { speed }
    }
}

/// What pursuers know about the player on a decision tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerView {
    pub position: Vec2,
    pub cell: Cell,
    pub yaw: f32,
    pub sprinting: bool,
    pub blinded: bool,
    pub directive: Option<Directive>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Perception {
    pub distance: f32,
    pub hearing_range: f32,
    pub rage: bool,
    pub blinded: bool,
    pub directive: Option<Directive>,
    pub ambush_ready: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Forced(Directive),
    Blinded,
    Patrol,
    Ambush,
    Chase,
}

impl Decision {
    pub fn mode(self) -> Mode {
        match self {
            Decision::Forced(_) => Mode::ForcedTarget,
            Decision::Blinded | Decision::Patrol => Mode::Patrol,
            Decision::Ambush => Mode::Ambush,
            Decision::Chase => Mode::Chase,
        }
    }
}

/// Mode selection. `roll` is drawn only when an ambush is otherwise possible.
pub fn decide(perception: &Perception, tuning: &AiTuning, roll: impl FnOnce() -> f32) -> Decision {
    if let Some(directive) = perception.directive {
        return Decision::Forced(directive);
    }
    if perception.blinded {
        return Decision::Blinded;
    }
    if perception.distance > perception.hearing_range && !perception.rage {
        return Decision::Patrol;
    }
    if perception.ambush_ready
        && perception.distance > tuning.adjacency_distance
        && roll() < tuning.ambush_chance
    {
        return Decision::Ambush;
    }
    Decision::Chase
}

/// Cell `lookahead` cells ahead of the player's facing, clamped to the interior.
/// Facing only; velocity is not considered.
pub fn predict_ambush_cell(grid: &Grid, player: Cell, yaw: f32, lookahead: i32) -> Cell {
    let reach = lookahead as f32;
    let predicted = Cell::new(
        player.row + (-yaw.cos() * reach).round() as i32,
        player.col + (-yaw.sin() * reach).round() as i32,
    );
    grid.clamp_interior(predicted)
}

/// Farthest (by squared cell distance) of `samples` random open cells.
/// Earlier samples win ties.
pub fn farthest_sampled_cell(
    grid: &Grid,
    from: Cell,
    samples: usize,
    rng: &mut ChaCha8Rng,
) -> Option<Cell> {
    let open = grid.open_cells();
    let mut best: Option<(i64, Cell)> = None;
    for _ in 0..samples.min(open.len()) {
        let Some(cell) = pick(rng, open) else {
            break;
        };
        let score = cell.distance_squared(from);
        if best.is_none_or(|(best_score, _)| score > best_score) {
            best = Some((score, cell));
        }
    }
    best.map(|(_, cell)| cell).or_else(|| pick(rng, open))
}
