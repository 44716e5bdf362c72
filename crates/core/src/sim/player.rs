//! Player movement, sprint stamina and timed status effects.
//! The pursuit AI reads these but never writes them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::StaminaRules;
use crate::grid::{Grid, cell_center, world_to_cell};
use crate::types::{Cell, Directive};

pub const WALK_SPEED: f32 = 5.0;
pub const SPRINT_SPEED: f32 = 11.0;
pub const WALK_ACCELERATION: f32 = 14.0;
pub const SPRINT_ACCELERATION: f32 = 18.0;
pub const DECELERATION: f32 = 10.0;
/// Half-width of the player's collision square.
pub const COLLISION_MARGIN: f32 = 0.4;
/// Distance at which an objective pellet is picked up.
pub const PICKUP_RADIUS: f32 = 1.2;

/// One tick of control input. Axes are in `[-1, 1]`; `yaw` is radians with
/// zero facing toward lower rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    pub forward: f32,
    pub strafe: f32,
    pub yaw: f32,
    pub sprint: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum StatusEffect {
    /// Pursuers lose track of the player and wander slowly.
    Blind { seconds: f32 },
    /// Pursuers freeze and drop their routes.
    Stun { seconds: f32 },
    /// Contact with a pursuer is ignored.
    Invulnerable { seconds: f32 },
    /// Pursuers head for this cell.
    Decoy { cell: Cell, seconds: f32 },
    /// Pursuers flee from the player, on difficulties that allow it.
    Reversal { seconds: f32 },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct StatusTimers {
    pub blind: f32,
    pub stun: f32,
    pub invulnerable: f32,
    pub decoy: f32,
    pub decoy_cell: Option<Cell>,
    pub reversal: f32,
}

impl StatusTimers {
    /// Longer durations win; a new decoy replaces the old cell.
    pub fn apply(&mut self, effect: StatusEffect) {
        match effect {
            StatusEffect::Blind { seconds } => self.blind = self.blind.max(seconds),
            StatusEffect::Stun { seconds } => self.stun = self.stun.max(seconds),
            StatusEffect::Invulnerable { seconds } => {
                self.invulnerable = self.invulnerable.max(seconds);
            }
            StatusEffect::Decoy { cell, seconds } => {
                self.decoy = seconds;
                self.decoy_cell = Some(cell);
            }
            StatusEffect::Reversal { seconds } => self.reversal = self.reversal.max(seconds),
        }
    }

    pub fn tick(&mut self, dt: f32) {
        let timers = [
            &mut self.blind,
            &mut self.stun,
            &mut self.invulnerable,
            &mut self.decoy,
            &mut self.reversal,
        ];
        for timer in timers {
            *timer = (*timer - dt).max(0.0);
        }
        if self.decoy <= 0.0 {
            self.decoy_cell = None;
        }
    }

    pub fn blinded(&self) -> bool {
        self.blind > 0.0
    }

    pub fn stunned(&self) -> bool {
        self.stun > 0.0
    }

    pub fn invulnerable(&self) -> bool {
        self.invulnerable > 0.0
    }

    /// Active override for pursuer goals. Reversal outranks a decoy; a decoy
    /// over a wall is ignored.
    pub fn directive(&self, grid: &Grid, allow_reversal: bool) -> Option<Directive> {
        if self.reversal > 0.0 && allow_reversal {
            return Some(Directive::Flee);
        }
        let cell = grid.clamp_interior(self.decoy_cell.filter(|_| self.decoy > 0.0)?);
        grid.is_open(cell).then_some(Directive::Decoy(cell))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerState {
    pub position: Vec2,
    pub previous_position: Vec2,
    pub yaw: f32,
    pub speed: f32,
    pub stamina: f32,
    /// Stamina ran out; sprint stays locked until it recovers.
    pub exhausted: bool,
    pub sprinting: bool,
    pub status: StatusTimers,
}

impl PlayerState {
    pub fn spawn(cell: Cell, stamina: Option<StaminaRules>) -> Self {
        let position = cell_center(cell);
        Self {
            position,
            previous_position: position,
            yaw: 0.0,
            speed: 0.0,
            stamina: stamina.map_or(0.0, |rules| rules.max),
            exhausted: false,
            sprinting: false,
            status: StatusTimers::default(),
        }
    }

    pub fn cell(&self) -> Cell {
        world_to_cell(self.position)
    }

    /// Unit vector the player faces, in world x/y.
    pub fn forward(&self) -> Vec2 {
        Vec2::new(-self.yaw.sin(), -self.yaw.cos())
    }

    /// Re-clamp stamina after a difficulty change. Coming from unlimited
    /// sprint starts the bar full.
    pub fn apply_stamina_rules(&mut self, had_stamina: bool, stamina: Option<StaminaRules>) {
        match stamina {
            Some(rules) if !had_stamina => {
                self.stamina = rules.max;
                self.exhausted = false;
            }
            Some(rules) => self.stamina = self.stamina.min(rules.max),
            None => {
                self.stamina = 0.0;
                self.exhausted = false;
            }
        }
    }

    pub fn update(
        &mut self,
        input: &PlayerInput,
        grid: &Grid,
        stamina: Option<StaminaRules>,
        dt: f32,
    ) {
        self.yaw = input.yaw;
        self.sprinting = self.update_stamina(input.sprint, stamina, dt);

        let forward = self.forward();
        let right = Vec2::new(self.yaw.cos(), -self.yaw.sin());
        let axes = Vec2::new(input.strafe.clamp(-1.0, 1.0), input.forward.clamp(-1.0, 1.0));
        let direction = (right * axes.x + forward * axes.y).normalize_or_zero();

        let target = if direction == Vec2::ZERO {
            0.0
        } else if self.sprinting {
            SPRINT_SPEED
        } else {
            WALK_SPEED
        };
        let acceleration = if self.sprinting { SPRINT_ACCELERATION } else { WALK_ACCELERATION };
        self.speed = if target > self.speed {
            (self.speed + acceleration * dt).min(target)
        } else {
            (self.speed - DECELERATION * dt).max(target)
        };

        let step = direction * self.speed * dt;
        if step.x != 0.0 && can_occupy(grid, self.position + Vec2::new(step.x, 0.0)) {
            self.position.x += step.x;
        }
        if step.y != 0.0 && can_occupy(grid, self.position + Vec2::new(0.0, step.y)) {
            self.position.y += step.y;
        }
        self.status.tick(dt);
    }

    /// Returns whether the player may sprint this tick.
    fn update_stamina(&mut self, wants_sprint: bool, rules: Option<StaminaRules>, dt: f32) -> bool {
        let Some(rules) = rules else {
            return wants_sprint;
        };
        if wants_sprint && self.stamina > 0.0 && !self.exhausted {
            self.stamina = (self.stamina - rules.drain * dt).max(0.0);
            if self.stamina <= 0.0 {
                self.exhausted = true;
                return false;
            }
            true
        } else {
            self.stamina = (self.stamina + rules.regen * dt).min(rules.max);
            if self.stamina > rules.recover_at {
                self.exhausted = false;
            }
            false
        }
    }
}

/// Whether a collision square centred at `position` touches only open cells.
pub fn can_occupy(grid: &Grid, position: Vec2) -> bool {
    let m = COLLISION_MARGIN;
    [Vec2::new(-m, -m), Vec2::new(m, -m), Vec2::new(-m, m), Vec2::new(m, m)]
        .into_iter()
        .all(|corner| grid.is_open(world_to_cell(position + corner)))
}

pub fn within_pickup(position: Vec2, cell: Cell) -> bool {
    position.distance(cell_center(cell)) < PICKUP_RADIUS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Difficulty;
    use crate::grid::CELL_SIZE;
    use std::f32::consts::FRAC_PI_2;

    const DT: f32 = 1.0 / 60.0;

    fn run(
        player: &mut PlayerState,
        input: PlayerInput,
        grid: &Grid,
        rules: Option<StaminaRules>,
        ticks: u32,
    ) {
        for _ in 0..ticks {
            player.update(&input, grid, rules, DT);
        }
    }

    #[test]
    fn walking_accelerates_to_walk_speed_then_coasts_to_rest() {
        let grid = Grid::new(30, 30);
        let mut player = PlayerState::spawn(Cell::new(25, 5), None);
        let forward = PlayerInput { forward: 1.0, ..PlayerInput::default() };
        run(&mut player, forward, &grid, None, 60);
        assert_eq!(player.speed, WALK_SPEED);
        assert!(player.position.y < cell_center(Cell::new(25, 5)).y);

        run(&mut player, PlayerInput::default(), &grid, None, 60);
        assert_eq!(player.speed, 0.0);
    }

    #[test]
    fn walls_stop_movement_on_the_blocked_axis_only() {
        let grid = Grid::new(5, 12);
        let mut player = PlayerState::spawn(Cell::new(1, 2), None);
        // Yaw 0 faces row 0; strafing right moves along +x.
        let input = PlayerInput { forward: 1.0, strafe: 1.0, ..PlayerInput::default() };
        run(&mut player, input, &grid, None, 120);
        assert!(player.position.y - COLLISION_MARGIN >= CELL_SIZE);
        assert!(player.position.x > cell_center(Cell::new(1, 2)).x + 4.0);
        assert!(can_occupy(&grid, player.position));
    }

    #[test]
    fn stamina_exhausts_and_locks_sprint_until_recovered() {
        let rules = Difficulty::Nightmare.profile().stamina;
        let grid = Grid::new(60, 60);
        let mut player = PlayerState::spawn(Cell::new(30, 30), rules);
        let sprint =
            PlayerInput { forward: 1.0, sprint: true, yaw: FRAC_PI_2, ..PlayerInput::default() };

        // 60 stamina at 34/s lasts under two seconds.
        run(&mut player, sprint, &grid, rules, 120);
        assert!(player.exhausted);
        assert!(!player.sprinting);

        // Sprint stays locked while regenerating below the recovery threshold.
        run(&mut player, sprint, &grid, rules, 60);
        assert!(player.exhausted);
        let walk = PlayerInput { sprint: false, ..sprint };
        run(&mut player, walk, &grid, rules, 150);
        assert!(!player.exhausted);
        run(&mut player, sprint, &grid, rules, 1);
        assert!(player.sprinting);
    }

    #[test]
    fn unlimited_sprint_without_stamina_rules() {
        let grid = Grid::new(80, 10);
        let mut player = PlayerState::spawn(Cell::new(75, 5), None);
        let sprint = PlayerInput { forward: 1.0, sprint: true, ..PlayerInput::default() };
        run(&mut player, sprint, &grid, None, 90);
        assert!(player.sprinting);
        assert_eq!(player.speed, SPRINT_SPEED);
    }

    #[test]
    fn status_timers_expire_and_decoy_clears() {
        let grid = Grid::new(9, 9);
        let mut status = StatusTimers::default();
        status.apply(StatusEffect::Blind { seconds: 3.0 });
        status.apply(StatusEffect::Blind { seconds: 1.0 });
        status.apply(StatusEffect::Decoy { cell: Cell::new(0, 4), seconds: 1.0 });
        assert!(status.blinded());
        assert_eq!(status.directive(&grid, true), Some(Directive::Decoy(Cell::new(1, 4))));

        status.tick(1.5);
        assert!(status.blinded());
        assert_eq!(status.directive(&grid, true), None);
        status.tick(2.0);
        assert!(!status.blinded());
    }

    #[test]
    fn reversal_outranks_decoy_only_when_allowed() {
        let grid = Grid::new(9, 9);
        let mut status = StatusTimers::default();
        status.apply(StatusEffect::Decoy { cell: Cell::new(4, 4), seconds: 5.0 });
        status.apply(StatusEffect::Reversal { seconds: 4.0 });
        assert_eq!(status.directive(&grid, true), Some(Directive::Flee));
        assert_eq!(status.directive(&grid, false), Some(Directive::Decoy(Cell::new(4, 4))));
    }
}
