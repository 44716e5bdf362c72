//! Session configuration snapshot: difficulty presets, AI tuning and scheduler
//! parameters. Loaded from TOML by the headless tools; every field has a default.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Novice,
    #[default]
    Standard,
    Hard,
    Nightmare,
    Impossible,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::Novice,
        Difficulty::Standard,
        Difficulty::Hard,
        Difficulty::Nightmare,
        Difficulty::Impossible,
    ];

    pub fn profile(self) -> DifficultyProfile {
        match self {
            Difficulty::Novice => DifficultyProfile {
                multiplier: 0.72,
                stamina: None,
                spawn_schedule: &[],
                initial_extra_pursuers: 0,
                allow_reversal: true,
            },
            Difficulty::Standard => DifficultyProfile {
                multiplier: 1.0,
                stamina: None,
                spawn_schedule: &[],
                initial_extra_pursuers: 0,
                allow_reversal: true,
            },
            Difficulty::Hard => DifficultyProfile {
                multiplier: 1.35,
                stamina: Some(StaminaRules {
                    max: 100.0,
                    drain: 20.0,
                    regen: 12.0,
                    recover_at: 25.0,
                }),
                spawn_schedule: &[30.0],
                initial_extra_pursuers: 0,
                allow_reversal: false,
            },
            Difficulty::Nightmare => DifficultyProfile {
                multiplier: 1.7,
                stamina: Some(StaminaRules {
                    max: 60.0,
                    drain: 34.0,
                    regen: 7.0,
                    recover_at: 20.0,
                }),
                spawn_schedule: &[20.0, 45.0],
                initial_extra_pursuers: 1,
                allow_reversal: false,
            },
            Difficulty::Impossible => DifficultyProfile {
                multiplier: 2.8,
                stamina: None,
                spawn_schedule: &[],
                initial_extra_pursuers: 0,
                allow_reversal: false,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Novice => "novice",
            Difficulty::Standard => "standard",
            Difficulty::Hard => "hard",
            Difficulty::Nightmare => "nightmare",
            Difficulty::Impossible => "impossible",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|difficulty| difficulty.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownDifficulty(s.to_string()))
    }
}

/// Sprint stamina. Absent on difficulties where sprinting is unlimited.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaminaRules {
    pub max: f32,
    pub drain: f32,
    pub regen: f32,
    /// Stamina that must be regained after exhaustion before sprinting again.
    pub recover_at: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyProfile {
    /// Pursuer speed multiplier; also widens the base hearing radius.
    pub multiplier: f32,
    pub stamina: Option<StaminaRules>,
    /// Elapsed game seconds at which an extra pursuer joins.
    pub spawn_schedule: &'static [f32],
    pub initial_extra_pursuers: usize,
    pub allow_reversal: bool,
}

impl DifficultyProfile {
    pub fn pursuer_base_speed(&self) -> f32 {
        5.2 * (0.8 + self.multiplier * 0.3)
    }

    pub fn hearing_range(&self) -> f32 {
        18.0 + self.multiplier * 3.0
    }
}

/// Pursuit AI constants. Distances are in world units, times in seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    pub ambush_chance: f32,
    pub ambush_cooldown_min: f32,
    pub ambush_cooldown_jitter: f32,
    /// Cells ahead of the player's facing used as the ambush goal.
    pub ambush_lookahead: i32,
    /// Below this distance the player counts as adjacent and ambush is skipped.
    pub adjacency_distance: f32,
    pub sprint_hearing_range: f32,
    pub decision_interval: f32,
    pub rage_decision_interval: f32,
    pub blinded_decision_interval: f32,
    pub arrival_tolerance: f32,
    pub catch_distance: f32,
    /// Rage starts once remaining objectives drop to this fraction of the total.
    pub rage_fraction: f32,
    pub patrol_speed: f32,
    pub pursuit_speed: f32,
    pub rage_speed: f32,
    pub blinded_speed: f32,
    /// Cells within which a patrol waypoint counts as reached.
    pub patrol_arrival_cells: i32,
    pub flee_samples: usize,
    pub spawn_samples: usize,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            ambush_chance: 0.15,
            ambush_cooldown_min: 5.0,
            ambush_cooldown_jitter: 5.0,
            ambush_lookahead: 4,
            adjacency_distance: 8.0,
            sprint_hearing_range: 30.0,
            decision_interval: 0.25,
            rage_decision_interval: 0.15,
            blinded_decision_interval: 0.4,
            arrival_tolerance: 0.3,
            catch_distance: 1.8,
            rage_fraction: 0.2,
            patrol_speed: 1.0,
            pursuit_speed: 1.15,
            rage_speed: 1.8,
            blinded_speed: 0.65,
            patrol_arrival_cells: 2,
            flee_samples: 24,
            spawn_samples: 20,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub seed: u64,
    pub difficulty: Difficulty,
    pub tick_rate_hz: f64,
    pub max_sub_steps: u32,
    /// Ceiling applied to each frame delta before it reaches the accumulator.
    pub max_frame_delta: f64,
    /// Maximum simultaneously active light sources (K).
    pub light_budget: usize,
    pub light_retune_interval: f32,
    pub pool_capacity: usize,
    /// Use the background path worker; falls back to inline search if it fails.
    pub async_paths: bool,
    pub ai: AiTuning,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            difficulty: Difficulty::Standard,
            tick_rate_hz: 60.0,
            max_sub_steps: 8,
            max_frame_delta: 0.25,
            light_budget: 6,
            light_retune_interval: 0.18,
            pool_capacity: 6,
            async_paths: true,
            ai: AiTuning::default(),
        }
    }
}

impl SessionConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_rate_hz.is_finite() && self.tick_rate_hz > 0.0) {
            return Err(invalid("tick_rate_hz", "must be a positive number"));
        }
        if self.max_sub_steps == 0 {
            return Err(invalid("max_sub_steps", "must be at least 1"));
        }
        if !(self.max_frame_delta.is_finite() && self.max_frame_delta > 0.0) {
            return Err(invalid("max_frame_delta", "must be a positive number"));
        }
        if self.pool_capacity == 0 || self.pool_capacity > usize::from(u16::MAX) {
            return Err(invalid("pool_capacity", "must be between 1 and 65535"));
        }
        if !(self.light_retune_interval >= 0.0) {
            return Err(invalid("light_retune_interval", "must not be negative"));
        }
        let ai = &self.ai;
        if !(0.0..=1.0).contains(&ai.ambush_chance) {
            return Err(invalid("ai.ambush_chance", "must be within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&ai.rage_fraction) {
            return Err(invalid("ai.rage_fraction", "must be within [0, 1]"));
        }
        for (field, value) in [
            ("ai.patrol_speed", ai.patrol_speed),
            ("ai.pursuit_speed", ai.pursuit_speed),
            ("ai.rage_speed", ai.rage_speed),
            ("ai.blinded_speed", ai.blinded_speed),
            ("ai.decision_interval", ai.decision_interval),
            ("ai.rage_decision_interval", ai.rage_decision_interval),
            ("ai.blinded_decision_interval", ai.blinded_decision_interval),
            ("ai.arrival_tolerance", ai.arrival_tolerance),
            ("ai.catch_distance", ai.catch_distance),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(field, "must be a non-negative number"));
            }
        }
        Ok(())
    }

    pub fn profile(&self) -> DifficultyProfile {
        self.difficulty.profile()
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field, reason: reason.to_string() }
}
