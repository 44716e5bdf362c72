//! Bounded activation of ambient light sources around the player.

use serde::Serialize;
use slotmap::SlotMap;

use crate::grid::{Grid, LightPlacement};
use crate::sim::visibility::has_line_of_sight;
use crate::types::{Cell, LightId};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSource {
    pub cell: Cell,
    pub intensity: f32,
    /// Broken fixture; never a candidate.
    pub dead: bool,
    pub active: bool,
    /// Active and in line of sight of the player.
    pub casts_shadow: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RetuneReport {
    pub activated: usize,
    pub deactivated: usize,
    pub shadow_changes: usize,
    pub active: usize,
}

impl RetuneReport {
    pub fn writes(&self) -> usize {
        self.activated + self.deactivated + self.shadow_changes
    }
}

#[derive(Clone, Debug)]
pub struct LightManager {
    lights: SlotMap<LightId, LightSource>,
    order: Vec<LightId>,
    budget: usize,
    retune_interval: f32,
    cooldown: f32,
    blackout: bool,
}

impl LightManager {
    pub fn new(budget: usize, retune_interval: f32) -> Self {
        Self {
            lights: SlotMap::with_key(),
            order: Vec::new(),
            budget,
            retune_interval,
            cooldown: 0.0,
            blackout: false,
        }
    }

    pub fn from_placements(
        placements: &[LightPlacement],
        budget: usize,
        retune_interval: f32,
    ) -> Self {
        let mut manager = Self::new(budget, retune_interval);
        for placement in placements {
            let intensity = if placement.dead { 0.0 } else { 1.0 };
            manager.insert(placement.cell, intensity, placement.dead);
        }
        manager
    }

    pub fn insert(&mut self, cell: Cell, intensity: f32, dead: bool) -> LightId {
        let id = self.lights.insert(LightSource {
            cell,
            intensity,
            dead,
            active: false,
            casts_shadow: false,
        });
        self.order.push(id);
        id
    }

    pub fn get(&self, id: LightId) -> Option<&LightSource> {
        self.lights.get(id)
    }

    /// Sources in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (LightId, &LightSource)> {
        self.order.iter().filter_map(|&id| self.lights.get(id).map(|light| (id, light)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn active_count(&self) -> usize {
        self.lights.values().filter(|light| light.active).count()
    }

    pub fn is_blackout(&self) -> bool {
        self.blackout
    }

    /// Takes effect on the next `tick`.
    pub fn set_budget(&mut self, budget: usize) {
        self.budget = budget;
        self.cooldown = 0.0;
    }

    /// Takes effect on the next `tick`.
    pub fn set_blackout(&mut self, blackout: bool) {
        self.blackout = blackout;
        self.cooldown = 0.0;
    }

    /// Retune when the cadence timer has run out.
    pub fn tick(&mut self, dt: f32, grid: &Grid, player: Cell) -> Option<RetuneReport> {
        self.cooldown -= dt;
        if self.cooldown > 0.0 {
            return None;
        }
        self.cooldown = self.retune_interval;
        Some(self.retune(grid, player))
    }

    /// Activate the `budget` nearest live sources; ties keep insertion order.
    /// Flags are written only when they change.
    pub fn retune(&mut self, grid: &Grid, player: Cell) -> RetuneReport {
        let mut ranked: Vec<(i64, usize, LightId)> = if self.blackout {
            Vec::new()
        } else {
            self.order
                .iter()
                .enumerate()
                .filter(|(_, id)| self.lights.get(**id).is_some_and(|light| !light.dead))
                .map(|(index, &id)| (self.lights[id].cell.distance_squared(player), index, id))
                .collect()
        };
        ranked.sort_unstable();
        ranked.truncate(self.budget);

        let mut report = RetuneReport::default();
        for (index, &id) in self.order.iter().enumerate() {
            let selected = ranked.iter().any(|&(_, rank_index, _)| rank_index == index);
            let Some(light) = self.lights.get_mut(id) else {
                continue;
            };
            if light.active != selected {
                light.active = selected;
                if selected {
                    report.activated += 1;
                } else {
                    report.deactivated += 1;
                }
            }
            let shadow = selected && has_line_of_sight(grid, player, light.cell);
            if light.casts_shadow != shadow {
                light.casts_shadow = shadow;
                report.shadow_changes += 1;
            }
        }
        report.active = ranked.len();
        report
    }
}
