//! Frame-to-tick conversion and the fixed per-tick update order.

use std::mem;

use serde::Serialize;

use super::*;
use crate::sim::player::within_pickup;
use crate::sim::pursuit::PlayerView;
use crate::sim::visibility::has_line_of_sight;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameReport {
    pub simulated_ticks: u32,
    /// Wall-clock time discarded by the sub-step cap this frame.
    pub dropped_seconds: f64,
    /// Render interpolation fraction in `[0, 1]`.
    pub alpha: f32,
    pub events: Vec<SimEvent>,
}

impl Session {
    /// Feed one frame of wall-clock time and run every whole tick it covers.
    pub fn advance(&mut self, real_dt: f64) -> FrameReport {
        if self.paused {
            return FrameReport {
                simulated_ticks: 0,
                dropped_seconds: 0.0,
                alpha: self.clock.alpha(),
                events: mem::take(&mut self.events),
            };
        }

        let step = self.clock.advance(real_dt);
        let dt = self.clock.fixed_step() as f32;
        for _ in 0..step.ticks {
            self.step(dt);
        }
        FrameReport {
            simulated_ticks: step.ticks,
            dropped_seconds: step.dropped_seconds,
            alpha: step.alpha,
            events: mem::take(&mut self.events),
        }
    }

    /// Run exactly `ticks` fixed steps, bypassing the wall-clock accumulator.
    pub fn run_ticks(&mut self, ticks: u32) -> Vec<SimEvent> {
        let dt = self.clock.fixed_step() as f32;
        for _ in 0..ticks {
            self.step(dt);
        }
        mem::take(&mut self.events)
    }

    /// One simulation tick. Runs to completion; never waits on the path worker.
    fn step(&mut self, dt: f32) {
        self.tick += 1;
        self.elapsed += f64::from(dt);

        self.player.previous_position = self.player.position;
        for pursuer in self.pool.iter_active_mut() {
            pursuer.previous_position = pursuer.position;
        }

        self.apply_path_responses();
        self.player.update(&self.input, &self.grid, self.profile.stamina, dt);
        self.collect_objectives();
        self.run_spawn_schedule();
        self.update_pursuers(dt);

        let player_cell = self.player.cell();
        self.lights.tick(dt, &self.grid, player_cell);
    }

    fn apply_path_responses(&mut self) {
        for response in self.paths.poll_responses() {
            match self.pool.get_mut(response.agent) {
                Some(pursuer) => {
                    self.paths.deliver(&response, &mut pursuer.path);
                }
                None => self.paths.discard(&response),
            }
        }
    }

    fn collect_objectives(&mut self) {
        let position = self.player.position;
        let before = self.remaining_objectives.len();
        let mut collected = Vec::new();
        self.remaining_objectives.retain(|&cell| {
            let picked = within_pickup(position, cell);
            if picked {
                collected.push(cell);
            }
            !picked
        });
        if collected.is_empty() {
            return;
        }

        let mut remaining = before;
        for cell in collected {
            remaining -= 1;
            self.events.push(SimEvent::ObjectiveCollected { cell, remaining });
        }
        if remaining == 0 {
            tracing::info!(tick = self.tick, "all objectives collected");
            self.events.push(SimEvent::AllObjectivesCollected);
        }

        self.update_rage();
    }

    /// Rage holds once remaining objectives fall to the configured fraction.
    pub(super) fn update_rage(&mut self) {
        if self.total_objectives == 0 {
            return;
        }
        let remaining = self.remaining_objectives.len();
        let threshold =
            (self.total_objectives as f32 * self.config.ai.rage_fraction).ceil() as usize;
        let rage = remaining <= threshold;
        if rage && !self.rage {
            tracing::info!(remaining, threshold, "rage started");
            self.events.push(SimEvent::RageStarted);
        }
        self.rage = rage;
    }

    fn run_spawn_schedule(&mut self) {
        let elapsed = self.elapsed as f32;
        while let Some(&at) = self.profile.spawn_schedule.get(self.next_scheduled_spawn)
            && elapsed >= at
        {
            self.next_scheduled_spawn += 1;
            self.spawn_extra_pursuer();
        }
    }

    fn update_pursuers(&mut self, dt: f32) {
        let player_cell = self.player.cell();
        let status = self.player.status;
        let view = PlayerView {
            position: self.player.position,
            cell: player_cell,
            yaw: self.player.yaw,
            sprinting: self.player.sprinting,
            blinded: status.blinded(),
            directive: status.directive(&self.grid, self.profile.allow_reversal),
        };
        let tuning = &self.config.ai;

        for pursuer in self.pool.iter_active_mut() {
            pursuer.rage = self.rage;

            if status.stunned() {
                pursuer.path.clear();
            } else {
                let before = pursuer.mode;
                if let Some(goal) = pursuer.think(&view, &self.grid, tuning, dt, &mut self.rng) {
                    let start = pursuer.cell();
                    let requested =
                        self.paths.request_path(pursuer.id, &mut pursuer.path, start, goal);
                    if let Err(err) = requested {
                        tracing::warn!(agent = pursuer.id.0, error = %err, "path request rejected");
                        pursuer.path.clear();
                    }
                }
                if pursuer.mode != before {
                    self.events.push(SimEvent::ModeChanged {
                        agent: pursuer.id,
                        from: before,
                        to: pursuer.mode,
                    });
                }
                let speed = pursuer.move_speed(&self.profile, tuning, view.blinded);
                pursuer.follow_path(speed, tuning.arrival_tolerance, dt);
            }

            pursuer.muffled = !has_line_of_sight(&self.grid, player_cell, pursuer.cell());

            let touching = pursuer.position.distance(view.position) < tuning.catch_distance
                && !status.invulnerable();
            if touching && !pursuer.in_contact {
                tracing::info!(agent = pursuer.id.0, tick = self.tick, "player caught");
                self.events.push(SimEvent::PlayerCaught { agent: pursuer.id });
            }
            pursuer.in_contact = touching;
        }
    }
}
