//! Fixed-step accumulator that decouples simulation ticks from frame rate.

/// Slack for accumulated float error when comparing against one step.
const STEP_EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockAdvance {
    /// Fixed ticks the caller must run for this frame.
    pub ticks: u32,
    /// Backlog discarded by the sub-step cap, in seconds.
    pub dropped_seconds: f64,
    /// `accumulator / fixed_step` after the pass, in `[0, 1]`.
    pub alpha: f32,
}

impl ClockAdvance {
    pub fn starved(&self) -> bool {
        self.dropped_seconds > 0.0
    }
}

#[derive(Clone, Debug)]
pub struct FixedStepClock {
    fixed_step: f64,
    max_sub_steps: u32,
    max_frame_delta: f64,
    accumulator: f64,
    total_ticks: u64,
}

impl FixedStepClock {
    pub fn new(tick_rate_hz: f64, max_sub_steps: u32, max_frame_delta: f64) -> Self {
        Self {
            fixed_step: 1.0 / tick_rate_hz,
            max_sub_steps,
            max_frame_delta,
            accumulator: 0.0,
            total_ticks: 0,
        }
    }

    pub fn fixed_step(&self) -> f64 {
        self.fixed_step
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Feed one frame of wall-clock time and consume it in whole steps.
    ///
    /// Negative or non-finite deltas count as zero; large ones are clamped to
    /// `max_frame_delta`. When the sub-step cap is reached, whatever is left
    /// in the accumulator is dropped, even less than one step.
    pub fn advance(&mut self, real_dt: f64) -> ClockAdvance {
        let dt = if real_dt.is_finite() { real_dt.clamp(0.0, self.max_frame_delta) } else { 0.0 };
        self.accumulator += dt;

        let mut ticks = 0;
        while self.accumulator + STEP_EPSILON >= self.fixed_step && ticks < self.max_sub_steps {
            self.accumulator = (self.accumulator - self.fixed_step).max(0.0);
            ticks += 1;
        }
        self.total_ticks += u64::from(ticks);

        let mut dropped_seconds = 0.0;
        if ticks == self.max_sub_steps && self.accumulator > 0.0 {
            dropped_seconds = self.accumulator;
            self.accumulator = 0.0;
            tracing::warn!(dropped_seconds, "sub-step cap reached; dropping simulation backlog");
        }

        ClockAdvance { ticks, dropped_seconds, alpha: self.alpha() }
    }

    /// Render interpolation fraction.
    pub fn alpha(&self) -> f32 {
        if self.fixed_step <= 0.0 {
            return 0.0;
        }
        (self.accumulator / self.fixed_step).clamp(0.0, 1.0) as f32
    }

    /// Forget residual time, e.g. after a pause or a liveness restart.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
