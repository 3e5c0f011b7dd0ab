//! Fixed timestep accumulator
//!
//! Converts variable frame times into a whole number of simulation ticks,
//! capped per frame to prevent a spiral of death on slow frames.

use std::time::Duration;

use log::debug;

use crate::consts::{MAX_SUBSTEPS, TICK_RATE};

#[derive(Debug, Clone)]
pub struct FixedStepClock {
    step: Duration,
    max_steps: u32,
    accumulator: Duration,
    dropped_ticks: u64,
}

impl Default for FixedStepClock {
    fn default() -> Self {
        Self::new(Duration::from_secs(1) / TICK_RATE, MAX_SUBSTEPS)
    }
}

impl FixedStepClock {
    pub fn new(step: Duration, max_steps: u32) -> Self {
        Self {
            step,
            max_steps,
            accumulator: Duration::ZERO,
            dropped_ticks: 0,
        }
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// Ticks discarded because a frame exceeded the catch-up cap
    pub fn dropped_ticks(&self) -> u64 {
        self.dropped_ticks
    }

    /// Add a frame's elapsed time; returns how many ticks to run now
    pub fn advance(&mut self, frame: Duration) -> u32 {
        self.accumulator += frame;
        let step_nanos = self.step.as_nanos();
        let available = self.accumulator.as_nanos() / step_nanos;
        let steps = available.min(self.max_steps as u128) as u32;
        self.accumulator -= self.step * steps;
        if available > steps as u128 {
            let dropped = (available - steps as u128) as u64;
            self.dropped_ticks += dropped;
            debug!("Frame too slow, dropping {dropped} ticks");
            self.accumulator = Duration::from_nanos((self.accumulator.as_nanos() % step_nanos) as u64);
        }
        steps
    }
}
