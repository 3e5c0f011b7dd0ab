//! Foreground scroll driver
//!
//! Owns the world's horizontal speed ramp and is the only writer of the
//! terrain scroll position.

use crate::consts::*;
use crate::fixed::Fixed;
use crate::physics;
use crate::terrain::{TerrainError, WindowManager};

#[derive(Debug, Clone)]
pub struct ScrollDriver {
    speed: Fixed,
    distance: Fixed,
    stopped: bool,
}

impl Default for ScrollDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollDriver {
    pub fn new() -> Self {
        Self {
            speed: PLAYER_INITIAL_SPEED,
            distance: Fixed::ZERO,
            stopped: false,
        }
    }

    /// Current scroll speed (pixels/s)
    pub fn speed(&self) -> Fixed {
        self.speed
    }

    /// Total distance scrolled
    pub fn distance(&self) -> Fixed {
        self.distance
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Freeze the world; later ticks scroll nothing
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Ramp the speed and scroll the terrain by one step.
    ///
    /// State only advances if the scroll succeeds, so a starved tick can be
    /// retried without losing time.
    pub fn tick(&mut self, terrain: &mut WindowManager, dt: Fixed) -> Result<Fixed, TerrainError> {
        if self.stopped {
            return Ok(Fixed::ZERO);
        }
        let speed = physics::advance_speed(self.speed, dt);
        let dx = speed * dt;
        terrain.scroll(dx)?;
        self.speed = speed;
        self.distance += dx;
        Ok(dx)
    }
}
