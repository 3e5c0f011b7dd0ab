//! One game run
//!
//! Wires the terrain pipeline, scroll driver and player together with
//! explicit ownership instead of global lookups. Dropping the session stops
//! the generator thread.

use log::info;

use super::driver::ScrollDriver;
use super::player::{JumpLatch, Player};
use crate::consts::*;
use crate::fixed::Fixed;
use crate::persistence::{self, PersistenceError, SaveStore};
use crate::renderer::{Canvas, Rgba};
use crate::terrain::{GeneratorWorker, TerrainError, TerrainGenerator, WindowManager};

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Playing,
    /// Player died; the world is frozen
    GameOver,
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Demo mode - jump automatically to follow the corridor
    pub autopilot: bool,
}

pub struct GameSession {
    terrain: WindowManager,
    worker: Option<GeneratorWorker>,
    driver: ScrollDriver,
    player: Player,
    jump: JumpLatch,
    phase: GamePhase,
    score: Fixed,
    time_ticks: u64,
}

impl GameSession {
    /// Launch the terrain and start the background generator
    pub fn new(seed: u64) -> Result<Self, TerrainError> {
        let mut generator = TerrainGenerator::new(seed);
        let mut terrain = WindowManager::new();
        terrain.launch(|tile| generator.generate(tile))?;
        let worker = GeneratorWorker::spawn(generator, terrain.exchange())?;
        info!("Session started (seed {seed})");
        Ok(Self {
            terrain,
            worker: Some(worker),
            driver: ScrollDriver::new(),
            player: Player::new(),
            jump: JumpLatch::default(),
            phase: GamePhase::Playing,
            score: Fixed::ZERO,
            time_ticks: 0,
        })
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Seconds survived
    pub fn score(&self) -> Fixed {
        self.score
    }

    pub fn speed(&self) -> Fixed {
        self.driver.speed()
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn terrain(&self) -> &WindowManager {
        &self.terrain
    }

    pub fn generator_running(&self) -> bool {
        self.worker.as_ref().is_some_and(GeneratorWorker::is_running)
    }

    /// Request a jump on the next tick; repeated presses before it collapse
    /// into one
    pub fn press_jump(&mut self) {
        self.jump.press();
    }

    /// Advance the run by one fixed timestep.
    ///
    /// A `Starved` error means nothing moved this tick; calling again retries.
    pub fn tick(&mut self, input: &TickInput) -> Result<(), TerrainError> {
        if self.phase == GamePhase::GameOver {
            return Ok(());
        }
        let dt = TICK_TIME;
        self.driver.tick(&mut self.terrain, dt)?;
        self.time_ticks += 1;

        let pressed = self.jump.take();
        let jump = pressed || (input.autopilot && self.autopilot_wants_jump());
        self.score += dt;
        if self.player.tick(jump, &self.terrain, dt) {
            self.game_over();
        }
        Ok(())
    }

    fn game_over(&mut self) {
        self.phase = GamePhase::GameOver;
        self.driver.stop();
        // The join happens when the session is dropped, off the tick path
        if let Some(worker) = &self.worker {
            worker.request_stop();
        }
        info!(
            "Game over after {} ticks: score {}, speed {}",
            self.time_ticks,
            self.score.quantize(1),
            self.driver.speed().quantize(1)
        );
    }

    /// Jump when below the middle of the open corridor just ahead and falling
    fn autopilot_wants_jump(&self) -> bool {
        let speed_y = self.player.speed_y();
        if speed_y <= Fixed::ZERO {
            return false;
        }
        let look_ahead = Fixed::from_int(CELL_SIDE) + self.driver.speed() * Fixed::from_millis(100);
        let y = self.player.pos_y();
        let Some((top, bottom)) = self.terrain.corridor_at(PLAYER_OFFSET_X + look_ahead, y) else {
            return false;
        };
        let middle = (top + bottom) / 2;
        y > middle || y > bottom - Fixed::from_int(CELL_SIDE)
    }

    /// Record the score if it beats the stored best. Returns true on a new best.
    pub fn record_best_score(&self, store: &mut dyn SaveStore) -> Result<bool, PersistenceError> {
        let is_new_best = persistence::record_best_score(store, self.score)?;
        if is_new_best {
            info!("New best score: {}", self.score);
        }
        Ok(is_new_best)
    }

    /// Compose the current frame
    pub fn render(&self, canvas: &mut Canvas) {
        canvas.fill(Rgba::from_array(BACKGROUND_COLOR));
        self.terrain.draw(canvas);
        self.player.draw(canvas);
    }
}
