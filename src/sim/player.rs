//! The player's circle
//!
//! Only moves vertically; the world scrolls past it. Touching a block or
//! leaving the screen vertically is fatal and permanent.

use glam::Vec2;

use crate::consts::*;
use crate::fixed::Fixed;
use crate::physics;
use crate::renderer::{Canvas, Rgba};
use crate::terrain::WindowManager;

/// One-shot "jump requested" pulse, cleared when read
#[derive(Debug, Clone, Default)]
pub struct JumpLatch {
    requested: bool,
}

impl JumpLatch {
    pub fn press(&mut self) {
        self.requested = true;
    }

    /// Read and clear the pulse
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.requested)
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pos_y: Fixed,
    speed_y: Fixed,
    is_dead: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            pos_y: PLAYER_INITIAL_POS_Y,
            speed_y: Fixed::ZERO,
            is_dead: false,
        }
    }

    pub fn pos_y(&self) -> Fixed {
        self.pos_y
    }

    pub fn speed_y(&self) -> Fixed {
        self.speed_y
    }

    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    /// Advance one step. Returns true on the tick the player dies.
    pub fn tick(&mut self, jump: bool, terrain: &WindowManager, dt: Fixed) -> bool {
        if self.is_dead {
            return false;
        }
        if jump {
            self.speed_y = -PLAYER_JUMP_SPEED;
        }
        self.speed_y = physics::apply_gravity(self.speed_y, dt);
        self.pos_y += self.speed_y * dt;

        let y = self.pos_y;
        if y < Fixed::ZERO
            || y > Fixed::from_int(WINDOW_HEIGHT)
            || terrain.test_collision(PLAYER_OFFSET_X, y)
        {
            self.is_dead = true;
        }
        self.is_dead
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        let center = Vec2::new(PLAYER_OFFSET_X.to_f32(), self.pos_y.floor() as f32);
        canvas.fill_circle(center, PLAYER_RADIUS, Rgba::BLACK);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::Block;
    use std::time::Duration;

    fn open_terrain() -> WindowManager {
        let mut terrain = WindowManager::with_starvation_grace(Duration::ZERO);
        terrain.launch(|_| {}).unwrap();
        terrain
    }

    #[test]
    fn test_jump_latch_is_one_shot() {
        let mut latch = JumpLatch::default();
        assert!(!latch.take());
        latch.press();
        assert!(latch.take());
        assert!(!latch.take());
    }

    #[test]
    fn test_gravity_and_jump() {
        let terrain = open_terrain();
        let mut player = Player::new();
        assert!(!player.tick(false, &terrain, TICK_TIME));
        assert_eq!(player.speed_y(), Fixed::from_int(10));
        assert_eq!(player.pos_y(), "200.1".parse().unwrap());

        assert!(!player.tick(true, &terrain, TICK_TIME));
        assert_eq!(player.speed_y(), Fixed::from_int(-290));
        assert!(player.pos_y() < PLAYER_INITIAL_POS_Y);
    }

    #[test]
    fn test_falling_off_screen_is_terminal() {
        let terrain = open_terrain();
        let mut player = Player::new();
        let mut died_at = None;
        for tick in 0..1_000 {
            if player.tick(false, &terrain, TICK_TIME) {
                died_at = Some(tick);
                break;
            }
        }
        assert!(died_at.is_some());
        assert!(player.is_dead());

        // Dead players no longer move
        let y = player.pos_y();
        assert!(!player.tick(true, &terrain, TICK_TIME));
        assert_eq!(player.pos_y(), y);
    }

    #[test]
    fn test_block_under_player_kills() {
        let mut terrain = WindowManager::with_starvation_grace(Duration::ZERO);
        let row = (PLAYER_INITIAL_POS_Y.floor() / CELL_SIDE) as usize;
        // Column under the player once the filled tile's left edge is at x = 1
        let column = ((PLAYER_OFFSET_X.floor() - 1) / CELL_SIDE) as usize;
        terrain
            .launch(|tile| {
                tile.set_cell(column, row, Some(Block::new(Rgba::BLACK))).unwrap();
            })
            .unwrap();
        // The filled tile starts one screen to the right
        let mut player = Player::new();
        assert!(!player.tick(false, &terrain, TICK_TIME));

        terrain.scroll(TILE_PIXEL_WIDTH - Fixed::ONE).unwrap();
        let mut player = Player::new();
        assert!(player.tick(false, &terrain, TICK_TIME));
        assert!(player.is_dead());
    }
}
