//! Don't Touch Blocks - a side-scrolling reflex game
//!
//! Core modules:
//! - `fixed`: Fixed-point decimal scalar and vector math
//! - `physics`: Motion formulas shared by the player and the terrain generator
//! - `terrain`: Tile streaming pipeline (tiles, window manager, background generator)
//! - `sim`: Fixed timestep game session (scroll driver, player, frame clock)
//! - `renderer`: Software render target
//! - `persistence`: Key-value save store with best-score helpers
//! - `settings`: Player preferences

pub mod fixed;
pub mod persistence;
pub mod physics;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod terrain;

pub use fixed::{Fixed, FixedVec2};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    use crate::fixed::{Fixed, FixedVec2};

    /// Window dimensions in pixels
    pub const WINDOW_WIDTH: i64 = 1280;
    pub const WINDOW_HEIGHT: i64 = 800;
    pub const BACKGROUND_COLOR: [u8; 4] = [205, 201, 201, 255];

    /// Side length of one terrain cell in pixels
    pub const CELL_SIDE: i64 = 20;
    /// Tile grid dimensions (one tile covers exactly one screen)
    pub const TILE_COLUMNS: usize = (WINDOW_WIDTH / CELL_SIDE) as usize;
    pub const TILE_ROWS: usize = (WINDOW_HEIGHT / CELL_SIDE) as usize;
    pub const TILE_PIXEL_WIDTH: Fixed = Fixed::from_int(WINDOW_WIDTH);

    /// Fixed simulation rate (100 Hz)
    pub const TICK_RATE: u32 = 100;
    pub const TICK_TIME: Fixed = Fixed::from_millis(1000 / TICK_RATE as i64);
    /// Maximum ticks run per rendered frame before the backlog is dropped
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Gravity (pixels/s², +y is down)
    pub const GRAVITY_ACCEL: Fixed = Fixed::from_int(1000);

    /// Player defaults
    pub const PLAYER_JUMP_SPEED: Fixed = Fixed::from_int(300);
    pub const PLAYER_OFFSET_X: Fixed = Fixed::from_int(200);
    pub const PLAYER_INITIAL_POS_Y: Fixed = Fixed::from_int(200);
    pub const PLAYER_RADIUS: f32 = 20.0;

    /// Horizontal speed ramp (pixels/s), reaches max after `SPEED_RAMP_SECONDS`
    pub const PLAYER_INITIAL_SPEED: Fixed = Fixed::from_int(300);
    pub const PLAYER_MAX_SPEED: Fixed = Fixed::from_int(900);
    pub const SPEED_RAMP_SECONDS: i64 = 300;

    /// Generated tiles the manager tries to keep queued ahead of the screen
    pub const READY_POOL_TARGET: usize = 3;

    /// Vertical band the generator's virtual jumper stays inside
    pub const JUMPER_POS_Y_MIN: Fixed = Fixed::from_int(60);
    pub const JUMPER_POS_Y_MAX: Fixed = Fixed::from_int(WINDOW_HEIGHT - 60);
    /// Shortest time between generated jumps (seconds)
    pub const JUMP_INTERVAL_MIN: f64 = 0.2;
    /// Split between the short and long interval ranges (seconds)
    pub const JUMP_INTERVAL_SPLIT: f64 = 0.5;
    pub const JUMP_INTERVAL_SHORT_PROB: f64 = 0.8;

    /// Corridor padding range in cells (x = low, y = high), narrows over time
    pub const PADDING_RANGE_START: FixedVec2 = FixedVec2::from_ints(1, 5);
    pub const PADDING_RANGE_END: FixedVec2 = FixedVec2::from_ints(0, 2);
    pub const PADDING_NARROW_SECONDS: i64 = 120;
}
