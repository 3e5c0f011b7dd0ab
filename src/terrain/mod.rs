//! Terrain streaming pipeline
//!
//! Tiles move between exactly one owner at a time:
//! - the manager's two active slots (on screen)
//! - the ready pool (generated, waiting to scroll in)
//! - the recyclable pool (spent, waiting to be regenerated)
//! - the background generator, while it is filling one
//!
//! The foreground owns the `WindowManager`; the background worker only ever
//! sees a `TileExchange` and cannot reach the active tiles.

pub mod generator;
pub mod manager;
pub mod queue;
pub mod tile;
pub mod worker;

use std::time::Duration;

use thiserror::Error;

pub use generator::{Footprint, TerrainGenerator, sample_jump_interval};
pub use manager::{TileExchange, WindowManager};
pub use queue::TileQueue;
pub use tile::{Block, Tile, TileId};
pub use worker::GeneratorWorker;

/// Failures raised by the terrain pipeline (all developer-facing)
#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("cell ({x}, {y}) is outside the tile grid")]
    CellOutOfRange { x: usize, y: usize },
    #[error("window manager was already launched")]
    AlreadyLaunched,
    #[error("window manager has not been launched")]
    NotLaunched,
    #[error("ready pool empty at tile promotion (waited {waited:?})")]
    Starved { waited: Duration },
    #[error("failed to spawn terrain generator thread")]
    WorkerSpawn(#[source] std::io::Error),
}
