//! Window manager: the two on-screen tiles and the pools feeding them
//!
//! `current` covers the left part of the screen and `next` sits exactly one
//! tile width to its right. When `current` scrolls fully off-screen it is
//! recycled, `next` takes its place and a generated tile is pulled from the
//! ready pool to become the new `next`.

use std::sync::Arc;
use std::time::Duration;

use glam::IVec2;
use log::{debug, error, info};

use super::TerrainError;
use super::queue::TileQueue;
use super::tile::{Tile, TileId};
use crate::consts::*;
use crate::fixed::Fixed;
use crate::renderer::Canvas;

/// How long promotion waits on an empty ready pool before giving up
pub const STARVATION_GRACE: Duration = Duration::from_millis(50);

/// The generator's handle on the two pools.
///
/// Has no access to the active tiles.
#[derive(Debug, Clone)]
pub struct TileExchange {
    ready: Arc<TileQueue>,
    recyclable: Arc<TileQueue>,
}

impl TileExchange {
    fn new() -> Self {
        Self {
            ready: Arc::new(TileQueue::new()),
            recyclable: Arc::new(TileQueue::new()),
        }
    }

    /// Non-blocking take of a spent tile to regenerate
    pub fn try_take_recyclable(&self) -> Option<Box<Tile>> {
        self.recyclable.try_get()
    }

    /// Hand a fully generated (and rasterized) tile to the manager
    pub fn deposit_ready(&self, tile: Box<Tile>) {
        self.ready.put(tile);
    }

    pub fn ready_len(&self) -> usize {
        self.ready.len()
    }

    pub fn recyclable_len(&self) -> usize {
        self.recyclable.len()
    }
}

struct ActiveTiles {
    current: Box<Tile>,
    next: Box<Tile>,
}

pub struct WindowManager {
    exchange: TileExchange,
    active: Option<ActiveTiles>,
    starvation_grace: Duration,
    next_tile_id: u32,
    promotions: u64,
}

impl Default for WindowManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowManager {
    pub fn new() -> Self {
        Self::with_starvation_grace(STARVATION_GRACE)
    }

    /// Manager whose promotion waits at most `grace` for a ready tile
    pub fn with_starvation_grace(grace: Duration) -> Self {
        Self {
            exchange: TileExchange::new(),
            active: None,
            starvation_grace: grace,
            next_tile_id: 0,
            promotions: 0,
        }
    }

    /// Handle for the background generator
    pub fn exchange(&self) -> TileExchange {
        self.exchange.clone()
    }

    pub fn is_launched(&self) -> bool {
        self.active.is_some()
    }

    fn new_tile(&mut self) -> Box<Tile> {
        let id = TileId(self.next_tile_id);
        self.next_tile_id += 1;
        Box::new(Tile::new(id))
    }

    /// Create the two active tiles and prime the pools.
    ///
    /// `current` starts empty and flush with the left edge of the screen;
    /// `next` is filled synchronously by `fill` and placed right of it.
    pub fn launch<F>(&mut self, fill: F) -> Result<(), TerrainError>
    where
        F: FnOnce(&mut Tile),
    {
        if self.active.is_some() {
            return Err(TerrainError::AlreadyLaunched);
        }
        let mut current = self.new_tile();
        current.place_at(Fixed::ZERO);
        let mut next = self.new_tile();
        fill(&mut next);
        next.place_at(TILE_PIXEL_WIDTH);
        self.active = Some(ActiveTiles { current, next });
        self.top_up_recyclables();
        info!(
            "Terrain launched ({} recyclable tiles primed)",
            self.exchange.recyclable.len()
        );
        Ok(())
    }

    /// Scroll both active tiles left by `dx`, promoting as tiles leave the screen.
    ///
    /// Every ready tile the scroll will need is claimed before anything moves.
    /// If the ready pool stays empty for the starvation grace period, claimed
    /// tiles go back to the front of the pool, nothing moves and `Starved` is
    /// returned; the caller retries the same scroll later.
    pub fn scroll(&mut self, dx: Fixed) -> Result<(), TerrainError> {
        let active = self.active.as_mut().ok_or(TerrainError::NotLaunched)?;

        let mut incoming = Vec::new();
        let mut offset = active.current.offset_x() - dx;
        while offset <= -TILE_PIXEL_WIDTH {
            let Some(tile) = self.exchange.ready.get_timeout(self.starvation_grace) else {
                for tile in incoming.into_iter().rev() {
                    self.exchange.ready.put_front(tile);
                }
                error!(
                    "Ready pool starved at promotion ({} recyclable waiting)",
                    self.exchange.recyclable.len()
                );
                return Err(TerrainError::Starved {
                    waited: self.starvation_grace,
                });
            };
            incoming.push(tile);
            offset += TILE_PIXEL_WIDTH;
        }

        active.current.scroll(dx);
        active.next.scroll(dx);
        for mut tile in incoming {
            tile.place_at(active.next.offset_x() + TILE_PIXEL_WIDTH);
            let promoted = std::mem::replace(&mut active.next, tile);
            let mut spent = std::mem::replace(&mut active.current, promoted);
            debug!(
                "Promoted tile {:?}, recycling {:?}, next {:?}",
                active.current.id(),
                spent.id(),
                active.next.id()
            );
            spent.recycle();
            self.exchange.recyclable.put(spent);
            self.promotions += 1;
        }

        self.top_up_recyclables();
        Ok(())
    }

    /// Create empty tiles until ready + recyclable reaches the target depth
    fn top_up_recyclables(&mut self) {
        let wanted = READY_POOL_TARGET.saturating_sub(self.exchange.ready.len());
        let missing = wanted.saturating_sub(self.exchange.recyclable.len());
        for _ in 0..missing {
            let tile = self.new_tile();
            debug!("Allocated tile {:?}", tile.id());
            self.exchange.recyclable.put(tile);
        }
    }

    pub fn try_take_recyclable(&self) -> Option<Box<Tile>> {
        self.exchange.try_take_recyclable()
    }

    pub fn deposit_ready(&self, tile: Box<Tile>) {
        self.exchange.deposit_ready(tile);
    }

    /// True if either active tile has a block at the world position.
    ///
    /// Positions outside a tile's grid never collide with that tile.
    pub fn test_collision(&self, world_x: Fixed, world_y: Fixed) -> bool {
        self.active_tiles().into_iter().any(|tile| {
            let (cx, cy) = tile.world_to_cell(world_x, world_y);
            tile.block_at(cx, cy).is_some()
        })
    }

    /// World-space vertical extent `(top, bottom)` of the open run of cells
    /// nearest to `world_y` in the column under `world_x`
    pub fn corridor_at(&self, world_x: Fixed, world_y: Fixed) -> Option<(Fixed, Fixed)> {
        let tile = self.active_tiles().into_iter().find(|tile| {
            let (cx, _) = tile.world_to_cell(world_x, world_y);
            (0..TILE_COLUMNS as i64).contains(&cx)
        })?;
        let (cx, cy) = tile.world_to_cell(world_x, world_y);
        let column = cx as usize;
        let row = cy.clamp(0, TILE_ROWS as i64 - 1) as usize;
        let is_open = |y: usize| tile.block_at(column as i64, y as i64).is_none();

        let seed_row = (0..TILE_ROWS)
            .filter(|&y| is_open(y))
            .min_by_key(|&y| y.abs_diff(row))?;
        let mut top = seed_row;
        while top > 0 && is_open(top - 1) {
            top -= 1;
        }
        let mut bottom = seed_row;
        while bottom + 1 < TILE_ROWS && is_open(bottom + 1) {
            bottom += 1;
        }
        Some((
            Fixed::from_int(top as i64 * CELL_SIDE),
            Fixed::from_int((bottom as i64 + 1) * CELL_SIDE),
        ))
    }

    /// Blit both active tile images at their current offsets
    pub fn draw(&self, canvas: &mut Canvas) {
        for tile in self.active_tiles() {
            canvas.blit(tile.image(), IVec2::new(tile.offset_x().floor() as i32, 0));
        }
    }

    fn active_tiles(&self) -> Vec<&Tile> {
        match &self.active {
            Some(active) => vec![&*active.current, &*active.next],
            None => Vec::new(),
        }
    }

    pub fn current(&self) -> Option<&Tile> {
        self.active.as_ref().map(|a| &*a.current)
    }

    pub fn next(&self) -> Option<&Tile> {
        self.active.as_ref().map(|a| &*a.next)
    }

    pub fn ready_len(&self) -> usize {
        self.exchange.ready.len()
    }

    pub fn recyclable_len(&self) -> usize {
        self.exchange.recyclable.len()
    }

    /// Number of times `next` has been promoted to `current`
    pub fn promotions(&self) -> u64 {
        self.promotions
    }

    /// Total tiles ever allocated by this manager
    pub fn tiles_created(&self) -> u32 {
        self.next_tile_id
    }

    /// Ids of every tile the manager can currently see: active, ready, recyclable
    pub fn inventory(&self) -> Vec<TileId> {
        let mut ids: Vec<TileId> = self.active_tiles().iter().map(|t| t.id()).collect();
        ids.extend(self.exchange.ready.ids());
        ids.extend(self.exchange.recyclable.ids());
        ids
    }
}
