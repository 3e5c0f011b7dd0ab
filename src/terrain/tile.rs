//! Terrain tile: one screen's worth of obstacle cells
//!
//! A tile is a `TILE_COLUMNS` x `TILE_ROWS` grid of optional blocks stored
//! column-major, a cached image the size of the window, and the world-space
//! x of its left edge.

use glam::IVec2;

use super::TerrainError;
use crate::consts::*;
use crate::fixed::Fixed;
use crate::renderer::{Canvas, Rgba};

/// Identity of a tile instance, stable across recycling
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileId(pub u32);

/// A square obstacle the player must not touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub color: Rgba,
}

impl Block {
    pub const fn new(color: Rgba) -> Self {
        Self { color }
    }
}

const TILE_CELLS: usize = TILE_COLUMNS * TILE_ROWS;

pub struct Tile {
    id: TileId,
    cells: Vec<Option<Block>>,
    image: Canvas,
    offset_x: Fixed,
}

impl std::fmt::Debug for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tile")
            .field("id", &self.id)
            .field("offset_x", &self.offset_x)
            .finish_non_exhaustive()
    }
}

impl Tile {
    /// World x every fresh or recycled tile starts at (just off-screen right)
    pub const SPAWN_OFFSET_X: Fixed = TILE_PIXEL_WIDTH;

    /// Create an empty tile at the spawn offset
    pub fn new(id: TileId) -> Self {
        Self {
            id,
            cells: vec![None; TILE_CELLS],
            image: Canvas::new(WINDOW_WIDTH as usize, WINDOW_HEIGHT as usize),
            offset_x: Self::SPAWN_OFFSET_X,
        }
    }

    #[inline]
    pub fn id(&self) -> TileId {
        self.id
    }

    /// World x of the tile's left edge
    #[inline]
    pub fn offset_x(&self) -> Fixed {
        self.offset_x
    }

    /// Cached image; only meaningful after `rasterize`
    pub fn image(&self) -> &Canvas {
        &self.image
    }

    #[inline]
    fn index(x: usize, y: usize) -> Result<usize, TerrainError> {
        if x < TILE_COLUMNS && y < TILE_ROWS {
            Ok(x * TILE_ROWS + y)
        } else {
            Err(TerrainError::CellOutOfRange { x, y })
        }
    }

    pub fn get_cell(&self, x: usize, y: usize) -> Result<Option<Block>, TerrainError> {
        Ok(self.cells[Self::index(x, y)?])
    }

    pub fn set_cell(&mut self, x: usize, y: usize, block: Option<Block>) -> Result<(), TerrainError> {
        self.cells[Self::index(x, y)?] = block;
        Ok(())
    }

    /// Cell coordinate of a world position under this tile's current offset.
    ///
    /// Uses floor division and performs no clamping; the result may be
    /// outside the grid.
    pub fn world_to_cell(&self, world_x: Fixed, world_y: Fixed) -> (i64, i64) {
        (
            (world_x - self.offset_x).div_floor(CELL_SIDE),
            world_y.div_floor(CELL_SIDE),
        )
    }

    /// Block at a (possibly out-of-grid) cell coordinate; out of grid is empty
    pub fn block_at(&self, cell_x: i64, cell_y: i64) -> Option<Block> {
        let x = usize::try_from(cell_x).ok()?;
        let y = usize::try_from(cell_y).ok()?;
        self.get_cell(x, y).ok().flatten()
    }

    /// Number of filled cells
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Redraw the cached image from the cell grid
    pub fn rasterize(&mut self) {
        self.image.fill(Rgba::TRANSPARENT);
        let side = CELL_SIDE as i32;
        for x in 0..TILE_COLUMNS {
            for y in 0..TILE_ROWS {
                if let Some(block) = self.cells[x * TILE_ROWS + y] {
                    self.image.fill_rect(
                        IVec2::new(x as i32 * side, y as i32 * side),
                        IVec2::splat(side),
                        block.color,
                    );
                }
            }
        }
    }

    /// Move the tile left by `dx` world units
    #[inline]
    pub fn scroll(&mut self, dx: Fixed) {
        self.offset_x -= dx;
    }

    /// True once the tile has scrolled completely off the left edge
    #[inline]
    pub fn is_invalid(&self) -> bool {
        self.offset_x <= -TILE_PIXEL_WIDTH
    }

    /// Clear every cell and return to the spawn offset
    pub fn recycle(&mut self) {
        self.cells.fill(None);
        self.offset_x = Self::SPAWN_OFFSET_X;
    }

    /// Position the tile's left edge at `offset_x`
    pub(crate) fn place_at(&mut self, offset_x: Fixed) {
        self.offset_x = offset_x;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREY: Block = Block::new(Rgba::rgb(90, 90, 90));

    #[test]
    fn test_cell_access_bounds() {
        let mut tile = Tile::new(TileId(0));
        tile.set_cell(0, 0, Some(GREY)).unwrap();
        tile.set_cell(TILE_COLUMNS - 1, TILE_ROWS - 1, Some(GREY)).unwrap();
        assert_eq!(tile.get_cell(0, 0).unwrap(), Some(GREY));
        assert_eq!(tile.get_cell(1, 0).unwrap(), None);
        assert!(matches!(
            tile.get_cell(TILE_COLUMNS, 0),
            Err(TerrainError::CellOutOfRange { .. })
        ));
        assert!(matches!(
            tile.set_cell(0, TILE_ROWS, Some(GREY)),
            Err(TerrainError::CellOutOfRange { x: 0, y }) if y == TILE_ROWS
        ));
        assert_eq!(tile.filled_count(), 2);
    }

    #[test]
    fn test_world_to_cell_uses_offset_and_floor() {
        let mut tile = Tile::new(TileId(0));
        tile.place_at(Fixed::from_int(100));
        assert_eq!(tile.world_to_cell(Fixed::from_int(100), Fixed::ZERO), (0, 0));
        assert_eq!(tile.world_to_cell(Fixed::from_int(139), Fixed::from_int(59)), (1, 2));
        // Just left of the tile maps to column -1, not 0
        assert_eq!(
            tile.world_to_cell("99.5".parse().unwrap(), Fixed::from_int(-1)),
            (-1, -1)
        );
        assert_eq!(tile.block_at(-1, 0), None);
        assert_eq!(tile.block_at(0, TILE_ROWS as i64), None);
    }

    #[test]
    fn test_scroll_forward_and_back_is_exact() {
        let mut tile = Tile::new(TileId(0));
        let origin = tile.offset_x();
        // One tick at a speed partway up the ramp
        let dx: Fixed = "3.0002".parse().unwrap();
        for _ in 0..10_000 {
            tile.scroll(dx);
        }
        assert_eq!(tile.offset_x(), origin - dx * 10_000);
        for _ in 0..10_000 {
            tile.scroll(-dx);
        }
        assert_eq!(tile.offset_x(), origin);
    }

    #[test]
    fn test_invalid_boundary() {
        let mut tile = Tile::new(TileId(0));
        tile.place_at(Fixed::ZERO);
        tile.scroll(TILE_PIXEL_WIDTH - Fixed::from_raw(1));
        assert!(!tile.is_invalid());
        tile.scroll(Fixed::from_raw(1));
        assert_eq!(tile.offset_x(), -TILE_PIXEL_WIDTH);
        assert!(tile.is_invalid());
    }

    #[test]
    fn test_recycle_resets() {
        let mut tile = Tile::new(TileId(7));
        tile.set_cell(3, 4, Some(GREY)).unwrap();
        tile.scroll(Fixed::from_int(5000));
        assert!(tile.is_invalid());
        tile.recycle();
        assert_eq!(tile.offset_x(), Tile::SPAWN_OFFSET_X);
        assert_eq!(tile.filled_count(), 0);
        assert_eq!(tile.id(), TileId(7));
        assert!(!tile.is_invalid());
    }

    #[test]
    fn test_rasterize_draws_filled_cells() {
        let mut tile = Tile::new(TileId(0));
        tile.set_cell(2, 1, Some(GREY)).unwrap();
        tile.rasterize();
        let side = CELL_SIDE as usize;
        let image = tile.image();
        assert_eq!(image.pixel(2 * side, side), Some(GREY.color));
        assert_eq!(image.pixel(3 * side - 1, 2 * side - 1), Some(GREY.color));
        assert_eq!(image.pixel(3 * side, side), Some(Rgba::TRANSPARENT));

        // Stale pixels are cleared on the next rasterize
        tile.recycle();
        tile.rasterize();
        assert_eq!(tile.image().pixel(2 * side, side), Some(Rgba::TRANSPARENT));
    }
}
