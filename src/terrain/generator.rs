//! Corridor generation
//!
//! A virtual jumper is simulated with the same gravity, jump speed and speed
//! ramp as the real player. Whatever rows it passes through in each column
//! stay open (plus some random padding); everything above and below is
//! filled with blocks. Jumper state carries over from tile to tile, so the
//! corridor is continuous across tile seams.

use log::{debug, error};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::tile::{Block, Tile};
use crate::consts::*;
use crate::fixed::{Fixed, FixedVec2};
use crate::physics;
use crate::renderer::Rgba;

/// Rows the jumper occupied while inside one column (inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    pub min_row: i64,
    pub max_row: i64,
}

impl Footprint {
    fn single(row: i64) -> Self {
        Self {
            min_row: row,
            max_row: row,
        }
    }

    fn include(&mut self, row: i64) {
        self.min_row = self.min_row.min(row);
        self.max_row = self.max_row.max(row);
    }
}

/// Draw the next jump countdown in seconds.
///
/// 80% of draws come from `[JUMP_INTERVAL_MIN, 0.5]`, the rest from
/// `[0.5, max_jump_interval]`.
pub fn sample_jump_interval<R: Rng>(rng: &mut R) -> f64 {
    let (lo, hi) = if rng.random::<f64>() <= JUMP_INTERVAL_SHORT_PROB {
        (JUMP_INTERVAL_MIN, JUMP_INTERVAL_SPLIT)
    } else {
        (JUMP_INTERVAL_SPLIT, physics::max_jump_interval())
    };
    rng.random_range(lo..=hi)
}

/// Padding in cells, sampled uniformly from `[range.x, range.y]`, rounded half to even
fn sample_padding<R: Rng>(rng: &mut R, range: FixedVec2) -> i64 {
    let lo = range.x.to_f64();
    let hi = range.y.to_f64();
    rng.random_range(lo..=hi).round_ties_even() as i64
}

fn random_base_color<R: Rng>(rng: &mut R) -> Rgba {
    Rgba::rgb(
        rng.random_range(0..=128),
        rng.random_range(0..=128),
        rng.random_range(0..=128),
    )
}

fn darken<R: Rng>(rng: &mut R, color: Rgba) -> Rgba {
    let mut step = |c: u8| c.saturating_sub(rng.random_range(0..=50));
    Rgba::rgb(step(color.r), step(color.g), step(color.b))
}

pub struct TerrainGenerator {
    rng: Pcg32,
    /// Jumper vertical position and speed (+y is down)
    pos_y: Fixed,
    speed_y: Fixed,
    speed_x: Fixed,
    /// Horizontal progress into the current column
    offset_x: Fixed,
    jump_timer: Fixed,
    /// Simulated seconds since the first step
    elapsed: Fixed,
    path: Vec<Footprint>,
    tiles_generated: u64,
}

impl TerrainGenerator {
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let pos_y = Fixed::from_f64(
            rng.random_range(JUMPER_POS_Y_MIN.to_f64()..=JUMPER_POS_Y_MAX.to_f64()),
        );
        let jump_timer = Fixed::from_f64(sample_jump_interval(&mut rng));
        Self {
            rng,
            pos_y,
            speed_y: Fixed::ZERO,
            speed_x: PLAYER_INITIAL_SPEED,
            offset_x: Fixed::ZERO,
            jump_timer,
            elapsed: Fixed::ZERO,
            path: Vec::with_capacity(TILE_COLUMNS),
            tiles_generated: 0,
        }
    }

    /// Footprints recorded for the most recently generated tile
    pub fn last_path(&self) -> &[Footprint] {
        &self.path
    }

    pub fn tiles_generated(&self) -> u64 {
        self.tiles_generated
    }

    pub fn elapsed(&self) -> Fixed {
        self.elapsed
    }

    /// Current padding range, narrowing linearly then frozen at the end range
    pub fn padding_range(&self) -> FixedVec2 {
        let horizon = Fixed::from_int(PADDING_NARROW_SECONDS);
        if self.elapsed >= horizon {
            return PADDING_RANGE_END;
        }
        PADDING_RANGE_START.lerp(PADDING_RANGE_END, self.elapsed / horizon)
    }

    /// Fill an empty tile with the next stretch of corridor and rasterize it
    pub fn generate(&mut self, tile: &mut Tile) {
        self.trace_path();
        let range = self.padding_range();
        for (x, footprint) in self.path.iter().enumerate() {
            let top = footprint.min_row - sample_padding(&mut self.rng, range);
            let bottom = footprint.max_row + sample_padding(&mut self.rng, range);
            Self::fill_column(&mut self.rng, tile, x, top, bottom);
        }
        tile.rasterize();
        self.tiles_generated += 1;
        debug!(
            "Generated tile {:?} (#{}, t={}s, padding {}..{})",
            tile.id(),
            self.tiles_generated,
            self.elapsed,
            range.x,
            range.y
        );
    }

    /// Run the jumper across one tile width, recording a footprint per column
    fn trace_path(&mut self) {
        let dt = TICK_TIME;
        let side = Fixed::from_int(CELL_SIDE);
        let jumpable_min = physics::jumpable_min_y();
        self.path.clear();
        let mut footprint = Footprint::single(self.pos_y.div_floor(CELL_SIDE));

        loop {
            let row = self.pos_y.div_floor(CELL_SIDE);
            while self.offset_x >= side {
                self.offset_x -= side;
                self.path.push(footprint);
                if self.path.len() == TILE_COLUMNS {
                    return;
                }
                footprint = Footprint::single(row);
            }
            footprint.include(row);

            if self.jump_timer <= Fixed::ZERO {
                self.jump_timer = self.next_jump_interval();
                if self.pos_y > jumpable_min {
                    self.speed_y = -PLAYER_JUMP_SPEED;
                }
            } else if self.pos_y >= JUMPER_POS_Y_MAX {
                self.jump_timer = self.next_jump_interval();
                self.speed_y = -PLAYER_JUMP_SPEED;
            }
            self.jump_timer -= dt;
            self.speed_y = physics::apply_gravity(self.speed_y, dt);
            self.pos_y += self.speed_y * dt;
            self.speed_x = physics::advance_speed(self.speed_x, dt);
            self.offset_x += self.speed_x * dt;
            self.elapsed += dt;
        }
    }

    fn next_jump_interval(&mut self) -> Fixed {
        Fixed::from_f64(sample_jump_interval(&mut self.rng))
    }

    /// Fill rows above `top` and below `bottom`, darkening away from the corridor
    fn fill_column(rng: &mut Pcg32, tile: &mut Tile, x: usize, top: i64, bottom: i64) {
        let rows = TILE_ROWS as i64;
        if top > 0 {
            let mut color = random_base_color(rng);
            for y in (0..top.min(rows)).rev() {
                Self::place(tile, x, y, color);
                color = darken(rng, color);
            }
        }
        if bottom < rows - 1 {
            let mut color = random_base_color(rng);
            for y in (bottom + 1).max(0)..rows {
                Self::place(tile, x, y, color);
                color = darken(rng, color);
            }
        }
    }

    fn place(tile: &mut Tile, x: usize, y: i64, color: Rgba) {
        // Rows are clamped to the grid by the callers
        if let Err(err) = tile.set_cell(x, y as usize, Some(Block::new(color))) {
            error!("Corridor fill outside tile: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TileId;
    use proptest::prelude::*;

    fn open_rows(tile: &Tile, x: usize) -> Vec<bool> {
        (0..TILE_ROWS)
            .map(|y| tile.get_cell(x, y).unwrap().is_none())
            .collect()
    }

    #[test]
    fn test_generated_tile_keeps_jumper_path_open() {
        let mut generator = TerrainGenerator::new(42);
        for i in 0..12 {
            let mut tile = Tile::new(TileId(i));
            generator.generate(&mut tile);
            let path = generator.last_path();
            assert_eq!(path.len(), TILE_COLUMNS);
            for (x, footprint) in path.iter().enumerate() {
                for row in footprint.min_row..=footprint.max_row {
                    assert!(
                        tile.block_at(x as i64, row).is_none(),
                        "tile {i} column {x} row {row} blocked"
                    );
                }
            }
        }
        assert_eq!(generator.tiles_generated(), 12);
    }

    #[test]
    fn test_columns_are_walls_around_one_gap() {
        let mut generator = TerrainGenerator::new(7);
        let mut tile = Tile::new(TileId(0));
        generator.generate(&mut tile);
        assert!(tile.filled_count() > 0);
        for x in 0..TILE_COLUMNS {
            let open = open_rows(&tile, x);
            // open cells form exactly one contiguous run
            let first = open.iter().position(|&o| o).unwrap();
            let last = open.iter().rposition(|&o| o).unwrap();
            assert!(open[first..=last].iter().all(|&o| o), "column {x} has two gaps");
        }
    }

    #[test]
    fn test_path_is_continuous_across_tiles() {
        let mut generator = TerrainGenerator::new(11);
        let mut previous_last: Option<Footprint> = None;
        for i in 0..6 {
            let mut tile = Tile::new(TileId(i));
            generator.generate(&mut tile);
            let first = generator.last_path()[0];
            if let Some(last) = previous_last {
                // The jumper moves at most one row per step at these speeds
                assert!(first.min_row <= last.max_row + 1);
                assert!(first.max_row >= last.min_row - 1);
            }
            previous_last = generator.last_path().last().copied();
        }
    }

    #[test]
    fn test_jumper_stays_on_screen() {
        let mut generator = TerrainGenerator::new(3);
        for i in 0..30 {
            let mut tile = Tile::new(TileId(i));
            generator.generate(&mut tile);
            for footprint in generator.last_path() {
                assert!(footprint.min_row >= 0);
                assert!(footprint.max_row < TILE_ROWS as i64);
            }
        }
    }

    #[test]
    fn test_padding_range_narrows_then_freezes() {
        let mut generator = TerrainGenerator::new(1);
        assert_eq!(generator.padding_range(), PADDING_RANGE_START);

        generator.elapsed = Fixed::from_int(PADDING_NARROW_SECONDS / 2);
        let mid = generator.padding_range();
        assert_eq!(mid.x, "0.5".parse().unwrap());
        assert_eq!(mid.y, "3.5".parse().unwrap());

        generator.elapsed = Fixed::from_int(PADDING_NARROW_SECONDS);
        assert_eq!(generator.padding_range(), PADDING_RANGE_END);
        generator.elapsed = Fixed::from_int(10_000);
        assert_eq!(generator.padding_range(), PADDING_RANGE_END);
    }

    #[test]
    fn test_elapsed_tracks_simulated_time() {
        let mut generator = TerrainGenerator::new(5);
        let mut tile = Tile::new(TileId(0));
        generator.generate(&mut tile);
        // 1280 px at ~300 px/s is a bit over four seconds
        let secs = generator.elapsed().to_f64();
        assert!(secs > 4.0 && secs < 4.4, "elapsed {secs}");
    }

    #[test]
    fn test_same_seed_same_terrain() {
        let mut a = TerrainGenerator::new(99);
        let mut b = TerrainGenerator::new(99);
        let mut ta = Tile::new(TileId(0));
        let mut tb = Tile::new(TileId(1));
        a.generate(&mut ta);
        b.generate(&mut tb);
        assert_eq!(a.last_path(), b.last_path());
        for x in 0..TILE_COLUMNS {
            for y in 0..TILE_ROWS {
                assert_eq!(ta.get_cell(x, y).unwrap(), tb.get_cell(x, y).unwrap());
            }
        }
    }

    #[test]
    fn test_jump_interval_distribution() {
        let mut rng = Pcg32::seed_from_u64(2024);
        let max = physics::max_jump_interval();
        let samples = 10_000;
        let mut short = 0;
        for _ in 0..samples {
            let v = sample_jump_interval(&mut rng);
            assert!((JUMP_INTERVAL_MIN..=max).contains(&v), "sample {v} out of range");
            if v < JUMP_INTERVAL_SPLIT {
                short += 1;
            }
        }
        let fraction = short as f64 / samples as f64;
        assert!((fraction - JUMP_INTERVAL_SHORT_PROB).abs() < 0.03, "short fraction {fraction}");
    }

    proptest! {
        #[test]
        fn prop_padding_stays_in_range(seed in any::<u64>(), lo in 0i64..4, extra in 0i64..4) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let range = FixedVec2::from_ints(lo, lo + extra);
            for _ in 0..50 {
                let pad = sample_padding(&mut rng, range);
                prop_assert!(pad >= lo && pad <= lo + extra);
            }
        }
    }
}
