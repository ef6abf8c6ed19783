//! Test fixtures and helpers.
//!
//! Pre-built grids and obstacle layouts for consistent testing.

use fixed::types::I32F32;
use nav_core::config::NavConfig;
use nav_core::grid::NavGrid;
use nav_core::math::{Vec2Fixed, WorldRect};

/// Tile size used by the fixture grids.
pub const TILE: u32 = 32;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a world position from whole units.
#[must_use]
pub fn vec2(x: i32, y: i32) -> Vec2Fixed {
    Vec2Fixed::from_ints(x, y)
}

/// World position of the center of tile `(gx, gy)` on a fixture grid.
#[must_use]
pub fn tile_center(gx: i32, gy: i32) -> Vec2Fixed {
    let half = (TILE / 2) as i32;
    vec2(gx * TILE as i32 + half, gy * TILE as i32 + half)
}

/// An all-walkable grid of `width` x `height` tiles with no building padding.
///
/// # Panics
///
/// Panics if the dimensions are zero.
#[must_use]
pub fn open_grid(width: u32, height: u32) -> NavGrid {
    NavGrid::new(NavConfig::open_field(width, height, TILE).with_building_padding(0))
        .expect("open field config is valid")
}

/// The default world with terrain generated from `seed`.
///
/// # Panics
///
/// Panics if generation fails to connect the bases.
#[must_use]
pub fn generated_grid(seed: u64) -> NavGrid {
    let mut grid = NavGrid::new(NavConfig::default()).expect("default config is valid");
    grid.generate_terrain(seed)
        .expect("default terrain connects the bases");
    grid
}

/// Zero-size footprint on the center of a tile.
///
/// With zero building padding this blocks exactly that tile.
#[must_use]
pub fn tile_footprint(grid: &NavGrid, gx: i32, gy: i32) -> WorldRect {
    let c = grid.grid_to_world(gx, gy);
    WorldRect::new(c.x, c.y, I32F32::ZERO, I32F32::ZERO)
}

/// Mark each listed tile as a building.
pub fn block_tiles(grid: &mut NavGrid, tiles: &[(i32, i32)]) {
    for &(gx, gy) in tiles {
        let footprint = tile_footprint(grid, gx, gy);
        grid.mark_building(&footprint);
    }
}

/// Vertical wall at column `x` covering rows `ys`.
pub fn block_column(grid: &mut NavGrid, x: i32, ys: std::ops::Range<i32>) {
    let tiles: Vec<_> = ys.map(|y| (x, y)).collect();
    block_tiles(grid, &tiles);
}

/// Horizontal wall at row `y` covering columns `xs`.
pub fn block_row(grid: &mut NavGrid, y: i32, xs: std::ops::Range<i32>) {
    let tiles: Vec<_> = xs.map(|x| (x, y)).collect();
    block_tiles(grid, &tiles);
}
