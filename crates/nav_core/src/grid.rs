//! Tile grid storage and building obstacle marking.
//!
//! A [`NavGrid`] keeps two parallel tile layers over the same world:
//!
//! - the **static** layer holds terrain only and is written solely by
//!   terrain generation;
//! - the **live** layer holds terrain plus placed buildings and is the only
//!   layer path search reads.
//!
//! Every tile that is [`Tile::Terrain`] in the static layer is never
//! [`Tile::Walkable`] in the live layer. Coordinates outside the grid read as
//! [`Tile::Terrain`].

use sha2::{Digest, Sha256};

use crate::config::NavConfig;
use crate::error::Result;
use crate::math::{Fixed, Vec2Fixed, WorldRect};

/// State of a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tile {
    /// Open ground.
    #[default]
    Walkable,
    /// Permanent obstacle from terrain generation.
    Terrain,
    /// Temporary obstacle under (and around) a placed building.
    Building,
}

impl Tile {
    /// Returns true if units may stand on this tile.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Walkable)
    }

    /// Stable one-byte encoding used by [`NavGrid::layer_hash`].
    const fn code(self) -> u8 {
        match self {
            Self::Walkable => 0,
            Self::Terrain => 1,
            Self::Building => 2,
        }
    }
}

/// Selects one of the two tile layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Terrain only.
    Static,
    /// Terrain plus buildings.
    Live,
}

/// 8-directional steps with x10 integer costs.
///
/// Cardinal = 10, diagonal = 14 (approximation of sqrt(2) * 10).
pub(crate) const DIRECTIONS: [(i32, i32, u32); 8] = [
    (1, 0, 10),   // East
    (-1, 0, 10),  // West
    (0, 1, 10),   // South
    (0, -1, 10),  // North
    (1, 1, 14),   // Southeast
    (1, -1, 14),  // Northeast
    (-1, 1, 14),  // Southwest
    (-1, -1, 14), // Northwest
];

/// Inclusive tile range covered by a world rectangle, clamped to the grid.
///
/// Empty when the rectangle lies entirely outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TileRange {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl TileRange {
    pub(crate) fn tiles(self) -> impl Iterator<Item = (i32, i32)> {
        (self.y1..=self.y2).flat_map(move |gy| (self.x1..=self.x2).map(move |gx| (gx, gy)))
    }
}

/// Navigation grid with static and live layers.
#[derive(Debug, Clone)]
pub struct NavGrid {
    config: NavConfig,
    /// Grid width in tiles.
    width: i32,
    /// Grid height in tiles.
    height: i32,
    /// Terrain-only tiles, row-major.
    static_tiles: Vec<Tile>,
    /// Terrain and building tiles, row-major.
    live_tiles: Vec<Tile>,
    /// Generated terrain features, kept for rendering.
    terrain_rects: Vec<WorldRect>,
}

impl NavGrid {
    /// Create a grid with every tile walkable.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::NavError::InvalidConfig`] if the configuration
    /// fails validation.
    pub fn new(config: NavConfig) -> Result<Self> {
        config.validate()?;

        let width = config.grid_width() as i32;
        let height = config.grid_height() as i32;
        let tile_count = (width as usize) * (height as usize);
        Ok(Self {
            config,
            width,
            height,
            static_tiles: vec![Tile::Walkable; tile_count],
            live_tiles: vec![Tile::Walkable; tile_count],
            terrain_rects: Vec::new(),
        })
    }

    /// Grid width in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width as u32
    }

    /// Grid height in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height as u32
    }

    /// Tile edge length in world units.
    #[must_use]
    pub const fn tile_size(&self) -> u32 {
        self.config.tile_size
    }

    /// The configuration this grid was built from.
    #[must_use]
    pub const fn config(&self) -> &NavConfig {
        &self.config
    }

    /// Terrain rectangles produced by the last terrain generation.
    #[must_use]
    pub fn terrain_rects(&self) -> &[WorldRect] {
        &self.terrain_rects
    }

    /// Check if coordinates are within grid bounds.
    #[must_use]
    pub const fn in_bounds(&self, gx: i32, gy: i32) -> bool {
        gx >= 0 && gx < self.width && gy >= 0 && gy < self.height
    }

    #[inline]
    fn index(&self, gx: i32, gy: i32) -> Option<usize> {
        if self.in_bounds(gx, gy) {
            Some((gy as usize) * (self.width as usize) + (gx as usize))
        } else {
            None
        }
    }

    /// Live tile at grid coordinates; [`Tile::Terrain`] when out of bounds.
    #[must_use]
    pub fn get(&self, gx: i32, gy: i32) -> Tile {
        self.tile(Layer::Live, gx, gy)
    }

    /// Static tile at grid coordinates; [`Tile::Terrain`] when out of bounds.
    #[must_use]
    pub fn get_static(&self, gx: i32, gy: i32) -> Tile {
        self.tile(Layer::Static, gx, gy)
    }

    /// Tile from the chosen layer; [`Tile::Terrain`] when out of bounds.
    #[must_use]
    pub fn tile(&self, layer: Layer, gx: i32, gy: i32) -> Tile {
        let tiles = match layer {
            Layer::Static => &self.static_tiles,
            Layer::Live => &self.live_tiles,
        };
        self.index(gx, gy).map_or(Tile::Terrain, |idx| tiles[idx])
    }

    /// Check if a live tile is walkable.
    #[must_use]
    pub fn is_walkable(&self, gx: i32, gy: i32) -> bool {
        self.get(gx, gy).is_walkable()
    }

    /// Convert a world position to grid coordinates (floor division).
    ///
    /// The result may lie outside the grid.
    #[must_use]
    pub fn world_to_grid(&self, pos: Vec2Fixed) -> (i32, i32) {
        let tile = Fixed::from_num(self.config.tile_size);
        (
            (pos.x / tile).floor().to_num::<i32>(),
            (pos.y / tile).floor().to_num::<i32>(),
        )
    }

    /// Convert grid coordinates to world position (center of tile).
    #[must_use]
    pub fn grid_to_world(&self, gx: i32, gy: i32) -> Vec2Fixed {
        let tile = Fixed::from_num(self.config.tile_size);
        let half = tile / Fixed::from_num(2);
        Vec2Fixed::new(
            Fixed::from_num(gx) * tile + half,
            Fixed::from_num(gy) * tile + half,
        )
    }

    /// Tiles covered by `rect` grown by `pad` on every side.
    pub(crate) fn tile_range(&self, rect: &WorldRect, pad: i32) -> TileRange {
        let tile = Fixed::from_num(self.config.tile_size);
        let pad = Fixed::from_num(pad);
        let to_tile = |v: Fixed| (v / tile).floor().to_num::<i32>();

        TileRange {
            x1: to_tile(rect.x.saturating_sub(pad)).max(0),
            y1: to_tile(rect.y.saturating_sub(pad)).max(0),
            x2: to_tile(rect.right().saturating_add(pad)).min(self.width - 1),
            y2: to_tile(rect.bottom().saturating_add(pad)).min(self.height - 1),
        }
    }

    /// Mark the tiles under a building (plus padding) as [`Tile::Building`]
    /// in the live layer.
    pub fn mark_building(&mut self, footprint: &WorldRect) {
        let range = self.tile_range(footprint, self.config.building_padding);
        for (gx, gy) in range.tiles() {
            if let Some(idx) = self.index(gx, gy) {
                self.live_tiles[idx] = Tile::Building;
            }
        }
        tracing::trace!(?range, "Marked building footprint");
    }

    /// Restore the tiles under a building (plus padding) from the static
    /// layer.
    ///
    /// Terrain under the footprint survives the removal.
    pub fn unmark_building(&mut self, footprint: &WorldRect) {
        let range = self.tile_range(footprint, self.config.building_padding);
        for (gx, gy) in range.tiles() {
            if let Some(idx) = self.index(gx, gy) {
                self.live_tiles[idx] = self.static_tiles[idx];
            }
        }
        tracing::trace!(?range, "Unmarked building footprint");
    }

    /// True if no tile under `rect` is terrain in the static layer.
    ///
    /// Buildings are ignored; overlap between buildings is validated by the
    /// placement logic with rectangle intersection.
    #[must_use]
    pub fn is_rect_clear(&self, rect: &WorldRect) -> bool {
        self.tile_range(rect, 0)
            .tiles()
            .all(|(gx, gy)| self.get_static(gx, gy) != Tile::Terrain)
    }

    /// Walkable live neighbors of a tile with their step cost.
    ///
    /// Diagonal steps are skipped when either flanking cardinal tile is not
    /// walkable, so no step cuts an obstacle corner.
    pub(crate) fn walkable_neighbors(
        &self,
        gx: i32,
        gy: i32,
    ) -> impl Iterator<Item = (i32, i32, u32)> + '_ {
        DIRECTIONS.iter().filter_map(move |&(dx, dy, cost)| {
            let nx = gx + dx;
            let ny = gy + dy;
            if !self.is_walkable(nx, ny) {
                return None;
            }
            if dx != 0 && dy != 0 && !(self.is_walkable(nx, gy) && self.is_walkable(gx, ny)) {
                return None;
            }
            Some((nx, ny, cost))
        })
    }

    /// Deterministic hash of one layer, for desync diagnostics.
    ///
    /// SHA-256 over the little-endian grid dimensions and one byte per tile,
    /// truncated to 64 bits. The value does not depend on the target or the
    /// toolchain, so identical grids hash identically on every peer.
    #[must_use]
    pub fn layer_hash(&self, layer: Layer) -> u64 {
        let tiles = match layer {
            Layer::Static => &self.static_tiles,
            Layer::Live => &self.live_tiles,
        };
        let mut hasher = Sha256::new();
        hasher.update(self.width.to_le_bytes());
        hasher.update(self.height.to_le_bytes());
        let bytes: Vec<u8> = tiles.iter().map(|&tile| tile.code()).collect();
        hasher.update(&bytes);

        let digest = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(head)
    }

    /// Fill the live layer with walkable tiles and mark `rects` as terrain.
    pub(crate) fn paint_terrain(&mut self, rects: &[WorldRect]) {
        self.live_tiles.fill(Tile::Walkable);
        for rect in rects {
            let range = self.tile_range(rect, 0);
            for (gx, gy) in range.tiles() {
                if let Some(idx) = self.index(gx, gy) {
                    self.live_tiles[idx] = Tile::Terrain;
                }
            }
        }
    }

    /// Freeze the live layer as the static layer.
    pub(crate) fn commit_terrain(&mut self, rects: Vec<WorldRect>) {
        self.static_tiles.clone_from(&self.live_tiles);
        self.terrain_rects = rects;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(w: u32, h: u32) -> NavGrid {
        NavGrid::new(NavConfig::open_field(w, h, 32)).unwrap()
    }

    fn rect(x: i32, y: i32, w: i32, h: i32) -> WorldRect {
        WorldRect::from_ints(x, y, w, h)
    }

    #[test]
    fn test_navgrid_creation() {
        let grid = grid(10, 6);
        assert_eq!(grid.width(), 10);
        assert_eq!(grid.height(), 6);
        assert_eq!(grid.tile_size(), 32);
        assert!(grid.terrain_rects().is_empty());
    }

    #[test]
    fn test_dimensions_round_down() {
        let config = NavConfig {
            world_width: 100,
            world_height: 70,
            ..NavConfig::open_field(1, 1, 32)
        };
        let grid = NavGrid::new(config).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = NavConfig {
            tile_size: 0,
            ..NavConfig::default()
        };
        assert!(NavGrid::new(config).is_err());
    }

    #[test]
    fn test_out_of_bounds_is_terrain() {
        let grid = grid(5, 5);
        assert_eq!(grid.get(-1, 0), Tile::Terrain);
        assert_eq!(grid.get(0, -1), Tile::Terrain);
        assert_eq!(grid.get(5, 0), Tile::Terrain);
        assert_eq!(grid.get(0, 5), Tile::Terrain);
        assert_eq!(grid.get(i32::MIN, i32::MAX), Tile::Terrain);
        assert_eq!(grid.get_static(99, 99), Tile::Terrain);
        assert_eq!(grid.get(4, 4), Tile::Walkable);
    }

    #[test]
    fn test_world_to_grid_conversion() {
        let grid = grid(10, 10);
        assert_eq!(grid.world_to_grid(Vec2Fixed::from_ints(0, 0)), (0, 0));
        assert_eq!(grid.world_to_grid(Vec2Fixed::from_ints(31, 31)), (0, 0));
        assert_eq!(grid.world_to_grid(Vec2Fixed::from_ints(32, 64)), (1, 2));
        // Negative positions floor below zero
        assert_eq!(grid.world_to_grid(Vec2Fixed::from_ints(-1, -33)), (-1, -2));
        // Past the far edge stays unclamped
        assert_eq!(grid.world_to_grid(Vec2Fixed::from_ints(320, 0)), (10, 0));
    }

    #[test]
    fn test_grid_to_world_is_center() {
        let grid = grid(10, 10);
        assert_eq!(grid.grid_to_world(0, 0), Vec2Fixed::from_ints(16, 16));
        assert_eq!(grid.grid_to_world(3, 1), Vec2Fixed::from_ints(112, 48));
    }

    #[test]
    fn test_conversion_inverse() {
        let grid = grid(12, 7);
        for gy in 0..7 {
            for gx in 0..12 {
                assert_eq!(grid.world_to_grid(grid.grid_to_world(gx, gy)), (gx, gy));
            }
        }
    }

    #[test]
    fn test_mark_and_unmark_building() {
        let mut grid = grid(20, 20);
        // 64x64 footprint at (320, 320) padded by 20 covers tiles 9..=12
        let footprint = rect(320, 320, 64, 64);
        grid.mark_building(&footprint);

        for gy in 9..=12 {
            for gx in 9..=12 {
                assert_eq!(grid.get(gx, gy), Tile::Building, "tile ({gx}, {gy})");
            }
        }
        assert_eq!(grid.get(8, 10), Tile::Walkable);
        assert_eq!(grid.get(13, 10), Tile::Walkable);
        // Static layer is untouched
        assert_eq!(grid.get_static(10, 10), Tile::Walkable);

        grid.unmark_building(&footprint);
        for gy in 9..=12 {
            for gx in 9..=12 {
                assert_eq!(grid.get(gx, gy), Tile::Walkable);
            }
        }
    }

    #[test]
    fn test_unmark_restores_terrain() {
        let mut grid = grid(10, 10);
        grid.paint_terrain(&[rect(64, 64, 0, 0)]);
        grid.commit_terrain(vec![rect(64, 64, 0, 0)]);
        assert_eq!(grid.get_static(2, 2), Tile::Terrain);

        let footprint = rect(64, 64, 32, 32);
        grid.mark_building(&footprint);
        assert_eq!(grid.get(2, 2), Tile::Building);
        assert_eq!(grid.get(3, 3), Tile::Building);

        grid.unmark_building(&footprint);
        assert_eq!(grid.get(2, 2), Tile::Terrain);
        assert_eq!(grid.get(3, 3), Tile::Walkable);
    }

    #[test]
    fn test_building_at_edge_is_clamped() {
        let mut grid = grid(5, 5);
        grid.mark_building(&rect(-50, -50, 40, 40));
        assert_eq!(grid.get(0, 0), Tile::Building);
        // Entirely outside the grid: nothing changes
        grid.mark_building(&rect(1000, 1000, 32, 32));
        let buildings = (0..5)
            .flat_map(|y| (0..5).map(move |x| (x, y)))
            .filter(|&(x, y)| grid.get(x, y) == Tile::Building)
            .count();
        assert_eq!(buildings, 1);
    }

    #[test]
    fn test_is_rect_clear_ignores_buildings() {
        let mut grid = grid(10, 10);
        grid.mark_building(&rect(96, 96, 32, 32));
        assert!(grid.is_rect_clear(&rect(96, 96, 32, 32)));

        grid.paint_terrain(&[rect(200, 200, 10, 10)]);
        grid.commit_terrain(vec![rect(200, 200, 10, 10)]);
        assert!(!grid.is_rect_clear(&rect(190, 190, 20, 20)));
        assert!(grid.is_rect_clear(&rect(0, 0, 60, 60)));
    }

    #[test]
    fn test_paint_terrain_tile_range_is_inclusive() {
        let mut grid = grid(10, 10);
        // x + w lands exactly on a tile boundary, which is still covered
        grid.paint_terrain(&[rect(32, 32, 64, 32)]);
        assert_eq!(grid.get(1, 1), Tile::Terrain);
        assert_eq!(grid.get(3, 2), Tile::Terrain);
        assert_eq!(grid.get(4, 1), Tile::Walkable);
        assert_eq!(grid.get(0, 1), Tile::Walkable);
    }

    #[test]
    fn test_walkable_neighbors_no_corner_cutting() {
        let mut grid = grid(5, 5);
        // Block the tile east of (2, 2)
        grid.paint_terrain(&[rect(96, 64, 0, 0)]);

        let neighbors: Vec<_> = grid.walkable_neighbors(2, 2).collect();
        assert!(!neighbors.iter().any(|&(x, y, _)| (x, y) == (3, 2)));
        // Both diagonals flanked by (3, 2) are excluded
        assert!(!neighbors.iter().any(|&(x, y, _)| (x, y) == (3, 3)));
        assert!(!neighbors.iter().any(|&(x, y, _)| (x, y) == (3, 1)));
        assert!(neighbors.contains(&(1, 1, 14)));
        assert!(neighbors.contains(&(2, 3, 10)));
        assert_eq!(neighbors.len(), 5);
    }

    #[test]
    fn test_layer_hash() {
        let mut a = grid(8, 8);
        let b = grid(8, 8);
        assert_eq!(a.layer_hash(Layer::Live), b.layer_hash(Layer::Live));

        a.mark_building(&rect(100, 100, 10, 10));
        assert_ne!(a.layer_hash(Layer::Live), b.layer_hash(Layer::Live));
        assert_eq!(a.layer_hash(Layer::Static), b.layer_hash(Layer::Static));

        a.unmark_building(&rect(100, 100, 10, 10));
        assert_eq!(a.layer_hash(Layer::Live), b.layer_hash(Layer::Live));
    }

    #[test]
    fn test_layer_hash_is_pinned() {
        // Fixed value: peers on any target must agree on it.
        let mut grid = NavGrid::new(NavConfig::open_field(2, 1, 32).with_building_padding(0))
            .unwrap();
        assert_eq!(grid.layer_hash(Layer::Static), 0x8f3e_4fdd_8147_eb3f);

        grid.mark_building(&rect(40, 0, 0, 0));
        assert_eq!(grid.get(1, 0), Tile::Building);
        assert_eq!(grid.layer_hash(Layer::Live), 0xcd9a_e9a0_f9a5_2f2a);
        assert_eq!(grid.layer_hash(Layer::Static), 0x8f3e_4fdd_8147_eb3f);
    }
}
