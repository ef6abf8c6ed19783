//! Navigation configuration.
//!
//! All distances are whole world units. The defaults reproduce the shipped
//! skirmish map: a 10000x5400 battlefield split into 32-unit tiles with the
//! two town centers on the top edge.
//!
//! # Example RON
//!
//! ```ron
//! NavConfig(
//!     world_width: 4000,
//!     world_height: 2000,
//!     tile_size: 32,
//!     search: SearchConfig(max_expansions: 5000),
//! )
//! ```
//!
//! Omitted fields take their default values.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NavError, Result};

/// Top-level navigation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// World width in world units.
    pub world_width: u32,
    /// World height in world units.
    pub world_height: u32,
    /// Edge length of one square tile in world units.
    pub tile_size: u32,
    /// Extra margin added around building footprints when marking the live
    /// layer, so units do not clip building corners.
    pub building_padding: i32,
    /// Procedural terrain parameters.
    pub terrain: TerrainConfig,
    /// Path search limits.
    pub search: SearchConfig,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            world_width: 10_000,
            world_height: 5_400,
            tile_size: 32,
            building_padding: 20,
            terrain: TerrainConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

/// Parameters for [`crate::grid::NavGrid::generate_terrain`].
///
/// Ranges are `(min, max)` and inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Spawn positions of the two bases.
    pub bases: [(i32, i32); 2],
    /// Offset from a base spawn position to the point used for the
    /// connectivity check (the middle of the town center footprint).
    pub base_anchor_offset: i32,
    /// Resource node offsets from the first base. The second base uses the
    /// same offsets with `dx` negated.
    pub resource_offsets: Vec<(i32, i32)>,
    /// Obstacle-free radius around each base.
    pub base_exclusion_radius: i32,
    /// Obstacle-free radius around each resource node.
    pub resource_exclusion_radius: i32,
    /// Number of obstacle clusters.
    pub cluster_count: (u32, u32),
    /// Minimum distance from a cluster center to the edges of the left half.
    pub cluster_margin: i32,
    /// Rectangles generated per cluster.
    pub rects_per_cluster: (u32, u32),
    /// Rectangle width.
    pub rect_width: (i32, i32),
    /// Rectangle height.
    pub rect_height: (i32, i32),
    /// Maximum offset of a rectangle center from its cluster center.
    pub cluster_spread: i32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            bases: [(100, 280), (8000, 280)],
            base_anchor_offset: 32,
            resource_offsets: vec![
                (250, -80),
                (200, 220),
                (500, -80),
                (500, 520),
                (800, 120),
                (1000, 70),
                (800, 720),
                (1200, -30),
                (1400, -130),
                (1500, 320),
            ],
            base_exclusion_radius: 600,
            resource_exclusion_radius: 200,
            cluster_count: (8, 15),
            cluster_margin: 200,
            rects_per_cluster: (1, 4),
            rect_width: (64, 256),
            rect_height: (64, 192),
            cluster_spread: 100,
        }
    }
}

impl TerrainConfig {
    /// Terrain settings that never place an obstacle.
    #[must_use]
    pub fn empty(bases: [(i32, i32); 2]) -> Self {
        Self {
            bases,
            base_anchor_offset: 0,
            resource_offsets: Vec::new(),
            cluster_count: (0, 0),
            ..Self::default()
        }
    }
}

/// Limits for a single path query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum tile expansions before returning a partial path.
    pub max_expansions: u32,
    /// Largest ring radius searched when a start or goal tile is blocked.
    pub nearest_walkable_radius: i32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_expansions: 10_000,
            nearest_walkable_radius: 19,
        }
    }
}

impl NavConfig {
    /// An obstacle-free field of `width_tiles` x `height_tiles` tiles.
    ///
    /// Bases sit in the top-left and bottom-right tiles.
    #[must_use]
    pub fn open_field(width_tiles: u32, height_tiles: u32, tile_size: u32) -> Self {
        let half = (tile_size / 2) as i32;
        let far_x = (width_tiles.saturating_sub(1) * tile_size) as i32 + half;
        let far_y = (height_tiles.saturating_sub(1) * tile_size) as i32 + half;
        Self {
            world_width: width_tiles * tile_size,
            world_height: height_tiles * tile_size,
            tile_size,
            terrain: TerrainConfig::empty([(half, half), (far_x, far_y)]),
            ..Self::default()
        }
    }

    /// Load a configuration from a RON file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| NavError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&contents)
    }

    /// Parse a configuration from a RON string and validate it.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: Self = ron::from_str(ron)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the search expansion budget.
    #[must_use]
    pub const fn with_max_expansions(mut self, max_expansions: u32) -> Self {
        self.search.max_expansions = max_expansions;
        self
    }

    /// Set the building footprint padding.
    #[must_use]
    pub const fn with_building_padding(mut self, padding: i32) -> Self {
        self.building_padding = padding;
        self
    }

    /// Replace the terrain parameters.
    #[must_use]
    pub fn with_terrain(mut self, terrain: TerrainConfig) -> Self {
        self.terrain = terrain;
        self
    }

    /// Grid width in tiles (world width / tile size, rounded down).
    #[must_use]
    pub const fn grid_width(&self) -> u32 {
        self.world_width / self.tile_size
    }

    /// Grid height in tiles (world height / tile size, rounded down).
    #[must_use]
    pub const fn grid_height(&self) -> u32 {
        self.world_height / self.tile_size
    }

    /// Check that the configuration describes a usable grid and terrain.
    pub fn validate(&self) -> Result<()> {
        if self.tile_size == 0 {
            return Err(invalid("tile_size must be positive"));
        }
        if self.world_width < self.tile_size || self.world_height < self.tile_size {
            return Err(invalid(format!(
                "world {}x{} is smaller than one {}-unit tile",
                self.world_width, self.world_height, self.tile_size
            )));
        }
        if self.world_width > i32::MAX as u32 || self.world_height > i32::MAX as u32 {
            return Err(invalid("world dimensions exceed i32 range"));
        }
        if self.building_padding < 0 {
            return Err(invalid("building_padding must not be negative"));
        }
        if self.search.max_expansions == 0 {
            return Err(invalid("search.max_expansions must be positive"));
        }
        if self.search.nearest_walkable_radius < 0 {
            return Err(invalid("search.nearest_walkable_radius must not be negative"));
        }
        self.validate_terrain()
    }

    fn validate_terrain(&self) -> Result<()> {
        let terrain = &self.terrain;
        check_range("terrain.cluster_count", terrain.cluster_count)?;
        check_range("terrain.rects_per_cluster", terrain.rects_per_cluster)?;
        check_range("terrain.rect_width", terrain.rect_width)?;
        check_range("terrain.rect_height", terrain.rect_height)?;

        if terrain.cluster_count.1 == 0 {
            return Ok(());
        }

        let half_w = (self.world_width / 2) as i32;
        let world_h = self.world_height as i32;
        if terrain.rect_width.0 <= 0 || terrain.rect_height.0 <= 0 {
            return Err(invalid("terrain rect sizes must be positive"));
        }
        if terrain.rect_width.1 > half_w || terrain.rect_height.1 > world_h {
            return Err(invalid("terrain rects must fit inside the left half of the world"));
        }
        if terrain.cluster_margin < 0
            || half_w - terrain.cluster_margin < terrain.cluster_margin
            || world_h - terrain.cluster_margin < terrain.cluster_margin
        {
            return Err(invalid("terrain.cluster_margin leaves no room for cluster centers"));
        }
        if terrain.cluster_spread < 0 {
            return Err(invalid("terrain.cluster_spread must not be negative"));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> NavError {
    NavError::InvalidConfig(message.into())
}

fn check_range<T: PartialOrd + std::fmt::Debug>(name: &str, (min, max): (T, T)) -> Result<()> {
    if min > max {
        return Err(invalid(format!("{name} range ({min:?}, {max:?}) is inverted")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid_dimensions() {
        let config = NavConfig::default();
        // 10000 / 32 and 5400 / 32, rounded down
        assert_eq!(config.grid_width(), 312);
        assert_eq!(config.grid_height(), 168);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_open_field() {
        let config = NavConfig::open_field(10, 8, 32);
        assert_eq!(config.world_width, 320);
        assert_eq!(config.world_height, 256);
        assert_eq!(config.grid_width(), 10);
        assert_eq!(config.grid_height(), 8);
        assert_eq!(config.terrain.bases, [(16, 16), (304, 240)]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_tile_size_rejected() {
        let config = NavConfig {
            tile_size: 0,
            ..NavConfig::default()
        };
        assert!(matches!(config.validate(), Err(NavError::InvalidConfig(_))));
    }

    #[test]
    fn test_world_smaller_than_tile_rejected() {
        let config = NavConfig {
            world_width: 16,
            ..NavConfig::open_field(4, 4, 32)
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut config = NavConfig::default();
        config.terrain.rect_width = (200, 100);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_margin_rejected() {
        let mut config = NavConfig::default();
        config.terrain.cluster_margin = 3_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_budget_rejected() {
        let config = NavConfig::default().with_max_expansions(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_ron_partial() {
        let config = NavConfig::from_ron_str(
            "NavConfig(world_width: 4000, world_height: 2000, search: SearchConfig(max_expansions: 500))",
        )
        .unwrap();
        assert_eq!(config.world_width, 4000);
        assert_eq!(config.world_height, 2000);
        assert_eq!(config.tile_size, 32);
        assert_eq!(config.search.max_expansions, 500);
        assert_eq!(config.search.nearest_walkable_radius, 19);
        assert_eq!(config.terrain, TerrainConfig::default());
    }

    #[test]
    fn test_from_ron_invalid_syntax() {
        let result = NavConfig::from_ron_str("NavConfig(world_width: )");
        assert!(matches!(result, Err(NavError::ConfigParse(_))));
    }

    #[test]
    fn test_from_ron_invalid_values() {
        let result = NavConfig::from_ron_str("NavConfig(tile_size: 0)");
        assert!(matches!(result, Err(NavError::InvalidConfig(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = NavConfig::load("/nonexistent/nav_config.ron");
        assert!(matches!(result, Err(NavError::ConfigRead { .. })));
    }

    #[test]
    fn test_ron_round_trip_default() {
        let text = ron::to_string(&NavConfig::default()).unwrap();
        let parsed = NavConfig::from_ron_str(&text).unwrap();
        assert_eq!(parsed, NavConfig::default());
    }
}
