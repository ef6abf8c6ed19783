//! Procedural terrain generation with a base-to-base connectivity guarantee.
//!
//! Generates mirror-symmetric maps:
//! - Obstacle clusters are rolled in the left half of the world only
//! - Every accepted rectangle is mirrored across the vertical midline
//! - Bases and resource nodes are kept clear by exclusion circles
//! - Obstacle pairs are discarded, newest first, until the bases connect

use std::collections::VecDeque;

use crate::config::TerrainConfig;
use crate::error::{NavError, Result};
use crate::grid::NavGrid;
use crate::math::{Fixed, Vec2Fixed, WorldRect};

/// Simple deterministic RNG for terrain generation.
///
/// A 64-bit LCG reading its high bits; identical on every platform.
struct MapRng {
    state: u64,
}

impl MapRng {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9E37_79B9_7F4A_7C15),
        }
    }

    fn next(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.state
    }

    /// Uniform value in `min..=max`.
    fn next_range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (i64::from(max) - i64::from(min) + 1) as u64;
        let offset = (self.next() >> 32) % span;
        (i64::from(min) + offset as i64) as i32
    }

    fn next_count(&mut self, (min, max): (u32, u32)) -> u32 {
        let min = min.min(i32::MAX as u32) as i32;
        let max = max.min(i32::MAX as u32) as i32;
        self.next_range(min, max) as u32
    }
}

/// A circle no obstacle center may fall inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Exclusion {
    x: i64,
    y: i64,
    radius: i64,
}

impl Exclusion {
    fn new(x: i32, y: i32, radius: i32) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            radius: radius.into(),
        }
    }

    /// True if the rectangle's center lies inside this circle padded by half
    /// the rectangle's largest dimension.
    fn rejects(&self, rx: i32, ry: i32, rw: i32, rh: i32) -> bool {
        let cx = i64::from(rx) + i64::from(rw / 2);
        let cy = i64::from(ry) + i64::from(rh / 2);
        let reach = self.radius + i64::from(rw.max(rh) / 2);
        let dx = cx - self.x;
        let dy = cy - self.y;
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy)) < reach.saturating_mul(reach)
    }
}

/// Exclusion circles around both bases and every resource node.
///
/// The second base's resource nodes mirror the first base's offsets in x.
fn exclusion_zones(terrain: &TerrainConfig) -> Vec<Exclusion> {
    let [(b1x, b1y), (b2x, b2y)] = terrain.bases;
    let mut zones = vec![
        Exclusion::new(b1x, b1y, terrain.base_exclusion_radius),
        Exclusion::new(b2x, b2y, terrain.base_exclusion_radius),
    ];
    for &(dx, dy) in &terrain.resource_offsets {
        zones.push(Exclusion::new(
            b1x.saturating_add(dx),
            b1y.saturating_add(dy),
            terrain.resource_exclusion_radius,
        ));
        zones.push(Exclusion::new(
            b2x.saturating_sub(dx),
            b2y.saturating_add(dy),
            terrain.resource_exclusion_radius,
        ));
    }
    zones
}

/// Roll obstacle rectangles as (original, mirror) pairs.
fn roll_obstacles(
    terrain: &TerrainConfig,
    world_w: i32,
    world_h: i32,
    rng: &mut MapRng,
) -> Vec<WorldRect> {
    let zones = exclusion_zones(terrain);
    let half_w = world_w / 2;
    let world_width = Fixed::from_num(world_w);
    let mut rects = Vec::new();

    let clusters = rng.next_count(terrain.cluster_count);
    for _ in 0..clusters {
        let cx = rng.next_range(terrain.cluster_margin, half_w - terrain.cluster_margin);
        let cy = rng.next_range(terrain.cluster_margin, world_h - terrain.cluster_margin);
        let count = rng.next_count(terrain.rects_per_cluster);

        for _ in 0..count {
            let w = rng.next_range(terrain.rect_width.0, terrain.rect_width.1);
            let h = rng.next_range(terrain.rect_height.0, terrain.rect_height.1);
            let ox = rng.next_range(-terrain.cluster_spread, terrain.cluster_spread);
            let oy = rng.next_range(-terrain.cluster_spread, terrain.cluster_spread);
            let rx = (cx + ox - w / 2).min(half_w - w).max(0);
            let ry = (cy + oy - h / 2).min(world_h - h).max(0);

            if zones.iter().any(|zone| zone.rejects(rx, ry, w, h)) {
                continue;
            }
            let rect = WorldRect::from_ints(rx, ry, w, h);
            rects.push(rect);
            rects.push(rect.mirrored_x(world_width));
        }
    }

    tracing::debug!(clusters, rects = rects.len(), "Rolled terrain obstacles");
    rects
}

impl NavGrid {
    /// Generate mirror-symmetric terrain from `seed` and commit it as the
    /// static layer.
    ///
    /// Both layers are rebuilt from scratch, so any marked buildings are
    /// cleared. Returns the obstacle rectangles, which are also kept in
    /// [`NavGrid::terrain_rects`]. The same seed and configuration always
    /// produce the same rectangles and tiles.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::BasesUnreachable`] if the bases cannot reach each
    /// other even after every obstacle was discarded (a base outside the
    /// world, for instance). The empty terrain is still committed.
    pub fn generate_terrain(&mut self, seed: u64) -> Result<Vec<WorldRect>> {
        let world_w = self.config().world_width as i32;
        let world_h = self.config().world_height as i32;
        let mut rng = MapRng::new(seed);
        let mut rects = roll_obstacles(&self.config().terrain, world_w, world_h, &mut rng);

        self.paint_terrain(&rects);
        let (from, to) = self.base_tiles();
        let mut connected = self.is_connected(from, to);

        // Each pass drops one (original, mirror) pair, so this runs at most
        // rects.len() / 2 times.
        let mut discarded = 0usize;
        while !connected && !rects.is_empty() {
            rects.truncate(rects.len().saturating_sub(2));
            self.paint_terrain(&rects);
            connected = self.is_connected(from, to);
            discarded += 1;
        }
        if discarded > 0 {
            tracing::warn!(
                seed,
                discarded_pairs = discarded,
                remaining = rects.len(),
                "Discarded terrain to reconnect bases"
            );
        }

        self.commit_terrain(rects.clone());

        if !connected {
            tracing::error!(?from, ?to, "Bases unreachable with no terrain");
            return Err(NavError::BasesUnreachable {
                from_x: from.0,
                from_y: from.1,
                to_x: to.0,
                to_y: to.1,
            });
        }

        tracing::debug!(seed, rects = rects.len(), "Terrain committed");
        Ok(rects)
    }

    /// Grid tiles of the two base anchors (spawn point + anchor offset).
    #[must_use]
    pub fn base_tiles(&self) -> ((i32, i32), (i32, i32)) {
        let terrain = &self.config().terrain;
        let offset = terrain.base_anchor_offset;
        let [(b1x, b1y), (b2x, b2y)] = terrain.bases;
        (
            self.world_to_grid(Vec2Fixed::from_ints(
                b1x.saturating_add(offset),
                b1y.saturating_add(offset),
            )),
            self.world_to_grid(Vec2Fixed::from_ints(
                b2x.saturating_add(offset),
                b2y.saturating_add(offset),
            )),
        )
    }

    /// Breadth-first reachability between two tiles over the live layer.
    ///
    /// Uses the same moves as path search, including the corner-cutting
    /// rule. False if either tile is not walkable.
    #[must_use]
    pub fn is_connected(&self, from: (i32, i32), to: (i32, i32)) -> bool {
        if !self.is_walkable(from.0, from.1) || !self.is_walkable(to.0, to.1) {
            return false;
        }

        let width = self.width() as usize;
        let mut visited = vec![false; width * self.height() as usize];
        let mut queue = VecDeque::new();
        visited[from.1 as usize * width + from.0 as usize] = true;
        queue.push_back(from);

        while let Some((cx, cy)) = queue.pop_front() {
            if (cx, cy) == to {
                return true;
            }
            for (nx, ny, _) in self.walkable_neighbors(cx, cy) {
                let idx = ny as usize * width + nx as usize;
                if !visited[idx] {
                    visited[idx] = true;
                    queue.push_back((nx, ny));
                }
            }
        }
        false
    }
}
