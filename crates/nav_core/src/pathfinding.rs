//! Grid-based pathfinding using a bounded A* search.
//!
//! All costs are x10 integers (cardinal 10, diagonal 14) so every client
//! computes the same path. Each query expands at most
//! [`crate::config::SearchConfig::max_expansions`] tiles; when the budget
//! runs out the query returns a partial path toward the closest tile found.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::grid::NavGrid;
use crate::math::Vec2Fixed;
use crate::path::Path;

/// Octile distance heuristic (x10 integer).
///
/// Admissible and consistent for cardinal 10 / diagonal 14 costs.
#[inline]
#[must_use]
pub fn octile_distance(x0: i32, y0: i32, x1: i32, y1: i32) -> u32 {
    let dx = x0.abs_diff(x1);
    let dy = y0.abs_diff(y1);
    10 * (dx + dy) - 6 * dx.min(dy)
}

/// A node in the A* open set priority queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct OpenNode {
    /// f = g + h
    f: u32,
    /// Insertion counter; earlier pushes win ties.
    order: u64,
    /// Tile index.
    idx: u32,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so reverse for min-heap behavior.
        match other.f.cmp(&self.f) {
            Ordering::Equal => other.order.cmp(&self.order),
            ord => ord,
        }
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reusable working buffers for path queries.
///
/// Entries are invalidated by bumping a generation stamp instead of clearing,
/// so reusing one scratch across many queries on the same grid avoids
/// per-query allocation. A scratch adapts itself to whichever grid it is
/// used with.
#[derive(Debug, Default)]
pub struct SearchScratch {
    g_cost: Vec<u32>,
    came_from: Vec<Option<u32>>,
    stamp: Vec<u32>,
    generation: u32,
    open: BinaryHeap<OpenNode>,
    tiles: Vec<(i32, i32)>,
}

impl SearchScratch {
    /// Create empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create scratch buffers sized for `grid`.
    #[must_use]
    pub fn for_grid(grid: &NavGrid) -> Self {
        let mut scratch = Self::new();
        scratch.reset(grid.width() as usize * grid.height() as usize);
        scratch
    }

    fn reset(&mut self, tile_count: usize) {
        if self.stamp.len() != tile_count {
            self.g_cost = vec![0; tile_count];
            self.came_from = vec![None; tile_count];
            self.stamp = vec![0; tile_count];
            self.generation = 0;
        }
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.stamp.fill(0);
            self.generation = 1;
        }
        self.open.clear();
        self.tiles.clear();
    }

    #[inline]
    fn g(&self, idx: usize) -> Option<u32> {
        (self.stamp[idx] == self.generation).then(|| self.g_cost[idx])
    }

    #[inline]
    fn record(&mut self, idx: usize, g: u32, parent: Option<u32>) {
        self.stamp[idx] = self.generation;
        self.g_cost[idx] = g;
        self.came_from[idx] = parent;
    }
}

/// A single start -> goal request for batch queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathQuery {
    /// Current unit position.
    pub start: Vec2Fixed,
    /// Requested destination.
    pub goal: Vec2Fixed,
}

impl PathQuery {
    /// Create a new query.
    #[must_use]
    pub const fn new(start: Vec2Fixed, goal: Vec2Fixed) -> Self {
        Self { start, goal }
    }
}

impl NavGrid {
    /// Find a path from `start` to `goal` over the live layer.
    ///
    /// Returns world waypoints ending exactly at `goal`, or `None` if no
    /// walkable tile exists near the start or goal, or if no tile closer to
    /// the goal than the start was reached. When the expansion budget runs
    /// out the path leads toward the closest tile found.
    #[must_use]
    pub fn find_path(&self, start: Vec2Fixed, goal: Vec2Fixed) -> Option<Path> {
        let mut scratch = SearchScratch::new();
        self.find_path_with(&mut scratch, start, goal)
    }

    /// [`NavGrid::find_path`] reusing caller-owned scratch buffers.
    pub fn find_path_with(
        &self,
        scratch: &mut SearchScratch,
        start: Vec2Fixed,
        goal: Vec2Fixed,
    ) -> Option<Path> {
        let start_tile = self.walkable_near(self.world_to_grid(start))?;
        let goal_tile = self.walkable_near(self.world_to_grid(goal))?;

        if start_tile == goal_tile {
            return Some(Path::single(goal));
        }

        let (terminal, partial) = self.search(scratch, start_tile, goal_tile)?;
        self.trace_back(scratch, terminal);
        Some(Path::from_tiles(self, &scratch.tiles, goal, partial))
    }

    /// Answer each query in order, reusing one scratch buffer.
    #[must_use]
    pub fn find_paths(&self, queries: &[PathQuery]) -> Vec<Option<Path>> {
        let mut scratch = SearchScratch::for_grid(self);
        queries
            .iter()
            .map(|q| self.find_path_with(&mut scratch, q.start, q.goal))
            .collect()
    }

    /// Answer queries in parallel. The grid is borrowed immutably for the
    /// whole batch; results match [`NavGrid::find_paths`].
    #[cfg(feature = "parallel")]
    #[must_use]
    pub fn par_find_paths(&self, queries: &[PathQuery]) -> Vec<Option<Path>> {
        use rayon::prelude::*;

        queries
            .par_iter()
            .map_init(
                || SearchScratch::for_grid(self),
                |scratch, q| self.find_path_with(scratch, q.start, q.goal),
            )
            .collect()
    }

    /// Nearest walkable tile to `(gx, gy)`, searching square rings of growing
    /// radius. Returns the tile itself if it is walkable.
    #[must_use]
    pub fn nearest_walkable(&self, gx: i32, gy: i32) -> Option<(i32, i32)> {
        if self.is_walkable(gx, gy) {
            return Some((gx, gy));
        }
        for r in 1..=self.config().search.nearest_walkable_radius {
            for dx in -r..=r {
                for dy in -r..=r {
                    if dx.abs() != r && dy.abs() != r {
                        continue;
                    }
                    let (nx, ny) = (gx.saturating_add(dx), gy.saturating_add(dy));
                    if self.is_walkable(nx, ny) {
                        return Some((nx, ny));
                    }
                }
            }
        }
        None
    }

    fn walkable_near(&self, (gx, gy): (i32, i32)) -> Option<(i32, i32)> {
        let found = self.nearest_walkable(gx, gy);
        if found.is_none() {
            tracing::trace!(gx, gy, "No walkable tile in range");
        }
        found
    }

    #[inline]
    fn tile_index(&self, gx: i32, gy: i32) -> usize {
        gy as usize * self.width() as usize + gx as usize
    }

    #[inline]
    fn tile_coords(&self, idx: usize) -> (i32, i32) {
        let width = self.width() as usize;
        ((idx % width) as i32, (idx / width) as i32)
    }

    /// Bounded A*. Returns the terminal tile index and whether it is a
    /// partial result, or `None` when no progress was possible.
    fn search(
        &self,
        scratch: &mut SearchScratch,
        start: (i32, i32),
        goal: (i32, i32),
    ) -> Option<(usize, bool)> {
        scratch.reset(self.width() as usize * self.height() as usize);

        let max_expansions = self.config().search.max_expansions;
        let start_idx = self.tile_index(start.0, start.1);
        let goal_idx = self.tile_index(goal.0, goal.1);

        let start_h = octile_distance(start.0, start.1, goal.0, goal.1);
        let mut best = (start_h, start_idx);
        let mut order = 0u64;

        scratch.record(start_idx, 0, None);
        scratch.open.push(OpenNode {
            f: start_h,
            order,
            idx: start_idx as u32,
        });

        let mut expansions = 0u32;
        while expansions < max_expansions {
            let Some(node) = scratch.open.pop() else {
                break;
            };
            let idx = node.idx as usize;
            if idx == goal_idx {
                tracing::trace!(expansions, "Path found");
                return Some((goal_idx, false));
            }

            let (cx, cy) = self.tile_coords(idx);
            let Some(current_g) = scratch.g(idx) else {
                continue;
            };
            // Stale entry: a cheaper route to this tile was pushed later.
            if node.f > current_g + octile_distance(cx, cy, goal.0, goal.1) {
                continue;
            }

            expansions += 1;

            for (nx, ny, cost) in self.walkable_neighbors(cx, cy) {
                let n_idx = self.tile_index(nx, ny);
                let tentative_g = current_g + cost;
                if scratch.g(n_idx).is_some_and(|g| g <= tentative_g) {
                    continue;
                }

                scratch.record(n_idx, tentative_g, Some(idx as u32));
                let h = octile_distance(nx, ny, goal.0, goal.1);
                order += 1;
                scratch.open.push(OpenNode {
                    f: tentative_g + h,
                    order,
                    idx: n_idx as u32,
                });
                if h < best.0 {
                    best = (h, n_idx);
                }
            }
        }

        if best.1 == start_idx {
            tracing::trace!(expansions, "No progress toward goal");
            return None;
        }
        tracing::debug!(
            expansions,
            remaining_h = best.0,
            "Search budget exhausted or goal unreachable; returning partial path"
        );
        Some((best.1, true))
    }

    /// Walk predecessors from `terminal` back to the start into
    /// `scratch.tiles`, in start -> terminal order.
    fn trace_back(&self, scratch: &mut SearchScratch, terminal: usize) {
        scratch.tiles.clear();
        let mut node = Some(terminal as u32);
        while let Some(idx) = node {
            scratch.tiles.push(self.tile_coords(idx as usize));
            node = scratch.came_from[idx as usize];
        }
        scratch.tiles.reverse();
    }
}
