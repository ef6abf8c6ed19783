//! Waypoint paths, line-of-sight checks and path smoothing.

use crate::grid::NavGrid;
use crate::math::Vec2Fixed;

/// World-space waypoints for a unit to visit in order.
///
/// Never empty. The last waypoint is exactly the requested destination;
/// earlier waypoints are tile centers. The unit's own tile is not included.
/// Consuming the path with [`IntoIterator`] hands the waypoints over once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    waypoints: Vec<Vec2Fixed>,
    partial: bool,
}

impl Path {
    /// A path consisting of the destination alone.
    pub(crate) fn single(goal: Vec2Fixed) -> Self {
        Self {
            waypoints: vec![goal],
            partial: false,
        }
    }

    /// Build a smoothed path from raw search tiles (start first).
    pub(crate) fn from_tiles(
        grid: &NavGrid,
        tiles: &[(i32, i32)],
        goal: Vec2Fixed,
        partial: bool,
    ) -> Self {
        let smoothed = smooth_tiles(grid, tiles);
        let mut waypoints: Vec<Vec2Fixed> = smoothed
            .iter()
            .skip(1)
            .map(|&(gx, gy)| grid.grid_to_world(gx, gy))
            .collect();
        match waypoints.last_mut() {
            Some(last) => *last = goal,
            None => waypoints.push(goal),
        }
        Self { waypoints, partial }
    }

    /// The waypoints in visiting order.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2Fixed] {
        &self.waypoints
    }

    /// Number of waypoints (at least one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Always false; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// The final waypoint, equal to the requested destination.
    #[must_use]
    pub fn destination(&self) -> Vec2Fixed {
        self.waypoints[self.waypoints.len() - 1]
    }

    /// True when the search budget ran out (or the goal was unreachable) and
    /// the intermediate waypoints lead only as far as the closest tile found.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.partial
    }

    /// Take ownership of the waypoints.
    #[must_use]
    pub fn into_waypoints(self) -> Vec<Vec2Fixed> {
        self.waypoints
    }
}

impl IntoIterator for Path {
    type Item = Vec2Fixed;
    type IntoIter = std::vec::IntoIter<Vec2Fixed>;

    fn into_iter(self) -> Self::IntoIter {
        self.waypoints.into_iter()
    }
}

/// Greedy string pulling over a tile path.
///
/// From each anchor, jumps to the farthest later tile in line of sight. The
/// first and last tiles are always kept, and the result is never longer than
/// the input.
#[must_use]
pub fn smooth_tiles(grid: &NavGrid, tiles: &[(i32, i32)]) -> Vec<(i32, i32)> {
    let Some(&first) = tiles.first() else {
        return Vec::new();
    };

    let mut smoothed = vec![first];
    let mut anchor = 0;
    while anchor < tiles.len() - 1 {
        let (ax, ay) = tiles[anchor];
        let farthest = ((anchor + 1)..tiles.len())
            .rev()
            .find(|&j| grid.line_of_sight((ax, ay), tiles[j]))
            .unwrap_or(anchor + 1);
        smoothed.push(tiles[farthest]);
        anchor = farthest;
    }
    smoothed
}

impl NavGrid {
    /// Check for a clear straight line between two tiles on the live layer.
    ///
    /// Walks the Bresenham line; every visited tile must be walkable and
    /// diagonal steps must not cut an obstacle corner.
    #[must_use]
    pub fn line_of_sight(&self, from: (i32, i32), to: (i32, i32)) -> bool {
        let (x1, y1) = to;
        let dx = (x1 - from.0).abs();
        let dy = (y1 - from.1).abs();
        let sx = if x1 > from.0 { 1 } else { -1 };
        let sy = if y1 > from.1 { 1 } else { -1 };
        let mut err = dx - dy;
        let (mut x, mut y) = from;

        loop {
            if !self.is_walkable(x, y) {
                return false;
            }
            if x == x1 && y == y1 {
                return true;
            }

            let e2 = 2 * err;
            let step_x = e2 > -dy;
            let step_y = e2 < dx;
            if step_x
                && step_y
                && !(self.is_walkable(x + sx, y) && self.is_walkable(x, y + sy))
            {
                return false;
            }
            if step_x {
                err -= dy;
                x += sx;
            }
            if step_y {
                err += dx;
                y += sy;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NavConfig;
    use crate::math::{Fixed, WorldRect};

    fn open_grid(w: u32, h: u32) -> NavGrid {
        NavGrid::new(NavConfig::open_field(w, h, 32).with_building_padding(0)).unwrap()
    }

    fn block(grid: &mut NavGrid, tiles: &[(i32, i32)]) {
        for &(gx, gy) in tiles {
            let c = grid.grid_to_world(gx, gy);
            grid.mark_building(&WorldRect::new(c.x, c.y, Fixed::ZERO, Fixed::ZERO));
        }
    }

    #[test]
    fn test_line_of_sight_open() {
        let grid = open_grid(10, 10);
        assert!(grid.line_of_sight((0, 0), (9, 9)));
        assert!(grid.line_of_sight((0, 0), (9, 3)));
        assert!(grid.line_of_sight((5, 5), (5, 5)));
        assert!(grid.line_of_sight((9, 0), (0, 7)));
    }

    #[test]
    fn test_line_of_sight_blocked() {
        let mut grid = open_grid(10, 10);
        block(&mut grid, &[(4, 0)]);
        assert!(!grid.line_of_sight((0, 0), (9, 0)));
        assert!(grid.line_of_sight((0, 1), (9, 1)));
        // Endpoints out of bounds are blocked
        assert!(!grid.line_of_sight((0, 0), (10, 0)));
    }

    #[test]
    fn test_line_of_sight_no_corner_cutting() {
        let mut grid = open_grid(4, 4);
        block(&mut grid, &[(1, 0)]);
        // Diagonal step (0,0) -> (1,1) is flanked by the blocked (1,0)
        assert!(!grid.line_of_sight((0, 0), (1, 1)));
        assert!(grid.line_of_sight((0, 1), (1, 2)));
    }

    #[test]
    fn test_smooth_straight_line() {
        let grid = open_grid(10, 10);
        let tiles: Vec<_> = (0..6).map(|i| (i, i)).collect();
        assert_eq!(smooth_tiles(&grid, &tiles), vec![(0, 0), (5, 5)]);
    }

    #[test]
    fn test_smooth_keeps_corner() {
        let mut grid = open_grid(10, 10);
        // L-shaped route around a block at (1..=3, 1..=3)
        let blocked: Vec<_> = (1..=3).flat_map(|x| (1..=3).map(move |y| (x, y))).collect();
        block(&mut grid, &blocked);
        let tiles = vec![(0, 0), (0, 1), (0, 2), (0, 3), (0, 4), (1, 4), (2, 4), (3, 4)];
        let smoothed = smooth_tiles(&grid, &tiles);
        assert_eq!(smoothed, vec![(0, 0), (0, 4), (3, 4)]);
    }

    #[test]
    fn test_smooth_never_longer() {
        let grid = open_grid(10, 10);
        let tiles = vec![(0, 0), (1, 0), (2, 1), (3, 1), (4, 2)];
        assert!(smooth_tiles(&grid, &tiles).len() <= tiles.len());
        assert!(smooth_tiles(&grid, &[]).is_empty());
        assert_eq!(smooth_tiles(&grid, &[(2, 2)]), vec![(2, 2)]);
    }

    #[test]
    fn test_from_tiles_drops_start_and_uses_goal() {
        let mut grid = open_grid(10, 10);
        let blocked: Vec<_> = (1..=3).flat_map(|x| (1..=3).map(move |y| (x, y))).collect();
        block(&mut grid, &blocked);
        let tiles = vec![(0, 0), (0, 1), (0, 2), (0, 3), (0, 4), (1, 4), (2, 4), (3, 4)];
        let goal = Vec2Fixed::from_ints(120, 150);

        let path = Path::from_tiles(&grid, &tiles, goal, false);
        assert_eq!(path.waypoints(), &[grid.grid_to_world(0, 4), goal]);
        assert_eq!(path.destination(), goal);
        assert!(!path.is_empty());
    }

    #[test]
    fn test_path_into_iter() {
        let path = Path::single(Vec2Fixed::from_ints(1, 2));
        let collected: Vec<_> = path.into_iter().collect();
        assert_eq!(collected, vec![Vec2Fixed::from_ints(1, 2)]);
    }
}
