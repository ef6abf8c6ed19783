//! ASCII map renderer for quick terminal review of grids and paths.
//!
//! Large grids are downsampled: each character covers a block of tiles and
//! shows the most significant tile in the block.

use std::fmt::Write as _;

use nav_core::grid::{NavGrid, Tile};
use nav_core::path::Path;

/// ASCII rendering configuration.
#[derive(Debug, Clone)]
pub struct AsciiConfig {
    /// Maximum width of the map in characters.
    pub max_width: usize,
    /// Maximum height of the map in characters.
    pub max_height: usize,
    /// Show the legend under the map.
    pub show_legend: bool,
    /// Use colored output (ANSI).
    pub use_color: bool,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            max_width: 120,
            max_height: 48,
            show_legend: true,
            use_color: true,
        }
    }
}

/// ANSI color codes.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";

    pub const BLUE: &str = "\x1b[34m";
    pub const RED: &str = "\x1b[31m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const GREEN: &str = "\x1b[32m";
    pub const GRAY: &str = "\x1b[90m";
}

/// What a map cell shows, in increasing priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Cell {
    Open,
    Building,
    Terrain,
    Waypoint,
    Base(u8),
}

impl Cell {
    fn glyph(self) -> char {
        match self {
            Self::Open => '.',
            Self::Building => '+',
            Self::Terrain => '#',
            Self::Waypoint => '*',
            Self::Base(n) => char::from(b'0' + n),
        }
    }

    fn color(self) -> &'static str {
        match self {
            Self::Open => colors::GRAY,
            Self::Building => colors::YELLOW,
            Self::Terrain => colors::RED,
            Self::Waypoint => colors::GREEN,
            Self::Base(_) => colors::BLUE,
        }
    }
}

fn tile_cell(tile: Tile) -> Cell {
    match tile {
        Tile::Walkable => Cell::Open,
        Tile::Building => Cell::Building,
        Tile::Terrain => Cell::Terrain,
    }
}

/// Render the live layer of a grid, with base anchors and optional path
/// waypoints, as ASCII art.
#[must_use]
pub fn render_grid(grid: &NavGrid, path: Option<&Path>, config: &AsciiConfig) -> String {
    let width = grid.width() as usize;
    let height = grid.height() as usize;
    let block_w = width.div_ceil(config.max_width.max(1)).max(1);
    let block_h = height.div_ceil(config.max_height.max(1)).max(1);
    let cols = width.div_ceil(block_w);
    let rows = height.div_ceil(block_h);

    let mut cells = vec![vec![Cell::Open; cols]; rows];
    for gy in 0..height {
        for gx in 0..width {
            let cell = &mut cells[gy / block_h][gx / block_w];
            *cell = (*cell).max(tile_cell(grid.get(gx as i32, gy as i32)));
        }
    }

    let mut mark = |gx: i32, gy: i32, marker: Cell| {
        if grid.in_bounds(gx, gy) {
            let cell = &mut cells[gy as usize / block_h][gx as usize / block_w];
            *cell = (*cell).max(marker);
        }
    };
    if let Some(path) = path {
        for point in path.waypoints() {
            let (gx, gy) = grid.world_to_grid(*point);
            mark(gx, gy, Cell::Waypoint);
        }
    }
    let (base1, base2) = grid.base_tiles();
    mark(base1.0, base1.1, Cell::Base(1));
    mark(base2.0, base2.1, Cell::Base(2));

    let mut output = String::new();
    let _ = writeln!(
        output,
        "{}Grid {}x{} tiles │ {} terrain rects │ 1 char = {}x{} tiles{}",
        if config.use_color { colors::BOLD } else { "" },
        width,
        height,
        grid.terrain_rects().len(),
        block_w,
        block_h,
        if config.use_color { colors::RESET } else { "" }
    );

    output.push('╔');
    output.extend(std::iter::repeat('═').take(cols));
    output.push_str("╗\n");
    for row in &cells {
        output.push('║');
        for cell in row {
            if config.use_color && *cell != Cell::Open {
                output.push_str(cell.color());
                output.push(cell.glyph());
                output.push_str(colors::RESET);
            } else {
                output.push(cell.glyph());
            }
        }
        output.push_str("║\n");
    }
    output.push('╚');
    output.extend(std::iter::repeat('═').take(cols));
    output.push_str("╝\n");

    if config.show_legend {
        output.push_str("Legend: . open  # terrain  + building  * waypoint  1/2 base\n");
        if let Some(path) = path {
            let _ = writeln!(
                output,
                "Path: {} waypoints{}",
                path.len(),
                if path.is_partial() { " (partial)" } else { "" }
            );
        }
    }

    output
}
