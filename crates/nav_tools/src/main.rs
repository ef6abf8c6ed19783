//! Tactical navigation - Development Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nav_core::prelude::*;
use nav_tools::ascii::{render_grid, AsciiConfig};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "nav-tools")]
#[command(about = "Development tools for tactical navigation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate terrain and print a summary
    Generate {
        /// Terrain seed
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// RON configuration file (defaults are used when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Draw the map as ASCII
        #[arg(long)]
        ascii: bool,
        /// Print the generated rectangles as RON
        #[arg(long)]
        ron: bool,
    },
    /// Find a path on a generated map
    Path {
        /// Terrain seed
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// RON configuration file (defaults are used when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Start position in world units, as X,Y
        #[arg(long, value_parser = parse_point)]
        from: (i32, i32),
        /// Goal position in world units, as X,Y
        #[arg(long, value_parser = parse_point)]
        to: (i32, i32),
        /// Draw the map and path as ASCII
        #[arg(long)]
        ascii: bool,
    },
    /// Validate configuration files
    Validate {
        /// Path to a RON file or a directory of them
        #[arg(default_value = "assets/nav")]
        path: PathBuf,
    },
}

/// Terrain summary printed by `generate --ron`.
#[derive(Serialize)]
struct TerrainSummary<'a> {
    seed: u64,
    width: u32,
    height: u32,
    tile_size: u32,
    rects: &'a [WorldRect],
}

fn parse_point(s: &str) -> std::result::Result<(i32, i32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got `{s}`"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<i32>()
            .map_err(|e| format!("invalid coordinate `{v}`: {e}"))
    };
    Ok((parse(x)?, parse(y)?))
}

fn build_grid(config: Option<&PathBuf>, seed: u64) -> Result<NavGrid> {
    let config = match config {
        Some(path) => NavConfig::load(path)?,
        None => NavConfig::default(),
    };
    let mut grid = NavGrid::new(config)?;
    grid.generate_terrain(seed)?;
    Ok(grid)
}

fn run(command: Commands) -> Result<()> {
    let ascii = AsciiConfig::default();
    match command {
        Commands::Generate {
            seed,
            config,
            ascii: draw,
            ron,
        } => {
            let grid = build_grid(config.as_ref(), seed)?;
            tracing::info!(
                seed,
                width = grid.width(),
                height = grid.height(),
                rects = grid.terrain_rects().len(),
                "Terrain generated"
            );
            if ron {
                let summary = TerrainSummary {
                    seed,
                    width: grid.width(),
                    height: grid.height(),
                    tile_size: grid.tile_size(),
                    rects: grid.terrain_rects(),
                };
                match ron::ser::to_string_pretty(&summary, ron::ser::PrettyConfig::default()) {
                    Ok(text) => println!("{text}"),
                    Err(e) => tracing::error!("Failed to serialize terrain: {e}"),
                }
            }
            if draw {
                print!("{}", render_grid(&grid, None, &ascii));
            }
        }
        Commands::Path {
            seed,
            config,
            from,
            to,
            ascii: draw,
        } => {
            let grid = build_grid(config.as_ref(), seed)?;
            let start = Vec2Fixed::from_ints(from.0, from.1);
            let goal = Vec2Fixed::from_ints(to.0, to.1);
            let path = grid.find_path(start, goal);
            match &path {
                Some(path) => {
                    tracing::info!(
                        waypoints = path.len(),
                        partial = path.is_partial(),
                        "Path found"
                    );
                    for point in path.waypoints() {
                        println!("{:.2},{:.2}", point.x, point.y);
                    }
                }
                None => tracing::warn!(?from, ?to, "No path"),
            }
            if draw {
                print!("{}", render_grid(&grid, path.as_ref(), &ascii));
            }
        }
        Commands::Validate { path } => {
            tracing::info!("Validating configuration in: {}", path.display());
            let files = nav_tools::validate::validate_path(&path)?;
            tracing::info!(files = files.len(), "Validation passed");
        }
    }
    Ok(())
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
