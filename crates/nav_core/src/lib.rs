//! # Nav Core
//!
//! Deterministic tactical navigation for a lockstep RTS.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No system randomness (terrain is seeded)
//! - No floating-point math (world positions are fixed-point, costs are integers)
//!
//! Every peer that builds a grid from the same configuration and seed, and
//! applies the same building changes, gets identical tiles and identical
//! paths.
//!
//! ## Crate Structure
//!
//! - [`grid`] - Tile grid with static (terrain) and live (terrain + buildings) layers
//! - [`terrain`] - Seeded, mirror-symmetric terrain generation
//! - [`pathfinding`] - Bounded A* search over the live layer
//! - [`path`] - Waypoint paths, line of sight and smoothing
//! - [`config`] - Tunable world, terrain and search parameters
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod error;
pub mod grid;
pub mod math;
pub mod path;
pub mod pathfinding;
pub mod terrain;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{NavConfig, SearchConfig, TerrainConfig};
    pub use crate::error::{NavError, Result};
    pub use crate::grid::{Layer, NavGrid, Tile};
    pub use crate::math::{Fixed, Vec2Fixed, WorldRect};
    pub use crate::path::Path;
    pub use crate::pathfinding::{PathQuery, SearchScratch};
}
