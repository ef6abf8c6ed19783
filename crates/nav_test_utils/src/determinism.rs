//! Determinism testing utilities.
//!
//! Provides a harness for verifying that terrain generation and path
//! queries produce identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Navigation must be 100% deterministic for lockstep multiplayer: every
//! peer issues the same path queries against its own copy of the grid and
//! must get the same waypoints back. Sources of non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   World positions use [`nav_core::math::Fixed`] and search costs are
//!   integers.
//!
//! - **Tie-breaking in the open set**: equal-cost nodes must pop in the same
//!   order everywhere. The search breaks ties by insertion order.
//!
//! - **System randomness**: terrain is rolled from an explicit seed.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: single queries and single generations repeat exactly
//! 2. **Property tests**: random seeds and positions still repeat exactly
//! 3. **Parallel tests**: grids built on N threads all hash the same

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use nav_core::config::NavConfig;
use nav_core::grid::{Layer, NavGrid};
use nav_core::path::Path;
use nav_core::pathfinding::PathQuery;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps applied per run.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic runs).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Navigation is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a setup/step sequence multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to repeat the sequence
/// * `steps` - Number of steps to apply per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
///
/// # Example
///
/// ```ignore
/// use nav_test_utils::determinism::{grid_hash, verify_determinism};
///
/// let result = verify_determinism(
///     3,
///     0,
///     || generated_grid(42),
///     |_| {},
///     grid_hash,
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Hash both tile layers and the generated terrain rectangles of a grid.
#[must_use]
pub fn grid_hash(grid: &NavGrid) -> u64 {
    let mut hasher = DefaultHasher::new();
    grid.layer_hash(Layer::Static).hash(&mut hasher);
    grid.layer_hash(Layer::Live).hash(&mut hasher);
    grid.terrain_rects().hash(&mut hasher);
    hasher.finish()
}

/// Hash a path query result, including whether it was partial.
#[must_use]
pub fn path_hash(path: Option<&Path>) -> u64 {
    compute_hash(&path.map(|p| (p.waypoints(), p.is_partial())))
}

/// Generate terrain `runs` times from the same config and seed and compare
/// the resulting grids.
///
/// # Panics
///
/// Panics if the config is invalid or generation fails.
pub fn verify_terrain_determinism(config: &NavConfig, seed: u64, runs: usize) -> DeterminismResult {
    verify_determinism(
        runs,
        0,
        || {
            let mut grid = NavGrid::new(config.clone()).expect("valid config");
            grid.generate_terrain(seed).expect("terrain generation");
            grid
        },
        |_| {},
        grid_hash,
    )
}

/// Result of parallel grid builds.
#[derive(Debug, Clone)]
pub struct ParallelGenResult {
    /// Grid hash from each build.
    pub hashes: Vec<u64>,
    /// Seed every build used.
    pub seed: u64,
}

impl ParallelGenResult {
    /// Check if all builds produced identical grids.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all builds matched.
    ///
    /// # Panics
    ///
    /// Panics if builds produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel terrain generation diverged!\n\
                 Builds: {}\n\
                 Seed: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.seed,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Generate the same terrain on `num_builds` scoped threads and collect
/// the grid hashes.
///
/// Catches non-determinism that only shows up under thread scheduling or
/// memory layout differences.
///
/// # Panics
///
/// Panics if a build thread panics.
pub fn run_parallel_generations(
    config: &NavConfig,
    seed: u64,
    num_builds: usize,
) -> ParallelGenResult {
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_builds)
            .map(|_| {
                s.spawn(|| {
                    let mut grid = NavGrid::new(config.clone()).expect("valid config");
                    grid.generate_terrain(seed).expect("terrain generation");
                    grid_hash(&grid)
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    ParallelGenResult { hashes, seed }
}

/// Answer `queries` on two independently built grids, returning the index
/// of the first query whose results differ.
///
/// # Returns
///
/// `None` if every query matched.
pub fn find_first_divergent_query<F>(setup_fn: F, queries: &[PathQuery]) -> Option<usize>
where
    F: Fn() -> NavGrid,
{
    let grid1 = setup_fn();
    let grid2 = setup_fn();

    queries.iter().position(|q| {
        let a = grid1.find_path(q.start, q.goal);
        let b = grid2.find_path(q.start, q.goal);
        path_hash(a.as_ref()) != path_hash(b.as_ref())
    })
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for navigation testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of grids and path queries.
pub mod strategies {
    use proptest::prelude::*;

    use nav_core::math::{Fixed, Vec2Fixed, WorldRect};
    use nav_core::pathfinding::PathQuery;

    /// Generate a terrain seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }

    /// Generate a fixed-point coordinate in `[-margin, extent + margin)`,
    /// with a fractional part, so some values fall outside the world.
    pub fn arb_coordinate(extent: i32, margin: i32) -> impl Strategy<Value = Fixed> {
        ((-margin..extent + margin), 0u32..4)
            .prop_map(|(whole, quarter)| Fixed::from_num(whole) + Fixed::from_num(quarter) / Fixed::from_num(4))
    }

    /// Generate a world position around a `width` x `height` world.
    pub fn arb_world_position(width: i32, height: i32) -> impl Strategy<Value = Vec2Fixed> {
        (arb_coordinate(width, 64), arb_coordinate(height, 64))
            .prop_map(|(x, y)| Vec2Fixed::new(x, y))
    }

    /// Generate a position strictly inside a `width` x `height` world.
    pub fn arb_inner_position(width: i32, height: i32) -> impl Strategy<Value = Vec2Fixed> {
        (0..width, 0..height).prop_map(|(x, y)| Vec2Fixed::from_ints(x, y))
    }

    /// Generate a path query around a `width` x `height` world.
    pub fn arb_query(width: i32, height: i32) -> impl Strategy<Value = PathQuery> {
        (
            arb_world_position(width, height),
            arb_world_position(width, height),
        )
            .prop_map(|(start, goal)| PathQuery::new(start, goal))
    }

    /// Generate a building footprint inside a `width` x `height` world.
    pub fn arb_footprint(width: i32, height: i32) -> impl Strategy<Value = WorldRect> {
        (0..width, 0..height, 16i32..160, 16i32..160)
            .prop_map(|(x, y, w, h)| WorldRect::from_ints(x, y, w, h))
    }

    /// Generate a list of building footprints.
    pub fn arb_footprints(
        width: i32,
        height: i32,
        max_buildings: usize,
    ) -> impl Strategy<Value = Vec<WorldRect>> {
        proptest::collection::vec(arb_footprint(width, height), 0..max_buildings)
    }
}
