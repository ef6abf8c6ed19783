//! Navigation benchmarks for nav_core.
//!
//! Run with: `cargo bench -p nav_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nav_core::prelude::*;

fn generated_grid(seed: u64) -> NavGrid {
    let mut grid = NavGrid::new(NavConfig::default()).expect("default config is valid");
    grid.generate_terrain(seed).expect("default map connects");
    grid
}

/// Terrain generation on the default world.
pub fn terrain_benchmark(c: &mut Criterion) {
    c.bench_function("generate_terrain_default", |b| {
        b.iter(|| {
            let mut grid = NavGrid::new(NavConfig::default()).expect("default config is valid");
            black_box(grid.generate_terrain(black_box(42)))
        })
    });
}

/// Path queries across the default world.
pub fn pathfinding_benchmark(c: &mut Criterion) {
    let grid = generated_grid(42);
    let start = Vec2Fixed::from_ints(200, 300);
    let goal = Vec2Fixed::from_ints(9800, 5000);

    c.bench_function("find_path_cross_map", |b| {
        b.iter(|| black_box(grid.find_path(black_box(start), black_box(goal))))
    });

    let mut scratch = SearchScratch::for_grid(&grid);
    c.bench_function("find_path_cross_map_reused_scratch", |b| {
        b.iter(|| black_box(grid.find_path_with(&mut scratch, black_box(start), black_box(goal))))
    });

    let queries: Vec<_> = (0..64)
        .map(|i| {
            PathQuery::new(
                Vec2Fixed::from_ints(100 + i * 40, 200),
                Vec2Fixed::from_ints(9000 - i * 60, 5000),
            )
        })
        .collect();
    c.bench_function("find_paths_batch_64", |b| {
        b.iter(|| black_box(grid.find_paths(black_box(&queries))))
    });
}

criterion_group!(benches, terrain_benchmark, pathfinding_benchmark);
criterion_main!(benches);
