//! Configuration validation utilities.

use std::path::{Path, PathBuf};

use nav_core::config::NavConfig;
use nav_core::error::{NavError, Result};
use nav_core::grid::NavGrid;

/// Seed used for the trial generation run during validation.
pub const TRIAL_SEED: u64 = 0;

/// Validate one RON configuration file.
///
/// Parses and validates the file, then builds a grid from it and runs one
/// trial terrain generation so that impossible base layouts are caught too.
///
/// # Errors
///
/// Returns an error if the file cannot be read, fails to parse, fails
/// validation, or its bases cannot be connected.
pub fn validate_config_file(path: &Path) -> Result<NavConfig> {
    let config = NavConfig::load(path)?;
    let mut grid = NavGrid::new(config.clone())?;
    grid.generate_terrain(TRIAL_SEED)?;
    tracing::debug!(
        path = %path.display(),
        width = grid.width(),
        height = grid.height(),
        "Config valid"
    );
    Ok(config)
}

/// Validate a RON file, or every `.ron` file in a directory.
///
/// Returns the files that were validated, in sorted order.
///
/// # Errors
///
/// Returns the first error encountered.
pub fn validate_path(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        validate_config_file(path)?;
        return Ok(vec![path.to_path_buf()]);
    }

    let entries = std::fs::read_dir(path).map_err(|source| NavError::ConfigRead {
        path: path.display().to_string(),
        source,
    })?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    files.sort();

    for file in &files {
        tracing::info!("Validating {}", file.display());
        validate_config_file(file)?;
    }
    Ok(files)
}
