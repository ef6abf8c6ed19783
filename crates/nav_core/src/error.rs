//! Error types for the navigation subsystem.
//!
//! "No path" is not an error: path queries return `Option`. These variants
//! cover setup-time failures only.

use thiserror::Error;

/// Result type alias using [`NavError`].
pub type Result<T> = std::result::Result<T, NavError>;

/// Top-level error type for navigation setup failures.
#[derive(Debug, Error)]
pub enum NavError {
    /// Configuration values are unusable.
    #[error("Invalid navigation config: {0}")]
    InvalidConfig(String),

    /// Failed to read a configuration file.
    #[error("Failed to read navigation config '{path}': {source}")]
    ConfigRead {
        /// Path to the file that failed to read.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a RON configuration.
    #[error("Failed to parse navigation config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    /// The two bases are not connected even with every obstacle removed.
    #[error("Bases unreachable after terrain repair: tile ({from_x}, {from_y}) cannot reach ({to_x}, {to_y})")]
    BasesUnreachable {
        /// First base tile x.
        from_x: i32,
        /// First base tile y.
        from_y: i32,
        /// Second base tile x.
        to_x: i32,
        /// Second base tile y.
        to_y: i32,
    },
}
