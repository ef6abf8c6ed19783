//! # Nav Development Tools
//!
//! Command-line tools for development:
//! - Terrain previews rendered as ASCII
//! - One-off path queries
//! - Configuration validators

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ascii;
pub mod validate;
