//! Driver, configuration, and logging for attrsplit.
//!
//! This crate provides:
//! - [`Driver`] - Sequential per-file processing with all-or-nothing output
//! - [`Config`] - TOML configuration with compiled-in defaults
//! - [`telemetry`] - `tracing` subscriber setup writing to standard error
//! - The `attrsplit` command-line binary

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod driver;
pub mod telemetry;

pub use config::{Config, DEFAULT_BASE_DIR, DEFAULT_FILES};
pub use driver::{Driver, FileOutput};
pub use telemetry::TelemetryConfig;
