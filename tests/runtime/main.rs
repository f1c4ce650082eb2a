//! Integration tests for Layer 3: Runtime
//!
//! Tests for configuration loading and the all-or-nothing driver.

use std::path::PathBuf;

mod config;
mod driver;

/// Returns the fixture directory.
pub fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}
