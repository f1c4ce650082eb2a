//! Integration tests for Layer 1: Syntax
//!
//! Tests for loading, parsing, traversing, and printing the handler fixtures.

use std::path::PathBuf;

mod loading;
mod printing;
mod visiting;

/// Returns the path of a file under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Names of every handler fixture.
pub const FIXTURES: [&str; 3] = ["acl.go", "missing_bucket.go", "bad_read.go"];
