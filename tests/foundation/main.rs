//! Integration tests for Layer 0: Foundation
//!
//! Tests for the error kinds, the per-file stage machine, and error context.

mod errors;
mod stages;
