//! attrsplit - Service attribute handler CRUD splitter
//!
//! This crate re-exports all layers of the attrsplit system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: attrsplit_runtime     - Driver, configuration, logging, CLI
//! Layer 2: attrsplit_engine      - Anchor resolution and the CRUD split rewrites
//! Layer 1: attrsplit_syntax      - Lexer, decorated AST, parser, visitors, printer
//! Layer 0: attrsplit_foundation  - Error types and the per-file stage machine
//! ```

pub use attrsplit_engine as engine;
pub use attrsplit_foundation as foundation;
pub use attrsplit_runtime as runtime;
pub use attrsplit_syntax as syntax;
