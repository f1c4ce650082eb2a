//! Integration tests for Layer 2: Engine
//!
//! Tests for the CRUD split on the handler fixtures: the concrete scenarios
//! and the invariants every rewritten file satisfies.

use std::path::PathBuf;

use attrsplit_engine::{Refactorer, Report};
use attrsplit_syntax::{Decl, Decorations, File, load_file, print_file};

mod invariants;
mod scenarios;

/// Returns the path of a file under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// A fixture before and after the rewrite.
pub struct Rewritten {
    pub original: File,
    pub file: File,
    pub report: Report,
}

impl Rewritten {
    /// Loads and rewrites a fixture with the default settings.
    pub fn load(name: &str) -> Self {
        let original = load_file(&fixture(name)).unwrap();
        let mut file = original.clone();
        let report = Refactorer::new().refactor(&mut file).unwrap();
        Self {
            original,
            file,
            report,
        }
    }

    /// Returns the last declaration of the function called `name`.
    pub fn decl(&self, name: &str) -> &Decl {
        self.file
            .decls
            .iter()
            .rev()
            .find(|decl| decl.as_func().is_some_and(|func| func.name == name))
            .unwrap()
    }

    /// Prints the function called `name` on its own.
    pub fn method(&self, name: &str) -> String {
        let mut decl = self.decl(name).clone();
        decl.decs = Decorations::default();
        let text = print_file(&File {
            package: "fastly".into(),
            decls: vec![decl],
            ..File::default()
        });
        text.trim_start_matches("package fastly\n\n").to_string()
    }
}
