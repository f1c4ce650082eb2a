//! Loading source files into decorated trees.

use std::fs;
use std::path::Path;

use attrsplit_foundation::{Error, Result};

use crate::ast::File;
use crate::parser::parse_file;

/// Reads and parses the file at `path`.
///
/// # Errors
/// Returns a parse error naming `path` if the file cannot be read or is
/// not a well-formed translation unit.
pub fn load_file(path: &Path) -> Result<File> {
    let source = fs::read_to_string(path).map_err(|err| Error::unreadable(path, err))?;
    load_source(path, &source)
}

/// Parses `source` as if it had been read from `path`.
///
/// # Errors
/// Returns a parse error naming `path` if the source is not well-formed.
pub fn load_source(path: &Path, source: &str) -> Result<File> {
    parse_file(source).map_err(|err| err.at_path(path))
}
