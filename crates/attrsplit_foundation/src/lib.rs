//! Core types shared by every attrsplit layer.
//!
//! This crate provides:
//! - [`Error`] - Rich error type with per-file context
//! - [`ErrorKind`] - The categorized failure modes of a refactoring run
//! - [`Stage`] - The per-file processing state recorded on failure

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;

pub use error::{Error, ErrorContext, ErrorKind, ParseCause, Result, Stage};
