//! Error types for attrsplit.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Every abnormal condition is fatal at first occurrence; the kinds below
//! exist so the driver can say *why* and *where* a run aborted.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Placeholder path for sources that were not read from disk.
pub const IN_MEMORY_PATH: &str = "<input>";

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for attrsplit operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a syntax error for an in-memory source.
    ///
    /// The loader replaces the placeholder path with [`Error::at_path`].
    #[must_use]
    pub fn syntax(message: impl Into<String>, line: u32, column: u32, context: String) -> Self {
        Self::new(ErrorKind::Parse {
            path: PathBuf::from(IN_MEMORY_PATH),
            cause: ParseCause::Syntax {
                message: message.into(),
                line,
                column,
                context,
            },
        })
    }

    /// Creates an error for a source file that could not be read.
    #[must_use]
    pub fn unreadable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::new(ErrorKind::Parse {
            path: path.into(),
            cause: ParseCause::Io(source),
        })
    }

    /// Creates a missing anchor declaration error.
    #[must_use]
    pub fn not_found(anchor: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound {
            anchor: anchor.into(),
        })
    }

    /// Creates an unsupported receiver error.
    #[must_use]
    pub fn invalid_receiver(found: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidReceiver {
            found: found.into(),
        })
    }

    /// Creates a missing `s.Schema[...] = ...` assignment error.
    #[must_use]
    pub fn schema_assignment_not_found(receiver: impl Into<String>) -> Self {
        Self::new(ErrorKind::SchemaAssignmentNotFound {
            receiver: receiver.into(),
        })
    }

    /// Creates an unexpected selector error for the `Read` rewrite.
    #[must_use]
    pub fn unexpected_selector(selector: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnexpectedSelectorInRead {
            selector: selector.into(),
        })
    }

    /// Creates a printer error.
    #[must_use]
    pub fn print(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Print {
            message: message.into(),
        })
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config {
            message: message.into(),
        })
    }

    /// Attaches a file path to a parse error raised from an in-memory parse.
    ///
    /// Errors of any other kind are returned unchanged.
    #[must_use]
    pub fn at_path(mut self, file: impl Into<PathBuf>) -> Self {
        if let ErrorKind::Parse { path, .. } = &mut self.kind {
            *path = file.into();
        }
        self
    }

    /// Returns the stage the error was raised in, if known.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        self.context.as_ref().map(|ctx| ctx.stage)
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// The file could not be read or is not well-formed source.
    #[error("parse error in {}: {cause}", .path.display())]
    Parse {
        /// The file being loaded.
        path: PathBuf,
        /// What went wrong.
        cause: ParseCause,
    },

    /// A required anchor declaration is missing.
    #[error("no function declaration matching anchor `{anchor}`")]
    NotFound {
        /// The anchor substring that matched nothing.
        anchor: String,
    },

    /// The receiver of `Process` is not of the form `*H`.
    #[error("expected a pointer receiver `*H` on Process, found `{found}`")]
    InvalidReceiver {
        /// The receiver as written in the source.
        found: String,
    },

    /// `Register` never assigns into `s.Schema[...]`.
    #[error("Register on `{receiver}` has no `s.Schema[...] = ...` assignment")]
    SchemaAssignmentNotFound {
        /// The attribute handler type.
        receiver: String,
    },

    /// `Read` dereferences something other than `s.ActiveVersion`.
    #[error("unexpected selector `{selector}` in Read, only s.ActiveVersion is rewritable")]
    UnexpectedSelectorInRead {
        /// The offending selector chain.
        selector: String,
    },

    /// The rewritten tree could not be printed or failed verification.
    #[error("print error: {message}")]
    Print {
        /// Description of the failure.
        message: String,
    },

    /// The configuration file is missing or invalid.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the failure.
        message: String,
    },
}

/// Underlying cause of a [`ErrorKind::Parse`] error.
#[derive(Debug, Error)]
pub enum ParseCause {
    /// The file could not be read.
    #[error("cannot read file: {0}")]
    Io(#[from] io::Error),

    /// The source is not well-formed.
    #[error("{line}:{column}: {message}")]
    Syntax {
        /// Description of the syntax error.
        message: String,
        /// Line number (1-indexed).
        line: u32,
        /// Column number (1-indexed).
        column: u32,
        /// The source line where the error occurred.
        context: String,
    },
}

/// Per-file processing state.
///
/// `Parsing → Indexing → Transforming → Printing → Done`; a failure in any
/// stage aborts the whole run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Reading and parsing the source file.
    Parsing,
    /// Resolving the anchor declarations.
    Indexing,
    /// Synthesizing and rewriting declarations.
    Transforming,
    /// Serializing the mutated tree.
    Printing,
    /// The file was processed successfully.
    Done,
}

impl Stage {
    /// Returns the stage that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Parsing => Self::Indexing,
            Self::Indexing => Self::Transforming,
            Self::Transforming => Self::Printing,
            Self::Printing | Self::Done => Self::Done,
        }
    }

    /// Returns a lowercase name for this stage.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Parsing => "parsing",
            Self::Indexing => "indexing",
            Self::Transforming => "transforming",
            Self::Printing => "printing",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// The input file being processed.
    pub path: PathBuf,
    /// The stage the file was in.
    pub stage: Stage,
}

impl ErrorContext {
    /// Creates a new context.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, stage: Stage) -> Self {
        Self {
            path: path.into(),
            stage,
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "while {} {}", self.stage, self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_not_found_names_anchor() {
        let err = Error::not_found("Register");
        assert!(matches!(err.kind, ErrorKind::NotFound { .. }));
        assert!(format!("{err}").contains("Register"));
    }

    #[test]
    fn syntax_error_takes_path() {
        let err = Error::syntax("expected '}'", 3, 7, "func f() {".into()).at_path("acl.go");
        let msg = format!("{err}");
        assert!(msg.contains("acl.go"));
        assert!(msg.contains("3:7"));
    }

    #[test]
    fn at_path_leaves_other_kinds() {
        let err = Error::print("boom").at_path("acl.go");
        assert!(!format!("{err}").contains("acl.go"));
    }

    #[test]
    fn error_with_context() {
        let err = Error::unexpected_selector("s.Foo.Bar")
            .with_context(ErrorContext::new("read.go", Stage::Transforming));
        assert_eq!(err.stage(), Some(Stage::Transforming));
        let ctx = err.context.unwrap();
        assert_eq!(format!("{ctx}"), "while transforming read.go");
    }

    #[test]
    fn stage_progression() {
        let mut stage = Stage::Parsing;
        let mut seen = vec![stage];
        while stage != Stage::Done {
            stage = stage.next();
            seen.push(stage);
        }
        assert_eq!(
            seen,
            vec![
                Stage::Parsing,
                Stage::Indexing,
                Stage::Transforming,
                Stage::Printing,
                Stage::Done
            ]
        );
    }
}
