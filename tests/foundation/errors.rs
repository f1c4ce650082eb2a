//! Integration tests for Error types
//!
//! Tests error construction, display, context, and error kinds.

use std::io;
use std::path::{Path, PathBuf};

use attrsplit_foundation::{Error, ErrorContext, ErrorKind, ParseCause, Stage};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_not_found() {
    let err = Error::not_found("Process");
    assert!(matches!(err.kind, ErrorKind::NotFound { .. }));
    assert!(format!("{err}").contains("`Process`"));
}

#[test]
fn error_invalid_receiver() {
    let err = Error::invalid_receiver("ACLServiceAttributeHandler");
    assert!(matches!(err.kind, ErrorKind::InvalidReceiver { .. }));
    assert!(format!("{err}").contains("found `ACLServiceAttributeHandler`"));
}

#[test]
fn error_schema_assignment_not_found() {
    let err = Error::schema_assignment_not_found("GzipServiceAttributeHandler");
    let msg = format!("{err}");
    assert!(msg.contains("GzipServiceAttributeHandler"));
    assert!(msg.contains("s.Schema"));
}

#[test]
fn error_unexpected_selector() {
    let err = Error::unexpected_selector("s.Foo.Bar");
    match &err.kind {
        ErrorKind::UnexpectedSelectorInRead { selector } => assert_eq!(selector, "s.Foo.Bar"),
        other => panic!("unexpected kind: {other:?}"),
    }
    assert!(format!("{err}").contains("`s.Foo.Bar`"));
}

#[test]
fn error_print_and_config() {
    assert_eq!(
        format!("{}", Error::print("output truncated")),
        "print error: output truncated"
    );
    assert_eq!(
        format!("{}", Error::config("no input files configured")),
        "configuration error: no input files configured"
    );
}

// =============================================================================
// Parse Errors
// =============================================================================

#[test]
fn syntax_error_display() {
    let err = Error::syntax("expected `}`", 12, 4, "\tfor {".to_string())
        .at_path("fastly/block_fastly_service_acl.go");
    assert_eq!(
        format!("{err}"),
        "parse error in fastly/block_fastly_service_acl.go: 12:4: expected `}`"
    );
}

#[test]
fn syntax_error_keeps_source_line() {
    let err = Error::syntax("unexpected token", 3, 1, "func (".to_string());
    match err.kind {
        ErrorKind::Parse {
            cause: ParseCause::Syntax { context, .. },
            ..
        } => assert_eq!(context, "func ("),
        other => panic!("unexpected kind: {other:?}"),
    }
}

#[test]
fn unreadable_error_keeps_io_cause() {
    let source = io::Error::new(io::ErrorKind::NotFound, "no such file");
    let err = Error::unreadable("missing.go", source);
    match &err.kind {
        ErrorKind::Parse { path, cause } => {
            assert_eq!(path, Path::new("missing.go"));
            assert!(matches!(cause, ParseCause::Io(_)));
        }
        other => panic!("unexpected kind: {other:?}"),
    }
    assert!(format!("{err}").contains("cannot read file"));
}

#[test]
fn at_path_ignores_other_kinds() {
    let err = Error::not_found("Read").at_path("acl.go");
    assert!(matches!(err.kind, ErrorKind::NotFound { .. }));
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn error_without_context() {
    let err = Error::not_found("Register");
    assert!(err.context.is_none());
    assert_eq!(err.stage(), None);
}

#[test]
fn error_with_context() {
    let err = Error::not_found("Register")
        .with_context(ErrorContext::new("fastly/acl.go", Stage::Indexing));
    assert_eq!(err.stage(), Some(Stage::Indexing));
    let context = err.context.unwrap();
    assert_eq!(context.path, PathBuf::from("fastly/acl.go"));
    assert_eq!(format!("{context}"), "while indexing fastly/acl.go");
}
