//! Integration tests for loading and parsing fixtures

use std::path::Path;

use attrsplit_foundation::{ErrorKind, ParseCause};
use attrsplit_syntax::{DeclKind, load_file, load_source};

use crate::{FIXTURES, fixture};

// =============================================================================
// Fixtures
// =============================================================================

#[test]
fn every_fixture_loads() {
    for name in FIXTURES {
        let file = load_file(&fixture(name)).unwrap();
        assert_eq!(file.package, "fastly", "{name}");
    }
}

#[test]
fn acl_declarations() {
    let file = load_file(&fixture("acl.go")).unwrap();
    let names: Vec<&str> = file.funcs().map(|(_, func)| func.name.as_str()).collect();
    assert_eq!(
        names,
        ["NewServiceACL", "Process", "Read", "Register", "flattenACLs"]
    );
    assert_eq!(file.decls.len(), 7);
    assert!(matches!(file.decls[0].kind, DeclKind::Gen(_)));
    assert!(matches!(file.decls[1].kind, DeclKind::Gen(_)));
}

#[test]
fn doc_comments_attach_to_declarations() {
    let file = load_file(&fixture("acl.go")).unwrap();
    let ctor = &file.decls[2];
    assert_eq!(ctor.decs.leading.len(), 1);
    assert_eq!(
        ctor.decs.leading[0].text,
        "// NewServiceACL returns a new resource."
    );
    assert!(!ctor.decs.blank_before);
}

#[test]
fn methods_keep_receivers() {
    let file = load_file(&fixture("missing_bucket.go")).unwrap();
    let receivers: Vec<bool> = file
        .funcs()
        .map(|(_, func)| func.receiver_type().is_some())
        .collect();
    assert_eq!(receivers, [false, true, true, true]);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn missing_file_is_an_io_error() {
    let path = fixture("no_such_handler.go");
    let err = load_file(&path).unwrap_err();
    match err.kind {
        ErrorKind::Parse {
            path: reported,
            cause: ParseCause::Io(_),
        } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn syntax_error_names_file_and_line() {
    let source = "package fastly\n\nfunc f() {\n\tx := \n}\n";
    let err = load_source(Path::new("fastly/broken.go"), source).unwrap_err();
    match err.kind {
        ErrorKind::Parse {
            path,
            cause: ParseCause::Syntax { line, .. },
        } => {
            assert_eq!(path, Path::new("fastly/broken.go"));
            assert!(line >= 4, "line {line}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn missing_package_clause_is_rejected() {
    let err = load_source(Path::new("x.go"), "func f() {}\n").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Parse { .. }));
}
