//! Integration tests for the driver over the fixture files

use std::path::PathBuf;

use attrsplit_engine::AnchorPolicy;
use attrsplit_foundation::{ErrorKind, Stage};
use attrsplit_runtime::{Config, Driver};
use attrsplit_syntax::parse_file;

use crate::fixtures;

fn config(files: &[&str]) -> Config {
    Config {
        base_dir: fixtures(),
        files: files.iter().map(PathBuf::from).collect(),
        verify_output: true,
        ..Config::default()
    }
}

#[test]
fn outputs_follow_input_order() {
    let driver = Driver::new(config(&["missing_bucket.go", "acl.go"])).unwrap();
    let outputs = driver.run().unwrap();
    let handlers: Vec<&str> = outputs
        .iter()
        .map(|output| output.report.handler.as_str())
        .collect();
    assert_eq!(
        handlers,
        ["DictionaryServiceAttributeHandler", "ACLServiceAttributeHandler"]
    );

    let mut out = Vec::new();
    assert_eq!(driver.run_to(&mut out).unwrap(), 2);
    let text = String::from_utf8(out).unwrap();
    let expected: String = outputs.iter().map(|output| output.text.as_str()).collect();
    assert_eq!(text, expected);
}

#[test]
fn each_output_is_a_complete_file() {
    let outputs = Driver::new(config(&["acl.go"])).unwrap().run().unwrap();
    let text = &outputs[0].text;
    assert!(text.starts_with("package fastly\n"));
    assert_eq!(parse_file(text).unwrap().decls.len(), 12);
}

#[test]
fn read_guard_aborts_without_output() {
    let driver = Driver::new(config(&["acl.go", "bad_read.go", "missing_bucket.go"])).unwrap();
    let mut out = Vec::new();
    let err = driver.run_to(&mut out).unwrap_err();

    assert!(out.is_empty());
    assert_eq!(err.stage(), Some(Stage::Transforming));
    assert_eq!(err.context.as_ref().unwrap().path, fixtures().join("bad_read.go"));
    match err.kind {
        ErrorKind::UnexpectedSelectorInRead { selector } => assert_eq!(selector, "s.Foo.Bar"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn missing_input_aborts_in_parsing() {
    let driver = Driver::new(config(&["acl.go", "no_such_handler.go"])).unwrap();
    let err = driver.run().unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Parsing));
    assert!(matches!(err.kind, ErrorKind::Parse { .. }));
}

#[test]
fn exact_policy_gives_same_result_on_fixtures() {
    let loose = Driver::new(config(&["acl.go"])).unwrap().run().unwrap();
    let strict = Driver::new(Config {
        anchor_policy: AnchorPolicy::Exact,
        ..config(&["acl.go"])
    })
    .unwrap()
    .run()
    .unwrap();
    assert_eq!(loose[0].text, strict[0].text);
}

#[test]
fn conventions_flow_into_output() {
    let mut config = config(&["acl.go"]);
    config.conventions.ctor_wrapper = "AsDefinition".to_string();
    config.conventions.client_type = "*fastly.Client".to_string();
    let outputs = Driver::new(config).unwrap().run().unwrap();
    let text = &outputs[0].text;
    assert!(text.contains("\treturn AsDefinition(&ACLServiceAttributeHandler{\n"));
    assert!(text.contains("serviceVersion int, conn *fastly.Client) error {\n"));
    assert!(!text.contains("BlockSetToServiceAttributeDefinition"));
}
