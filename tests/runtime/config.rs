//! Integration tests for configuration files

use std::fs;
use std::path::PathBuf;

use attrsplit_engine::AnchorPolicy;
use attrsplit_foundation::ErrorKind;
use attrsplit_runtime::{Config, DEFAULT_BASE_DIR, DEFAULT_FILES};

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("attrsplit-config-{}-{name}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn loads_file_from_disk() {
    let dir = scratch("load");
    let path = dir.join("attrsplit.toml");
    fs::write(
        &path,
        "base_dir = \"tests/fixtures\"\nfiles = [\"acl.go\"]\nanchor_policy = \"last_containing\"\n\n[conventions]\nctor_wrapper = \"Wrap\"\n",
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.inputs(), vec![PathBuf::from("tests/fixtures/acl.go")]);
    assert_eq!(config.anchor_policy, AnchorPolicy::LastContaining);
    assert!(!config.verify_output);
    assert_eq!(config.conventions.ctor_wrapper, "Wrap");

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn invalid_toml_names_file() {
    let dir = scratch("invalid");
    let path = dir.join("attrsplit.toml");
    fs::write(&path, "files = [\n").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Config { .. }));
    assert!(format!("{err}").contains("attrsplit.toml"));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn unknown_policy_is_rejected() {
    let err = Config::from_toml("anchor_policy = \"first\"\n").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Config { .. }));
}

#[test]
fn defaults_cover_compiled_in_handlers() {
    let config = Config::default();
    assert_eq!(config.base_dir, PathBuf::from(DEFAULT_BASE_DIR));
    assert_eq!(config.files.len(), DEFAULT_FILES.len());
    assert!(config
        .inputs()
        .iter()
        .all(|path| path.starts_with(DEFAULT_BASE_DIR)
            && path.extension().is_some_and(|ext| ext == "go")));
}
