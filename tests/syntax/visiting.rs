//! Integration tests for the visitors on a real handler

use attrsplit_syntax::load_file;
use attrsplit_syntax::visitor::{
    IdentCollector, IdentRenamer, StmtDepth, rename_in_block, walk_file, walk_file_mut, walk_func,
};

use crate::fixture;

#[test]
fn collects_legacy_version_uses() {
    let file = load_file(&fixture("acl.go")).unwrap();
    let mut collector = IdentCollector::default();
    walk_file(&mut collector, &file);
    // One parameter and one use per diff loop.
    assert_eq!(collector.count("latestVersion"), 4);
    assert_eq!(collector.count("diffResult"), 4);
}

#[test]
fn process_nests_four_levels() {
    let file = load_file(&fixture("acl.go")).unwrap();
    let (_, process) = file.funcs().find(|(_, f)| f.name == "Process").unwrap();
    let mut depth = StmtDepth::default();
    walk_func(&mut depth, process);
    // for, if, if, return
    assert_eq!(depth.max_depth, 4);
}

#[test]
fn renaming_process_body_only() {
    let mut file = load_file(&fixture("acl.go")).unwrap();
    let index = file.funcs().find(|(_, f)| f.name == "Process").unwrap().0;
    let body = file.func_mut(index).unwrap().body.as_mut().unwrap();
    assert_eq!(rename_in_block(body, "latestVersion", "serviceVersion"), 3);

    let mut collector = IdentCollector::default();
    walk_file(&mut collector, &file);
    assert_eq!(collector.count("latestVersion"), 1);
    assert_eq!(collector.count("serviceVersion"), 3);
}

#[test]
fn renaming_twice_changes_nothing_more() {
    let mut file = load_file(&fixture("acl.go")).unwrap();
    let mut first = IdentRenamer::new("latestVersion", "serviceVersion");
    walk_file_mut(&mut first, &mut file);
    let once = file.clone();

    let mut second = IdentRenamer::new("latestVersion", "serviceVersion");
    walk_file_mut(&mut second, &mut file);
    assert_eq!(first.renamed, 4);
    assert_eq!(second.renamed, 0);
    assert_eq!(file, once);
}
