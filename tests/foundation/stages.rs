//! Integration tests for the per-file stage machine

use attrsplit_foundation::Stage;

#[test]
fn stages_advance_in_order() {
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
            Stage::Done,
        ]
    );
}

#[test]
fn done_is_terminal() {
    assert_eq!(Stage::Done.next(), Stage::Done);
}

#[test]
fn stage_names() {
    let names: Vec<String> = [
        Stage::Parsing,
        Stage::Indexing,
        Stage::Transforming,
        Stage::Printing,
        Stage::Done,
    ]
    .iter()
    .map(ToString::to_string)
    .collect();
    assert_eq!(
        names,
        ["parsing", "indexing", "transforming", "printing", "done"]
    );
}
