//! Integration tests for the printer

use attrsplit_syntax::{PrettyConfig, load_file, parse_file, print_file, print_file_with_config};

use crate::{FIXTURES, fixture};

#[test]
fn printing_is_idempotent_on_fixtures() {
    for name in FIXTURES {
        let once = print_file(&load_file(&fixture(name)).unwrap());
        let twice = print_file(&parse_file(&once).unwrap());
        assert_eq!(once, twice, "{name}");
    }
}

#[test]
fn comments_survive_printing() {
    let text = print_file(&load_file(&fixture("acl.go")).unwrap());
    for comment in [
        "// ACLServiceAttributeHandler provides a base implementation for ServiceAttributeDefinition.",
        "\t// Delete removed ACL configurations\n",
        "\t\t// Required fields\n",
        "\t\t// prune any empty values that come from the default string value in structs\n",
    ] {
        assert!(text.contains(comment), "missing {comment:?}");
    }
}

#[test]
fn blank_lines_survive_printing() {
    let text = print_file(&load_file(&fixture("acl.go")).unwrap());
    assert!(text.contains("\t\"log\"\n\n\tgofastly \"github.com/fastly/go-fastly/v6/fastly\"\n"));
    assert!(text.contains("\t\tresource := resource.(map[string]interface{})\n\n\t\topts := gofastly.CreateACLInput{\n"));
    assert!(!text.contains("\n\n\n"));
}

#[test]
fn small_file_round_trips_exactly() {
    let source = "package fastly\n\n// Key returns the attribute key.\nfunc (h *H) Key() string {\n\treturn h.key\n}\n\nfunc f(a, b int) int { return a*b + 1 }\n";
    assert_eq!(print_file(&parse_file(source).unwrap()), source);
}

#[test]
fn alignment_can_be_disabled() {
    let source = "package fastly\n\nvar x = T{\n\tA:    1,\n\tLong: 2,\n}\n";
    let file = parse_file(source).unwrap();
    assert_eq!(print_file(&file), source);

    let config = PrettyConfig {
        align_columns: false,
        ..PrettyConfig::default()
    };
    assert!(print_file_with_config(&file, &config).contains("\tA: 1,\n"));
}
