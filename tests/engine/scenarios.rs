//! Concrete rewrite scenarios on the handler fixtures

use attrsplit_engine::{BodyEdits, Operation, Refactorer};
use attrsplit_foundation::ErrorKind;
use attrsplit_syntax::load_file;

use crate::{Rewritten, fixture};

const ACL_SIGNATURE: &str = "(_ context.Context, d *schema.ResourceData, resource map[string]interface{}, serviceVersion int, conn *gofastly.Client) error {\n";
const ACL_UPDATE_SIGNATURE: &str = "(_ context.Context, d *schema.ResourceData, resource, modified map[string]interface{}, serviceVersion int, conn *gofastly.Client) error {\n";

// =============================================================================
// Full Shape
// =============================================================================

#[test]
fn all_three_buckets_are_split() {
    let acl = Rewritten::load("acl.go");
    assert_eq!(
        acl.report.matched_buckets(),
        vec![Operation::Create, Operation::Update, Operation::Delete]
    );
    assert_eq!(
        acl.report.crud,
        vec![
            (
                Operation::Create,
                Some(BodyEdits {
                    removed_assignments: 0,
                    renamed: 1
                })
            ),
            (
                Operation::Update,
                Some(BodyEdits {
                    removed_assignments: 2,
                    renamed: 1
                })
            ),
            (
                Operation::Delete,
                Some(BodyEdits {
                    removed_assignments: 0,
                    renamed: 1
                })
            ),
        ]
    );
}

#[test]
fn create_body_comes_from_added_loop() {
    let create = Rewritten::load("acl.go").method("Create");
    let expected_head = format!(
        "func (h *ACLServiceAttributeHandler) Create{ACL_SIGNATURE}\topts := gofastly.CreateACLInput{{\n\t\tServiceID:      d.Id(),\n\t\tServiceVersion: serviceVersion,\n"
    );
    assert!(create.starts_with(&expected_head), "{create}");
    assert!(create.contains("\n\n\tlog.Printf(\"[DEBUG] Fastly ACL creation opts: %#v\", opts)\n"));
    assert!(create.ends_with("\tif err != nil {\n\t\treturn err\n\t}\n\treturn nil\n}\n"));
    assert!(!create.contains("resource := resource"));
}

#[test]
fn delete_body_comes_from_deleted_loop() {
    let delete = Rewritten::load("acl.go").method("Delete");
    assert!(delete.starts_with(&format!(
        "func (h *ACLServiceAttributeHandler) Delete{ACL_SIGNATURE}\topts := gofastly.DeleteACLInput{{\n"
    )));
    assert!(delete.contains("\terr := conn.DeleteACL(&opts)\n"));
    assert!(delete.contains("\t} else if err != nil {\n"));
}

#[test]
fn update_shares_one_slot_for_both_maps() {
    let update = Rewritten::load("acl.go").method("Update");
    assert!(update.starts_with(&format!(
        "func (h *ACLServiceAttributeHandler) Update{ACL_UPDATE_SIGNATURE}\tif len(modified) == 0 {{\n\t\tcontinue\n\t}}\n\n\topts := gofastly.UpdateACLInput{{\n"
    )), "{update}");
}

// =============================================================================
// Missing Bucket
// =============================================================================

#[test]
fn missing_bucket_yields_no_op() {
    let dict = Rewritten::load("missing_bucket.go");
    assert_eq!(
        dict.report.matched_buckets(),
        vec![Operation::Create, Operation::Delete]
    );
    assert_eq!(
        dict.method("Update"),
        format!(
            "func (h *DictionaryServiceAttributeHandler) Update{ACL_UPDATE_SIGNATURE}\treturn nil\n}}\n"
        )
    );
}

#[test]
fn leading_blank_line_is_cleared_but_comment_kept() {
    let create = Rewritten::load("missing_bucket.go").method("Create");
    assert!(create.contains(&format!(
        "{ACL_SIGNATURE}\t// Dictionaries are versioned\n\tlog.Printf(\"[DEBUG] Create dictionary on version %d\", serviceVersion)\n"
    )), "{create}");
}

#[test]
fn unknown_bucket_is_ignored() {
    let dict = Rewritten::load("missing_bucket.go");
    for name in ["Create", "Update", "Delete"] {
        assert!(!dict.method(name).contains("ignored bucket"), "{name}");
    }
}

// =============================================================================
// modified Stripping and Rename
// =============================================================================

#[test]
fn top_level_modified_assignments_are_removed() {
    let update = Rewritten::load("acl.go").method("Update");
    assert!(!update.contains("modified = nil"));
    assert!(!update.contains("modified := setDiff.Filter"));
    assert!(update.contains("\tif v, ok := modified[\"name\"]; ok {\n\t\topts.NewName = gofastly.String(v.(string))\n\t}\n"));
}

#[test]
fn legacy_version_is_renamed() {
    let acl = Rewritten::load("acl.go");
    let update = acl.method("Update");
    assert!(update.contains("\t\tServiceVersion: serviceVersion + 1,\n"));
    for name in ["Create", "Update", "Delete"] {
        assert!(!acl.method(name).contains("latestVersion"), "{name}");
    }
}

// =============================================================================
// Constructor, Read, Key, GetSchema
// =============================================================================

#[test]
fn constructor_return_is_wrapped() {
    let acl = Rewritten::load("acl.go");
    assert_eq!(acl.report.ctor_returns, 1);
    let ctor = acl.method("NewServiceACL");
    assert!(ctor.contains(
        "\treturn BlockSetToServiceAttributeDefinition(&ACLServiceAttributeHandler{\n\t\t&DefaultServiceAttributeHandler{\n"
    ));
    assert!(ctor.ends_with("\t})\n}\n"));
}

#[test]
fn every_constructor_return_is_wrapped() {
    let dict = Rewritten::load("missing_bucket.go");
    assert_eq!(dict.report.ctor_returns, 2);
    let ctor = dict.method("NewServiceDictionary");
    assert_eq!(ctor.matches("BlockSetToServiceAttributeDefinition(").count(), 2);
}

#[test]
fn read_is_rebound() {
    let acl = Rewritten::load("acl.go");
    assert_eq!(acl.report.read_selectors, 2);
    let read = acl.method("Read");
    assert!(read.starts_with(
        "func (h *ACLServiceAttributeHandler) Read(_ context.Context, d *schema.ResourceData, _ map[string]interface{}, serviceVersion int, conn *gofastly.Client) error {\n\t// Refresh ACLs\n"
    ));
    assert!(read.contains("\t\tServiceVersion: serviceVersion,\n"));
    assert!(!read.contains("s.ActiveVersion"));
}

#[test]
fn key_returns_field() {
    assert_eq!(
        Rewritten::load("acl.go").method("Key"),
        "func (h *ACLServiceAttributeHandler) Key() string {\n\treturn h.key\n}\n"
    );
}

#[test]
fn get_schema_keeps_preamble() {
    let get_schema = Rewritten::load("acl.go").method("GetSchema");
    assert!(get_schema.starts_with(
        "func (h *ACLServiceAttributeHandler) GetSchema() *schema.Schema {\n\tblockAttributes := map[string]*schema.Schema{\n\t\t// Required fields\n"
    ));
    assert!(get_schema.contains("\n\n\treturn &schema.Schema{\n\t\tType:     schema.TypeSet,\n"));
    assert!(get_schema.ends_with("\t\t},\n\t}\n}\n"));
    assert!(!get_schema.contains("return nil"));
}

// =============================================================================
// Read Selector Guard
// =============================================================================

#[test]
fn foreign_selector_in_read_aborts() {
    let mut file = load_file(&fixture("bad_read.go")).unwrap();
    let err = Refactorer::new().refactor(&mut file).unwrap_err();
    match err.kind {
        ErrorKind::UnexpectedSelectorInRead { selector } => assert_eq!(selector, "s.Foo.Bar"),
        other => panic!("unexpected error: {other:?}"),
    }
}
