//! Splitting `Process` into `Create`, `Update` and `Delete`.
//!
//! `Process` handles one set difference per call, iterating
//! `diffResult.Added`, `diffResult.Modified` and `diffResult.Deleted` in
//! separate range loops. Each loop body becomes the body of one CRUD
//! method, adjusted to the per-item signature:
//!
//! 1. The first statement (the cast of the loop variable) is dropped.
//! 2. Top-level assignments to `modified` are removed.
//! 3. `latestVersion` is renamed to `serviceVersion`.
//! 4. `return nil` is appended.

use tracing::{info, warn};

use attrsplit_foundation::Result;
use attrsplit_syntax::ast::{Decorations, FuncType};
use attrsplit_syntax::visitor::{AstVisitor, rename_in_block, walk_block};
use attrsplit_syntax::{Block, Decl, FuncDecl, Stmt, StmtKind};

use crate::conventions::{Conventions, MapParam};

// =============================================================================
// Operations
// =============================================================================

/// A CRUD method emitted from `Process`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Emitted from the `Added` loop.
    Create,
    /// Emitted from the `Modified` loop.
    Update,
    /// Emitted from the `Deleted` loop.
    Delete,
}

impl Operation {
    /// All operations in emission order.
    pub const ALL: [Self; 3] = [Self::Create, Self::Update, Self::Delete];

    /// Maps a `diffResult` bucket to its operation; other buckets are ignored.
    #[must_use]
    pub fn from_bucket(bucket: &str) -> Option<Self> {
        match bucket {
            "Added" => Some(Self::Create),
            "Modified" => Some(Self::Update),
            "Deleted" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Returns the bucket this operation is derived from.
    #[must_use]
    pub const fn bucket(self) -> &'static str {
        match self {
            Self::Create => "Added",
            Self::Update => "Modified",
            Self::Delete => "Deleted",
        }
    }

    /// Returns the emitted method name.
    #[must_use]
    pub const fn method(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }

    const fn slot(self) -> usize {
        match self {
            Self::Create => 0,
            Self::Update => 1,
            Self::Delete => 2,
        }
    }

    const fn map_param(self) -> MapParam {
        match self {
            Self::Update => MapParam::ResourceAndModified,
            Self::Create | Self::Delete => MapParam::Resource,
        }
    }
}

// =============================================================================
// Bucket Collection
// =============================================================================

/// Collects the range loop bodies over `diffResult.<Bucket>`, at any depth.
struct BucketCollector<'a> {
    diff_result: &'a str,
    bodies: [Option<Block>; 3],
}

impl AstVisitor for BucketCollector<'_> {
    fn enter_stmt(&mut self, stmt: &Stmt) {
        let StmtKind::Range { expr, body, .. } = &stmt.kind else {
            return;
        };
        let Some((base, bucket)) = expr.unparen().as_selector() else {
            return;
        };
        if !base.is_ident(self.diff_result) {
            return;
        }
        let Some(op) = Operation::from_bucket(bucket) else {
            warn!(bucket, "ignoring range over unknown bucket");
            return;
        };
        let slot = &mut self.bodies[op.slot()];
        if slot.is_some() {
            warn!(bucket, "bucket iterated more than once, using the last loop");
        }
        info!(bucket, method = op.method(), "bucket matched");
        *slot = Some(body.clone());
    }
}

/// Returns the loop bodies of `Process` indexed by [`Operation`] slot.
fn bucket_bodies(process: &FuncDecl, conventions: &Conventions) -> [Option<Block>; 3] {
    let mut collector = BucketCollector {
        diff_result: &conventions.diff_result,
        bodies: [None, None, None],
    };
    if let Some(body) = &process.body {
        walk_block(&mut collector, body);
    }
    collector.bodies
}

// =============================================================================
// Body Derivation
// =============================================================================

/// Counts of the edits made while deriving a CRUD body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BodyEdits {
    /// Top-level assignments to `modified` removed.
    pub removed_assignments: usize,
    /// Identifiers renamed to the service version parameter.
    pub renamed: usize,
}

/// Returns true for `modified = ...` or `modified := ...`.
fn assigns_to(stmt: &Stmt, name: &str) -> bool {
    match &stmt.kind {
        StmtKind::Assign { lhs, .. } => lhs.len() == 1 && lhs[0].is_ident(name),
        _ => false,
    }
}

/// Derives a CRUD method body from a range loop body.
#[must_use]
pub fn derive_body(loop_body: &Block, conventions: &Conventions) -> (Block, BodyEdits) {
    let mut body = loop_body.clone();
    body.one_line = false;
    body.enclosure.close_newline = true;

    if !body.stmts.is_empty() {
        body.stmts.remove(0);
    }
    if let Some(first) = body.stmts.first_mut() {
        first.decs.blank_before = false;
        if let Some(comment) = first.decs.leading.first_mut() {
            comment.blank_before = false;
        }
    }

    let before = body.stmts.len();
    body.stmts.retain(|stmt| !assigns_to(stmt, &conventions.modified_param));
    let removed_assignments = before - body.stmts.len();

    let renamed = rename_in_block(
        &mut body,
        &conventions.legacy_version,
        &conventions.version_param,
    );

    body.stmts.push(Stmt::return_nil());

    (
        body,
        BodyEdits {
            removed_assignments,
            renamed,
        },
    )
}

// =============================================================================
// Synthesis
// =============================================================================

/// A synthesized CRUD method.
#[derive(Clone, Debug)]
pub struct CrudMethod {
    /// Which method this is.
    pub operation: Operation,
    /// The declaration to append.
    pub decl: Decl,
    /// Edits made to the loop body, or `None` if the bucket was absent.
    pub edits: Option<BodyEdits>,
}

/// Emits `Create`, `Update` and `Delete` on `(h *H)` from `Process`.
///
/// A bucket without a loop yields a method whose body is `return nil`.
///
/// # Errors
/// Returns a configuration error if a configured type does not parse.
pub fn synthesize_crud(
    process: &FuncDecl,
    handler: &str,
    conventions: &Conventions,
) -> Result<Vec<CrudMethod>> {
    let mut bodies = bucket_bodies(process, conventions);
    let mut methods = Vec::with_capacity(Operation::ALL.len());

    for op in Operation::ALL {
        let (body, edits) = match bodies[op.slot()].take() {
            Some(loop_body) => {
                let (body, edits) = derive_body(&loop_body, conventions);
                (body, Some(edits))
            }
            None => {
                info!(
                    bucket = op.bucket(),
                    method = op.method(),
                    "bucket absent, emitting no-op"
                );
                (Block::new(vec![Stmt::return_nil()]), None)
            }
        };

        let func = FuncDecl {
            recv: Some(conventions.receiver(handler)),
            name: op.method().to_string(),
            ty: FuncType {
                params: conventions.handler_params(op.map_param())?,
                results: Some(conventions.result(&conventions.error_type)?),
            },
            body: Some(body),
        };
        methods.push(CrudMethod {
            operation: op,
            decl: Decl::func(func, Decorations::blank_line()),
            edits,
        });
    }

    Ok(methods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrsplit_syntax::{parse_file, print_file};

    fn process(body: &str) -> FuncDecl {
        let source = format!(
            "package fastly\n\nfunc (h *H) Process(d *schema.ResourceData, latestVersion int) error {{\n{body}\n}}\n"
        );
        let file = parse_file(&source).unwrap();
        file.funcs().next().unwrap().1.clone()
    }

    fn printed(method: &CrudMethod) -> String {
        let file = attrsplit_syntax::File {
            package: "fastly".into(),
            package_decs: Decorations::default(),
            decls: vec![method.decl.clone()],
            trailing_comments: Vec::new(),
        };
        print_file(&file)
    }

    #[test]
    fn bucket_mapping() {
        assert_eq!(Operation::from_bucket("Added"), Some(Operation::Create));
        assert_eq!(Operation::from_bucket("Modified"), Some(Operation::Update));
        assert_eq!(Operation::from_bucket("Deleted"), Some(Operation::Delete));
        assert_eq!(Operation::from_bucket("Removed"), None);
    }

    #[test]
    fn derives_body_from_loop() {
        let func = process(
            "\tfor _, resource := range diffResult.Added {\n\t\tresource := resource.(map[string]interface{})\n\n\t\tcreate(resource, latestVersion + 1)\n\t}\n\treturn nil",
        );
        let methods = synthesize_crud(&func, "H", &Conventions::default()).unwrap();
        let create = &methods[0];
        assert_eq!(create.operation, Operation::Create);
        assert_eq!(
            create.edits,
            Some(BodyEdits {
                removed_assignments: 0,
                renamed: 1
            })
        );
        assert_eq!(
            printed(create),
            "package fastly\n\nfunc (h *H) Create(_ context.Context, d *schema.ResourceData, resource map[string]interface{}, serviceVersion int, conn *gofastly.Client) error {\n\tcreate(resource, serviceVersion+1)\n\treturn nil\n}\n"
        );
    }

    #[test]
    fn missing_bucket_is_noop() {
        let func = process(
            "\tfor _, r := range diffResult.Added {\n\t\tx := r\n\t\tuse(x)\n\t}\n\tfor _, r := range diffResult.Deleted {\n\t\tx := r\n\t\tdrop(x)\n\t}",
        );
        let methods = synthesize_crud(&func, "H", &Conventions::default()).unwrap();
        let update = &methods[1];
        assert_eq!(update.operation, Operation::Update);
        assert!(update.edits.is_none());
        let body = update.decl.as_func().unwrap().body.as_ref().unwrap();
        assert_eq!(body.stmts, vec![Stmt::return_nil()]);
        assert!(printed(update).contains(
            "Update(_ context.Context, d *schema.ResourceData, resource, modified map[string]interface{}, serviceVersion int, conn *gofastly.Client) error {\n\treturn nil\n}"
        ));
        assert!(methods[0].edits.is_some());
        assert!(methods[2].edits.is_some());
    }

    #[test]
    fn strips_top_level_modified_assignments_only() {
        let func = process(
            "\tfor _, r := range diffResult.Modified {\n\t\tresource := r.(map[string]interface{})\n\t\tmodified := filter(resource)\n\t\tif len(modified) == 0 {\n\t\t\tmodified = nil\n\t\t}\n\t\tmodified = nil\n\t\tmodified, ok := pair()\n\t\t_ = ok\n\t}",
        );
        let methods = synthesize_crud(&func, "H", &Conventions::default()).unwrap();
        let update = &methods[1];
        assert_eq!(update.edits.map(|e| e.removed_assignments), Some(2));
        let text = printed(update);
        assert!(!text.contains("modified := filter(resource)"));
        assert!(text.contains("\t\tmodified = nil\n"));
        assert!(text.contains("\tmodified, ok := pair()\n"));
    }

    #[test]
    fn first_statement_loses_blank_line() {
        let func = process(
            "\tfor _, r := range diffResult.Deleted {\n\t\tresource := r.(map[string]interface{})\n\n\t\t// Remove it.\n\t\tremove(resource)\n\t}",
        );
        let methods = synthesize_crud(&func, "H", &Conventions::default()).unwrap();
        let body = methods[2].decl.as_func().unwrap().body.as_ref().unwrap();
        assert!(!body.stmts[0].decs.blank_before);
        assert_eq!(body.stmts.len(), 2);
        assert!(body.stmts[1].is_return());
        assert!(printed(&methods[2]).contains("{\n\t// Remove it.\n\tremove(resource)\n\treturn nil\n}"));
    }

    #[test]
    fn nested_loops_are_found() {
        let func = process(
            "\tif d.HasChange(\"acl\") {\n\t\tfor _, r := range diffResult.Added {\n\t\t\tx := r\n\t\t\tadd(x)\n\t\t}\n\t}",
        );
        let methods = synthesize_crud(&func, "H", &Conventions::default()).unwrap();
        assert!(methods[0].edits.is_some());
        assert!(methods[1].edits.is_none());
        assert!(methods[2].edits.is_none());
    }

    #[test]
    fn emitted_methods_have_blank_line_and_receiver() {
        let func = process("\treturn nil");
        let methods = synthesize_crud(&func, "ACLHandler", &Conventions::default()).unwrap();
        let names: Vec<_> = methods
            .iter()
            .map(|m| m.decl.as_func().unwrap().name.clone())
            .collect();
        assert_eq!(names, vec!["Create", "Update", "Delete"]);
        for method in &methods {
            assert!(method.decl.decs.blank_before);
            let func = method.decl.as_func().unwrap();
            assert_eq!(
                attrsplit_syntax::print_expr(func.receiver_type().unwrap()),
                "*ACLHandler"
            );
        }
    }
}
