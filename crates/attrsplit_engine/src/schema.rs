//! Deriving `GetSchema` from `Register`.

use tracing::info;

use attrsplit_foundation::{Error, Result};
use attrsplit_syntax::ast::{AssignOp, Decorations, FuncType};
use attrsplit_syntax::{Block, Decl, Expr, FieldList, FuncDecl, Stmt, StmtKind};

use crate::conventions::Conventions;

/// Returns the assigned value if `stmt` is `s.Schema[...] = rhs`.
///
/// Only the indexee is inspected; the key may be any expression.
fn schema_assignment<'a>(stmt: &'a Stmt, conventions: &Conventions) -> Option<&'a Expr> {
    let StmtKind::Assign {
        lhs,
        op: AssignOp::Assign,
        rhs,
    } = &stmt.kind
    else {
        return None;
    };
    let ([target], [value]) = (lhs.as_slice(), rhs.as_slice()) else {
        return None;
    };
    match target {
        Expr::Index(indexee, _)
            if indexee.is_selector_of(&conventions.service_var, &conventions.schema_field) =>
        {
            Some(value)
        }
        _ => None,
    }
}

/// Emits `GetSchema() *schema.Schema` on `(h *H)`.
///
/// Statements of `Register` before the first schema assignment are copied
/// with their decorations; the assignment itself becomes `return rhs`, and
/// everything after it is dropped.
///
/// # Errors
/// Returns `SchemaAssignmentNotFound` if `Register` never assigns into
/// `s.Schema[...]`, or a configuration error for a malformed schema type.
pub fn synthesize_get_schema(
    register: &FuncDecl,
    handler: &str,
    conventions: &Conventions,
) -> Result<Decl> {
    let mut stmts = Vec::new();
    let mut found = false;

    for stmt in register.stmts() {
        if let Some(value) = schema_assignment(stmt, conventions) {
            let mut ret = Stmt::ret(vec![value.clone()]);
            ret.decs = stmt.decs.clone();
            stmts.push(ret);
            found = true;
            break;
        }
        stmts.push(stmt.clone());
    }

    if !found {
        return Err(Error::schema_assignment_not_found(handler));
    }
    info!(copied = stmts.len() - 1, "GetSchema derived from Register");

    let func = FuncDecl {
        recv: Some(conventions.receiver(handler)),
        name: "GetSchema".to_string(),
        ty: FuncType {
            params: FieldList::default(),
            results: Some(conventions.result(&conventions.schema_type)?),
        },
        body: Some(Block::new(stmts)),
    };
    Ok(Decl::func(func, Decorations::blank_line()))
}
