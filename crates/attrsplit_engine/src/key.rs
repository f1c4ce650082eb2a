//! The `Key()` accessor.

use tracing::info;

use attrsplit_syntax::ast::{Decorations, FuncType};
use attrsplit_syntax::{Block, Decl, Expr, Field, FieldList, FuncDecl, Stmt};

use crate::conventions::Conventions;

/// Emits `func (h *H) Key() string { return h.key }`.
#[must_use]
pub fn emit_key(handler: &str, conventions: &Conventions) -> Decl {
    let receiver = Expr::ident(&conventions.receiver_name);
    let func = FuncDecl {
        recv: Some(conventions.receiver(handler)),
        name: "Key".to_string(),
        ty: FuncType {
            params: FieldList::default(),
            results: Some(FieldList::new(vec![Field::new(&[], Expr::ident("string"))])),
        },
        body: Some(Block::new(vec![Stmt::ret(vec![Expr::selector(
            receiver,
            &conventions.key_field,
        )])])),
    };
    info!(handler, "Key accessor emitted");
    Decl::func(func, Decorations::blank_line())
}
