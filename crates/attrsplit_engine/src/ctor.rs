//! Wrapping the constructor's return values.

use tracing::info;

use attrsplit_syntax::visitor::{VisitMut, Walk, walk_block_mut};
use attrsplit_syntax::{Expr, FuncDecl, Stmt, StmtKind};

/// Wraps every single-value `return E` in a call to `wrapper`.
struct ReturnWrapper<'a> {
    wrapper: &'a str,
    wrapped: usize,
}

impl VisitMut for ReturnWrapper<'_> {
    fn visit_stmt_mut(&mut self, stmt: &mut Stmt) -> Walk {
        let StmtKind::Return(results) = &mut stmt.kind else {
            return Walk::Children;
        };
        let [value] = results.as_mut_slice() else {
            return Walk::Children;
        };
        let inner = std::mem::replace(value, Expr::ident("nil"));
        *value = Expr::call(Expr::ident(self.wrapper), vec![inner]);
        self.wrapped += 1;
        Walk::Skip
    }
}

/// Rewrites every `return E` in the constructor to `return wrapper(E)`.
///
/// The wrapped value is not visited again, so each return is wrapped
/// exactly once. Returns nested in function literals are wrapped too.
pub fn wrap_ctor_returns(ctor: &mut FuncDecl, wrapper: &str) -> usize {
    let mut rewriter = ReturnWrapper { wrapper, wrapped: 0 };
    if let Some(body) = &mut ctor.body {
        walk_block_mut(&mut rewriter, body);
    }
    info!(
        decl = %ctor.name,
        wrapper,
        returns = rewriter.wrapped,
        "constructor returns wrapped"
    );
    rewriter.wrapped
}
