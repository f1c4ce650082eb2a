//! Visitor pattern for traversing and rewriting syntax trees.
//!
//! This module provides two main traits:
//! - [`AstVisitor`] - For read-only traversal of a tree
//! - [`VisitMut`] - For in-place rewriting, with pre-order control over
//!   whether a node's children are visited
//!
//! Identifier positions covered by both walkers: identifier expressions,
//! selector names, field and parameter names, spec names, and labels.
//!
//! # Example
//!
//! ```
//! use attrsplit_syntax::parse_file;
//! use attrsplit_syntax::visitor::{AstVisitor, walk_file};
//!
//! struct IdentCounter(usize);
//!
//! impl AstVisitor for IdentCounter {
//!     fn visit_ident(&mut self, _name: &str) {
//!         self.0 += 1;
//!     }
//! }
//!
//! let file = parse_file("package p\n\nfunc f() { x = y + z }\n").unwrap();
//! let mut counter = IdentCounter(0);
//! walk_file(&mut counter, &file);
//! assert_eq!(counter.0, 4); // f, x, y, z
//! ```

use crate::ast::{
    Block, CallExpr, CaseClause, CommClause, CompositeLit, Decl, DeclKind, Else, Expr, FieldList,
    File, FuncDecl, FuncType, IfStmt, Spec, SpecKind, Stmt, StmtKind,
};

// =============================================================================
// Read-Only Visitor
// =============================================================================

/// Trait for read-only visitors.
///
/// Implement specific methods to handle nodes of interest.
/// The default implementations do nothing.
///
/// Use [`walk_file`], [`walk_block`], [`walk_stmt`] or [`walk_expr`] to
/// traverse a tree and call visitor methods.
#[allow(unused_variables)]
pub trait AstVisitor {
    /// Called when entering a statement (before its children).
    fn enter_stmt(&mut self, stmt: &Stmt) {}

    /// Called when leaving a statement (after its children).
    fn leave_stmt(&mut self, stmt: &Stmt) {}

    /// Called when entering an expression (before its children).
    fn enter_expr(&mut self, expr: &Expr) {}

    /// Called when leaving an expression (after its children).
    fn leave_expr(&mut self, expr: &Expr) {}

    /// Visit an identifier in any position.
    fn visit_ident(&mut self, name: &str) {}
}

/// Walk every declaration of a file.
pub fn walk_file<V: AstVisitor + ?Sized>(visitor: &mut V, file: &File) {
    for decl in &file.decls {
        walk_decl(visitor, decl);
    }
}

/// Walk a top-level declaration.
pub fn walk_decl<V: AstVisitor + ?Sized>(visitor: &mut V, decl: &Decl) {
    match &decl.kind {
        DeclKind::Func(func) => walk_func(visitor, func),
        DeclKind::Gen(gen_decl) => {
            for spec in &gen_decl.specs {
                walk_spec(visitor, spec);
            }
        }
    }
}

/// Walk a function declaration: receiver, name, signature, body.
pub fn walk_func<V: AstVisitor + ?Sized>(visitor: &mut V, func: &FuncDecl) {
    if let Some(recv) = &func.recv {
        walk_fields(visitor, recv);
    }
    visitor.visit_ident(&func.name);
    walk_signature(visitor, &func.ty);
    if let Some(body) = &func.body {
        walk_block(visitor, body);
    }
}

fn walk_spec<V: AstVisitor + ?Sized>(visitor: &mut V, spec: &Spec) {
    match &spec.kind {
        SpecKind::Import { .. } => {}
        SpecKind::Value { names, ty, values } => {
            for name in names {
                visitor.visit_ident(name);
            }
            if let Some(ty) = ty {
                walk_expr(visitor, ty);
            }
            walk_exprs(visitor, values);
        }
        SpecKind::Type { name, ty, .. } => {
            visitor.visit_ident(name);
            walk_expr(visitor, ty);
        }
    }
}

fn walk_signature<V: AstVisitor + ?Sized>(visitor: &mut V, ty: &FuncType) {
    walk_fields(visitor, &ty.params);
    if let Some(results) = &ty.results {
        walk_fields(visitor, results);
    }
}

fn walk_fields<V: AstVisitor + ?Sized>(visitor: &mut V, list: &FieldList) {
    for field in &list.fields {
        for name in &field.names {
            visitor.visit_ident(name);
        }
        walk_expr(visitor, &field.ty);
    }
}

/// Walk every statement of a block.
pub fn walk_block<V: AstVisitor + ?Sized>(visitor: &mut V, block: &Block) {
    walk_stmts(visitor, &block.stmts);
}

fn walk_stmts<V: AstVisitor + ?Sized>(visitor: &mut V, stmts: &[Stmt]) {
    for stmt in stmts {
        walk_stmt(visitor, stmt);
    }
}

fn walk_exprs<V: AstVisitor + ?Sized>(visitor: &mut V, exprs: &[Expr]) {
    for expr in exprs {
        walk_expr(visitor, expr);
    }
}

fn walk_opt_stmt<V: AstVisitor + ?Sized>(visitor: &mut V, stmt: Option<&Stmt>) {
    if let Some(stmt) = stmt {
        walk_stmt(visitor, stmt);
    }
}

fn walk_opt_expr<V: AstVisitor + ?Sized>(visitor: &mut V, expr: Option<&Expr>) {
    if let Some(expr) = expr {
        walk_expr(visitor, expr);
    }
}

fn walk_if<V: AstVisitor + ?Sized>(visitor: &mut V, stmt: &IfStmt) {
    walk_opt_stmt(visitor, stmt.init.as_deref());
    walk_expr(visitor, &stmt.cond);
    walk_block(visitor, &stmt.then);
    match stmt.els.as_deref() {
        Some(Else::If(nested)) => walk_if(visitor, nested),
        Some(Else::Block(block)) => walk_block(visitor, block),
        None => {}
    }
}

fn walk_cases<V: AstVisitor + ?Sized>(visitor: &mut V, clauses: &[CaseClause]) {
    for clause in clauses {
        if let Some(list) = &clause.list {
            walk_exprs(visitor, list);
        }
        walk_stmts(visitor, &clause.body);
    }
}

fn walk_comms<V: AstVisitor + ?Sized>(visitor: &mut V, clauses: &[CommClause]) {
    for clause in clauses {
        walk_opt_stmt(visitor, clause.comm.as_deref());
        walk_stmts(visitor, &clause.body);
    }
}

/// Walk a statement, calling visitor methods depth-first.
///
/// This function calls:
/// 1. `enter_stmt` for the statement
/// 2. Recursively walks nested statements, blocks, and expressions
/// 3. `leave_stmt` for the statement
pub fn walk_stmt<V: AstVisitor + ?Sized>(visitor: &mut V, stmt: &Stmt) {
    visitor.enter_stmt(stmt);

    match &stmt.kind {
        StmtKind::Expr(expr) | StmtKind::Go(expr) | StmtKind::Defer(expr) => {
            walk_expr(visitor, expr);
        }
        StmtKind::Assign { lhs, rhs, .. } => {
            walk_exprs(visitor, lhs);
            walk_exprs(visitor, rhs);
        }
        StmtKind::IncDec { expr, .. } => walk_expr(visitor, expr),
        StmtKind::Send { chan, value } => {
            walk_expr(visitor, chan);
            walk_expr(visitor, value);
        }
        StmtKind::Decl(gen_decl) => {
            for spec in &gen_decl.specs {
                walk_spec(visitor, spec);
            }
        }
        StmtKind::Return(results) => walk_exprs(visitor, results),
        StmtKind::Branch { label, .. } => {
            if let Some(label) = label {
                visitor.visit_ident(label);
            }
        }
        StmtKind::Block(block) => walk_block(visitor, block),
        StmtKind::If(if_stmt) => walk_if(visitor, if_stmt),
        StmtKind::For {
            init,
            cond,
            post,
            body,
        } => {
            walk_opt_stmt(visitor, init.as_deref());
            walk_opt_expr(visitor, cond.as_ref());
            walk_opt_stmt(visitor, post.as_deref());
            walk_block(visitor, body);
        }
        StmtKind::Range {
            key,
            value,
            expr,
            body,
            ..
        } => {
            walk_opt_expr(visitor, key.as_ref());
            walk_opt_expr(visitor, value.as_ref());
            walk_expr(visitor, expr);
            walk_block(visitor, body);
        }
        StmtKind::Switch {
            init, tag, clauses, ..
        } => {
            walk_opt_stmt(visitor, init.as_deref());
            walk_opt_expr(visitor, tag.as_ref());
            walk_cases(visitor, clauses);
        }
        StmtKind::TypeSwitch {
            init,
            guard,
            clauses,
            ..
        } => {
            walk_opt_stmt(visitor, init.as_deref());
            walk_stmt(visitor, guard);
            walk_cases(visitor, clauses);
        }
        StmtKind::Select { clauses, .. } => walk_comms(visitor, clauses),
        StmtKind::Labeled { label, stmt } => {
            visitor.visit_ident(label);
            walk_stmt(visitor, stmt);
        }
        StmtKind::Empty => {}
    }

    visitor.leave_stmt(stmt);
}

/// Walk an expression, calling visitor methods depth-first.
pub fn walk_expr<V: AstVisitor + ?Sized>(visitor: &mut V, expr: &Expr) {
    visitor.enter_expr(expr);

    match expr {
        Expr::Ident(name) => visitor.visit_ident(name),
        Expr::BasicLit(..) | Expr::Ellipsis(None) => {}
        Expr::Composite(CompositeLit { ty, elts, .. }) => {
            walk_opt_expr(visitor, ty.as_deref());
            for elt in elts {
                walk_expr(visitor, &elt.expr);
            }
        }
        Expr::FuncLit { ty, body } => {
            walk_signature(visitor, ty);
            walk_block(visitor, body);
        }
        Expr::Paren(inner) | Expr::Star(inner) | Expr::Unary(_, inner) => {
            walk_expr(visitor, inner);
        }
        Expr::ChanType(_, inner) | Expr::Ellipsis(Some(inner)) => walk_expr(visitor, inner),
        Expr::Selector(x, sel) => {
            walk_expr(visitor, x);
            visitor.visit_ident(sel);
        }
        Expr::Index(x, index) => {
            walk_expr(visitor, x);
            walk_expr(visitor, index);
        }
        Expr::Slice { x, low, high, max } => {
            walk_expr(visitor, x);
            walk_opt_expr(visitor, low.as_deref());
            walk_opt_expr(visitor, high.as_deref());
            walk_opt_expr(visitor, max.as_deref());
        }
        Expr::TypeAssert(x, ty) => {
            walk_expr(visitor, x);
            walk_opt_expr(visitor, ty.as_deref());
        }
        Expr::Call(CallExpr { fun, args, .. }) => {
            walk_expr(visitor, fun);
            for arg in args {
                walk_expr(visitor, &arg.expr);
            }
        }
        Expr::Binary { x, y, .. } => {
            walk_expr(visitor, x);
            walk_expr(visitor, y);
        }
        Expr::KeyValue(key, value) | Expr::MapType(key, value) => {
            walk_expr(visitor, key);
            walk_expr(visitor, value);
        }
        Expr::ArrayType { len, elem } => {
            walk_opt_expr(visitor, len.as_deref());
            walk_expr(visitor, elem);
        }
        Expr::FuncType(ty) => walk_signature(visitor, ty),
        Expr::StructType(fields) | Expr::InterfaceType(fields) => walk_fields(visitor, fields),
    }

    visitor.leave_expr(expr);
}

// =============================================================================
// Rewriting Visitor
// =============================================================================

/// Whether a rewriting walker descends into a node after visiting it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Walk {
    /// Visit the node's children.
    #[default]
    Children,
    /// Leave the node's children untouched.
    Skip,
}

/// Trait for in-place tree rewriting.
///
/// Nodes are offered to the visitor before their children (pre-order), so
/// an implementation may replace a node wholesale and return
/// [`Walk::Skip`] to keep the walker out of the replacement.
#[allow(unused_variables)]
pub trait VisitMut {
    /// Visit a statement before its children.
    fn visit_stmt_mut(&mut self, stmt: &mut Stmt) -> Walk {
        Walk::Children
    }

    /// Visit an expression before its children.
    fn visit_expr_mut(&mut self, expr: &mut Expr) -> Walk {
        Walk::Children
    }

    /// Visit an identifier in any position.
    fn visit_ident_mut(&mut self, name: &mut String) {}
}

/// Rewrite every declaration of a file.
pub fn walk_file_mut<V: VisitMut + ?Sized>(visitor: &mut V, file: &mut File) {
    for decl in &mut file.decls {
        match &mut decl.kind {
            DeclKind::Func(func) => walk_func_mut(visitor, func),
            DeclKind::Gen(gen_decl) => {
                for spec in &mut gen_decl.specs {
                    walk_spec_mut(visitor, spec);
                }
            }
        }
    }
}

/// Rewrite a function declaration: receiver, name, signature, body.
pub fn walk_func_mut<V: VisitMut + ?Sized>(visitor: &mut V, func: &mut FuncDecl) {
    if let Some(recv) = &mut func.recv {
        walk_fields_mut(visitor, recv);
    }
    visitor.visit_ident_mut(&mut func.name);
    walk_signature_mut(visitor, &mut func.ty);
    if let Some(body) = &mut func.body {
        walk_block_mut(visitor, body);
    }
}

fn walk_spec_mut<V: VisitMut + ?Sized>(visitor: &mut V, spec: &mut Spec) {
    match &mut spec.kind {
        SpecKind::Import { .. } => {}
        SpecKind::Value { names, ty, values } => {
            for name in names {
                visitor.visit_ident_mut(name);
            }
            if let Some(ty) = ty {
                walk_expr_mut(visitor, ty);
            }
            walk_exprs_mut(visitor, values);
        }
        SpecKind::Type { name, ty, .. } => {
            visitor.visit_ident_mut(name);
            walk_expr_mut(visitor, ty);
        }
    }
}

fn walk_signature_mut<V: VisitMut + ?Sized>(visitor: &mut V, ty: &mut FuncType) {
    walk_fields_mut(visitor, &mut ty.params);
    if let Some(results) = &mut ty.results {
        walk_fields_mut(visitor, results);
    }
}

fn walk_fields_mut<V: VisitMut + ?Sized>(visitor: &mut V, list: &mut FieldList) {
    for field in &mut list.fields {
        for name in &mut field.names {
            visitor.visit_ident_mut(name);
        }
        walk_expr_mut(visitor, &mut field.ty);
    }
}

/// Rewrite every statement of a block.
pub fn walk_block_mut<V: VisitMut + ?Sized>(visitor: &mut V, block: &mut Block) {
    walk_stmts_mut(visitor, &mut block.stmts);
}

fn walk_stmts_mut<V: VisitMut + ?Sized>(visitor: &mut V, stmts: &mut [Stmt]) {
    for stmt in stmts {
        walk_stmt_mut(visitor, stmt);
    }
}

fn walk_exprs_mut<V: VisitMut + ?Sized>(visitor: &mut V, exprs: &mut [Expr]) {
    for expr in exprs {
        walk_expr_mut(visitor, expr);
    }
}

fn walk_opt_stmt_mut<V: VisitMut + ?Sized>(visitor: &mut V, stmt: Option<&mut Stmt>) {
    if let Some(stmt) = stmt {
        walk_stmt_mut(visitor, stmt);
    }
}

fn walk_opt_expr_mut<V: VisitMut + ?Sized>(visitor: &mut V, expr: Option<&mut Expr>) {
    if let Some(expr) = expr {
        walk_expr_mut(visitor, expr);
    }
}

fn walk_if_mut<V: VisitMut + ?Sized>(visitor: &mut V, stmt: &mut IfStmt) {
    walk_opt_stmt_mut(visitor, stmt.init.as_deref_mut());
    walk_expr_mut(visitor, &mut stmt.cond);
    walk_block_mut(visitor, &mut stmt.then);
    match stmt.els.as_deref_mut() {
        Some(Else::If(nested)) => walk_if_mut(visitor, nested),
        Some(Else::Block(block)) => walk_block_mut(visitor, block),
        None => {}
    }
}

fn walk_cases_mut<V: VisitMut + ?Sized>(visitor: &mut V, clauses: &mut [CaseClause]) {
    for clause in clauses {
        if let Some(list) = &mut clause.list {
            walk_exprs_mut(visitor, list);
        }
        walk_stmts_mut(visitor, &mut clause.body);
    }
}

fn walk_comms_mut<V: VisitMut + ?Sized>(visitor: &mut V, clauses: &mut [CommClause]) {
    for clause in clauses {
        walk_opt_stmt_mut(visitor, clause.comm.as_deref_mut());
        walk_stmts_mut(visitor, &mut clause.body);
    }
}

/// Rewrite a statement and, unless the visitor skips it, its children.
pub fn walk_stmt_mut<V: VisitMut + ?Sized>(visitor: &mut V, stmt: &mut Stmt) {
    if visitor.visit_stmt_mut(stmt) == Walk::Skip {
        return;
    }

    match &mut stmt.kind {
        StmtKind::Expr(expr) | StmtKind::Go(expr) | StmtKind::Defer(expr) => {
            walk_expr_mut(visitor, expr);
        }
        StmtKind::Assign { lhs, rhs, .. } => {
            walk_exprs_mut(visitor, lhs);
            walk_exprs_mut(visitor, rhs);
        }
        StmtKind::IncDec { expr, .. } => walk_expr_mut(visitor, expr),
        StmtKind::Send { chan, value } => {
            walk_expr_mut(visitor, chan);
            walk_expr_mut(visitor, value);
        }
        StmtKind::Decl(gen_decl) => {
            for spec in &mut gen_decl.specs {
                walk_spec_mut(visitor, spec);
            }
        }
        StmtKind::Return(results) => walk_exprs_mut(visitor, results),
        StmtKind::Branch { label, .. } => {
            if let Some(label) = label {
                visitor.visit_ident_mut(label);
            }
        }
        StmtKind::Block(block) => walk_block_mut(visitor, block),
        StmtKind::If(if_stmt) => walk_if_mut(visitor, if_stmt),
        StmtKind::For {
            init,
            cond,
            post,
            body,
        } => {
            walk_opt_stmt_mut(visitor, init.as_deref_mut());
            walk_opt_expr_mut(visitor, cond.as_mut());
            walk_opt_stmt_mut(visitor, post.as_deref_mut());
            walk_block_mut(visitor, body);
        }
        StmtKind::Range {
            key,
            value,
            expr,
            body,
            ..
        } => {
            walk_opt_expr_mut(visitor, key.as_mut());
            walk_opt_expr_mut(visitor, value.as_mut());
            walk_expr_mut(visitor, expr);
            walk_block_mut(visitor, body);
        }
        StmtKind::Switch {
            init, tag, clauses, ..
        } => {
            walk_opt_stmt_mut(visitor, init.as_deref_mut());
            walk_opt_expr_mut(visitor, tag.as_mut());
            walk_cases_mut(visitor, clauses);
        }
        StmtKind::TypeSwitch {
            init,
            guard,
            clauses,
            ..
        } => {
            walk_opt_stmt_mut(visitor, init.as_deref_mut());
            walk_stmt_mut(visitor, guard);
            walk_cases_mut(visitor, clauses);
        }
        StmtKind::Select { clauses, .. } => walk_comms_mut(visitor, clauses),
        StmtKind::Labeled { label, stmt } => {
            visitor.visit_ident_mut(label);
            walk_stmt_mut(visitor, stmt);
        }
        StmtKind::Empty => {}
    }
}

/// Rewrite an expression and, unless the visitor skips it, its children.
pub fn walk_expr_mut<V: VisitMut + ?Sized>(visitor: &mut V, expr: &mut Expr) {
    if visitor.visit_expr_mut(expr) == Walk::Skip {
        return;
    }

    match expr {
        Expr::Ident(name) => visitor.visit_ident_mut(name),
        Expr::BasicLit(..) | Expr::Ellipsis(None) => {}
        Expr::Composite(CompositeLit { ty, elts, .. }) => {
            walk_opt_expr_mut(visitor, ty.as_deref_mut());
            for elt in elts {
                walk_expr_mut(visitor, &mut elt.expr);
            }
        }
        Expr::FuncLit { ty, body } => {
            walk_signature_mut(visitor, ty);
            walk_block_mut(visitor, body);
        }
        Expr::Paren(inner) | Expr::Star(inner) | Expr::Unary(_, inner) => {
            walk_expr_mut(visitor, inner);
        }
        Expr::ChanType(_, inner) | Expr::Ellipsis(Some(inner)) => walk_expr_mut(visitor, inner),
        Expr::Selector(x, sel) => {
            walk_expr_mut(visitor, x);
            visitor.visit_ident_mut(sel);
        }
        Expr::Index(x, index) => {
            walk_expr_mut(visitor, x);
            walk_expr_mut(visitor, index);
        }
        Expr::Slice { x, low, high, max } => {
            walk_expr_mut(visitor, x);
            walk_opt_expr_mut(visitor, low.as_deref_mut());
            walk_opt_expr_mut(visitor, high.as_deref_mut());
            walk_opt_expr_mut(visitor, max.as_deref_mut());
        }
        Expr::TypeAssert(x, ty) => {
            walk_expr_mut(visitor, x);
            walk_opt_expr_mut(visitor, ty.as_deref_mut());
        }
        Expr::Call(CallExpr { fun, args, .. }) => {
            walk_expr_mut(visitor, fun);
            for arg in args {
                walk_expr_mut(visitor, &mut arg.expr);
            }
        }
        Expr::Binary { x, y, .. } => {
            walk_expr_mut(visitor, x);
            walk_expr_mut(visitor, y);
        }
        Expr::KeyValue(key, value) | Expr::MapType(key, value) => {
            walk_expr_mut(visitor, key);
            walk_expr_mut(visitor, value);
        }
        Expr::ArrayType { len, elem } => {
            walk_opt_expr_mut(visitor, len.as_deref_mut());
            walk_expr_mut(visitor, elem);
        }
        Expr::FuncType(ty) => walk_signature_mut(visitor, ty),
        Expr::StructType(fields) | Expr::InterfaceType(fields) => {
            walk_fields_mut(visitor, fields);
        }
    }
}

// =============================================================================
// Utility Visitors
// =============================================================================

/// Collects every identifier in traversal order.
#[derive(Debug, Default)]
pub struct IdentCollector {
    /// Collected identifier names.
    pub idents: Vec<String>,
}

impl IdentCollector {
    /// Returns how many times `name` was seen.
    #[must_use]
    pub fn count(&self, name: &str) -> usize {
        self.idents.iter().filter(|ident| *ident == name).count()
    }
}

impl AstVisitor for IdentCollector {
    fn visit_ident(&mut self, name: &str) {
        self.idents.push(name.to_string());
    }
}

/// Computes the maximum statement nesting depth.
#[derive(Debug, Default)]
pub struct StmtDepth {
    current: usize,
    /// Maximum depth encountered.
    pub max_depth: usize,
}

impl AstVisitor for StmtDepth {
    fn enter_stmt(&mut self, _stmt: &Stmt) {
        self.current += 1;
        self.max_depth = self.max_depth.max(self.current);
    }

    fn leave_stmt(&mut self, _stmt: &Stmt) {
        self.current -= 1;
    }
}

// =============================================================================
// Utility Rewriters
// =============================================================================

/// Renames every occurrence of one identifier, without regard to scope.
///
/// Renaming is idempotent as long as `to` differs from `from`: a second
/// pass finds nothing left to rename.
#[derive(Debug)]
pub struct IdentRenamer<'a> {
    from: &'a str,
    to: &'a str,
    /// Number of identifiers renamed so far.
    pub renamed: usize,
}

impl<'a> IdentRenamer<'a> {
    /// Creates a renamer from `from` to `to`.
    #[must_use]
    pub const fn new(from: &'a str, to: &'a str) -> Self {
        Self { from, to, renamed: 0 }
    }
}

impl VisitMut for IdentRenamer<'_> {
    fn visit_ident_mut(&mut self, name: &mut String) {
        if name == self.from {
            self.to.clone_into(name);
            self.renamed += 1;
        }
    }
}

/// Renames `from` to `to` throughout a block and returns the rename count.
pub fn rename_in_block(block: &mut Block, from: &str, to: &str) -> usize {
    let mut renamer = IdentRenamer::new(from, to);
    walk_block_mut(&mut renamer, block);
    renamer.renamed
}
