//! Properties every rewritten fixture satisfies

use attrsplit_syntax::visitor::{AstVisitor, walk_func};
use attrsplit_syntax::{Expr, Stmt, StmtKind, parse_file, print_expr, print_file};

use crate::Rewritten;

const REWRITABLE: [&str; 2] = ["acl.go", "missing_bucket.go"];
const EMITTED: [&str; 5] = ["Create", "Update", "Delete", "Key", "GetSchema"];

#[test]
fn five_declarations_are_appended() {
    for name in REWRITABLE {
        let rewritten = Rewritten::load(name);
        assert_eq!(
            rewritten.file.decls.len(),
            rewritten.original.decls.len() + 5,
            "{name}"
        );
    }
}

#[test]
fn appended_declarations_are_last_and_ordered() {
    for name in REWRITABLE {
        let rewritten = Rewritten::load(name);
        let tail: Vec<&str> = rewritten.file.decls[rewritten.original.decls.len()..]
            .iter()
            .map(|decl| decl.as_func().unwrap().name.as_str())
            .collect();
        assert_eq!(tail, EMITTED, "{name}");
        assert_eq!(rewritten.report.emitted, EMITTED, "{name}");
    }
}

#[test]
fn appended_declarations_start_after_blank_line() {
    let rewritten = Rewritten::load("acl.go");
    for name in EMITTED {
        assert!(rewritten.decl(name).decs.blank_before, "{name}");
    }
    let text = print_file(&rewritten.file);
    for name in EMITTED {
        assert!(text.contains(&format!("}}\n\nfunc (h *ACLServiceAttributeHandler) {name}(")));
    }
}

#[test]
fn emitted_methods_share_process_receiver() {
    for name in REWRITABLE {
        let rewritten = Rewritten::load(name);
        let expected = format!("*{}", rewritten.report.handler);
        for method in EMITTED {
            let func = rewritten.decl(method).as_func().unwrap();
            let recv = func.recv.as_ref().unwrap();
            assert_eq!(recv.fields.len(), 1);
            assert_eq!(recv.fields[0].names, ["h"]);
            assert_eq!(print_expr(&recv.fields[0].ty), expected, "{name} {method}");
        }
    }
}

#[test]
fn other_declarations_are_untouched() {
    for name in REWRITABLE {
        let rewritten = Rewritten::load(name);
        for (i, original) in rewritten.original.decls.iter().enumerate() {
            let rewritten_decl = &rewritten.file.decls[i];
            let touched = original
                .as_func()
                .is_some_and(|func| func.name == "Read" || func.name.starts_with("New"));
            if touched {
                assert_ne!(rewritten_decl, original, "{name} decl {i}");
            } else {
                assert_eq!(rewritten_decl, original, "{name} decl {i}");
            }
        }
    }
}

#[test]
fn no_top_level_modified_assignments() {
    for name in REWRITABLE {
        let rewritten = Rewritten::load(name);
        for method in ["Create", "Update", "Delete"] {
            let func = rewritten.decl(method).as_func().unwrap();
            let stray = func.stmts().iter().any(|stmt| match &stmt.kind {
                StmtKind::Assign { lhs, .. } => lhs.len() == 1 && lhs[0].is_ident("modified"),
                _ => false,
            });
            assert!(!stray, "{name} {method}");
        }
    }
}

#[test]
fn emitted_bodies_end_in_return() {
    for name in REWRITABLE {
        let rewritten = Rewritten::load(name);
        for method in EMITTED {
            let func = rewritten.decl(method).as_func().unwrap();
            assert!(
                func.stmts().last().is_some_and(Stmt::is_return),
                "{name} {method}"
            );
        }
    }
}

/// Counts wrapper calls per return statement.
#[derive(Default)]
struct WrappedReturns {
    returns: usize,
    wrapped_once: usize,
}

impl AstVisitor for WrappedReturns {
    fn enter_stmt(&mut self, stmt: &Stmt) {
        let StmtKind::Return(results) = &stmt.kind else {
            return;
        };
        self.returns += 1;
        let [call @ Expr::Call(_)] = results.as_slice() else {
            return;
        };
        let text = print_expr(call);
        if text.starts_with("BlockSetToServiceAttributeDefinition(")
            && text.matches("BlockSetToServiceAttributeDefinition(").count() == 1
        {
            self.wrapped_once += 1;
        }
    }
}

#[test]
fn constructor_returns_are_wrapped_exactly_once() {
    for name in REWRITABLE {
        let rewritten = Rewritten::load(name);
        let (_, ctor) = rewritten
            .file
            .funcs()
            .find(|(_, func)| func.name.starts_with("New"))
            .unwrap();
        let mut counter = WrappedReturns::default();
        walk_func(&mut counter, ctor);
        assert!(counter.returns > 0, "{name}");
        assert_eq!(counter.wrapped_once, counter.returns, "{name}");
    }
}

#[test]
fn rewritten_files_parse_and_print_stably() {
    for name in REWRITABLE {
        let text = print_file(&Rewritten::load(name).file);
        let reparsed = parse_file(&text).unwrap();
        assert_eq!(print_file(&reparsed), text, "{name}");
    }
}
