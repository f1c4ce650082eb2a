//! Lexer, decorated syntax tree, parser, visitors, and printer for Go sources.
//!
//! This crate provides:
//! - [`Lexer`] - Tokenization with Go's automatic semicolon rule
//! - [`parse_file`] - Parsing a translation unit into a decorated [`File`]
//! - [`visitor`] - Read-only and rewriting traversals
//! - [`print_file`] - gofmt-style re-serialization of a decorated tree
//! - [`load_file`] - Reading and parsing a file from disk

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod lexer;
pub mod loader;
pub mod parser;
pub mod pretty;
pub mod span;
pub mod token;
pub mod visitor;


pub use ast::{
    Block, Comment, Decl, DeclKind, Decorations, Enclosure, Expr, Field, FieldList, File,
    FuncDecl, FuncType, Stmt, StmtKind,
};
pub use lexer::Lexer;
pub use loader::{load_file, load_source};
pub use parser::{Parser, parse_expr, parse_file, parse_type};
pub use pretty::{PrettyConfig, print_expr, print_file, print_file_with_config};
pub use span::Span;
pub use token::{Token, TokenKind};
