//! Parser for Go source.
//!
//! The parser converts a stream of tokens into a decorated syntax tree.
//! Comments and line structure seen between tokens are collected and
//! attached to the nearest node that can carry them, so nothing in the
//! source is lost when the tree is printed again.

use attrsplit_foundation::{Error, Result};

use crate::ast::{
    AssignOp, BinaryOp, Block, BranchKind, CallExpr, CaseClause, ChanDir, CommClause, Comment,
    CompositeLit, Decl, DeclKind, Decorations, Element, Else, Enclosure, Expr, Field, FieldList,
    File, FuncDecl, FuncType, GenDecl, GenKeyword, IfStmt, LitKind, Spec, SpecKind, Stmt,
    StmtKind, UnaryOp,
};
use crate::lexer::Lexer;
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Deepest nesting of expressions, types, and blocks accepted before
/// parsing fails, keeping recursion within a 2 MiB thread stack.
const MAX_NESTING: usize = 40;

/// A comment waiting to be attached to a node.
#[derive(Debug)]
struct PendingComment {
    comment: Comment,
    /// The comment starts on the line where the previous token ended.
    trailing: bool,
}

/// Result of a simple statement in a `for` header.
enum Simple {
    Plain(StmtKind),
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        expr: Expr,
    },
}

/// One entry of a parameter list before names and types are grouped.
struct ParamItem {
    name: Option<String>,
    ty: Option<Expr>,
    decs: Decorations,
}

/// Parser for Go source code.
pub struct Parser<'src> {
    /// The lexer providing tokens.
    lexer: Lexer<'src>,
    /// Current token (lookahead), never a comment.
    current: Token,
    /// Source text (for error messages and line counts).
    source: &'src str,
    /// Comments read since they were last claimed.
    pending: Vec<PendingComment>,
    /// Line on which the last consumed token ended.
    prev_end_line: u32,
    /// Line on which the last consumed token or comment ended.
    last_line: u32,
    /// The current token starts on a later line than `prev_end_line`.
    newline_before: bool,
    /// An empty line precedes the current token.
    blank_before: bool,
    /// Nesting level of brackets; negative inside control clause headers.
    expr_lev: i32,
    /// Recursion depth of expressions, types, and blocks.
    depth: usize,
}

impl<'src> Parser<'src> {
    /// Creates a new parser for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        let mut parser = Self {
            lexer: Lexer::new(source),
            current: Token::new(TokenKind::Semicolon { auto: false }, Span::new(0, 0, 0, 0)),
            source,
            pending: Vec::new(),
            prev_end_line: 0,
            last_line: 0,
            newline_before: false,
            blank_before: false,
            expr_lev: 0,
            depth: 0,
        };
        parser.advance();
        parser
    }

    /// Parses a complete source file.
    ///
    /// # Errors
    /// Returns an error if the source is not a well-formed file.
    pub fn parse_file(&mut self) -> Result<File> {
        let mut package_decs = self.start_decorations();
        self.expect(&TokenKind::Package)?;
        let package = self.expect_ident()?;
        self.expect_semi()?;
        package_decs.trailing = self.take_trailing();

        let mut decls = Vec::new();
        while self.current.kind != TokenKind::Eof {
            if matches!(self.current.kind, TokenKind::Semicolon { .. }) {
                self.advance();
                continue;
            }
            let mut decs = self.start_decorations();
            let kind = match self.current.kind {
                TokenKind::Func => DeclKind::Func(self.parse_func_decl()?),
                TokenKind::Import | TokenKind::Const | TokenKind::Var | TokenKind::Type => {
                    DeclKind::Gen(self.parse_gen_decl()?)
                }
                _ => return Err(self.unexpected("declaration")),
            };
            if self.current.kind != TokenKind::Eof {
                self.expect_semi()?;
            }
            decs.trailing = self.take_trailing();
            decls.push(Decl { kind, decs });
        }

        Ok(File {
            package,
            package_decs,
            decls,
            trailing_comments: self.drain_comments(),
        })
    }

    /// Parses a single expression, requiring the whole input to be consumed.
    ///
    /// # Errors
    /// Returns an error if the source is not a single expression.
    pub fn parse_standalone_expr(&mut self) -> Result<Expr> {
        let expr = self.parse_expr()?;
        self.finish_standalone()?;
        Ok(expr)
    }

    /// Parses a single type, requiring the whole input to be consumed.
    ///
    /// # Errors
    /// Returns an error if the source is not a single type.
    pub fn parse_standalone_type(&mut self) -> Result<Expr> {
        let ty = self.parse_type()?;
        self.finish_standalone()?;
        Ok(ty)
    }

    fn finish_standalone(&mut self) -> Result<()> {
        if matches!(self.current.kind, TokenKind::Semicolon { auto: true }) {
            self.advance();
        }
        if self.current.kind == TokenKind::Eof {
            Ok(())
        } else {
            Err(self.unexpected("end of input"))
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn parse_gen_decl(&mut self) -> Result<GenDecl> {
        let keyword = match self.current.kind {
            TokenKind::Import => GenKeyword::Import,
            TokenKind::Const => GenKeyword::Const,
            TokenKind::Var => GenKeyword::Var,
            TokenKind::Type => GenKeyword::Type,
            _ => return Err(self.unexpected("declaration keyword")),
        };
        self.advance();

        if self.current.kind != TokenKind::LParen {
            let kind = self.parse_spec(keyword)?;
            return Ok(GenDecl {
                keyword,
                specs: vec![Spec {
                    kind,
                    decs: Decorations::default(),
                }],
                group: None,
            });
        }

        let open_span = self.current.span;
        self.advance();
        let open_comment = self.take_trailing();
        let mut specs = Vec::new();
        while self.current.kind != TokenKind::RParen {
            match self.current.kind {
                TokenKind::Eof => {
                    return Err(self.error_at(open_span, "unterminated declaration group"));
                }
                TokenKind::Semicolon { auto: false } => {
                    self.advance();
                    continue;
                }
                _ => {}
            }
            let mut decs = self.start_decorations();
            let kind = self.parse_spec(keyword)?;
            self.expect_semi()?;
            decs.trailing = self.take_trailing();
            specs.push(Spec { kind, decs });
        }
        let group = self.close_enclosure(open_comment);
        self.expect(&TokenKind::RParen)?;

        Ok(GenDecl {
            keyword,
            specs,
            group: Some(group),
        })
    }

    fn parse_spec(&mut self, keyword: GenKeyword) -> Result<SpecKind> {
        match keyword {
            GenKeyword::Import => {
                let name = match &self.current.kind {
                    TokenKind::Ident(name) => {
                        let name = name.clone();
                        self.advance();
                        Some(name)
                    }
                    TokenKind::Period => {
                        self.advance();
                        Some(".".to_string())
                    }
                    _ => None,
                };
                let TokenKind::String(path) = &self.current.kind else {
                    return Err(self.unexpected("import path"));
                };
                let path = path.clone();
                self.advance();
                Ok(SpecKind::Import { name, path })
            }
            GenKeyword::Const | GenKeyword::Var => {
                let names = self.parse_ident_list()?;
                let ty = if matches!(
                    self.current.kind,
                    TokenKind::Assign
                        | TokenKind::Semicolon { .. }
                        | TokenKind::RParen
                        | TokenKind::Eof
                ) {
                    None
                } else {
                    Some(self.parse_type()?)
                };
                let values = if self.current.kind == TokenKind::Assign {
                    self.advance();
                    self.parse_expr_list()?
                } else {
                    Vec::new()
                };
                Ok(SpecKind::Value { names, ty, values })
            }
            GenKeyword::Type => {
                let name = self.expect_ident()?;
                let alias = self.current.kind == TokenKind::Assign;
                if alias {
                    self.advance();
                }
                let ty = self.parse_type()?;
                Ok(SpecKind::Type { name, alias, ty })
            }
        }
    }

    fn parse_func_decl(&mut self) -> Result<FuncDecl> {
        self.expect(&TokenKind::Func)?;
        let recv = if self.current.kind == TokenKind::LParen {
            Some(self.parse_params()?)
        } else {
            None
        };
        let name = self.expect_ident()?;
        let ty = self.parse_signature()?;
        let body = if self.current.kind == TokenKind::LBrace {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(FuncDecl {
            recv,
            name,
            ty,
            body,
        })
    }

    fn parse_signature(&mut self) -> Result<FuncType> {
        let params = self.parse_params()?;
        let results = self.parse_results()?;
        Ok(FuncType { params, results })
    }

    fn parse_results(&mut self) -> Result<Option<FieldList>> {
        if self.current.kind == TokenKind::LParen {
            return Ok(Some(self.parse_params()?));
        }
        if self.starts_type() {
            let ty = self.parse_type()?;
            return Ok(Some(FieldList::new(vec![Field::new(&[], ty)])));
        }
        Ok(None)
    }

    /// Parses a parenthesized parameter list, grouping names that share a type.
    fn parse_params(&mut self) -> Result<FieldList> {
        let open_span = self.current.span;
        self.expect(&TokenKind::LParen)?;
        let open_comment = self.take_trailing();

        let mut items = Vec::new();
        while self.current.kind != TokenKind::RParen {
            if self.current.kind == TokenKind::Eof {
                return Err(self.error_at(open_span, "unterminated parameter list"));
            }
            let decs = self.start_decorations();
            let mut item = self.parse_param_item(decs)?;
            if self.current.kind == TokenKind::Comma {
                self.advance();
                item.decs.trailing = self.take_trailing();
                items.push(item);
            } else {
                items.push(item);
                break;
            }
        }
        let enclosure = self.close_enclosure(open_comment);
        self.expect(&TokenKind::RParen)?;

        let fields = self.group_params(items)?;
        Ok(FieldList { fields, enclosure })
    }

    fn parse_param_item(&mut self, decs: Decorations) -> Result<ParamItem> {
        let TokenKind::Ident(name) = &self.current.kind else {
            let ty = self.parse_param_type()?;
            return Ok(ParamItem {
                name: None,
                ty: Some(ty),
                decs,
            });
        };
        let name = name.clone();
        self.advance();

        match self.current.kind {
            TokenKind::Period => {
                self.advance();
                let sel = self.expect_ident()?;
                Ok(ParamItem {
                    name: None,
                    ty: Some(Expr::selector(Expr::Ident(name), sel)),
                    decs,
                })
            }
            TokenKind::Comma | TokenKind::RParen => Ok(ParamItem {
                name: Some(name),
                ty: None,
                decs,
            }),
            _ => {
                let ty = self.parse_param_type()?;
                Ok(ParamItem {
                    name: Some(name),
                    ty: Some(ty),
                    decs,
                })
            }
        }
    }

    fn parse_param_type(&mut self) -> Result<Expr> {
        if self.current.kind == TokenKind::Ellipsis {
            self.advance();
            let elem = self.parse_type()?;
            return Ok(Expr::Ellipsis(Some(Box::new(elem))));
        }
        self.parse_type()
    }

    fn group_params(&self, items: Vec<ParamItem>) -> Result<Vec<Field>> {
        let named = items
            .iter()
            .any(|item| item.name.is_some() && item.ty.is_some());

        if !named {
            return Ok(items
                .into_iter()
                .filter_map(|item| {
                    let ty = item.ty.or_else(|| item.name.map(Expr::Ident))?;
                    Some(Field {
                        names: Vec::new(),
                        ty,
                        tag: None,
                        decs: item.decs,
                    })
                })
                .collect());
        }

        let mut fields = Vec::new();
        let mut names = Vec::new();
        let mut decs: Option<Decorations> = None;
        for item in items {
            let Some(name) = item.name else {
                return Err(self.error("mixed named and unnamed parameters"));
            };
            names.push(name);
            let group_decs = decs.get_or_insert_with(|| item.decs.clone());
            group_decs.trailing = item.decs.trailing;
            if let Some(ty) = item.ty {
                fields.push(Field {
                    names: std::mem::take(&mut names),
                    ty,
                    tag: None,
                    decs: decs.take().unwrap_or_default(),
                });
            }
        }
        if !names.is_empty() {
            return Err(self.error("missing parameter type"));
        }
        Ok(fields)
    }

    // =========================================================================
    // Types
    // =========================================================================

    fn starts_type(&self) -> bool {
        matches!(
            self.current.kind,
            TokenKind::Ident(_)
                | TokenKind::LBracket
                | TokenKind::Struct
                | TokenKind::Map
                | TokenKind::Chan
                | TokenKind::Func
                | TokenKind::Interface
                | TokenKind::Op(BinaryOp::Mul)
                | TokenKind::Arrow
        )
    }

    fn parse_type(&mut self) -> Result<Expr> {
        self.nested(Self::parse_type_inner)
    }

    fn parse_type_inner(&mut self) -> Result<Expr> {
        match &self.current.kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                if self.current.kind == TokenKind::Period {
                    self.advance();
                    let sel = self.expect_ident()?;
                    return Ok(Expr::selector(Expr::Ident(name), sel));
                }
                Ok(Expr::Ident(name))
            }
            TokenKind::LParen => {
                self.advance();
                let ty = self.parse_type()?;
                self.expect(&TokenKind::RParen)?;
                Ok(Expr::Paren(Box::new(ty)))
            }
            TokenKind::LBracket => self.parse_array_type(),
            TokenKind::Struct => self.parse_struct_type(),
            TokenKind::Interface => self.parse_interface_type(),
            TokenKind::Map => self.parse_map_type(),
            TokenKind::Chan | TokenKind::Arrow => self.parse_chan_type(),
            TokenKind::Func => {
                self.advance();
                Ok(Expr::FuncType(self.parse_signature()?))
            }
            TokenKind::Op(BinaryOp::Mul) => {
                self.advance();
                Ok(Expr::star(self.parse_type()?))
            }
            _ => Err(self.unexpected("type")),
        }
    }

    fn parse_array_type(&mut self) -> Result<Expr> {
        self.expect(&TokenKind::LBracket)?;
        let len = match self.current.kind {
            TokenKind::RBracket => None,
            TokenKind::Ellipsis => {
                self.advance();
                Some(Box::new(Expr::Ellipsis(None)))
            }
            _ => {
                self.expr_lev += 1;
                let len = self.parse_expr();
                self.expr_lev -= 1;
                Some(Box::new(len?))
            }
        };
        self.expect(&TokenKind::RBracket)?;
        let elem = self.parse_type()?;
        Ok(Expr::ArrayType {
            len,
            elem: Box::new(elem),
        })
    }

    fn parse_map_type(&mut self) -> Result<Expr> {
        self.expect(&TokenKind::Map)?;
        self.expect(&TokenKind::LBracket)?;
        let key = self.parse_type()?;
        self.expect(&TokenKind::RBracket)?;
        let value = self.parse_type()?;
        Ok(Expr::map_type(key, value))
    }

    fn parse_chan_type(&mut self) -> Result<Expr> {
        let dir = if self.current.kind == TokenKind::Arrow {
            self.advance();
            self.expect(&TokenKind::Chan)?;
            ChanDir::Recv
        } else {
            self.expect(&TokenKind::Chan)?;
            if self.current.kind == TokenKind::Arrow {
                self.advance();
                ChanDir::Send
            } else {
                ChanDir::Both
            }
        };
        let value = self.parse_type()?;
        Ok(Expr::ChanType(dir, Box::new(value)))
    }

    fn parse_struct_type(&mut self) -> Result<Expr> {
        self.expect(&TokenKind::Struct)?;
        let open_span = self.current.span;
        self.expect(&TokenKind::LBrace)?;
        let open_comment = self.take_trailing();

        let mut fields = Vec::new();
        while self.current.kind != TokenKind::RBrace {
            match self.current.kind {
                TokenKind::Eof => return Err(self.error_at(open_span, "unterminated struct")),
                TokenKind::Semicolon { auto: false } => {
                    self.advance();
                    continue;
                }
                _ => {}
            }
            let mut decs = self.start_decorations();
            let (names, ty) = self.parse_struct_field()?;
            let tag = if let TokenKind::String(tag) = &self.current.kind {
                let tag = tag.clone();
                self.advance();
                Some(tag)
            } else {
                None
            };
            self.expect_semi()?;
            decs.trailing = self.take_trailing();
            fields.push(Field {
                names,
                ty,
                tag,
                decs,
            });
        }
        let enclosure = self.close_enclosure(open_comment);
        self.expect(&TokenKind::RBrace)?;
        Ok(Expr::StructType(FieldList { fields, enclosure }))
    }

    fn parse_struct_field(&mut self) -> Result<(Vec<String>, Expr)> {
        let TokenKind::Ident(name) = &self.current.kind else {
            // Embedded pointer like `*Base`.
            self.expect(&TokenKind::Op(BinaryOp::Mul))?;
            let ty = self.parse_type()?;
            return Ok((Vec::new(), Expr::star(ty)));
        };
        let name = name.clone();
        self.advance();

        match self.current.kind {
            TokenKind::Period => {
                self.advance();
                let sel = self.expect_ident()?;
                Ok((Vec::new(), Expr::selector(Expr::Ident(name), sel)))
            }
            TokenKind::Semicolon { .. } | TokenKind::RBrace | TokenKind::String(_) => {
                Ok((Vec::new(), Expr::Ident(name)))
            }
            _ => {
                let mut names = vec![name];
                while self.current.kind == TokenKind::Comma {
                    self.advance();
                    names.push(self.expect_ident()?);
                }
                let ty = self.parse_type()?;
                Ok((names, ty))
            }
        }
    }

    fn parse_interface_type(&mut self) -> Result<Expr> {
        self.expect(&TokenKind::Interface)?;
        let open_span = self.current.span;
        self.expect(&TokenKind::LBrace)?;
        let open_comment = self.take_trailing();

        let mut fields = Vec::new();
        while self.current.kind != TokenKind::RBrace {
            match self.current.kind {
                TokenKind::Eof => {
                    return Err(self.error_at(open_span, "unterminated interface"));
                }
                TokenKind::Semicolon { auto: false } => {
                    self.advance();
                    continue;
                }
                _ => {}
            }
            let mut decs = self.start_decorations();
            let name = self.expect_ident()?;
            let field = match self.current.kind {
                TokenKind::LParen => {
                    let sig = self.parse_signature()?;
                    Field {
                        names: vec![name],
                        ty: Expr::FuncType(sig),
                        tag: None,
                        decs: Decorations::default(),
                    }
                }
                TokenKind::Period => {
                    self.advance();
                    let sel = self.expect_ident()?;
                    Field::new(&[], Expr::selector(Expr::Ident(name), sel))
                }
                _ => Field::new(&[], Expr::Ident(name)),
            };
            self.expect_semi()?;
            decs.trailing = self.take_trailing();
            fields.push(Field { decs, ..field });
        }
        let enclosure = self.close_enclosure(open_comment);
        self.expect(&TokenKind::RBrace)?;
        Ok(Expr::InterfaceType(FieldList { fields, enclosure }))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_block(&mut self) -> Result<Block> {
        self.nested(Self::parse_block_inner)
    }

    fn parse_block_inner(&mut self) -> Result<Block> {
        let open_span = self.current.span;
        self.expect(&TokenKind::LBrace)?;
        let open_comment = self.take_trailing();
        let stmts = self.parse_stmt_list()?;
        match self.current.kind {
            TokenKind::RBrace => {}
            TokenKind::Eof => return Err(self.error_at(open_span, "unterminated block")),
            _ => return Err(self.unexpected("'}'")),
        }
        let one_line = self.current.span.line == open_span.line;
        let enclosure = self.close_enclosure(open_comment);
        self.advance();
        Ok(Block {
            stmts,
            enclosure,
            one_line,
        })
    }

    fn parse_stmt_list(&mut self) -> Result<Vec<Stmt>> {
        let mut stmts = Vec::new();
        loop {
            match self.current.kind {
                TokenKind::RBrace | TokenKind::Case | TokenKind::Default | TokenKind::Eof => break,
                TokenKind::Semicolon { .. } => {
                    self.advance();
                    continue;
                }
                _ => {}
            }
            let mut decs = self.start_decorations();
            let kind = self.parse_stmt()?;
            if !matches!(
                self.current.kind,
                TokenKind::RBrace | TokenKind::Case | TokenKind::Default
            ) {
                self.expect_semi()?;
            }
            decs.trailing = self.take_trailing();
            stmts.push(Stmt { kind, decs });
        }
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<StmtKind> {
        match self.current.kind {
            TokenKind::Var | TokenKind::Const | TokenKind::Type => {
                Ok(StmtKind::Decl(self.parse_gen_decl()?))
            }
            TokenKind::Return => {
                self.advance();
                let results = if matches!(
                    self.current.kind,
                    TokenKind::Semicolon { .. } | TokenKind::RBrace
                ) {
                    Vec::new()
                } else {
                    self.parse_expr_list()?
                };
                Ok(StmtKind::Return(results))
            }
            TokenKind::Break | TokenKind::Continue | TokenKind::Goto => {
                let kind = match self.current.kind {
                    TokenKind::Break => BranchKind::Break,
                    TokenKind::Continue => BranchKind::Continue,
                    _ => BranchKind::Goto,
                };
                self.advance();
                let label = if let TokenKind::Ident(label) = &self.current.kind {
                    let label = label.clone();
                    self.advance();
                    Some(label)
                } else {
                    None
                };
                Ok(StmtKind::Branch { kind, label })
            }
            TokenKind::Fallthrough => {
                self.advance();
                Ok(StmtKind::Branch {
                    kind: BranchKind::Fallthrough,
                    label: None,
                })
            }
            TokenKind::LBrace => Ok(StmtKind::Block(self.parse_block()?)),
            TokenKind::If => Ok(StmtKind::If(self.parse_if()?)),
            TokenKind::For => self.parse_for(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Select => self.parse_select(),
            TokenKind::Go => {
                self.advance();
                Ok(StmtKind::Go(self.parse_expr()?))
            }
            TokenKind::Defer => {
                self.advance();
                Ok(StmtKind::Defer(self.parse_expr()?))
            }
            _ => match self.parse_simple_stmt(false, true)? {
                Simple::Plain(kind) => Ok(kind),
                Simple::Range { .. } => Err(self.error("unexpected range clause")),
            },
        }
    }

    fn parse_simple_stmt(&mut self, range_ok: bool, label_ok: bool) -> Result<Simple> {
        if range_ok && self.current.kind == TokenKind::Range {
            self.advance();
            let expr = self.parse_expr()?;
            return Ok(Simple::Range {
                key: None,
                value: None,
                define: false,
                expr,
            });
        }

        let mut lhs = self.parse_expr_list()?;

        let op = match self.current.kind {
            TokenKind::Define => Some(AssignOp::Define),
            TokenKind::Assign => Some(AssignOp::Assign),
            TokenKind::OpAssign(op) => Some(AssignOp::Op(op)),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let plain = matches!(op, AssignOp::Define | AssignOp::Assign);
            if range_ok && plain && self.current.kind == TokenKind::Range {
                if lhs.len() > 2 {
                    return Err(self.error("range clause permits at most two variables"));
                }
                self.advance();
                let expr = self.parse_expr()?;
                let mut vars = lhs.into_iter();
                return Ok(Simple::Range {
                    key: vars.next(),
                    value: vars.next(),
                    define: op == AssignOp::Define,
                    expr,
                });
            }
            let rhs = self.parse_expr_list()?;
            return Ok(Simple::Plain(StmtKind::Assign { lhs, op, rhs }));
        }

        if lhs.len() > 1 {
            return Err(self.unexpected("':=' or '='"));
        }
        let Some(x) = lhs.pop() else {
            return Err(self.unexpected("expression"));
        };

        if label_ok && self.current.kind == TokenKind::Colon {
            if let Expr::Ident(label) = x {
                self.advance();
                return Ok(Simple::Plain(self.parse_labeled(label)?));
            }
            return Err(self.error("invalid label"));
        }

        let kind = match self.current.kind {
            TokenKind::Arrow => {
                self.advance();
                let value = self.parse_expr()?;
                StmtKind::Send { chan: x, value }
            }
            TokenKind::Inc | TokenKind::Dec => {
                let inc = self.current.kind == TokenKind::Inc;
                self.advance();
                StmtKind::IncDec { expr: x, inc }
            }
            _ => StmtKind::Expr(x),
        };
        Ok(Simple::Plain(kind))
    }

    fn parse_labeled(&mut self, label: String) -> Result<StmtKind> {
        if matches!(
            self.current.kind,
            TokenKind::RBrace | TokenKind::Semicolon { .. }
        ) {
            return Ok(StmtKind::Labeled {
                label,
                stmt: Box::new(Stmt::new(StmtKind::Empty)),
            });
        }
        let decs = self.start_decorations();
        let kind = self.parse_stmt()?;
        Ok(StmtKind::Labeled {
            label,
            stmt: Box::new(Stmt { kind, decs }),
        })
    }

    /// Parses `init; cond` or `cond` of an `if`, `for`, or `switch` header.
    fn parse_header_stmt(&mut self, range_ok: bool) -> Result<Option<Simple>> {
        if matches!(
            self.current.kind,
            TokenKind::Semicolon { .. } | TokenKind::LBrace
        ) {
            return Ok(None);
        }
        self.parse_simple_stmt(range_ok, false).map(Some)
    }

    fn parse_if(&mut self) -> Result<IfStmt> {
        self.expect(&TokenKind::If)?;
        let outer = self.expr_lev;
        self.expr_lev = -1;
        let header = self.parse_if_header();
        self.expr_lev = outer;
        let (init, cond) = header?;

        let then = self.parse_block()?;
        let els = if self.current.kind == TokenKind::Else {
            self.advance();
            match self.current.kind {
                TokenKind::If => Some(Box::new(Else::If(self.parse_if()?))),
                TokenKind::LBrace => Some(Box::new(Else::Block(self.parse_block()?))),
                _ => return Err(self.unexpected("if statement or block")),
            }
        } else {
            None
        };

        Ok(IfStmt {
            init,
            cond,
            then,
            els,
        })
    }

    fn parse_if_header(&mut self) -> Result<(Option<Box<Stmt>>, Expr)> {
        if self.current.kind == TokenKind::LBrace {
            return Err(self.error("missing condition in if statement"));
        }
        let first = self.parse_header_stmt(false)?;
        if matches!(self.current.kind, TokenKind::Semicolon { .. }) {
            self.advance();
            let init = first.map(|simple| self.simple_to_stmt(simple)).transpose()?;
            let cond = self.parse_expr()?;
            return Ok((init.map(Box::new), cond));
        }
        match first {
            Some(Simple::Plain(StmtKind::Expr(cond))) => Ok((None, cond)),
            _ => Err(self.error("expected condition in if statement")),
        }
    }

    fn parse_for(&mut self) -> Result<StmtKind> {
        self.expect(&TokenKind::For)?;
        let outer = self.expr_lev;
        self.expr_lev = -1;
        let header = self.parse_for_header();
        self.expr_lev = outer;
        let header = header?;
        let body = self.parse_block()?;

        Ok(match header {
            ForHeader::Range {
                key,
                value,
                define,
                expr,
            } => StmtKind::Range {
                key,
                value,
                define,
                expr,
                body,
            },
            ForHeader::Clauses { init, cond, post } => StmtKind::For {
                init,
                cond,
                post,
                body,
            },
        })
    }

    fn parse_for_header(&mut self) -> Result<ForHeader> {
        let first = self.parse_header_stmt(true)?;
        if let Some(Simple::Range {
            key,
            value,
            define,
            expr,
        }) = first
        {
            return Ok(ForHeader::Range {
                key,
                value,
                define,
                expr,
            });
        }

        if matches!(self.current.kind, TokenKind::Semicolon { .. }) {
            self.advance();
            let init = first.map(|simple| self.simple_to_stmt(simple)).transpose()?;
            let cond = if matches!(self.current.kind, TokenKind::Semicolon { .. }) {
                None
            } else {
                Some(self.parse_expr()?)
            };
            self.expect_semi()?;
            let post = match self.parse_header_stmt(false)? {
                Some(simple) => Some(Box::new(self.simple_to_stmt(simple)?)),
                None => None,
            };
            return Ok(ForHeader::Clauses {
                init: init.map(Box::new),
                cond,
                post,
            });
        }

        let cond = match first {
            None => None,
            Some(Simple::Plain(StmtKind::Expr(cond))) => Some(cond),
            Some(_) => return Err(self.error("expected for loop condition")),
        };
        Ok(ForHeader::Clauses {
            init: None,
            cond,
            post: None,
        })
    }

    fn simple_to_stmt(&self, simple: Simple) -> Result<Stmt> {
        match simple {
            Simple::Plain(kind) => Ok(Stmt::new(kind)),
            Simple::Range { .. } => Err(self.error("unexpected range clause")),
        }
    }

    fn parse_switch(&mut self) -> Result<StmtKind> {
        self.expect(&TokenKind::Switch)?;
        let outer = self.expr_lev;
        self.expr_lev = -1;
        let header = self.parse_switch_header();
        self.expr_lev = outer;
        let (init, tag) = header?;

        let open_span = self.current.span;
        self.expect(&TokenKind::LBrace)?;
        let open_comment = self.take_trailing();
        let mut clauses = Vec::new();
        while self.current.kind != TokenKind::RBrace {
            let mut decs = self.start_decorations();
            let list = match self.current.kind {
                TokenKind::Case => {
                    self.advance();
                    Some(self.parse_expr_list()?)
                }
                TokenKind::Default => {
                    self.advance();
                    None
                }
                TokenKind::Eof => return Err(self.error_at(open_span, "unterminated switch")),
                _ => return Err(self.unexpected("case or default")),
            };
            self.expect(&TokenKind::Colon)?;
            decs.trailing = self.take_trailing();
            let body = self.parse_stmt_list()?;
            clauses.push(CaseClause { list, body, decs });
        }
        let enclosure = self.close_enclosure(open_comment);
        self.expect(&TokenKind::RBrace)?;

        let init = init.map(Box::new);
        let guard = match tag {
            Some(stmt) if is_type_switch_guard(&stmt.kind) => stmt,
            Some(Stmt {
                kind: StmtKind::Expr(tag),
                ..
            }) => {
                return Ok(StmtKind::Switch {
                    init,
                    tag: Some(tag),
                    clauses,
                    enclosure,
                });
            }
            Some(_) => return Err(self.error_at(open_span, "expected switch expression")),
            None => {
                return Ok(StmtKind::Switch {
                    init,
                    tag: None,
                    clauses,
                    enclosure,
                });
            }
        };
        Ok(StmtKind::TypeSwitch {
            init,
            guard: Box::new(guard),
            clauses,
            enclosure,
        })
    }

    fn parse_switch_header(&mut self) -> Result<(Option<Stmt>, Option<Stmt>)> {
        if self.current.kind == TokenKind::LBrace {
            return Ok((None, None));
        }
        let first = self.parse_header_stmt(false)?;
        if matches!(self.current.kind, TokenKind::Semicolon { .. }) {
            self.advance();
            let init = first.map(|simple| self.simple_to_stmt(simple)).transpose()?;
            let tag = match self.parse_header_stmt(false)? {
                Some(simple) => Some(self.simple_to_stmt(simple)?),
                None => None,
            };
            return Ok((init, tag));
        }
        let tag = first.map(|simple| self.simple_to_stmt(simple)).transpose()?;
        Ok((None, tag))
    }

    fn parse_select(&mut self) -> Result<StmtKind> {
        self.expect(&TokenKind::Select)?;
        let open_span = self.current.span;
        self.expect(&TokenKind::LBrace)?;
        let open_comment = self.take_trailing();
        let mut clauses = Vec::new();
        while self.current.kind != TokenKind::RBrace {
            let mut decs = self.start_decorations();
            let comm = match self.current.kind {
                TokenKind::Case => {
                    self.advance();
                    let simple = self.parse_simple_stmt(false, false)?;
                    Some(Box::new(self.simple_to_stmt(simple)?))
                }
                TokenKind::Default => {
                    self.advance();
                    None
                }
                TokenKind::Eof => return Err(self.error_at(open_span, "unterminated select")),
                _ => return Err(self.unexpected("case or default")),
            };
            self.expect(&TokenKind::Colon)?;
            decs.trailing = self.take_trailing();
            let body = self.parse_stmt_list()?;
            clauses.push(CommClause { comm, body, decs });
        }
        let enclosure = self.close_enclosure(open_comment);
        self.expect(&TokenKind::RBrace)?;
        Ok(StmtKind::Select { clauses, enclosure })
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expr_list(&mut self) -> Result<Vec<Expr>> {
        let mut list = vec![self.parse_expr()?];
        while self.current.kind == TokenKind::Comma {
            self.advance();
            list.push(self.parse_expr()?);
        }
        Ok(list)
    }

    fn parse_ident_list(&mut self) -> Result<Vec<String>> {
        let mut names = vec![self.expect_ident()?];
        while self.current.kind == TokenKind::Comma {
            self.advance();
            names.push(self.expect_ident()?);
        }
        Ok(names)
    }

    /// Parses an expression.
    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_binary(1)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr> {
        let mut x = self.parse_unary()?;
        loop {
            let TokenKind::Op(op) = self.current.kind else {
                return Ok(x);
            };
            if op.precedence() < min_prec {
                return Ok(x);
            }
            self.advance();
            let line_break = self.newline_before;
            let y = self.parse_binary(op.precedence() + 1)?;
            x = Expr::Binary {
                x: Box::new(x),
                op,
                y: Box::new(y),
                line_break,
            };
        }
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        self.nested(Self::parse_prefixed)
    }

    fn parse_prefixed(&mut self) -> Result<Expr> {
        let op = match self.current.kind {
            TokenKind::Op(BinaryOp::Add) => UnaryOp::Pos,
            TokenKind::Op(BinaryOp::Sub) => UnaryOp::Neg,
            TokenKind::Op(BinaryOp::Xor) => UnaryOp::Xor,
            TokenKind::Op(BinaryOp::And) => UnaryOp::Addr,
            TokenKind::Not => UnaryOp::Not,
            TokenKind::Tilde => UnaryOp::Tilde,
            TokenKind::Op(BinaryOp::Mul) => {
                self.advance();
                return Ok(Expr::star(self.parse_unary()?));
            }
            TokenKind::Arrow => {
                self.advance();
                if self.current.kind == TokenKind::Chan {
                    self.advance();
                    let value = self.parse_type()?;
                    return Ok(Expr::ChanType(ChanDir::Recv, Box::new(value)));
                }
                return Ok(Expr::Unary(UnaryOp::Recv, Box::new(self.parse_unary()?)));
            }
            _ => return self.parse_primary(),
        };
        self.advance();
        Ok(Expr::Unary(op, Box::new(self.parse_unary()?)))
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let mut x = self.parse_operand()?;
        loop {
            match self.current.kind {
                TokenKind::Period => {
                    self.advance();
                    x = self.parse_selector_or_assert(x)?;
                }
                TokenKind::LBracket => x = self.parse_index_or_slice(x)?,
                TokenKind::LParen => x = self.parse_call(x)?,
                TokenKind::LBrace => {
                    if !self.is_composite_type(&x) {
                        return Ok(x);
                    }
                    x = self.parse_composite(Some(x))?;
                }
                _ => return Ok(x),
            }
        }
    }

    /// Decides whether `{` after `x` opens a composite literal.
    fn is_composite_type(&self, x: &Expr) -> bool {
        match x.unparen() {
            Expr::Ident(_) | Expr::Selector(..) | Expr::Index(..) => self.expr_lev >= 0,
            Expr::ArrayType { .. } | Expr::StructType(_) | Expr::MapType(..) => true,
            _ => false,
        }
    }

    fn parse_operand(&mut self) -> Result<Expr> {
        let lit = |kind: LitKind, text: &String| Expr::BasicLit(kind, text.clone());
        let expr = match &self.current.kind {
            TokenKind::Ident(name) => Expr::Ident(name.clone()),
            TokenKind::Int(text) => lit(LitKind::Int, text),
            TokenKind::Float(text) => lit(LitKind::Float, text),
            TokenKind::Imag(text) => lit(LitKind::Imag, text),
            TokenKind::Char(text) => lit(LitKind::Char, text),
            TokenKind::String(text) => lit(LitKind::String, text),
            TokenKind::LParen => {
                self.advance();
                self.expr_lev += 1;
                let inner = self.parse_expr();
                self.expr_lev -= 1;
                let inner = inner?;
                self.expect(&TokenKind::RParen)?;
                return Ok(Expr::Paren(Box::new(inner)));
            }
            TokenKind::Func => {
                self.advance();
                let ty = self.parse_signature()?;
                if self.current.kind != TokenKind::LBrace {
                    return Ok(Expr::FuncType(ty));
                }
                self.expr_lev += 1;
                let body = self.parse_block();
                self.expr_lev -= 1;
                return Ok(Expr::FuncLit { ty, body: body? });
            }
            TokenKind::LBracket
            | TokenKind::Struct
            | TokenKind::Map
            | TokenKind::Chan
            | TokenKind::Interface => return self.parse_type(),
            _ => return Err(self.unexpected("expression")),
        };
        self.advance();
        Ok(expr)
    }

    fn parse_selector_or_assert(&mut self, x: Expr) -> Result<Expr> {
        match &self.current.kind {
            TokenKind::Ident(sel) => {
                let sel = sel.clone();
                self.advance();
                Ok(Expr::Selector(Box::new(x), sel))
            }
            TokenKind::LParen => {
                self.advance();
                let ty = if self.current.kind == TokenKind::Type {
                    self.advance();
                    None
                } else {
                    Some(Box::new(self.parse_type()?))
                };
                self.expect(&TokenKind::RParen)?;
                Ok(Expr::TypeAssert(Box::new(x), ty))
            }
            _ => Err(self.unexpected("selector or type assertion")),
        }
    }

    fn parse_index_or_slice(&mut self, x: Expr) -> Result<Expr> {
        self.expect(&TokenKind::LBracket)?;
        self.expr_lev += 1;
        let parts = self.parse_index_parts();
        self.expr_lev -= 1;
        let (index, colons) = parts?;
        self.expect(&TokenKind::RBracket)?;

        let [low, high, max] = index;
        if colons == 0 {
            let Some(index) = low else {
                return Err(self.error("expected operand"));
            };
            return Ok(Expr::Index(Box::new(x), Box::new(index)));
        }
        if colons == 2 && (high.is_none() || max.is_none()) {
            return Err(self.error("middle and final index required in 3-index slice"));
        }
        Ok(Expr::Slice {
            x: Box::new(x),
            low: low.map(Box::new),
            high: high.map(Box::new),
            max: max.map(Box::new),
        })
    }

    fn parse_index_parts(&mut self) -> Result<([Option<Expr>; 3], usize)> {
        let mut index: [Option<Expr>; 3] = [None, None, None];
        let mut colons = 0;
        if self.current.kind != TokenKind::Colon {
            index[0] = Some(self.parse_expr()?);
        }
        while self.current.kind == TokenKind::Colon && colons < 2 {
            colons += 1;
            self.advance();
            if !matches!(self.current.kind, TokenKind::Colon | TokenKind::RBracket) {
                index[colons] = Some(self.parse_expr()?);
            }
        }
        Ok((index, colons))
    }

    fn parse_call(&mut self, fun: Expr) -> Result<Expr> {
        let open_span = self.current.span;
        self.expect(&TokenKind::LParen)?;
        self.expr_lev += 1;
        let args = self.parse_call_args(open_span);
        self.expr_lev -= 1;
        let (args, ellipsis, enclosure) = args?;
        self.expect(&TokenKind::RParen)?;
        Ok(Expr::Call(CallExpr {
            fun: Box::new(fun),
            args,
            ellipsis,
            enclosure,
        }))
    }

    fn parse_call_args(&mut self, open_span: Span) -> Result<(Vec<Element>, bool, Enclosure)> {
        let open_comment = self.take_trailing();
        let mut args = Vec::new();
        let mut ellipsis = false;
        while self.current.kind != TokenKind::RParen {
            if self.current.kind == TokenKind::Eof {
                return Err(self.error_at(open_span, "unterminated argument list"));
            }
            let decs = self.start_decorations();
            let expr = self.parse_expr()?;
            if self.current.kind == TokenKind::Ellipsis {
                ellipsis = true;
                self.advance();
            }
            let mut element = Element { expr, decs };
            if self.current.kind == TokenKind::Comma {
                self.advance();
                element.decs.trailing = self.take_trailing();
                args.push(element);
            } else {
                args.push(element);
                break;
            }
        }
        let enclosure = self.close_enclosure(open_comment);
        Ok((args, ellipsis, enclosure))
    }

    fn parse_composite(&mut self, ty: Option<Expr>) -> Result<Expr> {
        let open_span = self.current.span;
        self.expect(&TokenKind::LBrace)?;
        self.expr_lev += 1;
        let elts = self.parse_composite_elements(open_span);
        self.expr_lev -= 1;
        let (elts, enclosure) = elts?;
        self.expect(&TokenKind::RBrace)?;
        Ok(Expr::Composite(CompositeLit {
            ty: ty.map(Box::new),
            elts,
            enclosure,
        }))
    }

    fn parse_composite_elements(&mut self, open_span: Span) -> Result<(Vec<Element>, Enclosure)> {
        let open_comment = self.take_trailing();
        let mut elts = Vec::new();
        while self.current.kind != TokenKind::RBrace {
            if self.current.kind == TokenKind::Eof {
                return Err(self.error_at(open_span, "unterminated composite literal"));
            }
            let decs = self.start_decorations();
            let mut expr = self.parse_element_value()?;
            if self.current.kind == TokenKind::Colon {
                self.advance();
                let value = self.parse_element_value()?;
                expr = Expr::KeyValue(Box::new(expr), Box::new(value));
            }
            let mut element = Element { expr, decs };
            if self.current.kind == TokenKind::Comma {
                self.advance();
                element.decs.trailing = self.take_trailing();
                elts.push(element);
            } else {
                elts.push(element);
                break;
            }
        }
        let enclosure = self.close_enclosure(open_comment);
        Ok((elts, enclosure))
    }

    fn parse_element_value(&mut self) -> Result<Expr> {
        if self.current.kind == TokenKind::LBrace {
            return self.nested(|parser| parser.parse_composite(None));
        }
        self.parse_expr()
    }

    // =========================================================================
    // Decorations
    // =========================================================================

    /// Claims all pending comments as leading comments of the node that
    /// starts at the current token.
    fn start_decorations(&mut self) -> Decorations {
        Decorations {
            blank_before: self.blank_before,
            newline_before: self.newline_before,
            leading: self.drain_comments(),
            trailing: None,
        }
    }

    /// Claims the first pending comment if it sits on the previous token's line.
    fn take_trailing(&mut self) -> Option<Comment> {
        if self.pending.first().is_some_and(|pending| pending.trailing) {
            Some(self.pending.remove(0).comment)
        } else {
            None
        }
    }

    fn drain_comments(&mut self) -> Vec<Comment> {
        self.pending.drain(..).map(|pending| pending.comment).collect()
    }

    /// Builds the enclosure of a list whose closing token is current.
    fn close_enclosure(&mut self, open_comment: Option<Comment>) -> Enclosure {
        Enclosure {
            open_comment,
            close_newline: self.newline_before,
            close_comments: self.drain_comments(),
        }
    }

    // =========================================================================
    // Token handling
    // =========================================================================

    /// Advances to the next token, collecting comments on the way.
    fn advance(&mut self) {
        if !matches!(self.current.kind, TokenKind::Semicolon { auto: true }) {
            let end = self.current.span.end_line(self.source);
            self.prev_end_line = end;
            self.last_line = end;
        }
        loop {
            let token = self.lexer.next_token();
            if let TokenKind::Comment(text) = &token.kind {
                let trailing = token.span.line == self.prev_end_line
                    && self.pending.iter().all(|pending| pending.trailing);
                self.pending.push(PendingComment {
                    comment: Comment {
                        text: text.clone(),
                        blank_before: token.span.line > self.last_line + 1,
                    },
                    trailing,
                });
                self.last_line = token.span.end_line(self.source);
                continue;
            }
            self.newline_before = token.span.line > self.prev_end_line;
            self.blank_before = token.span.line > self.last_line + 1;
            self.current = token;
            return;
        }
    }

    /// Expects the current token to be of a specific kind, then advances.
    fn expect(&mut self, expected: &TokenKind) -> Result<()> {
        if &self.current.kind == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&expected.name()))
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        let TokenKind::Ident(name) = &self.current.kind else {
            return Err(self.unexpected("identifier"));
        };
        let name = name.clone();
        self.advance();
        Ok(name)
    }

    /// Expects a statement terminator. A closing `)` or `}` may stand in
    /// for it and is left unconsumed.
    fn expect_semi(&mut self) -> Result<()> {
        match self.current.kind {
            TokenKind::Semicolon { .. } => {
                self.advance();
                Ok(())
            }
            TokenKind::RParen | TokenKind::RBrace => Ok(()),
            _ => Err(self.unexpected("';' or newline")),
        }
    }

    /// Creates an error describing the current token.
    fn unexpected(&self, expected: &str) -> Error {
        match &self.current.kind {
            TokenKind::Error(message) => self.error(message),
            other => self.error(&format!("expected {expected}, found {}", other.name())),
        }
    }

    /// Runs `parse` one nesting level deeper, failing past [`MAX_NESTING`].
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_NESTING {
            return Err(self.error("expression nested too deeply"));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Creates a parse error at the current position.
    fn error(&self, message: &str) -> Error {
        self.error_at(self.current.span, message)
    }

    /// Creates a parse error at a specific span.
    fn error_at(&self, span: Span, message: &str) -> Error {
        Error::syntax(message, span.line, span.column, self.context_at(span))
    }

    /// Gets the source line containing a span for error messages.
    fn context_at(&self, span: Span) -> String {
        let start = span.start.min(self.source.len());
        let line_start = self.source[..start].rfind('\n').map_or(0, |i| i + 1);
        let line_end = self.source[start..]
            .find('\n')
            .map_or(self.source.len(), |i| start + i);
        self.source[line_start..line_end].to_string()
    }
}

/// Header of a `for` statement.
enum ForHeader {
    Clauses {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
    },
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        expr: Expr,
    },
}

/// Returns true for `x := y.(type)` and `y.(type)`.
fn is_type_switch_guard(kind: &StmtKind) -> bool {
    let is_guard = |expr: &Expr| matches!(expr, Expr::TypeAssert(_, None));
    match kind {
        StmtKind::Expr(expr) => is_guard(expr),
        StmtKind::Assign {
            op: AssignOp::Define,
            rhs,
            ..
        } => rhs.len() == 1 && is_guard(&rhs[0]),
        _ => false,
    }
}

/// Parses Go source into a decorated file.
///
/// # Errors
/// Returns an error if the source is not a well-formed file.
pub fn parse_file(source: &str) -> Result<File> {
    Parser::new(source).parse_file()
}

/// Parses a single Go expression.
///
/// # Errors
/// Returns an error if the source is not a single expression.
pub fn parse_expr(source: &str) -> Result<Expr> {
    Parser::new(source).parse_standalone_expr()
}

/// Parses a single Go type.
///
/// # Errors
/// Returns an error if the source is not a single type.
pub fn parse_type(source: &str) -> Result<Expr> {
    Parser::new(source).parse_standalone_type()
}
