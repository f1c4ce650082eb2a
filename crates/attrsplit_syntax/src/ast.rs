//! Decorated syntax tree for Go source files.
//!
//! The tree keeps enough layout information (comments, blank lines, line
//! breaks inside bracketed lists) for the printer to reproduce the source
//! after declarations have been rewritten or appended. Layout lives in two
//! records:
//!
//! - [`Decorations`] on every node that occupies its own line or list slot
//!   (declarations, statements, specs, fields, case clauses, list elements);
//! - [`Enclosure`] on every bracketed list (blocks, call arguments,
//!   composite literals, field lists, grouped declarations, switch bodies).

/// A source comment, stored with its delimiters.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Comment {
    /// The comment text including `//` or `/* */`.
    pub text: String,
    /// An empty line separates this comment from what precedes it.
    pub blank_before: bool,
}

impl Comment {
    /// Creates a line comment from its text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            blank_before: false,
        }
    }
}

/// Layout metadata attached to a node.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Decorations {
    /// An empty line directly precedes the node (after its leading comments).
    pub blank_before: bool,
    /// The node starts on a new source line.
    pub newline_before: bool,
    /// Comments on the lines before the node.
    pub leading: Vec<Comment>,
    /// A comment after the node on the same line.
    pub trailing: Option<Comment>,
}

impl Decorations {
    /// Decorations for a node that starts after an empty line.
    #[must_use]
    pub fn blank_line() -> Self {
        Self {
            blank_before: true,
            newline_before: true,
            ..Self::default()
        }
    }

    /// Decorations for a node on its own line.
    #[must_use]
    pub fn own_line() -> Self {
        Self {
            newline_before: true,
            ..Self::default()
        }
    }

    /// Returns true if the node must start on a new line when printed.
    #[must_use]
    pub fn breaks_line(&self) -> bool {
        self.newline_before || !self.leading.is_empty()
    }

    /// Returns true if no comments are attached.
    #[must_use]
    pub fn has_comments(&self) -> bool {
        !self.leading.is_empty() || self.trailing.is_some()
    }
}

/// Layout metadata of a bracketed list.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Enclosure {
    /// A comment after the opening delimiter on the same line.
    pub open_comment: Option<Comment>,
    /// The closing delimiter sits on its own line.
    pub close_newline: bool,
    /// Comments between the last element and the closing delimiter.
    pub close_comments: Vec<Comment>,
}

impl Enclosure {
    /// Layout of a list whose closing delimiter is on its own line.
    #[must_use]
    pub fn multi_line() -> Self {
        Self {
            close_newline: true,
            ..Self::default()
        }
    }

    /// Returns true if any comment is attached.
    #[must_use]
    pub fn has_comments(&self) -> bool {
        self.open_comment.is_some() || !self.close_comments.is_empty()
    }
}

/// A parsed source file.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct File {
    /// The package name.
    pub package: String,
    /// Decorations of the package clause (the file doc comment).
    pub package_decs: Decorations,
    /// Top-level declarations in source order.
    pub decls: Vec<Decl>,
    /// Comments after the last declaration.
    pub trailing_comments: Vec<Comment>,
}

impl File {
    /// Returns the function declarations with their positions.
    pub fn funcs(&self) -> impl Iterator<Item = (usize, &FuncDecl)> {
        self.decls
            .iter()
            .enumerate()
            .filter_map(|(i, decl)| decl.as_func().map(|func| (i, func)))
    }

    /// Returns the function declaration at `index`, if it is one.
    #[must_use]
    pub fn func(&self, index: usize) -> Option<&FuncDecl> {
        self.decls.get(index).and_then(Decl::as_func)
    }

    /// Returns the function declaration at `index` mutably, if it is one.
    pub fn func_mut(&mut self, index: usize) -> Option<&mut FuncDecl> {
        self.decls.get_mut(index).and_then(Decl::as_func_mut)
    }
}

/// A top-level declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct Decl {
    /// The declaration itself.
    pub kind: DeclKind,
    /// Layout metadata.
    pub decs: Decorations,
}

impl Decl {
    /// Wraps a function declaration.
    #[must_use]
    pub fn func(func: FuncDecl, decs: Decorations) -> Self {
        Self {
            kind: DeclKind::Func(func),
            decs,
        }
    }

    /// Returns the function declaration, if this is one.
    #[must_use]
    pub fn as_func(&self) -> Option<&FuncDecl> {
        match &self.kind {
            DeclKind::Func(func) => Some(func),
            DeclKind::Gen(_) => None,
        }
    }

    /// Returns the function declaration mutably, if this is one.
    pub fn as_func_mut(&mut self) -> Option<&mut FuncDecl> {
        match &mut self.kind {
            DeclKind::Func(func) => Some(func),
            DeclKind::Gen(_) => None,
        }
    }
}

/// Declaration variants.
#[derive(Clone, Debug, PartialEq)]
pub enum DeclKind {
    /// `func` declaration.
    Func(FuncDecl),
    /// `import`, `const`, `var`, or `type` declaration.
    Gen(GenDecl),
}

/// Keyword of a generic declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenKeyword {
    /// `import`
    Import,
    /// `const`
    Const,
    /// `var`
    Var,
    /// `type`
    Type,
}

impl GenKeyword {
    /// Returns the keyword text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Const => "const",
            Self::Var => "var",
            Self::Type => "type",
        }
    }
}

/// An `import`, `const`, `var`, or `type` declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct GenDecl {
    /// The declaration keyword.
    pub keyword: GenKeyword,
    /// The declared specs.
    pub specs: Vec<Spec>,
    /// Parenthesized group layout; `None` for a single ungrouped spec.
    pub group: Option<Enclosure>,
}

/// One spec of a generic declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct Spec {
    /// The spec itself.
    pub kind: SpecKind,
    /// Layout metadata.
    pub decs: Decorations,
}

/// Spec variants.
#[derive(Clone, Debug, PartialEq)]
pub enum SpecKind {
    /// `[name] "path"`
    Import {
        /// Optional alias (`_`, `.`, or an identifier).
        name: Option<String>,
        /// The quoted import path.
        path: String,
    },
    /// `names [type] [= values]`
    Value {
        /// Declared names.
        names: Vec<String>,
        /// Optional explicit type.
        ty: Option<Expr>,
        /// Initial values.
        values: Vec<Expr>,
    },
    /// `name [=] type`
    Type {
        /// Declared type name.
        name: String,
        /// True for an alias declaration.
        alias: bool,
        /// The underlying type.
        ty: Expr,
    },
}

/// A function or method declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct FuncDecl {
    /// Receiver list for methods.
    pub recv: Option<FieldList>,
    /// Function name.
    pub name: String,
    /// Parameters and results.
    pub ty: FuncType,
    /// Body; absent for external declarations.
    pub body: Option<Block>,
}

impl FuncDecl {
    /// Returns the receiver type expression, if this is a method.
    #[must_use]
    pub fn receiver_type(&self) -> Option<&Expr> {
        self.recv
            .as_ref()
            .and_then(|recv| recv.fields.first())
            .map(|field| &field.ty)
    }

    /// Returns the body statements, or an empty slice.
    #[must_use]
    pub fn stmts(&self) -> &[Stmt] {
        self.body.as_ref().map_or(&[], |body| body.stmts.as_slice())
    }
}

/// A function signature.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FuncType {
    /// Parameter list.
    pub params: FieldList,
    /// Result list, if any.
    pub results: Option<FieldList>,
}

/// A parenthesized or braced list of fields.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FieldList {
    /// The fields.
    pub fields: Vec<Field>,
    /// Layout of the list.
    pub enclosure: Enclosure,
}

impl FieldList {
    /// Creates a single-line field list.
    #[must_use]
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            enclosure: Enclosure::default(),
        }
    }
}

/// A parameter, result, struct field, or interface method.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    /// Names sharing the type; empty for anonymous or embedded fields.
    pub names: Vec<String>,
    /// The field type (a [`Expr::FuncType`] for interface methods).
    pub ty: Expr,
    /// Struct tag literal.
    pub tag: Option<String>,
    /// Layout metadata.
    pub decs: Decorations,
}

impl Field {
    /// Creates a field with the given names and type.
    #[must_use]
    pub fn new(names: &[&str], ty: Expr) -> Self {
        Self {
            names: names.iter().map(|name| (*name).to_string()).collect(),
            ty,
            tag: None,
            decs: Decorations::default(),
        }
    }
}

/// A braced statement list.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Block {
    /// The statements.
    pub stmts: Vec<Stmt>,
    /// Layout of the braces.
    pub enclosure: Enclosure,
    /// The source wrote the whole block on one line.
    pub one_line: bool,
}

impl Block {
    /// Creates a multi-line block.
    #[must_use]
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self {
            stmts,
            enclosure: Enclosure::multi_line(),
            one_line: false,
        }
    }
}

/// A statement with its decorations.
#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    /// The statement itself.
    pub kind: StmtKind,
    /// Layout metadata.
    pub decs: Decorations,
}

impl Stmt {
    /// Creates an undecorated statement.
    #[must_use]
    pub fn new(kind: StmtKind) -> Self {
        Self {
            kind,
            decs: Decorations::default(),
        }
    }

    /// Creates `return <results>`.
    #[must_use]
    pub fn ret(results: Vec<Expr>) -> Self {
        Self::new(StmtKind::Return(results))
    }

    /// Creates `return nil`.
    #[must_use]
    pub fn return_nil() -> Self {
        Self::ret(vec![Expr::ident("nil")])
    }

    /// Returns true if this is a `return` statement.
    #[must_use]
    pub const fn is_return(&self) -> bool {
        matches!(self.kind, StmtKind::Return(_))
    }
}

/// Assignment operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `:=`
    Define,
    /// Compound assignment like `+=`.
    Op(BinaryOp),
}

impl AssignOp {
    /// Returns the operator text.
    #[must_use]
    pub fn as_str(self) -> String {
        match self {
            Self::Assign => "=".into(),
            Self::Define => ":=".into(),
            Self::Op(op) => format!("{}=", op.as_str()),
        }
    }
}

/// Branch statement keywords.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchKind {
    /// `break`
    Break,
    /// `continue`
    Continue,
    /// `goto`
    Goto,
    /// `fallthrough`
    Fallthrough,
}

impl BranchKind {
    /// Returns the keyword text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Break => "break",
            Self::Continue => "continue",
            Self::Goto => "goto",
            Self::Fallthrough => "fallthrough",
        }
    }
}

/// Statement variants.
#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    /// An expression used as a statement.
    Expr(Expr),
    /// `lhs op rhs`
    Assign {
        /// Assigned expressions.
        lhs: Vec<Expr>,
        /// Operator.
        op: AssignOp,
        /// Assigned values.
        rhs: Vec<Expr>,
    },
    /// `x++` or `x--`
    IncDec {
        /// Operand.
        expr: Expr,
        /// True for `++`.
        inc: bool,
    },
    /// `ch <- value`
    Send {
        /// Channel.
        chan: Expr,
        /// Sent value.
        value: Expr,
    },
    /// A `var`, `const`, or `type` declaration inside a body.
    Decl(GenDecl),
    /// `return results`
    Return(Vec<Expr>),
    /// `break`, `continue`, `goto`, `fallthrough`
    Branch {
        /// Keyword.
        kind: BranchKind,
        /// Optional label.
        label: Option<String>,
    },
    /// `{ ... }`
    Block(Block),
    /// `if` statement.
    If(IfStmt),
    /// Three-clause, condition-only, or infinite `for`.
    For {
        /// Init statement.
        init: Option<Box<Stmt>>,
        /// Loop condition.
        cond: Option<Expr>,
        /// Post statement.
        post: Option<Box<Stmt>>,
        /// Loop body.
        body: Block,
    },
    /// `for key, value := range expr`
    Range {
        /// Key (or index) variable.
        key: Option<Expr>,
        /// Value variable.
        value: Option<Expr>,
        /// True for `:=`, false for `=`.
        define: bool,
        /// The ranged expression.
        expr: Expr,
        /// Loop body.
        body: Block,
    },
    /// Expression switch.
    Switch {
        /// Init statement.
        init: Option<Box<Stmt>>,
        /// Switch tag.
        tag: Option<Expr>,
        /// Case clauses.
        clauses: Vec<CaseClause>,
        /// Layout of the braces.
        enclosure: Enclosure,
    },
    /// Type switch.
    TypeSwitch {
        /// Init statement.
        init: Option<Box<Stmt>>,
        /// `x := y.(type)` or `y.(type)`.
        guard: Box<Stmt>,
        /// Case clauses.
        clauses: Vec<CaseClause>,
        /// Layout of the braces.
        enclosure: Enclosure,
    },
    /// `select` statement.
    Select {
        /// Communication clauses.
        clauses: Vec<CommClause>,
        /// Layout of the braces.
        enclosure: Enclosure,
    },
    /// `go call`
    Go(Expr),
    /// `defer call`
    Defer(Expr),
    /// `label: stmt`
    Labeled {
        /// Label name.
        label: String,
        /// Labeled statement.
        stmt: Box<Stmt>,
    },
    /// Empty statement.
    Empty,
}

/// An `if` statement.
#[derive(Clone, Debug, PartialEq)]
pub struct IfStmt {
    /// Init statement.
    pub init: Option<Box<Stmt>>,
    /// Condition.
    pub cond: Expr,
    /// Then branch.
    pub then: Block,
    /// Else branch.
    pub els: Option<Box<Else>>,
}

/// The `else` branch of an `if`.
#[derive(Clone, Debug, PartialEq)]
pub enum Else {
    /// `else if ...`
    If(IfStmt),
    /// `else { ... }`
    Block(Block),
}

/// A `case` or `default` clause.
#[derive(Clone, Debug, PartialEq)]
pub struct CaseClause {
    /// Case expressions; `None` for `default`.
    pub list: Option<Vec<Expr>>,
    /// Clause body.
    pub body: Vec<Stmt>,
    /// Layout metadata.
    pub decs: Decorations,
}

/// A `select` clause.
#[derive(Clone, Debug, PartialEq)]
pub struct CommClause {
    /// Send or receive statement; `None` for `default`.
    pub comm: Option<Box<Stmt>>,
    /// Clause body.
    pub body: Vec<Stmt>,
    /// Layout metadata.
    pub decs: Decorations,
}

/// An element of a call argument list or composite literal.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    /// The element expression.
    pub expr: Expr,
    /// Layout metadata.
    pub decs: Decorations,
}

impl Element {
    /// Creates an undecorated element.
    #[must_use]
    pub fn new(expr: Expr) -> Self {
        Self {
            expr,
            decs: Decorations::default(),
        }
    }
}

/// Kinds of basic literals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LitKind {
    /// Integer literal.
    Int,
    /// Floating-point literal.
    Float,
    /// Imaginary literal.
    Imag,
    /// Rune literal.
    Char,
    /// String literal.
    String,
}

/// Unary operators (other than `*`, see [`Expr::Star`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// `+`
    Pos,
    /// `-`
    Neg,
    /// `!`
    Not,
    /// `^`
    Xor,
    /// `&`
    Addr,
    /// `<-`
    Recv,
    /// `~`
    Tilde,
}

impl UnaryOp {
    /// Returns the operator text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pos => "+",
            Self::Neg => "-",
            Self::Not => "!",
            Self::Xor => "^",
            Self::Addr => "&",
            Self::Recv => "<-",
            Self::Tilde => "~",
        }
    }
}

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Quo,
    /// `%`
    Rem,
    /// `&`
    And,
    /// `|`
    Or,
    /// `^`
    Xor,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `&^`
    AndNot,
    /// `&&`
    LogAnd,
    /// `||`
    LogOr,
    /// `==`
    Eql,
    /// `!=`
    Neq,
    /// `<`
    Lss,
    /// `<=`
    Leq,
    /// `>`
    Gtr,
    /// `>=`
    Geq,
}

impl BinaryOp {
    /// Returns the operator text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Quo => "/",
            Self::Rem => "%",
            Self::And => "&",
            Self::Or => "|",
            Self::Xor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::AndNot => "&^",
            Self::LogAnd => "&&",
            Self::LogOr => "||",
            Self::Eql => "==",
            Self::Neq => "!=",
            Self::Lss => "<",
            Self::Leq => "<=",
            Self::Gtr => ">",
            Self::Geq => ">=",
        }
    }

    /// Returns Go's binding strength for this operator (1 = weakest).
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::LogOr => 1,
            Self::LogAnd => 2,
            Self::Eql | Self::Neq | Self::Lss | Self::Leq | Self::Gtr | Self::Geq => 3,
            Self::Add | Self::Sub | Self::Or | Self::Xor => 4,
            Self::Mul | Self::Quo | Self::Rem | Self::Shl | Self::Shr | Self::And | Self::AndNot => {
                5
            }
        }
    }
}

/// Channel directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChanDir {
    /// `chan T`
    Both,
    /// `chan<- T`
    Send,
    /// `<-chan T`
    Recv,
}

/// A composite literal `T{...}`.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeLit {
    /// Literal type; `None` when elided inside another literal.
    pub ty: Option<Box<Expr>>,
    /// Elements.
    pub elts: Vec<Element>,
    /// Layout of the braces.
    pub enclosure: Enclosure,
}

/// A call expression.
#[derive(Clone, Debug, PartialEq)]
pub struct CallExpr {
    /// Called function.
    pub fun: Box<Expr>,
    /// Arguments.
    pub args: Vec<Element>,
    /// The last argument is followed by `...`.
    pub ellipsis: bool,
    /// Layout of the parentheses.
    pub enclosure: Enclosure,
}

/// Expression (and type) variants.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Identifier like `diffResult`.
    Ident(String),
    /// Literal, kept as written.
    BasicLit(LitKind, String),
    /// Composite literal.
    Composite(CompositeLit),
    /// Function literal.
    FuncLit {
        /// Signature.
        ty: FuncType,
        /// Body.
        body: Block,
    },
    /// `(x)`
    Paren(Box<Expr>),
    /// `x.sel`
    Selector(Box<Expr>, String),
    /// `x[index]`
    Index(Box<Expr>, Box<Expr>),
    /// `x[low:high:max]`
    Slice {
        /// Sliced operand.
        x: Box<Expr>,
        /// Low bound.
        low: Option<Box<Expr>>,
        /// High bound.
        high: Option<Box<Expr>>,
        /// Capacity bound of a 3-index slice.
        max: Option<Box<Expr>>,
    },
    /// `x.(T)`, or `x.(type)` when the type is `None`.
    TypeAssert(Box<Expr>, Option<Box<Expr>>),
    /// Call expression.
    Call(CallExpr),
    /// `*x` (dereference or pointer type).
    Star(Box<Expr>),
    /// Unary expression.
    Unary(UnaryOp, Box<Expr>),
    /// Binary expression.
    Binary {
        /// Left operand.
        x: Box<Expr>,
        /// Operator.
        op: BinaryOp,
        /// Right operand.
        y: Box<Expr>,
        /// The source broke the line after the operator.
        line_break: bool,
    },
    /// `key: value` inside a composite literal.
    KeyValue(Box<Expr>, Box<Expr>),
    /// `[len]T`, `[]T` (len `None`), or `[...]T`.
    ArrayType {
        /// Length expression.
        len: Option<Box<Expr>>,
        /// Element type.
        elem: Box<Expr>,
    },
    /// `map[K]V`
    MapType(Box<Expr>, Box<Expr>),
    /// Channel type.
    ChanType(ChanDir, Box<Expr>),
    /// `func(...)` type.
    FuncType(FuncType),
    /// `struct{...}`
    StructType(FieldList),
    /// `interface{...}`
    InterfaceType(FieldList),
    /// `...T` in a parameter list, or `...` as an array length.
    Ellipsis(Option<Box<Expr>>),
}

impl Expr {
    /// Creates an identifier.
    #[must_use]
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident(name.into())
    }

    /// Creates `x.sel`.
    #[must_use]
    pub fn selector(x: Self, sel: impl Into<String>) -> Self {
        Self::Selector(Box::new(x), sel.into())
    }

    /// Creates a single-line call.
    #[must_use]
    pub fn call(fun: Self, args: Vec<Self>) -> Self {
        Self::Call(CallExpr {
            fun: Box::new(fun),
            args: args.into_iter().map(Element::new).collect(),
            ellipsis: false,
            enclosure: Enclosure::default(),
        })
    }

    /// Creates `*x`.
    #[must_use]
    pub fn star(x: Self) -> Self {
        Self::Star(Box::new(x))
    }

    /// Creates `map[key]value`.
    #[must_use]
    pub fn map_type(key: Self, value: Self) -> Self {
        Self::MapType(Box::new(key), Box::new(value))
    }

    /// Creates an interpreted string literal from unquoted text.
    #[must_use]
    pub fn string(text: &str) -> Self {
        Self::BasicLit(LitKind::String, format!("{text:?}"))
    }

    /// Returns the identifier name, if this is one.
    #[must_use]
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Self::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Returns true if this is the identifier `name`.
    #[must_use]
    pub fn is_ident(&self, name: &str) -> bool {
        self.as_ident() == Some(name)
    }

    /// Returns `(x, sel)` if this is a selector expression.
    #[must_use]
    pub fn as_selector(&self) -> Option<(&Self, &str)> {
        match self {
            Self::Selector(x, sel) => Some((x, sel)),
            _ => None,
        }
    }

    /// Returns true if this is the selector `x.sel` on identifier `x`.
    #[must_use]
    pub fn is_selector_of(&self, x: &str, sel: &str) -> bool {
        self.as_selector()
            .is_some_and(|(base, name)| name == sel && base.is_ident(x))
    }

    /// Removes any parentheses around the expression.
    #[must_use]
    pub fn unparen(&self) -> &Self {
        let mut expr = self;
        while let Self::Paren(inner) = expr {
            expr = inner;
        }
        expr
    }
}
