//! Token types for Go source.
//!
//! Tokens are the output of the lexer and input to the parser.

use crate::ast::BinaryOp;
use crate::span::Span;

/// A token from lexical analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// The type and value of this token.
    pub kind: TokenKind,
    /// Source location of this token.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns the text this token covers in the given source.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.text(source)
    }
}

/// Token types for Go source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    /// Identifier like `diffResult`
    Ident(String),
    /// Integer literal, kept as written
    Int(String),
    /// Floating-point literal, kept as written
    Float(String),
    /// Imaginary literal like `2i`
    Imag(String),
    /// Rune literal including quotes
    Char(String),
    /// Interpreted or raw string literal including quotes
    String(String),

    // Keywords
    /// `break`
    Break,
    /// `case`
    Case,
    /// `chan`
    Chan,
    /// `const`
    Const,
    /// `continue`
    Continue,
    /// `default`
    Default,
    /// `defer`
    Defer,
    /// `else`
    Else,
    /// `fallthrough`
    Fallthrough,
    /// `for`
    For,
    /// `func`
    Func,
    /// `go`
    Go,
    /// `goto`
    Goto,
    /// `if`
    If,
    /// `import`
    Import,
    /// `interface`
    Interface,
    /// `map`
    Map,
    /// `package`
    Package,
    /// `range`
    Range,
    /// `return`
    Return,
    /// `select`
    Select,
    /// `struct`
    Struct,
    /// `switch`
    Switch,
    /// `type`
    Type,
    /// `var`
    Var,

    // Operators
    /// Binary operator like `+` or `&&`
    Op(BinaryOp),
    /// Compound assignment like `+=`
    OpAssign(BinaryOp),
    /// `!`
    Not,
    /// `<-`
    Arrow,
    /// `~`
    Tilde,
    /// `++`
    Inc,
    /// `--`
    Dec,
    /// `=`
    Assign,
    /// `:=`
    Define,
    /// `...`
    Ellipsis,

    // Delimiters
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `,`
    Comma,
    /// `.`
    Period,
    /// `:`
    Colon,
    /// `;`, either written or inserted at a newline
    Semicolon {
        /// True when inserted by the automatic semicolon rule.
        auto: bool,
    },

    // Meta
    /// Comment text (including `//` or `/* */`)
    Comment(String),
    /// End of input
    Eof,
    /// Lexer error
    Error(String),
}

impl TokenKind {
    /// Returns true if this token kind should be ignored during parsing.
    #[must_use]
    pub const fn is_trivia(&self) -> bool {
        matches!(self, Self::Comment(_))
    }

    /// Returns the keyword for an identifier-shaped word, if it is one.
    #[must_use]
    pub fn keyword(word: &str) -> Option<Self> {
        let kind = match word {
            "break" => Self::Break,
            "case" => Self::Case,
            "chan" => Self::Chan,
            "const" => Self::Const,
            "continue" => Self::Continue,
            "default" => Self::Default,
            "defer" => Self::Defer,
            "else" => Self::Else,
            "fallthrough" => Self::Fallthrough,
            "for" => Self::For,
            "func" => Self::Func,
            "go" => Self::Go,
            "goto" => Self::Goto,
            "if" => Self::If,
            "import" => Self::Import,
            "interface" => Self::Interface,
            "map" => Self::Map,
            "package" => Self::Package,
            "range" => Self::Range,
            "return" => Self::Return,
            "select" => Self::Select,
            "struct" => Self::Struct,
            "switch" => Self::Switch,
            "type" => Self::Type,
            "var" => Self::Var,
            _ => return None,
        };
        Some(kind)
    }

    /// Returns true if a newline after this token ends the statement.
    #[must_use]
    pub const fn triggers_semicolon(&self) -> bool {
        matches!(
            self,
            Self::Ident(_)
                | Self::Int(_)
                | Self::Float(_)
                | Self::Imag(_)
                | Self::Char(_)
                | Self::String(_)
                | Self::Break
                | Self::Continue
                | Self::Fallthrough
                | Self::Return
                | Self::Inc
                | Self::Dec
                | Self::RParen
                | Self::RBracket
                | Self::RBrace
        )
    }

    /// Returns a human-readable name for this token kind.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Ident(name) => format!("identifier `{name}`"),
            Self::Int(_) => "integer".into(),
            Self::Float(_) => "float".into(),
            Self::Imag(_) => "imaginary".into(),
            Self::Char(_) => "rune".into(),
            Self::String(_) => "string".into(),
            Self::Op(op) => format!("'{}'", op.as_str()),
            Self::OpAssign(op) => format!("'{}='", op.as_str()),
            Self::Comment(_) => "comment".into(),
            Self::Eof => "end of input".into(),
            Self::Error(_) => "error".into(),
            Self::Semicolon { auto: true } => "newline".into(),
            other => format!("'{}'", other.fixed_text()),
        }
    }

    /// Returns the source text of a token that has no payload.
    fn fixed_text(&self) -> &'static str {
        match self {
            Self::Break => "break",
            Self::Case => "case",
            Self::Chan => "chan",
            Self::Const => "const",
            Self::Continue => "continue",
            Self::Default => "default",
            Self::Defer => "defer",
            Self::Else => "else",
            Self::Fallthrough => "fallthrough",
            Self::For => "for",
            Self::Func => "func",
            Self::Go => "go",
            Self::Goto => "goto",
            Self::If => "if",
            Self::Import => "import",
            Self::Interface => "interface",
            Self::Map => "map",
            Self::Package => "package",
            Self::Range => "range",
            Self::Return => "return",
            Self::Select => "select",
            Self::Struct => "struct",
            Self::Switch => "switch",
            Self::Type => "type",
            Self::Var => "var",
            Self::Not => "!",
            Self::Arrow => "<-",
            Self::Tilde => "~",
            Self::Inc => "++",
            Self::Dec => "--",
            Self::Assign => "=",
            Self::Define => ":=",
            Self::Ellipsis => "...",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::Comma => ",",
            Self::Period => ".",
            Self::Colon => ":",
            Self::Semicolon { .. } => ";",
            _ => "?",
        }
    }
}
