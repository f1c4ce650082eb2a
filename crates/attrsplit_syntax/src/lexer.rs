//! Lexer for Go source.
//!
//! The lexer converts source text into a stream of tokens. Comments are
//! emitted as tokens so the parser can attach them as decorations, and
//! semicolons are inserted at line ends following Go's automatic
//! semicolon rule.

use crate::ast::BinaryOp;
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Lexer for Go source code.
///
/// The lexer iterates through source text and produces tokens.
pub struct Lexer<'src> {
    /// Source text being tokenized.
    source: &'src str,
    /// Remaining source text.
    rest: &'src str,
    /// Current byte offset in source.
    position: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    column: u32,
    /// Whether a newline at this point ends a statement.
    insert_semi: bool,
    /// A multi-line block comment swallowed a statement-ending newline.
    deferred_semi: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source, skipping a leading byte order mark.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        let rest = source.strip_prefix('\u{feff}').unwrap_or(source);
        Self {
            source,
            rest,
            position: source.len() - rest.len(),
            line: 1,
            column: 1,
            insert_semi: false,
            deferred_semi: false,
        }
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Token {
        if self.deferred_semi {
            self.deferred_semi = false;
            self.insert_semi = false;
            return self.auto_semicolon();
        }

        loop {
            self.skip_blanks();
            if self.peek_char() != Some('\n') {
                break;
            }
            if self.insert_semi {
                self.insert_semi = false;
                let token = self.auto_semicolon();
                self.advance();
                return token;
            }
            self.advance();
        }

        let start = self.position;
        let start_line = self.line;
        let start_column = self.column;

        let Some(c) = self.peek_char() else {
            if self.insert_semi {
                self.insert_semi = false;
                return self.auto_semicolon();
            }
            return Token::new(
                TokenKind::Eof,
                Span::new(start, start, start_line, start_column),
            );
        };

        let kind = match c {
            '/' if self.peek_char_n(1) == Some('/') => self.scan_line_comment(),
            '/' if self.peek_char_n(1) == Some('*') => self.scan_block_comment(),
            '"' => self.scan_string(),
            '`' => self.scan_raw_string(),
            '\'' => self.scan_rune(),
            '.' if self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit()) => self.scan_number(),
            c if c.is_ascii_digit() => self.scan_number(),
            c if is_ident_start(c) => self.scan_word(),
            _ => self.scan_operator(c),
        };

        if !kind.is_trivia() {
            self.insert_semi = kind.triggers_semicolon();
        }

        Token::new(
            kind,
            Span::new(start, self.position, start_line, start_column),
        )
    }

    /// Tokenizes all source and returns a vector of tokens.
    ///
    /// Comments and inserted semicolons are included in the output.
    #[must_use]
    pub fn tokenize_all(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Builds an inserted semicolon at the current position.
    fn auto_semicolon(&self) -> Token {
        Token::new(
            TokenKind::Semicolon { auto: true },
            Span::new(self.position, self.position, self.line, self.column),
        )
    }

    /// Peeks at the next character without consuming it.
    fn peek_char(&self) -> Option<char> {
        self.rest.chars().next()
    }

    /// Peeks at the character `n` positions ahead.
    fn peek_char_n(&self, n: usize) -> Option<char> {
        self.rest.chars().nth(n)
    }

    /// Advances past the next character.
    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            let len = c.len_utf8();
            self.rest = &self.rest[len..];
            self.position += len;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    /// Advances past `n` characters.
    fn advance_n(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    /// Skips whitespace other than newlines.
    fn skip_blanks(&mut self) {
        while let Some(c) = self.peek_char() {
            if c == ' ' || c == '\t' || c == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Scans a `//` comment up to (not including) the newline.
    fn scan_line_comment(&mut self) -> TokenKind {
        let start = self.position;
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
        TokenKind::Comment(self.source[start..self.position].trim_end().to_string())
    }

    /// Scans a `/* */` comment.
    fn scan_block_comment(&mut self) -> TokenKind {
        let start = self.position;
        self.advance_n(2);
        let mut has_newline = false;
        loop {
            match self.peek_char() {
                Some('*') if self.peek_char_n(1) == Some('/') => {
                    self.advance_n(2);
                    break;
                }
                Some(c) => {
                    has_newline |= c == '\n';
                    self.advance();
                }
                None => return TokenKind::Error("comment not terminated".into()),
            }
        }
        if has_newline && self.insert_semi {
            self.deferred_semi = true;
        }
        TokenKind::Comment(self.source[start..self.position].to_string())
    }

    /// Scans an interpreted string literal, keeping its escapes as written.
    fn scan_string(&mut self) -> TokenKind {
        let start = self.position;
        self.advance(); // consume opening '"'
        loop {
            match self.peek_char() {
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek_char() {
                        Some('\n') | None => {
                            return TokenKind::Error("string literal not terminated".into());
                        }
                        Some(_) => self.advance(),
                    }
                }
                Some('\n') | None => {
                    return TokenKind::Error("string literal not terminated".into());
                }
                Some(_) => self.advance(),
            }
        }
        TokenKind::String(self.source[start..self.position].to_string())
    }

    /// Scans a raw string literal.
    fn scan_raw_string(&mut self) -> TokenKind {
        let start = self.position;
        self.advance(); // consume opening '`'
        loop {
            match self.peek_char() {
                Some('`') => {
                    self.advance();
                    break;
                }
                Some(_) => self.advance(),
                None => return TokenKind::Error("raw string literal not terminated".into()),
            }
        }
        TokenKind::String(self.source[start..self.position].to_string())
    }

    /// Scans a rune literal.
    fn scan_rune(&mut self) -> TokenKind {
        let start = self.position;
        self.advance(); // consume opening '\''
        loop {
            match self.peek_char() {
                Some('\'') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    if matches!(self.peek_char(), Some('\n') | None) {
                        return TokenKind::Error("rune literal not terminated".into());
                    }
                    self.advance();
                }
                Some('\n') | None => {
                    return TokenKind::Error("rune literal not terminated".into());
                }
                Some(_) => self.advance(),
            }
        }
        TokenKind::Char(self.source[start..self.position].to_string())
    }

    /// Scans a number (integer, float, or imaginary).
    ///
    /// Digit separators and base prefixes are accepted; the text is kept
    /// as written.
    fn scan_number(&mut self) -> TokenKind {
        let start = self.position;
        let mut is_float = false;

        let hex = self.peek_char() == Some('0') && matches!(self.peek_char_n(1), Some('x' | 'X'));
        if hex {
            self.advance_n(2);
        }

        while let Some(c) = self.peek_char() {
            let exponent = if hex {
                matches!(c, 'p' | 'P')
            } else {
                matches!(c, 'e' | 'E')
            };
            if exponent {
                is_float = true;
                self.advance();
                if matches!(self.peek_char(), Some('+' | '-')) {
                    self.advance();
                }
            } else if c == '.' {
                is_float = true;
                self.advance();
            } else if c.is_ascii_alphanumeric() || c == '_' {
                if c == 'i' {
                    self.advance();
                    return TokenKind::Imag(self.source[start..self.position].to_string());
                }
                self.advance();
            } else {
                break;
            }
        }

        let text = self.source[start..self.position].to_string();
        if is_float {
            TokenKind::Float(text)
        } else {
            TokenKind::Int(text)
        }
    }

    /// Scans an identifier or keyword.
    fn scan_word(&mut self) -> TokenKind {
        let start = self.position;
        while let Some(c) = self.peek_char() {
            if is_ident_continue(c) {
                self.advance();
            } else {
                break;
            }
        }
        let word = &self.source[start..self.position];
        TokenKind::keyword(word).unwrap_or_else(|| TokenKind::Ident(word.to_string()))
    }

    /// Scans an operator or delimiter.
    fn scan_operator(&mut self, c: char) -> TokenKind {
        let next = self.peek_char_n(1);
        let third = self.peek_char_n(2);

        // Longest match first.
        let (kind, len) = match (c, next, third) {
            ('.', Some('.'), Some('.')) => (TokenKind::Ellipsis, 3),
            ('<', Some('<'), Some('=')) => (TokenKind::OpAssign(BinaryOp::Shl), 3),
            ('>', Some('>'), Some('=')) => (TokenKind::OpAssign(BinaryOp::Shr), 3),
            ('&', Some('^'), Some('=')) => (TokenKind::OpAssign(BinaryOp::AndNot), 3),
            ('&', Some('&'), _) => (TokenKind::Op(BinaryOp::LogAnd), 2),
            ('|', Some('|'), _) => (TokenKind::Op(BinaryOp::LogOr), 2),
            ('<', Some('<'), _) => (TokenKind::Op(BinaryOp::Shl), 2),
            ('>', Some('>'), _) => (TokenKind::Op(BinaryOp::Shr), 2),
            ('&', Some('^'), _) => (TokenKind::Op(BinaryOp::AndNot), 2),
            ('<', Some('-'), _) => (TokenKind::Arrow, 2),
            ('+', Some('+'), _) => (TokenKind::Inc, 2),
            ('-', Some('-'), _) => (TokenKind::Dec, 2),
            ('=', Some('='), _) => (TokenKind::Op(BinaryOp::Eql), 2),
            ('!', Some('='), _) => (TokenKind::Op(BinaryOp::Neq), 2),
            ('<', Some('='), _) => (TokenKind::Op(BinaryOp::Leq), 2),
            ('>', Some('='), _) => (TokenKind::Op(BinaryOp::Geq), 2),
            (':', Some('='), _) => (TokenKind::Define, 2),
            ('<', _, _) => (TokenKind::Op(BinaryOp::Lss), 1),
            ('>', _, _) => (TokenKind::Op(BinaryOp::Gtr), 1),
            ('=', _, _) => (TokenKind::Assign, 1),
            ('!', _, _) => (TokenKind::Not, 1),
            ('~', _, _) => (TokenKind::Tilde, 1),
            ('(', _, _) => (TokenKind::LParen, 1),
            (')', _, _) => (TokenKind::RParen, 1),
            ('[', _, _) => (TokenKind::LBracket, 1),
            (']', _, _) => (TokenKind::RBracket, 1),
            ('{', _, _) => (TokenKind::LBrace, 1),
            ('}', _, _) => (TokenKind::RBrace, 1),
            (',', _, _) => (TokenKind::Comma, 1),
            ('.', _, _) => (TokenKind::Period, 1),
            (':', _, _) => (TokenKind::Colon, 1),
            (';', _, _) => (TokenKind::Semicolon { auto: false }, 1),
            (other, next, _) => match simple_binary(other) {
                Some(binary) if next == Some('=') => (TokenKind::OpAssign(binary), 2),
                Some(binary) => (TokenKind::Op(binary), 1),
                None => {
                    self.advance();
                    return TokenKind::Error(format!("unexpected character: {other}"));
                }
            },
        };
        self.advance_n(len);
        kind
    }
}

/// Maps single-character arithmetic and bitwise operators.
fn simple_binary(c: char) -> Option<BinaryOp> {
    match c {
        '+' => Some(BinaryOp::Add),
        '-' => Some(BinaryOp::Sub),
        '*' => Some(BinaryOp::Mul),
        '/' => Some(BinaryOp::Quo),
        '%' => Some(BinaryOp::Rem),
        '&' => Some(BinaryOp::And),
        '|' => Some(BinaryOp::Or),
        '^' => Some(BinaryOp::Xor),
        _ => None,
    }
}

/// Returns true if `c` can start an identifier.
fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

/// Returns true if `c` can continue an identifier.
fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize_all(source)
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Ident(name.into())
    }

    const SEMI: TokenKind = TokenKind::Semicolon { auto: true };

    #[test]
    fn lex_range_header() {
        assert_eq!(
            kinds("for _, resource := range diffResult.Added {"),
            vec![
                TokenKind::For,
                ident("_"),
                TokenKind::Comma,
                ident("resource"),
                TokenKind::Define,
                TokenKind::Range,
                ident("diffResult"),
                TokenKind::Period,
                ident("Added"),
                TokenKind::LBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_inserts_semicolons_at_newlines() {
        assert_eq!(
            kinds("x++\nreturn\n}"),
            vec![
                ident("x"),
                TokenKind::Inc,
                SEMI,
                TokenKind::Return,
                SEMI,
                TokenKind::RBrace,
                SEMI,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_no_semicolon_after_operator() {
        assert_eq!(
            kinds("a &&\nb"),
            vec![
                ident("a"),
                TokenKind::Op(BinaryOp::LogAnd),
                ident("b"),
                SEMI,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_comment_precedes_inserted_semicolon() {
        assert_eq!(
            kinds("x := 1 // one\n"),
            vec![
                ident("x"),
                TokenKind::Define,
                TokenKind::Int("1".into()),
                TokenKind::Comment("// one".into()),
                SEMI,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_multiline_block_comment_ends_statement() {
        assert_eq!(
            kinds("x /* a\nb */ y"),
            vec![
                ident("x"),
                TokenKind::Comment("/* a\nb */".into()),
                SEMI,
                ident("y"),
                SEMI,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_literals_keep_text() {
        assert_eq!(
            kinds(r#""a\"b" `raw` 'x' 0x1F 1.5e3 2i"#),
            vec![
                TokenKind::String(r#""a\"b""#.into()),
                TokenKind::String("`raw`".into()),
                TokenKind::Char("'x'".into()),
                TokenKind::Int("0x1F".into()),
                TokenKind::Float("1.5e3".into()),
                TokenKind::Imag("2i".into()),
                SEMI,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_compound_operators() {
        assert_eq!(
            kinds("a += 1; b &^= c; d <- e"),
            vec![
                ident("a"),
                TokenKind::OpAssign(BinaryOp::Add),
                TokenKind::Int("1".into()),
                TokenKind::Semicolon { auto: false },
                ident("b"),
                TokenKind::OpAssign(BinaryOp::AndNot),
                ident("c"),
                TokenKind::Semicolon { auto: false },
                ident("d"),
                TokenKind::Arrow,
                ident("e"),
                SEMI,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_ellipsis_and_period() {
        assert_eq!(
            kinds("f(args...) x.y"),
            vec![
                ident("f"),
                TokenKind::LParen,
                ident("args"),
                TokenKind::Ellipsis,
                TokenKind::RParen,
                ident("x"),
                TokenKind::Period,
                ident("y"),
                SEMI,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_unterminated_string() {
        let tokens = Lexer::tokenize_all("\"abc\nx");
        assert!(matches!(tokens[0].kind, TokenKind::Error(_)));
    }

    #[test]
    fn lex_tracks_lines() {
        let tokens = Lexer::tokenize_all("a\n\nb");
        assert_eq!(tokens[0].span.line, 1);
        assert_eq!(tokens[2].span.line, 3);
        assert_eq!(tokens[2].span.column, 1);
    }

    #[test]
    fn lex_skips_byte_order_mark() {
        let source = "\u{feff}package p\n";
        let tokens = Lexer::tokenize_all(source);
        assert_eq!(tokens[0].kind, TokenKind::Package);
        assert_eq!(tokens[0].span.column, 1);
        assert_eq!(tokens[0].span.text(source), "package");
        assert_eq!(tokens[1].kind, ident("p"));
    }
}
