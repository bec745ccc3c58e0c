//! Formula lexer
//!
//! Turns formula text into a flat token stream terminated by [`TokenKind::Eof`].
//! A single `=` at the very start of the input is the formula marker and is
//! skipped. Invalid characters become [`TokenKind::Unknown`]; reporting them is
//! left to the parser.

use std::fmt;

/// Token types
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Digits with at most one decimal point, kept as written
    Number(String),
    /// Double-quoted text without the quotes
    String(String),
    /// Function name or cell address
    Identifier(String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    Colon,
    Comma,

    // Delimiters
    LeftParen,
    RightParen,

    /// Character the lexer does not recognize
    Unknown(char),

    /// End of input
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "number '{}'", n),
            TokenKind::String(s) => write!(f, "string \"{}\"", s),
            TokenKind::Identifier(name) => write!(f, "identifier '{}'", name),
            TokenKind::Plus => f.write_str("'+'"),
            TokenKind::Minus => f.write_str("'-'"),
            TokenKind::Star => f.write_str("'*'"),
            TokenKind::Slash => f.write_str("'/'"),
            TokenKind::Equal => f.write_str("'='"),
            TokenKind::NotEqual => f.write_str("'<>'"),
            TokenKind::LessThan => f.write_str("'<'"),
            TokenKind::LessEqual => f.write_str("'<='"),
            TokenKind::GreaterThan => f.write_str("'>'"),
            TokenKind::GreaterEqual => f.write_str("'>='"),
            TokenKind::Colon => f.write_str("':'"),
            TokenKind::Comma => f.write_str("','"),
            TokenKind::LeftParen => f.write_str("'('"),
            TokenKind::RightParen => f.write_str("')'"),
            TokenKind::Unknown(c) => write!(f, "'{}'", c),
            TokenKind::Eof => f.write_str("end of input"),
        }
    }
}

/// A token and the byte offset where it starts
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

/// Tokenize formula text
///
/// # Example
/// ```rust
/// use gridcalc_formula::lexer::{tokenize, TokenKind};
///
/// let kinds: Vec<_> = tokenize("=A1<>2").into_iter().map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     vec![
///         TokenKind::Identifier("A1".into()),
///         TokenKind::NotEqual,
///         TokenKind::Number("2".into()),
///         TokenKind::Eof,
///     ]
/// );
/// ```
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();

    // The formula marker is only recognized at the very start
    if lexer.peek_char() == Some('=') {
        lexer.advance();
    }

    loop {
        let token = lexer.scan_token();
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            break;
        }
    }

    tokens
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn scan_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.pos;
        let Some(c) = self.peek_char() else {
            return Token {
                kind: TokenKind::Eof,
                position: start,
            };
        };

        let kind = if c.is_ascii_digit() || c == '.' {
            self.scan_number()
        } else if c.is_alphabetic() {
            self.scan_identifier()
        } else if c == '"' {
            self.scan_string()
        } else {
            self.scan_symbol(c)
        };

        Token {
            kind,
            position: start,
        }
    }

    fn scan_number(&mut self) -> TokenKind {
        let start = self.pos;
        let mut seen_dot = false;

        while let Some(c) = self.peek_char() {
            if c == '.' && !seen_dot {
                seen_dot = true;
            } else if !c.is_ascii_digit() {
                break;
            }
            self.advance();
        }

        TokenKind::Number(self.input[start..self.pos].to_string())
    }

    fn scan_identifier(&mut self) -> TokenKind {
        let start = self.pos;
        while self.peek_char().map_or(false, |c| c.is_alphanumeric()) {
            self.advance();
        }
        TokenKind::Identifier(self.input[start..self.pos].to_string())
    }

    fn scan_string(&mut self) -> TokenKind {
        self.advance(); // Skip opening quote

        let start = self.pos;
        while self.peek_char().map_or(false, |c| c != '"') {
            self.advance();
        }
        let text = self.input[start..self.pos].to_string();

        // An unterminated string runs to the end of input
        if self.peek_char() == Some('"') {
            self.advance();
        }

        TokenKind::String(text)
    }

    fn scan_symbol(&mut self, c: char) -> TokenKind {
        self.advance();
        match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '=' => TokenKind::Equal,
            '<' => match self.peek_char() {
                Some('=') => {
                    self.advance();
                    TokenKind::LessEqual
                }
                Some('>') => {
                    self.advance();
                    TokenKind::NotEqual
                }
                _ => TokenKind::LessThan,
            },
            '>' => {
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::GreaterThan
                }
            }
            other => TokenKind::Unknown(other),
        }
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }
}
