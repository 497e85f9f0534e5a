//! Expression lexer
//!
//! A single left-to-right scan that turns source text into a flat token list.
//! Operators are matched longest-first (`**` before `*`, `&^` before `&`).
//! Quoted literals are only checked for termination here; escape processing
//! happens when the literal is evaluated.

use crate::error::{FormulaError, FormulaResult};

/// Token categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    Int,
    Float,
    Imaginary,
    Char,
    String,
    Ident,

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    StarStar,

    // Bitwise
    Amp,
    AmpCaret,
    Pipe,
    Caret,
    Shl,
    Shr,

    // Logical
    AndAnd,
    OrOr,
    Bang,

    // Comparison
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,

    // Delimiters
    LParen,
    RParen,
    Comma,
}

/// A lexed token with its source text and byte offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub offset: usize,
}

/// Split expression text into tokens
///
/// # Example
/// ```rust
/// use gridcalc_formula::lexer::{tokenize, TokenKind};
///
/// let tokens = tokenize("A0 ** 2").unwrap();
/// let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(kinds, vec![TokenKind::Ident, TokenKind::StarStar, TokenKind::Int]);
/// ```
pub fn tokenize(source: &str) -> FormulaResult<Vec<Token>> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> FormulaResult<Vec<Token>> {
        while let Some(c) = self.peek() {
            let start = self.pos;
            if c.is_whitespace() {
                self.bump();
            } else if c.is_ascii_digit() {
                self.scan_number(start);
            } else if c.is_alphabetic() || c == '_' {
                self.bump_while(|c| c.is_alphanumeric() || c == '_');
                self.push(TokenKind::Ident, start);
            } else if c == '\'' || c == '"' {
                self.scan_quoted(c, start)?;
            } else {
                let kind = self.scan_operator(c).ok_or_else(|| FormulaError::Lex {
                    offset: start,
                    message: format!("unexpected character {c:?}"),
                })?;
                self.push(kind, start);
            }
        }
        Ok(self.tokens)
    }

    // === Character access ===

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.source[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn bump_if(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token {
            kind,
            text: self.source[start..self.pos].to_string(),
            offset: start,
        });
    }

    // === Token scanning ===

    fn scan_number(&mut self, start: usize) {
        self.bump_while(|c| c.is_ascii_digit());

        let mut kind = TokenKind::Int;
        if self.peek() == Some('.') {
            self.bump();
            self.bump_while(|c| c.is_ascii_digit());
            kind = TokenKind::Float;
        }
        if self.bump_if('i') {
            kind = TokenKind::Imaginary;
        }

        self.push(kind, start);
    }

    fn scan_quoted(&mut self, quote: char, start: usize) -> FormulaResult<()> {
        self.bump();
        loop {
            match self.bump() {
                Some('\\') => {
                    self.bump();
                }
                Some(c) if c == quote => break,
                Some(_) => {}
                None => {
                    let what = if quote == '"' { "string" } else { "character" };
                    return Err(FormulaError::Lex {
                        offset: start,
                        message: format!("unterminated {what} literal"),
                    });
                }
            }
        }

        let kind = if quote == '"' {
            TokenKind::String
        } else {
            TokenKind::Char
        };
        self.push(kind, start);
        Ok(())
    }

    fn scan_operator(&mut self, c: char) -> Option<TokenKind> {
        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '^' => TokenKind::Caret,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            '*' => {
                if self.peek_second() == Some('*') {
                    self.bump();
                    TokenKind::StarStar
                } else {
                    TokenKind::Star
                }
            }
            '&' => match self.peek_second() {
                Some('&') => {
                    self.bump();
                    TokenKind::AndAnd
                }
                Some('^') => {
                    self.bump();
                    TokenKind::AmpCaret
                }
                _ => TokenKind::Amp,
            },
            '|' => {
                if self.peek_second() == Some('|') {
                    self.bump();
                    TokenKind::OrOr
                } else {
                    TokenKind::Pipe
                }
            }
            '<' => match self.peek_second() {
                Some('<') => {
                    self.bump();
                    TokenKind::Shl
                }
                Some('=') => {
                    self.bump();
                    TokenKind::Le
                }
                _ => TokenKind::Lt,
            },
            '>' => match self.peek_second() {
                Some('>') => {
                    self.bump();
                    TokenKind::Shr
                }
                Some('=') => {
                    self.bump();
                    TokenKind::Ge
                }
                _ => TokenKind::Gt,
            },
            '!' => {
                if self.peek_second() == Some('=') {
                    self.bump();
                    TokenKind::NotEq
                } else {
                    TokenKind::Bang
                }
            }
            '=' => {
                if self.peek_second() == Some('=') {
                    self.bump();
                    TokenKind::EqEq
                } else {
                    return None;
                }
            }
            _ => return None,
        };
        self.bump();
        Some(kind)
    }
}
