//! Market DSL tokenizer - converts source text into a token stream
//!
//! Handles: the `market` keyword, field labels (`outcomes:`, `oracle:`,
//! `fee:`, `trading_mechanism:`), bare words (`Yes`, `No`, `pool`),
//! string literals, hex addresses, integer literals and punctuation.
//! ASCII whitespace (space, tab, form feed, CR, LF) between tokens is
//! insignificant; any other character is lexical input.
//!
//! Guarantees:
//! - Deterministic: same input always produces same token stream
//! - Unrecognized text becomes `Token::Invalid`, so the grammar engine
//!   reports what it expected at that position
//! - The only lexer error is an unterminated string

use crate::{Error, Result};

/// Number of hex digits in an oracle address after the `0x` prefix
pub const ADDRESS_HEX_DIGITS: usize = 40;

/// Token types for the market DSL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // Keywords
    Market,

    // Field labels (the trailing colon is part of the label)
    OutcomesLabel,
    OracleLabel,
    FeeLabel,
    TradingMechanismLabel,

    // Literals
    StringLiteral(String),
    Address(String),
    Number(u64),

    // Symbols
    LBrace,    // {
    RBrace,    // }
    Comma,     // ,
    Semicolon, // ;
    Percent,   // %
    Colon,     // :

    // Other
    Word(String),
    /// Text no terminal can match: stray characters, malformed `0x` runs,
    /// numerals wider than 64 bits
    Invalid(String),
    Eof,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Token::Market => write!(f, "'market'"),
            Token::OutcomesLabel => write!(f, "'outcomes:'"),
            Token::OracleLabel => write!(f, "'oracle:'"),
            Token::FeeLabel => write!(f, "'fee:'"),
            Token::TradingMechanismLabel => write!(f, "'trading_mechanism:'"),
            Token::StringLiteral(s) => write!(f, "string \"{}\"", s),
            Token::Address(a) => write!(f, "address {}", a),
            Token::Number(n) => write!(f, "number {}", n),
            Token::LBrace => write!(f, "'{{'"),
            Token::RBrace => write!(f, "'}}'"),
            Token::Comma => write!(f, "','"),
            Token::Semicolon => write!(f, "';'"),
            Token::Percent => write!(f, "'%'"),
            Token::Colon => write!(f, "':'"),
            Token::Word(w) => write!(f, "'{}'", w),
            Token::Invalid(text) => write!(f, "'{}'", text.escape_default()),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

/// Position in source text for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Token with source position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Tokenizer for market DSL source text
pub struct Tokenizer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Tokenizer {
    /// Create a new tokenizer for the given input text
    pub fn new(text: &str) -> Self {
        Tokenizer {
            input: text.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input into a stream of spanned tokens
    pub fn tokenize(&mut self) -> Result<Vec<SpannedToken>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            if self.is_at_end() {
                tokens.push(SpannedToken {
                    token: Token::Eof,
                    span: self.current_span(),
                });
                break;
            }

            let token = self.next_token()?;
            tokens.push(token);
        }

        Ok(tokens)
    }

    // ── Character helpers ──────────────────────────────────

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.input.get(self.position).copied();
        if let Some(c) = ch {
            self.position += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        ch
    }

    fn current_span(&self) -> Span {
        Span {
            line: self.line,
            column: self.column,
            offset: self.position,
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.position;
        while let Some(ch) = self.peek() {
            if pred(ch) {
                self.advance();
            } else {
                break;
            }
        }
        self.input[start..self.position].iter().collect()
    }

    // ── Main dispatch ──────────────────────────────────────

    fn next_token(&mut self) -> Result<SpannedToken> {
        let span = self.current_span();
        let Some(ch) = self.peek() else {
            return Ok(SpannedToken { token: Token::Eof, span });
        };

        let single = match ch {
            '{' => Some(Token::LBrace),
            '}' => Some(Token::RBrace),
            ',' => Some(Token::Comma),
            ';' => Some(Token::Semicolon),
            '%' => Some(Token::Percent),
            ':' => Some(Token::Colon),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return Ok(SpannedToken { token, span });
        }

        match ch {
            '"' => self.read_string(span),
            '0' if self.peek_ahead(1) == Some('x') => self.read_address(span),
            c if c.is_ascii_digit() => self.read_number(span),
            c if c.is_ascii_alphabetic() || c == '_' => self.read_word(span),
            _ => {
                self.advance();
                Ok(SpannedToken {
                    token: Token::Invalid(ch.to_string()),
                    span,
                })
            }
        }
    }

    // ── String literals ────────────────────────────────────

    /// Strings are `"[^"]*"`: no escape sequences, newlines allowed.
    fn read_string(&mut self, span: Span) -> Result<SpannedToken> {
        self.advance(); // consume opening "
        let value = self.take_while(|c| c != '"');

        if self.advance() != Some('"') {
            return Err(Error::syntax(
                &self.current_span(),
                &["'\"' closing the string"],
                Token::Eof.to_string(),
            ));
        }

        Ok(SpannedToken {
            token: Token::StringLiteral(value),
            span,
        })
    }

    // ── Addresses ──────────────────────────────────────────

    fn read_address(&mut self, span: Span) -> Result<SpannedToken> {
        self.advance(); // 0
        self.advance(); // x
        let digits = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');

        let text = format!("0x{}", digits);

        let token = if digits.len() == ADDRESS_HEX_DIGITS
            && digits.chars().all(|c| c.is_ascii_hexdigit())
        {
            Token::Address(text)
        } else {
            Token::Invalid(text)
        };
        Ok(SpannedToken { token, span })
    }

    // ── Numbers ────────────────────────────────────────────

    fn read_number(&mut self, span: Span) -> Result<SpannedToken> {
        let text = self.take_while(|c| c.is_ascii_digit());
        let token = match text.parse::<u64>() {
            Ok(value) => Token::Number(value),
            Err(_) => Token::Invalid(text),
        };
        Ok(SpannedToken { token, span })
    }

    // ── Keywords, labels & words ───────────────────────────

    fn read_word(&mut self, span: Span) -> Result<SpannedToken> {
        let text = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');

        // Labels only count when the colon follows immediately
        if self.peek() == Some(':') {
            let label = match text.as_str() {
                "outcomes" => Some(Token::OutcomesLabel),
                "oracle" => Some(Token::OracleLabel),
                "fee" => Some(Token::FeeLabel),
                "trading_mechanism" => Some(Token::TradingMechanismLabel),
                _ => None,
            };
            if let Some(token) = label {
                self.advance();
                return Ok(SpannedToken { token, span });
            }
        }

        let token = match text.as_str() {
            "market" => Token::Market,
            _ => Token::Word(text),
        };

        Ok(SpannedToken { token, span })
    }
}
