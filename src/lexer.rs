use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error as ThisError;
use tracing::trace;

use crate::{
    ast::{Keyword, Position, Span, SpannedToken, Token},
    dialect::{CQL, Dialect},
    error::CqlError,
    temporal,
};

static DATE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[0-9]{4}-[0-9]{2}-[0-9]{2}(?:[Tt][0-9]{2}:[0-9]{2}:[0-9]{2}(?:\.[0-9]+)?(?:[Zz]|[+-][0-9]{2}(?::?[0-9]{2})?)?)?",
    )
    .expect("date-time token pattern is valid")
});

const DOES_NOT_EXIST_TAIL: &str = "-NOT-EXIST";

/// Input the lexer could not classify.
#[derive(Debug, Clone, PartialEq, ThisError)]
#[error("{message} at {position}")]
pub struct LexError {
    pub message: String,
    pub position: Position,
}

impl From<LexError> for CqlError {
    fn from(e: LexError) -> Self {
        CqlError::Lex {
            message: e.message,
            position: e.position,
        }
    }
}

/// Turns filter text into [`SpannedToken`]s on demand.
///
/// Keywords are matched case-insensitively against the dialect's keyword
/// set; words outside it come back as identifiers.
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    line: usize,
    column: usize,
    dialect: &'static Dialect,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_dialect(input, &CQL)
    }

    pub fn with_dialect(input: &'a str, dialect: &'static Dialect) -> Self {
        Lexer {
            input,
            position: 0,
            line: 1,
            column: 1,
            dialect,
        }
    }

    pub fn source(&self) -> &'a str {
        self.input
    }

    pub fn dialect(&self) -> &'static Dialect {
        self.dialect
    }

    /// Lexes the whole input from the start.
    pub fn tokenize(mut self) -> Result<Vec<SpannedToken>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let next = self.next_token()?;
            let done = next.token == Token::Eof;
            tokens.push(next);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn current_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.rest().chars().nth(offset)
    }

    fn here(&self) -> Position {
        Position {
            offset: self.position,
            line: self.line,
            column: self.column,
        }
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += ch.len_utf8();
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn advance_bytes(&mut self, count: usize) {
        let target = self.position + count;
        while self.position < target && self.current_char().is_some() {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn error(&self, message: impl Into<String>, position: Position) -> LexError {
        LexError {
            message: message.into(),
            position,
        }
    }

    fn read_identifier(&mut self) -> String {
        let start = self.position;
        while let Some(ch) = self.current_char() {
            let continues_after_colon = ch == ':'
                && self
                    .peek_char(1)
                    .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == ':');
            if ch.is_alphanumeric() || ch == '_' || continues_after_colon {
                self.advance();
            } else {
                break;
            }
        }
        self.input[start..self.position].to_string()
    }

    fn read_quoted_identifier(&mut self) -> Result<String, LexError> {
        let start = self.here();
        self.advance(); // opening quote

        let content_start = self.position;
        while let Some(ch) = self.current_char() {
            if ch == '"' {
                let content = self.input[content_start..self.position].to_string();
                self.advance();
                if content.is_empty() {
                    return Err(self.error("empty quoted identifier", start));
                }
                return Ok(content);
            }
            self.advance();
        }

        Err(self.error("unterminated quoted identifier", start))
    }

    fn read_string(&mut self) -> Result<String, LexError> {
        let start = self.here();
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            if ch == '\'' {
                if self.peek_char(1) == Some('\'') {
                    result.push('\'');
                    self.advance();
                    self.advance();
                    continue;
                }
                self.advance();
                return Ok(result);
            }
            result.push(ch);
            self.advance();
        }

        Err(self.error("unterminated string literal", start))
    }

    fn read_number(&mut self) -> Token {
        if let Some(found) = DATE_TIME.find(self.rest()) {
            let text = found.as_str().to_string();
            self.advance_bytes(found.end());
            return if text.contains(['T', 't']) {
                Token::DateTime(text)
            } else {
                Token::Date(text)
            };
        }

        let start = self.position;
        let mut is_decimal = false;

        while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.current_char() == Some('.') && self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) {
            is_decimal = true;
            self.advance();
            while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if matches!(self.current_char(), Some('e' | 'E')) {
            let exponent_digits = match self.peek_char(1) {
                Some('+' | '-') => self.peek_char(2).is_some_and(|c| c.is_ascii_digit()),
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if exponent_digits {
                is_decimal = true;
                self.advance();
                if matches!(self.current_char(), Some('+' | '-')) {
                    self.advance();
                }
                while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }

        let text = self.input[start..self.position].to_string();
        if is_decimal {
            Token::Decimal(text)
        } else {
            Token::Digits(text)
        }
    }

    fn word_token(&mut self, start: usize) -> Token {
        let word = self.read_identifier();

        if word.eq_ignore_ascii_case("DOES")
            && self
                .rest()
                .get(..DOES_NOT_EXIST_TAIL.len())
                .is_some_and(|tail| tail.eq_ignore_ascii_case(DOES_NOT_EXIST_TAIL))
            && self.dialect.recognizes(Keyword::DoesNotExist)
        {
            self.advance_bytes(DOES_NOT_EXIST_TAIL.len());
            return Token::Keyword(Keyword::DoesNotExist);
        }

        if let Some(keyword) = Keyword::from_word(&word) {
            if self.dialect.recognizes(keyword) {
                return Token::Keyword(keyword);
            }
        }

        // Durations only make sense as one side of a `begin/end` period.
        let next_to_slash = self.input[..start].trim_end().ends_with('/')
            || self.rest().trim_start().starts_with('/');
        if next_to_slash && temporal::is_duration(&word) {
            return Token::Duration(word);
        }

        Token::Identifier(word)
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    pub fn next_token(&mut self) -> Result<SpannedToken, LexError> {
        self.skip_whitespace();
        let start = self.here();

        let token = match self.current_char() {
            None => Token::Eof,
            Some('=') => self.single(Token::Eq),
            Some('<') => match self.peek_char(1) {
                Some('=') => {
                    self.advance();
                    self.single(Token::LtEq)
                }
                Some('>') => {
                    self.advance();
                    self.single(Token::NotEq)
                }
                _ => self.single(Token::Lt),
            },
            Some('>') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.single(Token::GtEq)
                } else {
                    self.single(Token::Gt)
                }
            }
            Some('+') => self.single(Token::Plus),
            Some('-') => self.single(Token::Minus),
            Some('*') => self.single(Token::Star),
            Some('/') => self.single(Token::Slash),
            Some('\\') => self.single(Token::Backslash),
            Some('^') => self.single(Token::Caret),
            Some('%') => self.single(Token::Percent),
            Some('(') => self.single(Token::LParen),
            Some(')') => self.single(Token::RParen),
            Some('[') => self.single(Token::LBracket),
            Some(']') => self.single(Token::RBracket),
            Some(',') => self.single(Token::Comma),
            Some('.') => self.single(Token::Dot),
            Some(':') => self.single(Token::Colon),
            Some(';') => self.single(Token::Semicolon),
            Some('\'') => Token::String(self.read_string()?),
            Some('"') => Token::QuotedIdentifier(self.read_quoted_identifier()?),
            Some(ch) if ch.is_ascii_digit() => self.read_number(),
            Some(ch) if ch.is_alphabetic() || ch == '_' => self.word_token(start.offset),
            Some(ch) => {
                return Err(self.error(format!("unexpected character '{}'", ch), start));
            }
        };

        let span = Span::new(start, self.here());
        trace!(?token, offset = start.offset, "lexed token");
        Ok(SpannedToken { token, span })
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("and Or NOT between like");
    assert_eq!(lexer.next_token().unwrap().token, Token::Keyword(Keyword::And));
    assert_eq!(lexer.next_token().unwrap().token, Token::Keyword(Keyword::Or));
    assert_eq!(lexer.next_token().unwrap().token, Token::Keyword(Keyword::Not));
    assert_eq!(lexer.next_token().unwrap().token, Token::Keyword(Keyword::Between));
    assert_eq!(lexer.next_token().unwrap().token, Token::Keyword(Keyword::Like));
}

#[test]
fn test_comparison() {
    let mut lexer = Lexer::new("ATTR1 <> 'x'");
    assert_eq!(lexer.next_token().unwrap().token, Token::Identifier("ATTR1".to_string()));
    assert_eq!(lexer.next_token().unwrap().token, Token::NotEq);
    assert_eq!(lexer.next_token().unwrap().token, Token::String("x".to_string()));
    assert_eq!(lexer.next_token().unwrap().token, Token::Eof);
}
