//! Tokenizer for documentation type expressions.
//!
//! Tokens are produced on demand: the text after a type (a parameter name,
//! free-form description) is never lexed unless the parser asks for it, so
//! stray quotes or symbols in descriptions do not cause errors.

use crate::error::DocParseError;

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// Names and keywords: `int`, `non-empty-string`, `\Foo\Bar`, `is`.
    Identifier(String),
    /// `$name` (without the `$`), including `$this`.
    Variable(String),
    Int(i64),
    Float(f64),
    String(String),
    LessThan,
    GreaterThan,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    Comma,
    Pipe,
    Ampersand,
    Question,
    Colon,
    DoubleColon,
    Equals,
    Ellipsis,
    Star,
    Eof,
}

impl TokenKind {
    pub fn describe(&self) -> String {
        match self {
            Self::Identifier(name) => format!("`{name}`"),
            Self::Variable(name) => format!("`${name}`"),
            Self::Int(value) => format!("`{value}`"),
            Self::Float(value) => format!("`{value}`"),
            Self::String(value) => format!("'{value}'"),
            Self::LessThan => "`<`".to_string(),
            Self::GreaterThan => "`>`".to_string(),
            Self::OpenParen => "`(`".to_string(),
            Self::CloseParen => "`)`".to_string(),
            Self::OpenBracket => "`[`".to_string(),
            Self::CloseBracket => "`]`".to_string(),
            Self::OpenBrace => "`{`".to_string(),
            Self::CloseBrace => "`}`".to_string(),
            Self::Comma => "`,`".to_string(),
            Self::Pipe => "`|`".to_string(),
            Self::Ampersand => "`&`".to_string(),
            Self::Question => "`?`".to_string(),
            Self::Colon => "`:`".to_string(),
            Self::DoubleColon => "`::`".to_string(),
            Self::Equals => "`=`".to_string(),
            Self::Ellipsis => "`...`".to_string(),
            Self::Star => "`*`".to_string(),
            Self::Eof => "end of type".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    /// Whether whitespace separates this token from the previous one.
    pub space_before: bool,
}

pub struct Lexer<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    /// Byte offset of the next unread character.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Rewind to `offset` (used to retry after a failed token).
    pub fn reset(&mut self, offset: usize) {
        self.pos = offset.min(self.text.len());
    }

    fn peek_byte(&self, ahead: usize) -> Option<u8> {
        self.text.as_bytes().get(self.pos + ahead).copied()
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while let Some(byte) = self.peek_byte(0) {
            if byte.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.pos > start
    }

    pub fn next_token(&mut self) -> Result<Token, DocParseError> {
        let space_before = self.skip_whitespace() || self.pos == 0;
        let start = self.pos;
        let Some(byte) = self.peek_byte(0) else {
            return Ok(self.token(TokenKind::Eof, start, space_before));
        };

        let kind = match byte {
            b'<' => self.single(TokenKind::LessThan),
            b'>' => self.single(TokenKind::GreaterThan),
            b'(' => self.single(TokenKind::OpenParen),
            b')' => self.single(TokenKind::CloseParen),
            b'[' => self.single(TokenKind::OpenBracket),
            b']' => self.single(TokenKind::CloseBracket),
            b'{' => self.single(TokenKind::OpenBrace),
            b'}' => self.single(TokenKind::CloseBrace),
            b',' => self.single(TokenKind::Comma),
            b'|' => self.single(TokenKind::Pipe),
            b'&' => self.single(TokenKind::Ampersand),
            b'?' => self.single(TokenKind::Question),
            b'=' => self.single(TokenKind::Equals),
            b'*' => self.single(TokenKind::Star),
            b':' => {
                if self.peek_byte(1) == Some(b':') {
                    self.pos += 2;
                    TokenKind::DoubleColon
                } else {
                    self.single(TokenKind::Colon)
                }
            }
            b'.' if self.text[self.pos..].starts_with("...") => {
                self.pos += 3;
                TokenKind::Ellipsis
            }
            b'$' => {
                self.pos += 1;
                let name = self.identifier_tail();
                TokenKind::Variable(name.to_string())
            }
            b'\'' | b'"' => self.string(byte)?,
            b'-' if self.peek_byte(1).is_some_and(|b| b.is_ascii_digit()) => self.number()?,
            b'.' if self.peek_byte(1).is_some_and(|b| b.is_ascii_digit()) => self.number()?,
            b'0'..=b'9' => self.number()?,
            _ if is_identifier_start(byte) => {
                let name = self.identifier();
                TokenKind::Identifier(name.to_string())
            }
            other => {
                return Err(DocParseError::Unexpected {
                    expected: "a type".to_string(),
                    found: format!("`{}`", other as char),
                    offset: start,
                });
            }
        };
        Ok(self.token(kind, start, space_before))
    }

    fn token(&self, kind: TokenKind, start: usize, space_before: bool) -> Token {
        Token {
            kind,
            start,
            end: self.pos,
            space_before,
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    fn identifier_tail(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(byte) = self.peek_byte(0) {
            if byte.is_ascii_alphanumeric() || byte == b'_' || byte >= 0x80 {
                self.pos += 1;
            } else {
                break;
            }
        }
        &self.text[start..self.pos]
    }

    /// Identifiers may contain namespace separators and inner dashes
    /// (`non-empty-string`, `\App\Model`).
    fn identifier(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(byte) = self.peek_byte(0) {
            let continues = byte.is_ascii_alphanumeric()
                || byte == b'_'
                || byte >= 0x80
                || (byte == b'\\' && self.peek_byte(1).is_some_and(is_identifier_start))
                || (byte == b'-' && self.peek_byte(1).is_some_and(|b| b.is_ascii_alphabetic()));
            if continues {
                self.pos += 1;
            } else {
                break;
            }
        }
        &self.text[start..self.pos]
    }

    fn string(&mut self, quote: u8) -> Result<TokenKind, DocParseError> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        loop {
            let Some(byte) = self.peek_byte(0) else {
                return Err(DocParseError::UnterminatedString { offset: start });
            };
            if byte == quote {
                self.pos += 1;
                return Ok(TokenKind::String(value));
            }
            if byte == b'\\' {
                if let Some(next) = self.peek_byte(1) {
                    if next == quote || next == b'\\' {
                        value.push(next as char);
                        self.pos += 2;
                        continue;
                    }
                }
            }
            let ch = self.text[self.pos..].chars().next().unwrap_or_default();
            value.push(ch);
            self.pos += ch.len_utf8().max(1);
        }
    }

    fn number(&mut self) -> Result<TokenKind, DocParseError> {
        let start = self.pos;
        if self.peek_byte(0) == Some(b'-') {
            self.pos += 1;
        }
        let mut is_float = false;
        while let Some(byte) = self.peek_byte(0) {
            match byte {
                b'0'..=b'9' | b'_' | b'a'..=b'f' | b'A'..=b'F' | b'x' | b'X' | b'o' | b'O' => {
                    // `e` inside a decimal literal starts an exponent.
                    if (byte == b'e' || byte == b'E') && !self.is_radix_literal(start) {
                        is_float = true;
                        self.pos += 1;
                        if matches!(self.peek_byte(0), Some(b'+' | b'-')) {
                            self.pos += 1;
                        }
                        continue;
                    }
                    self.pos += 1;
                }
                b'.' if !self.text[self.pos..].starts_with("...") => {
                    is_float = true;
                    self.pos += 1;
                }
                _ => break,
            }
        }
        let text = &self.text[start..self.pos];
        parse_number(text, is_float).ok_or_else(|| DocParseError::InvalidNumber {
            text: text.to_string(),
        })
    }

    fn is_radix_literal(&self, start: usize) -> bool {
        let digits = self.text[start..].trim_start_matches('-');
        let bytes = digits.as_bytes();
        bytes.len() > 1
            && bytes[0] == b'0'
            && matches!(bytes[1], b'x' | b'X' | b'b' | b'B' | b'o' | b'O')
    }
}

fn is_identifier_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte == b'\\' || byte >= 0x80
}

/// Parse an integer (decimal, `0x`, `0o`, leading-zero octal, `0b`) or float
/// literal. Underscore separators are allowed.
pub fn parse_number(text: &str, is_float: bool) -> Option<TokenKind> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    if is_float {
        return cleaned.parse::<f64>().ok().map(TokenKind::Float);
    }
    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };
    let lower = digits.to_ascii_lowercase();
    let magnitude = if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()?
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()?
    } else if let Some(oct) = lower.strip_prefix("0o") {
        i64::from_str_radix(oct, 8).ok()?
    } else if lower.len() > 1 && lower.starts_with('0') {
        i64::from_str_radix(&lower[1..], 8).ok()?
    } else {
        lower.parse::<i64>().ok()?
    };
    Some(TokenKind::Int(if negative { -magnitude } else { magnitude }))
}

#[cfg(test)]
#[path = "../tests/lexer_tests.rs"]
mod tests;
