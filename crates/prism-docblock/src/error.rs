//! Documentation grammar errors.

use thiserror::Error;

/// A type expression could not be lexed, parsed or compiled.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DocParseError {
    #[error("unexpected {found} at offset {offset}, expected {expected}")]
    Unexpected {
        expected: String,
        found: String,
        offset: usize,
    },

    #[error("unterminated string literal at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("invalid number literal `{text}`")]
    InvalidNumber { text: String },

    #[error("type expression nested too deeply")]
    TooDeep,

    #[error("invalid type `{text}`: {reason}")]
    InvalidType { text: String, reason: String },
}

/// A tag whose type expression is invalid.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid @{tag} on line {line}: {error}")]
pub struct AnnotationError {
    /// Full tag name without the `@` (`phpstan-param`).
    pub tag: String,
    /// Zero-based line inside the comment.
    pub line: u32,
    #[source]
    pub error: DocParseError,
}
