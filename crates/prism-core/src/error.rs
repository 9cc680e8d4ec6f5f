//! Error taxonomy for reflection.
//!
//! Collaborator failures (locator, parser) are wrapped together with the
//! identity being reflected and propagated unchanged; nothing in the
//! pipeline swallows an error.

use prism_docblock::AnnotationError;
use prism_types::DeclId;
use thiserror::Error;

use crate::locator::LocatorError;
use crate::parser::ParseError;
use crate::typed_map::KeyNotPresent;

pub type Result<T, E = ReflectionError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ReflectionError {
    /// No locator produced a source unit declaring the identity.
    #[error("declaration `{0}` not found")]
    DeclarationNotFound(DeclId),

    /// An identity was requested again while it was still being resolved.
    #[error("cyclic resolution: {}", format_chain(.chain))]
    CyclicResolution { chain: Vec<DeclId> },

    /// Nested reflections went deeper than the configured limit.
    #[error("reflection of `{id}` nested deeper than {limit} levels")]
    DepthExceeded { id: DeclId, limit: u32 },

    #[error("locator failed while searching for `{id}`")]
    LocatorFailed {
        id: DeclId,
        #[source]
        source: LocatorError,
    },

    #[error("failed to parse the source unit of `{id}`")]
    ParseFailed {
        id: DeclId,
        #[source]
        source: ParseError,
    },

    #[error("invalid annotation on `{id}`: {source}")]
    InvalidAnnotationSyntax {
        id: DeclId,
        #[source]
        source: AnnotationError,
    },

    #[error(transparent)]
    KeyNotPresent(#[from] KeyNotPresent),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

fn format_chain(chain: &[DeclId]) -> String {
    chain
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// A constant expression could not be compiled or folded.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// The expression is valid code but not a constant expression.
    #[error("`{0}` is not allowed in a constant expression")]
    NotConstant(&'static str),

    #[error("undefined constant `{0}`")]
    UndefinedConstant(String),

    #[error("undefined class constant `{class}::{name}`")]
    UndefinedClassConstant { class: String, name: String },

    #[error("undefined array key {0}")]
    UndefinedKey(String),

    #[error("unsupported operand types for `{op}`: {left} and {right}")]
    InvalidOperands {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("cannot use {0} here")]
    InvalidOperand(&'static str),

    #[error("division by zero")]
    DivisionByZero,

    /// `static` used where no class is bound.
    #[error("cannot use `static` outside of a class")]
    UnboundStatic,

    #[error("circular constant reference `{0}`")]
    CircularReference(String),

    #[error("constant expression nested too deeply")]
    TooDeep,

    /// Reflecting a referenced declaration failed.
    #[error("failed to reflect a referenced declaration: {0}")]
    Reflection(Box<ReflectionError>),
}

impl From<ReflectionError> for EvaluationError {
    fn from(error: ReflectionError) -> Self {
        Self::Reflection(Box::new(error))
    }
}
