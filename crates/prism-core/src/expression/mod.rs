//! Constant expressions.
//!
//! Default values, constant values, enum case values and decorator
//! arguments are compiled from the syntax tree into an [`Expression`] when a
//! declaration is reflected, but only evaluated on demand: a value may refer
//! to constants of other declarations that have to be reflected first.
//!
//! Compilation binds everything that is known lexically: names are
//! resolved against the imports, `self`/`parent` are bound to concrete
//! classes, magic constants and `X::class` are folded. What remains
//! (`static`, constant lookups, operators) is evaluated against an
//! [`EvaluationContext`].

mod compile;
mod eval;
mod infer;
pub mod value;

pub use compile::{CompileScope, compile};
pub use eval::{EvaluationContext, Evaluator, LocalContext, builtin_constant};
pub use infer::{infer_type, type_of_value, widen};
pub use value::{ArrayKey, Value};

use prism_syntax::{BinaryOp, UnaryOp};
use prism_types::ClassId;

/// The class side of a fetch or instantiation after compilation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClassTarget {
    Class(ClassId),
    /// Late-bound `static`.
    Static,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArrayEntry {
    pub key: Option<Expression>,
    pub value: Expression,
    pub spread: bool,
}

/// A call or decorator argument.
#[derive(Clone, Debug, PartialEq)]
pub struct Argument {
    pub name: Option<String>,
    pub value: Expression,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Value(Value),
    Array(Vec<ArrayEntry>),
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
    /// `then == None` for `a ?: b`.
    Ternary {
        condition: Box<Expression>,
        then: Option<Box<Expression>>,
        otherwise: Box<Expression>,
    },
    /// A global constant: the namespaced candidate first, then the global
    /// fallback for unqualified names.
    ConstantFetch {
        primary: String,
        fallback: Option<String>,
    },
    /// `C::NAME`, enum cases included.
    ClassConstantFetch { class: ClassTarget, name: String },
    Instantiation {
        class: ClassTarget,
        arguments: Vec<Argument>,
    },
    ArrayFetch {
        array: Box<Expression>,
        key: Box<Expression>,
    },
    /// `$a[k] ?? default`: a missing element yields `default`.
    ArrayFetchCoalesce {
        array: Box<Expression>,
        key: Box<Expression>,
        default: Box<Expression>,
    },
}

impl Expression {
    pub fn value(value: Value) -> Self {
        Self::Value(value)
    }

    /// The literal value if this expression is already folded.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Value(Value::Null))
    }
}

#[cfg(test)]
#[path = "../../tests/expression_tests.rs"]
mod tests;
