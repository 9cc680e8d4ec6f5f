//! Evaluated constant values.
//!
//! Operators follow the host language's runtime rules closely enough for
//! metadata: integer overflow promotes to float, numeric strings take part
//! in arithmetic and loose comparison, array keys are normalized.

use crate::error::EvaluationError;
use prism_syntax::{BinaryOp, UnaryOp};
use prism_types::ClassId;
use std::cmp::Ordering;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArrayKey {
    Int(i64),
    String(String),
}

impl ArrayKey {
    /// Normalize a value used as an array key.
    ///
    /// Canonical decimal strings become integers, booleans and floats are
    /// truncated to integers, `null` is the empty string.
    pub fn from_value(value: &Value) -> Result<Self, EvaluationError> {
        match value {
            Value::Null => Ok(Self::String(String::new())),
            Value::Bool(value) => Ok(Self::Int(i64::from(*value))),
            Value::Int(value) => Ok(Self::Int(*value)),
            Value::Float(value) if value.is_finite() => Ok(Self::Int(value.trunc() as i64)),
            Value::Float(_) => Ok(Self::Int(0)),
            Value::String(text) => Ok(match canonical_int(text) {
                Some(value) => Self::Int(value),
                None => Self::String(text.clone()),
            }),
            Value::Array(_) | Value::Object { .. } | Value::EnumCase { .. } => {
                Err(EvaluationError::InvalidOperand("an array or object as an array key"))
            }
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(value) => Value::Int(*value),
            Self::String(value) => Value::String(value.clone()),
        }
    }
}

impl fmt::Display for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "\"{value}\""),
        }
    }
}

/// `"12"` but not `"012"`, `"+1"`, `"-0"` or `" 1"`.
fn canonical_int(text: &str) -> Option<i64> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    if text == "-0" {
        return None;
    }
    text.parse().ok()
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Ordered entries with unique keys.
    Array(Vec<(ArrayKey, Value)>),
    /// `new C(...)`: the class and its evaluated arguments; no constructor runs.
    Object {
        class: ClassId,
        arguments: Vec<(Option<String>, Value)>,
    },
    EnumCase {
        class: ClassId,
        case: String,
    },
}

// =============================================================================
// Array construction
// =============================================================================

/// Builds an array the way an array literal does: `[]`-style pushes take the
/// next integer key, explicit keys overwrite in place.
#[derive(Debug, Default)]
pub struct ArrayBuilder {
    entries: Vec<(ArrayKey, Value)>,
    next_index: i64,
}

impl ArrayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: Value) {
        let key = ArrayKey::Int(self.next_index);
        self.insert(key, value);
    }

    pub fn insert(&mut self, key: ArrayKey, value: Value) {
        if let ArrayKey::Int(index) = key {
            if index >= self.next_index {
                self.next_index = index.saturating_add(1);
            }
        }
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn finish(self) -> Value {
        Value::Array(self.entries)
    }
}

// =============================================================================
// Conversions
// =============================================================================

enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn to_value(self) -> Value {
        match self {
            Number::Int(value) => Value::Int(value),
            Number::Float(value) => Value::Float(value),
        }
    }

    fn as_float(&self) -> f64 {
        match self {
            Number::Int(value) => *value as f64,
            Number::Float(value) => *value,
        }
    }
}

/// Parse the numeric part of a string.
///
/// Returns the number and whether the whole string (modulo surrounding
/// whitespace) was numeric.
fn parse_numeric(text: &str) -> Option<(Number, bool)> {
    let trimmed = text.trim_start_matches([' ', '\t', '\n', '\r', '\x0b', '\x0c']);
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut int_digits = end - int_start;
    let mut is_float = false;
    if end < bytes.len() && bytes[end] == b'.' {
        let fraction_start = end + 1;
        let mut cursor = fraction_start;
        while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
            cursor += 1;
        }
        if int_digits > 0 || cursor > fraction_start {
            int_digits += cursor - fraction_start;
            end = cursor;
            is_float = true;
        }
    }
    if int_digits == 0 {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut cursor = end + 1;
        if cursor < bytes.len() && (bytes[cursor] == b'+' || bytes[cursor] == b'-') {
            cursor += 1;
        }
        let exponent_start = cursor;
        while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
            cursor += 1;
        }
        if cursor > exponent_start {
            end = cursor;
            is_float = true;
        }
    }

    let literal = &trimmed[..end];
    let whole = trimmed[end..].trim_end_matches([' ', '\t', '\n', '\r', '\x0b', '\x0c']).is_empty();
    let number = if is_float {
        Number::Float(literal.parse().ok()?)
    } else {
        match literal.parse::<i64>() {
            Ok(value) => Number::Int(value),
            Err(_) => Number::Float(literal.parse().ok()?),
        }
    };
    Some((number, whole))
}

/// Whether a string is numeric as a whole.
pub fn is_numeric_string(text: &str) -> bool {
    matches!(parse_numeric(text), Some((_, true)))
}

/// Format a float the way string conversion does: shortest round-trip
/// digits, exponent form outside `1e-4..1e15`.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "NAN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    let exponent = value.abs().log10().floor() as i32;
    if (-4..15).contains(&exponent) {
        return format!("{value}");
    }
    let scientific = format!("{value:e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let mantissa = if mantissa.contains('.') {
        mantissa.to_string()
    } else {
        format!("{mantissa}.0")
    };
    match exponent.strip_prefix('-') {
        Some(digits) => format!("{mantissa}E-{digits}"),
        None => format!("{mantissa}E+{exponent}"),
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object { .. } => "object",
            Self::EnumCase { .. } => "enum",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(value) => *value,
            Self::Int(value) => *value != 0,
            Self::Float(value) => *value != 0.0,
            Self::String(value) => !value.is_empty() && value != "0",
            Self::Array(entries) => !entries.is_empty(),
            Self::Object { .. } | Self::EnumCase { .. } => true,
        }
    }

    /// String conversion used by `.`.
    pub fn to_php_string(&self) -> Result<String, EvaluationError> {
        match self {
            Self::Null | Self::Bool(false) => Ok(String::new()),
            Self::Bool(true) => Ok("1".to_string()),
            Self::Int(value) => Ok(value.to_string()),
            Self::Float(value) => Ok(format_float(*value)),
            Self::String(value) => Ok(value.clone()),
            Self::Array(_) => Ok("Array".to_string()),
            Self::Object { .. } | Self::EnumCase { .. } => {
                Err(EvaluationError::InvalidOperand("an object as a string"))
            }
        }
    }

    fn to_number(&self, op: &'static str, other: &Value) -> Result<Number, EvaluationError> {
        match self {
            Self::Null => Ok(Number::Int(0)),
            Self::Bool(value) => Ok(Number::Int(i64::from(*value))),
            Self::Int(value) => Ok(Number::Int(*value)),
            Self::Float(value) => Ok(Number::Float(*value)),
            Self::String(text) => match parse_numeric(text) {
                Some((number, _)) => Ok(number),
                None => Err(self.invalid(op, other)),
            },
            Self::Array(_) | Self::Object { .. } | Self::EnumCase { .. } => Err(self.invalid(op, other)),
        }
    }

    fn to_int(&self, op: &'static str, other: &Value) -> Result<i64, EvaluationError> {
        Ok(match self.to_number(op, other)? {
            Number::Int(value) => value,
            Number::Float(value) if value.is_finite() => value.trunc() as i64,
            Number::Float(_) => 0,
        })
    }

    fn invalid(&self, op: &'static str, other: &Value) -> EvaluationError {
        EvaluationError::InvalidOperands {
            op,
            left: self.type_name(),
            right: other.type_name(),
        }
    }
}

// =============================================================================
// Operators
// =============================================================================

fn op_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Subtract => "-",
        BinaryOp::Multiply => "*",
        BinaryOp::Divide => "/",
        BinaryOp::Modulo => "%",
        BinaryOp::Power => "**",
        BinaryOp::Concat => ".",
        BinaryOp::ShiftLeft => "<<",
        BinaryOp::ShiftRight => ">>",
        BinaryOp::BitwiseAnd => "&",
        BinaryOp::BitwiseOr => "|",
        BinaryOp::BitwiseXor => "^",
        BinaryOp::LogicalAnd => "&&",
        BinaryOp::LogicalOr => "||",
        BinaryOp::LogicalXor => "xor",
        BinaryOp::Equal => "==",
        BinaryOp::NotEqual => "!=",
        BinaryOp::Identical => "===",
        BinaryOp::NotIdentical => "!==",
        BinaryOp::Less => "<",
        BinaryOp::LessOrEqual => "<=",
        BinaryOp::Greater => ">",
        BinaryOp::GreaterOrEqual => ">=",
        BinaryOp::Spaceship => "<=>",
        BinaryOp::Coalesce => "??",
    }
}

/// Apply a binary operator to two evaluated operands.
///
/// Short-circuiting operators (`&&`, `||`, `??`) are handled by the
/// evaluator before their right operand is evaluated; here they are plain
/// value operations.
pub fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvaluationError> {
    let symbol = op_symbol(op);
    match op {
        BinaryOp::Add => {
            if let (Value::Array(left), Value::Array(right)) = (left, right) {
                return Ok(array_union(left, right));
            }
            arithmetic(symbol, left, right, i64::checked_add, |a, b| a + b)
        }
        BinaryOp::Subtract => arithmetic(symbol, left, right, i64::checked_sub, |a, b| a - b),
        BinaryOp::Multiply => arithmetic(symbol, left, right, i64::checked_mul, |a, b| a * b),
        BinaryOp::Divide => divide(symbol, left, right),
        BinaryOp::Modulo => {
            let divisor = right.to_int(symbol, left)?;
            let dividend = left.to_int(symbol, right)?;
            if divisor == 0 {
                return Err(EvaluationError::DivisionByZero);
            }
            Ok(Value::Int(dividend.checked_rem(divisor).unwrap_or(0)))
        }
        BinaryOp::Power => power(symbol, left, right),
        BinaryOp::Concat => Ok(Value::String(format!(
            "{}{}",
            left.to_php_string()?,
            right.to_php_string()?
        ))),
        BinaryOp::ShiftLeft | BinaryOp::ShiftRight => {
            let value = left.to_int(symbol, right)?;
            let shift = right.to_int(symbol, left)?;
            if shift < 0 {
                return Err(EvaluationError::InvalidOperand("a negative shift count"));
            }
            let shifted = match (op, shift) {
                (BinaryOp::ShiftLeft, 0..=63) => value << shift,
                (BinaryOp::ShiftLeft, _) => 0,
                (_, 0..=63) => value >> shift,
                _ => {
                    if value < 0 {
                        -1
                    } else {
                        0
                    }
                }
            };
            Ok(Value::Int(shifted))
        }
        BinaryOp::BitwiseAnd => Ok(Value::Int(left.to_int(symbol, right)? & right.to_int(symbol, left)?)),
        BinaryOp::BitwiseOr => Ok(Value::Int(left.to_int(symbol, right)? | right.to_int(symbol, left)?)),
        BinaryOp::BitwiseXor => Ok(Value::Int(left.to_int(symbol, right)? ^ right.to_int(symbol, left)?)),
        BinaryOp::LogicalAnd => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        BinaryOp::LogicalOr => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
        BinaryOp::LogicalXor => Ok(Value::Bool(left.is_truthy() != right.is_truthy())),
        BinaryOp::Equal => Ok(Value::Bool(loose_equals(left, right))),
        BinaryOp::NotEqual => Ok(Value::Bool(!loose_equals(left, right))),
        BinaryOp::Identical => Ok(Value::Bool(identical(left, right))),
        BinaryOp::NotIdentical => Ok(Value::Bool(!identical(left, right))),
        BinaryOp::Less => Ok(Value::Bool(loose_compare(left, right) == Some(Ordering::Less))),
        BinaryOp::LessOrEqual => Ok(Value::Bool(matches!(
            loose_compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        ))),
        BinaryOp::Greater => Ok(Value::Bool(loose_compare(left, right) == Some(Ordering::Greater))),
        BinaryOp::GreaterOrEqual => Ok(Value::Bool(matches!(
            loose_compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ))),
        BinaryOp::Spaceship => Ok(Value::Int(match loose_compare(left, right) {
            Some(Ordering::Less) => -1,
            Some(Ordering::Equal) => 0,
            // Uncomparable operands order as "greater".
            Some(Ordering::Greater) | None => 1,
        })),
        BinaryOp::Coalesce => Ok(if matches!(left, Value::Null) {
            right.clone()
        } else {
            left.clone()
        }),
    }
}

fn arithmetic(
    symbol: &'static str,
    left: &Value,
    right: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, EvaluationError> {
    let a = left.to_number(symbol, right)?;
    let b = right.to_number(symbol, left)?;
    if let (Number::Int(x), Number::Int(y)) = (&a, &b) {
        if let Some(result) = int_op(*x, *y) {
            return Ok(Value::Int(result));
        }
    }
    Ok(Value::Float(float_op(a.as_float(), b.as_float())))
}

fn divide(symbol: &'static str, left: &Value, right: &Value) -> Result<Value, EvaluationError> {
    let a = left.to_number(symbol, right)?;
    let b = right.to_number(symbol, left)?;
    if b.as_float() == 0.0 {
        return Err(EvaluationError::DivisionByZero);
    }
    if let (Number::Int(x), Number::Int(y)) = (&a, &b) {
        if x.checked_rem(*y) == Some(0) {
            if let Some(result) = x.checked_div(*y) {
                return Ok(Value::Int(result));
            }
        }
    }
    Ok(Value::Float(a.as_float() / b.as_float()))
}

fn power(symbol: &'static str, left: &Value, right: &Value) -> Result<Value, EvaluationError> {
    let base = left.to_number(symbol, right)?;
    let exponent = right.to_number(symbol, left)?;
    if let (Number::Int(base), Number::Int(exponent)) = (&base, &exponent) {
        if let Ok(exponent) = u32::try_from(*exponent) {
            if let Some(result) = base.checked_pow(exponent) {
                return Ok(Value::Int(result));
            }
        }
    }
    Ok(Value::Float(base.as_float().powf(exponent.as_float())))
}

/// `$a + $b` on arrays: keys of `left` win, missing keys come from `right`.
fn array_union(left: &[(ArrayKey, Value)], right: &[(ArrayKey, Value)]) -> Value {
    let mut entries = left.to_vec();
    for (key, value) in right {
        if !entries.iter().any(|(existing, _)| existing == key) {
            entries.push((key.clone(), value.clone()));
        }
    }
    Value::Array(entries)
}

pub fn unary(op: UnaryOp, operand: &Value) -> Result<Value, EvaluationError> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
        UnaryOp::Plus => Ok(operand.to_number("+", &Value::Int(1))?.to_value()),
        UnaryOp::Negate => Ok(match operand.to_number("-", &Value::Int(-1))? {
            Number::Int(value) => match value.checked_neg() {
                Some(negated) => Value::Int(negated),
                None => Value::Float(-(value as f64)),
            },
            Number::Float(value) => Value::Float(-value),
        }),
        UnaryOp::BitwiseNot => match operand {
            Value::Int(value) => Ok(Value::Int(!value)),
            Value::Float(value) if value.is_finite() => Ok(Value::Int(!(value.trunc() as i64))),
            _ => Err(EvaluationError::InvalidOperand("`~` on a non-integer")),
        },
    }
}

// =============================================================================
// Comparison
// =============================================================================

/// `===`
pub fn identical(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .zip(b)
                    .all(|((ka, va), (kb, vb))| ka == kb && identical(va, vb))
        }
        (Value::Float(a), Value::Float(b)) => a == b,
        _ => left == right,
    }
}

/// `==`
pub fn loose_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len()
                && a.iter().all(|(key, value)| {
                    b.iter()
                        .find(|(other, _)| other == key)
                        .is_some_and(|(_, other)| loose_equals(value, other))
                })
        }
        (Value::Object { .. } | Value::EnumCase { .. }, _) | (_, Value::Object { .. } | Value::EnumCase { .. }) => {
            if matches!(left, Value::Null | Value::Bool(_)) || matches!(right, Value::Null | Value::Bool(_)) {
                return left.is_truthy() == right.is_truthy();
            }
            left == right
        }
        _ => loose_compare(left, right) == Some(Ordering::Equal),
    }
}

/// Loose ordering; `None` when the operands are not comparable.
pub fn loose_compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => match (parse_numeric(a), parse_numeric(b)) {
            (Some((x, true)), Some((y, true))) => compare_numbers(&x, &y),
            _ => Some(a.as_bytes().cmp(b.as_bytes())),
        },
        (Value::Null, Value::String(text)) => Some("".cmp(text.as_str())),
        (Value::String(text), Value::Null) => Some(text.as_str().cmp("")),
        (Value::Null | Value::Bool(_), _) | (_, Value::Null | Value::Bool(_)) => {
            Some(left.is_truthy().cmp(&right.is_truthy()))
        }
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            compare_numbers(&plain_number(left)?, &plain_number(right)?)
        }
        (Value::Int(_) | Value::Float(_), Value::String(text)) => match parse_numeric(text) {
            Some((number, true)) => compare_numbers(&plain_number(left)?, &number),
            _ => Some(
                left.to_php_string()
                    .ok()?
                    .as_bytes()
                    .cmp(text.as_bytes()),
            ),
        },
        (Value::String(_), Value::Int(_) | Value::Float(_)) => {
            loose_compare(right, left).map(Ordering::reverse)
        }
        (Value::Array(a), Value::Array(b)) => {
            if a.len() != b.len() {
                return Some(a.len().cmp(&b.len()));
            }
            for (key, value) in a {
                let (_, other) = b.iter().find(|(other, _)| other == key)?;
                match loose_compare(value, other)? {
                    Ordering::Equal => {}
                    unequal => return Some(unequal),
                }
            }
            Some(Ordering::Equal)
        }
        (Value::Array(_), _) => Some(Ordering::Greater),
        (_, Value::Array(_)) => Some(Ordering::Less),
        _ => (left == right).then_some(Ordering::Equal),
    }
}

fn plain_number(value: &Value) -> Option<Number> {
    match value {
        Value::Int(value) => Some(Number::Int(*value)),
        Value::Float(value) => Some(Number::Float(*value)),
        _ => None,
    }
}

fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => Some(x.cmp(y)),
        _ => a.as_float().partial_cmp(&b.as_float()),
    }
}

// =============================================================================
// Element access
// =============================================================================

/// `$container[$key]`; `Ok(None)` when the element does not exist.
pub fn fetch(container: &Value, key: &Value) -> Result<Option<Value>, EvaluationError> {
    match container {
        Value::Array(entries) => {
            let key = ArrayKey::from_value(key)?;
            Ok(entries
                .iter()
                .find(|(existing, _)| *existing == key)
                .map(|(_, value)| value.clone()))
        }
        Value::String(text) => {
            let offset = match key {
                Value::Int(offset) => *offset,
                Value::String(offset) => match canonical_int(offset) {
                    Some(offset) => offset,
                    None => return Err(EvaluationError::InvalidOperand("a non-integer string offset")),
                },
                Value::Bool(value) => i64::from(*value),
                Value::Float(value) => value.trunc() as i64,
                _ => return Err(EvaluationError::InvalidOperand("an illegal string offset")),
            };
            let bytes = text.as_bytes();
            let len = bytes.len() as i64;
            let index = if offset < 0 { len + offset } else { offset };
            if index < 0 || index >= len {
                return Ok(None);
            }
            let byte = bytes[index as usize];
            Ok(Some(Value::String(String::from_utf8_lossy(&[byte]).into_owned())))
        }
        Value::Null => Ok(None),
        _ => Err(EvaluationError::InvalidOperand("a scalar value as an array")),
    }
}

#[cfg(test)]
#[path = "../../tests/value_tests.rs"]
mod tests;
