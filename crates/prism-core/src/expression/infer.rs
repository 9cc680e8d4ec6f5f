//! Static types of constant expressions.

use super::eval::LocalContext;
use super::value::{ArrayKey, Value};
use super::{ClassTarget, Expression};
use prism_syntax::{BinaryOp, UnaryOp};
use prism_types::{ShapeItem, ShapeKey, ShapeKind, Type};

/// The literal type of an evaluated value.
pub fn type_of_value(value: &Value) -> Type {
    match value {
        Value::Null => Type::Null,
        Value::Bool(true) => Type::True,
        Value::Bool(false) => Type::False,
        Value::Int(value) => Type::IntLiteral(*value),
        Value::Float(value) => Type::FloatLiteral(*value),
        Value::String(value) => Type::StringLiteral(value.clone()),
        Value::Array(entries) => {
            let is_list = entries
                .iter()
                .enumerate()
                .all(|(index, (key, _))| *key == ArrayKey::Int(index as i64));
            Type::Shape {
                kind: if is_list && !entries.is_empty() {
                    ShapeKind::List
                } else {
                    ShapeKind::Array
                },
                items: entries
                    .iter()
                    .map(|(key, value)| ShapeItem {
                        key: Some(match key {
                            ArrayKey::Int(key) => ShapeKey::Int(*key),
                            ArrayKey::String(key) => ShapeKey::String(key.clone()),
                        }),
                        value: type_of_value(value),
                        optional: false,
                    })
                    .collect(),
                sealed: true,
            }
        }
        Value::Object { class, .. } => Type::named(class.type_name()),
        Value::EnumCase { class, case } => Type::ClassConstant {
            class: class.type_name(),
            name: case.clone(),
        },
    }
}

/// Infer the type of an expression without reflecting anything.
///
/// Expressions that fold locally get their literal type; the rest get a
/// structural approximation, or `None` when nothing useful is known.
pub fn infer_type(expr: &Expression) -> Option<Type> {
    match expr.evaluate(&LocalContext, None) {
        Ok(value) => Some(type_of_value(&value)),
        Err(_) => structural(expr),
    }
}

fn structural(expr: &Expression) -> Option<Type> {
    match expr {
        Expression::Value(value) => Some(type_of_value(value)),
        Expression::Array(_) => Some(Type::array()),
        Expression::ClassConstantFetch {
            class: ClassTarget::Class(class),
            name,
        } => Some(Type::ClassConstant {
            class: class.type_name(),
            name: name.clone(),
        }),
        Expression::ClassConstantFetch {
            class: ClassTarget::Static,
            ..
        } => None,
        Expression::Instantiation { class, .. } => Some(match class {
            ClassTarget::Class(class) => Type::named(class.type_name()),
            ClassTarget::Static => Type::Static,
        }),
        Expression::Binary { op, left, right } => match op {
            BinaryOp::Concat => Some(Type::String),
            BinaryOp::Equal
            | BinaryOp::NotEqual
            | BinaryOp::Identical
            | BinaryOp::NotIdentical
            | BinaryOp::Less
            | BinaryOp::LessOrEqual
            | BinaryOp::Greater
            | BinaryOp::GreaterOrEqual
            | BinaryOp::LogicalAnd
            | BinaryOp::LogicalOr
            | BinaryOp::LogicalXor => Some(Type::Bool),
            BinaryOp::Spaceship => Some(Type::IntRange {
                min: Some(-1),
                max: Some(1),
            }),
            BinaryOp::Modulo
            | BinaryOp::ShiftLeft
            | BinaryOp::ShiftRight
            | BinaryOp::BitwiseAnd
            | BinaryOp::BitwiseOr
            | BinaryOp::BitwiseXor => Some(Type::Int),
            BinaryOp::Add | BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Power => {
                let left = infer_type(left).map(|ty| widen(&ty));
                let right = infer_type(right).map(|ty| widen(&ty));
                match (left, right) {
                    (Some(Type::Float), _) | (_, Some(Type::Float)) => Some(Type::Float),
                    (Some(Type::Int), Some(Type::Int)) => Some(Type::union([Type::Int, Type::Float])),
                    _ => None,
                }
            }
            BinaryOp::Divide => Some(Type::union([Type::Int, Type::Float])),
            BinaryOp::Coalesce => None,
        },
        Expression::Unary { op, operand } => match op {
            UnaryOp::Not => Some(Type::Bool),
            UnaryOp::BitwiseNot => Some(Type::Int),
            UnaryOp::Negate | UnaryOp::Plus => infer_type(operand).map(|ty| widen(&ty)),
        },
        Expression::Ternary {
            condition,
            then,
            otherwise,
        } => {
            let then = infer_type(then.as_deref().unwrap_or(&**condition))?;
            let otherwise = infer_type(otherwise)?;
            Some(Type::union([then, otherwise]))
        }
        Expression::ConstantFetch { .. }
        | Expression::ArrayFetch { .. }
        | Expression::ArrayFetchCoalesce { .. } => None,
    }
}

/// Drop literal precision: `1` becomes `int`, `'a'` becomes `string`,
/// shapes become `array`/`list`.
///
/// Property and parameter defaults are widened; a constant keeps its
/// literal type because its value cannot change.
pub fn widen(ty: &Type) -> Type {
    match ty {
        Type::IntLiteral(_) => Type::Int,
        Type::FloatLiteral(_) => Type::Float,
        Type::StringLiteral(_) => Type::String,
        Type::True | Type::False => Type::Bool,
        Type::Shape {
            kind: ShapeKind::List,
            items,
            ..
        } => Type::list_of(Type::union(items.iter().map(|item| widen(&item.value)).collect::<Vec<_>>())),
        Type::Shape { items, .. } if items.is_empty() => Type::array(),
        Type::Shape { items, .. } => Type::array_of(
            Type::union(
                items
                    .iter()
                    .map(|item| match &item.key {
                        Some(ShapeKey::Int(_)) | None => Type::Int,
                        Some(ShapeKey::String(_)) => Type::String,
                    })
                    .collect::<Vec<_>>(),
            ),
            Type::union(items.iter().map(|item| widen(&item.value)).collect::<Vec<_>>()),
        ),
        Type::Union(members) => Type::union(members.iter().map(widen).collect::<Vec<_>>()),
        other => other.clone(),
    }
}
