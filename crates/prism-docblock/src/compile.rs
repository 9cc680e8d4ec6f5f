//! Compile parsed documentation types into [`Type`].
//!
//! Resolution order for a bare name: keyword, active template, type alias,
//! then class name through the namespace and imports.

use crate::error::DocParseError;
use crate::node::{CallableParamNode, ShapeItemNode, ShapeKeyNode, SubjectNode, TypeNode};
use prism_syntax::Name;
use prism_types::{
    CallableKind, CallableParam, ConditionalSubject, ShapeItem, ShapeKey, ShapeKind, Type,
    TypeContext,
};

/// Compile a documentation type against its declaration's context.
pub fn compile_type(node: &TypeNode, context: &TypeContext) -> Result<Type, DocParseError> {
    match node {
        TypeNode::Identifier(name) => Ok(compile_identifier(name, context)),
        TypeNode::This => Ok(Type::Static),
        TypeNode::Generic { base, args } => compile_generic(base, args, context),
        TypeNode::Nullable(inner) => Ok(Type::nullable(compile_type(inner, context)?)),
        TypeNode::Union(members) => Ok(Type::union(compile_all(members, context)?)),
        TypeNode::Intersection(members) => Ok(Type::intersection(compile_all(members, context)?)),
        TypeNode::ArrayOf(inner) => Ok(Type::array_of(Type::ArrayKey, compile_type(inner, context)?)),
        TypeNode::OffsetAccess { base, offset } => Ok(Type::OffsetAccess {
            base: Box::new(compile_type(base, context)?),
            offset: Box::new(compile_type(offset, context)?),
        }),
        TypeNode::Shape {
            base,
            items,
            sealed,
        } => compile_shape(base, items, *sealed, context),
        TypeNode::Callable { base, params, ret } => compile_callable(base, params, ret.as_deref(), context),
        TypeNode::IntLiteral(value) => Ok(Type::IntLiteral(*value)),
        TypeNode::FloatLiteral(value) => Ok(Type::FloatLiteral(*value)),
        TypeNode::StringLiteral(value) => Ok(Type::StringLiteral(value.clone())),
        TypeNode::ConstFetch { class, name } => Ok(compile_const_fetch(class, name, context)),
        TypeNode::Conditional {
            subject,
            target,
            if_true,
            if_false,
            negated,
        } => Ok(Type::Conditional {
            subject: match subject {
                SubjectNode::Parameter(name) => ConditionalSubject::Parameter(name.clone()),
                SubjectNode::Type(ty) => ConditionalSubject::Type(Box::new(compile_type(ty, context)?)),
            },
            target: Box::new(compile_type(target, context)?),
            if_true: Box::new(compile_type(if_true, context)?),
            if_false: Box::new(compile_type(if_false, context)?),
            negated: *negated,
        }),
    }
}

fn compile_all(nodes: &[TypeNode], context: &TypeContext) -> Result<Vec<Type>, DocParseError> {
    nodes.iter().map(|node| compile_type(node, context)).collect()
}

// =============================================================================
// Names
// =============================================================================

fn keyword(name: &str, context: &TypeContext) -> Option<Type> {
    let ty = match name.to_ascii_lowercase().as_str() {
        "int" | "integer" => Type::Int,
        "positive-int" => Type::positive_int(),
        "negative-int" => Type::negative_int(),
        "non-positive-int" => Type::non_positive_int(),
        "non-negative-int" => Type::non_negative_int(),
        "non-zero-int" => Type::union([Type::negative_int(), Type::positive_int()]),
        "float" | "double" => Type::Float,
        "string" => Type::String,
        "non-empty-string" => Type::NonEmptyString,
        "numeric-string" => Type::NumericString,
        "literal-string" | "non-empty-literal-string" => Type::LiteralString,
        "truthy-string" | "non-falsy-string" => Type::NonFalsyString,
        "class-string" => Type::ClassString(None),
        "bool" | "boolean" => Type::Bool,
        "true" => Type::True,
        "false" => Type::False,
        "null" => Type::Null,
        "void" => Type::Void,
        "never" | "never-return" | "never-returns" | "no-return" | "noreturn" => Type::Never,
        "mixed" => Type::Mixed,
        "scalar" => Type::Scalar,
        "numeric" => Type::Numeric,
        "array-key" => Type::ArrayKey,
        "resource" | "closed-resource" | "open-resource" => Type::Resource,
        "object" => Type::Object,
        "iterable" => Type::iterable(),
        "callable" | "pure-callable" => Type::callable(),
        "array" | "associative-array" => Type::array(),
        "non-empty-array" => Type::Array {
            key: Box::new(Type::ArrayKey),
            value: Box::new(Type::Mixed),
            non_empty: true,
        },
        "list" => Type::list_of(Type::Mixed),
        "non-empty-list" => Type::List {
            value: Box::new(Type::Mixed),
            non_empty: true,
        },
        "static" => Type::Static,
        "self" => Type::named(context.self_name()?),
        "parent" => Type::named(context.parent_class.clone()?),
        _ => return None,
    };
    Some(ty)
}

fn compile_identifier(name: &str, context: &TypeContext) -> Type {
    let is_unqualified = !name.contains('\\');
    if is_unqualified {
        if let Some(ty) = keyword(name, context) {
            return ty;
        }
        if let Some(template) = context.resolve_template(name) {
            return Type::Template(template.clone());
        }
        if let Some((class, alias)) = context.resolve_alias(name) {
            return Type::Alias {
                class: class.to_string(),
                name: alias.to_string(),
            };
        }
    }
    Type::named(resolve_class(name, context))
}

fn resolve_class(name: &str, context: &TypeContext) -> String {
    let lower = name.to_ascii_lowercase();
    if lower == "self" || lower == "static" {
        if let Some(class) = context.self_name() {
            return class;
        }
    }
    if lower == "parent" {
        if let Some(parent) = &context.parent_class {
            return parent.clone();
        }
    }
    context.names.resolve_class(&Name::from(name))
}

fn compile_const_fetch(class: &str, name: &str, context: &TypeContext) -> Type {
    let class = resolve_class(class, context);
    if name.eq_ignore_ascii_case("class") {
        return Type::ClassString(Some(Box::new(Type::named(class))));
    }
    Type::ClassConstant {
        class,
        name: name.to_string(),
    }
}

// =============================================================================
// Generics
// =============================================================================

fn invalid(text: &str, reason: &str) -> DocParseError {
    DocParseError::InvalidType {
        text: text.to_string(),
        reason: reason.to_string(),
    }
}

fn compile_generic(base: &str, args: &[TypeNode], context: &TypeContext) -> Result<Type, DocParseError> {
    let lower = base.to_ascii_lowercase();
    match lower.as_str() {
        "array" | "non-empty-array" | "associative-array" => {
            let non_empty = lower == "non-empty-array";
            let (key, value) = match args {
                [value] => (Type::ArrayKey, compile_type(value, context)?),
                [key, value] => (compile_type(key, context)?, compile_type(value, context)?),
                _ => return Err(invalid(base, "expected one or two type arguments")),
            };
            Ok(Type::Array {
                key: Box::new(key),
                value: Box::new(value),
                non_empty,
            })
        }
        "list" | "non-empty-list" => match args {
            [value] => Ok(Type::List {
                value: Box::new(compile_type(value, context)?),
                non_empty: lower == "non-empty-list",
            }),
            _ => Err(invalid(base, "expected one type argument")),
        },
        "iterable" => {
            let (key, value) = match args {
                [value] => (Type::Mixed, compile_type(value, context)?),
                [key, value] => (compile_type(key, context)?, compile_type(value, context)?),
                _ => return Err(invalid(base, "expected one or two type arguments")),
            };
            Ok(Type::Iterable {
                key: Box::new(key),
                value: Box::new(value),
            })
        }
        "class-string" => match args {
            [inner] => Ok(Type::ClassString(Some(Box::new(compile_type(inner, context)?)))),
            _ => Err(invalid(base, "expected one type argument")),
        },
        "int" => match args {
            [min, max] => Ok(Type::IntRange {
                min: int_bound(min, "min")?,
                max: int_bound(max, "max")?,
            }),
            _ => Err(invalid(base, "expected `int<min, max>`")),
        },
        "key-of" => match args {
            [inner] => Ok(Type::KeyOf(Box::new(compile_type(inner, context)?))),
            _ => Err(invalid(base, "expected one type argument")),
        },
        "value-of" => match args {
            [inner] => Ok(Type::ValueOf(Box::new(compile_type(inner, context)?))),
            _ => Err(invalid(base, "expected one type argument")),
        },
        _ => {
            let is_unqualified = !base.contains('\\');
            if is_unqualified
                && (context.resolve_template(base).is_some()
                    || context.resolve_alias(base).is_some()
                    || keyword(base, context).is_some_and(|ty| !matches!(ty, Type::Named { .. })))
            {
                return Err(invalid(base, "type does not take arguments"));
            }
            Ok(Type::Named {
                class: resolve_class(base, context),
                args: compile_all(args, context)?,
            })
        }
    }
}

fn int_bound(node: &TypeNode, open: &str) -> Result<Option<i64>, DocParseError> {
    match node {
        TypeNode::IntLiteral(value) => Ok(Some(*value)),
        TypeNode::Identifier(name) if name.eq_ignore_ascii_case(open) => Ok(None),
        _ => Err(invalid("int", "range bounds must be integers, `min` or `max`")),
    }
}

// =============================================================================
// Shapes and signatures
// =============================================================================

fn compile_shape(
    base: &str,
    items: &[ShapeItemNode],
    sealed: bool,
    context: &TypeContext,
) -> Result<Type, DocParseError> {
    let items = items
        .iter()
        .map(|item| {
            Ok(ShapeItem {
                key: item.key.as_ref().map(|key| match key {
                    ShapeKeyNode::Identifier(name) | ShapeKeyNode::String(name) => {
                        ShapeKey::String(name.clone())
                    }
                    ShapeKeyNode::Int(value) => ShapeKey::Int(*value),
                }),
                value: compile_type(&item.value, context)?,
                optional: item.optional,
            })
        })
        .collect::<Result<Vec<_>, DocParseError>>()?;

    let kind = match base.to_ascii_lowercase().as_str() {
        "object" => return Ok(Type::ObjectShape(items)),
        "list" | "non-empty-list" => ShapeKind::List,
        _ => ShapeKind::Array,
    };
    Ok(Type::Shape {
        kind,
        items,
        sealed,
    })
}

fn compile_callable(
    base: &str,
    params: &[CallableParamNode],
    ret: Option<&TypeNode>,
    context: &TypeContext,
) -> Result<Type, DocParseError> {
    let kind = match base.trim_start_matches('\\').to_ascii_lowercase().as_str() {
        "closure" | "pure-closure" => CallableKind::Closure,
        _ => CallableKind::Callable,
    };
    let params = params
        .iter()
        .map(|param| {
            Ok(CallableParam {
                ty: compile_type(&param.ty, context)?,
                name: param.name.clone(),
                optional: param.optional,
                variadic: param.variadic,
                by_ref: param.by_ref,
            })
        })
        .collect::<Result<Vec<_>, DocParseError>>()?;
    let ret = match ret {
        Some(ret) => Some(Box::new(compile_type(ret, context)?)),
        None => None,
    };
    Ok(Type::Callable { kind, params, ret })
}

#[cfg(test)]
#[path = "../tests/compile_tests.rs"]
mod tests;
