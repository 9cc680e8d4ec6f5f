//! Type formatting.
//!
//! Types print in the documentation grammar so that a formatted type can be
//! parsed back by `prism-docblock`.

use crate::ty::{CallableKind, CallableParam, ConditionalSubject, ShapeItem, ShapeKey, ShapeKind, Type};
use std::fmt;

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Never => f.write_str("never"),
            Type::Void => f.write_str("void"),
            Type::Null => f.write_str("null"),
            Type::Mixed => f.write_str("mixed"),
            Type::Bool => f.write_str("bool"),
            Type::True => f.write_str("true"),
            Type::False => f.write_str("false"),
            Type::Int => f.write_str("int"),
            Type::IntRange { min, max } => match (min, max) {
                (Some(1), None) => f.write_str("positive-int"),
                (None, Some(-1)) => f.write_str("negative-int"),
                (Some(0), None) => f.write_str("non-negative-int"),
                (None, Some(0)) => f.write_str("non-positive-int"),
                _ => {
                    f.write_str("int<")?;
                    write_bound(f, *min, "min")?;
                    f.write_str(", ")?;
                    write_bound(f, *max, "max")?;
                    f.write_str(">")
                }
            },
            Type::IntLiteral(value) => write!(f, "{value}"),
            Type::Float => f.write_str("float"),
            Type::FloatLiteral(value) => {
                if value.fract() == 0.0 && value.is_finite() {
                    write!(f, "{value:.1}")
                } else {
                    write!(f, "{value}")
                }
            }
            Type::String => f.write_str("string"),
            Type::NonEmptyString => f.write_str("non-empty-string"),
            Type::NumericString => f.write_str("numeric-string"),
            Type::LiteralString => f.write_str("literal-string"),
            Type::NonFalsyString => f.write_str("non-falsy-string"),
            Type::StringLiteral(value) => write_quoted(f, value),
            Type::ClassString(None) => f.write_str("class-string"),
            Type::ClassString(Some(inner)) => write!(f, "class-string<{inner}>"),
            Type::Scalar => f.write_str("scalar"),
            Type::Numeric => f.write_str("numeric"),
            Type::ArrayKey => f.write_str("array-key"),
            Type::Resource => f.write_str("resource"),
            Type::Object => f.write_str("object"),
            Type::Array {
                key,
                value,
                non_empty,
            } => {
                let name = if *non_empty { "non-empty-array" } else { "array" };
                if **key == Type::ArrayKey && **value == Type::Mixed {
                    f.write_str(name)
                } else if **key == Type::ArrayKey {
                    write!(f, "{name}<{value}>")
                } else {
                    write!(f, "{name}<{key}, {value}>")
                }
            }
            Type::List { value, non_empty } => {
                let name = if *non_empty { "non-empty-list" } else { "list" };
                write!(f, "{name}<{value}>")
            }
            Type::Iterable { key, value } => {
                if **key == Type::Mixed && **value == Type::Mixed {
                    f.write_str("iterable")
                } else {
                    write!(f, "iterable<{key}, {value}>")
                }
            }
            Type::Shape {
                kind,
                items,
                sealed,
            } => {
                f.write_str(match kind {
                    ShapeKind::Array => "array{",
                    ShapeKind::List => "list{",
                })?;
                write_items(f, items)?;
                if !sealed {
                    if !items.is_empty() {
                        f.write_str(", ")?;
                    }
                    f.write_str("...")?;
                }
                f.write_str("}")
            }
            Type::ObjectShape(items) => {
                f.write_str("object{")?;
                write_items(f, items)?;
                f.write_str("}")
            }
            Type::Named { class, args } => {
                f.write_str(class)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    write_list(f, args, ", ")?;
                    f.write_str(">")?;
                }
                Ok(())
            }
            Type::Static => f.write_str("static"),
            Type::Template(template) => f.write_str(&template.name),
            Type::Alias { name, .. } => f.write_str(name),
            Type::ClassConstant { class, name } => write!(f, "{class}::{name}"),
            Type::Callable { kind, params, ret } => {
                f.write_str(match kind {
                    CallableKind::Callable => "callable",
                    CallableKind::Closure => "Closure",
                })?;
                if params.is_empty() && ret.is_none() {
                    return Ok(());
                }
                f.write_str("(")?;
                for (index, param) in params.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write_param(f, param)?;
                }
                f.write_str(")")?;
                if let Some(ret) = ret {
                    write!(f, ": {ret}")?;
                }
                Ok(())
            }
            Type::Union(members) => write_list(f, members, "|"),
            Type::Intersection(members) => write_list(f, members, "&"),
            Type::KeyOf(inner) => write!(f, "key-of<{inner}>"),
            Type::ValueOf(inner) => write!(f, "value-of<{inner}>"),
            Type::OffsetAccess { base, offset } => write!(f, "{base}[{offset}]"),
            Type::Conditional {
                subject,
                target,
                if_true,
                if_false,
                negated,
            } => {
                f.write_str("(")?;
                match subject {
                    ConditionalSubject::Parameter(name) => write!(f, "${name}")?,
                    ConditionalSubject::Type(ty) => write!(f, "{ty}")?,
                }
                let is = if *negated { "is not" } else { "is" };
                write!(f, " {is} {target} ? {if_true} : {if_false})")
            }
        }
    }
}

fn write_bound(f: &mut fmt::Formatter<'_>, bound: Option<i64>, open: &str) -> fmt::Result {
    match bound {
        Some(value) => write!(f, "{value}"),
        None => f.write_str(open),
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("'")?;
    for ch in value.chars() {
        match ch {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            _ => write!(f, "{ch}")?,
        }
    }
    f.write_str("'")
}

fn write_list(f: &mut fmt::Formatter<'_>, types: &[Type], separator: &str) -> fmt::Result {
    for (index, ty) in types.iter().enumerate() {
        if index > 0 {
            f.write_str(separator)?;
        }
        // Compound members of a union/intersection need parentheses.
        let wrap = separator != ", "
            && matches!(ty, Type::Union(_) | Type::Intersection(_) | Type::Callable { .. });
        if wrap {
            write!(f, "({ty})")?;
        } else {
            write!(f, "{ty}")?;
        }
    }
    Ok(())
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[ShapeItem]) -> fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        if let Some(key) = &item.key {
            match key {
                ShapeKey::Int(value) => write!(f, "{value}")?,
                ShapeKey::String(value) => {
                    if is_bare_key(value) {
                        f.write_str(value)?;
                    } else {
                        write_quoted(f, value)?;
                    }
                }
            }
            if item.optional {
                f.write_str("?")?;
            }
            f.write_str(": ")?;
        }
        write!(f, "{}", item.value)?;
    }
    Ok(())
}

fn is_bare_key(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn write_param(f: &mut fmt::Formatter<'_>, param: &CallableParam) -> fmt::Result {
    write!(f, "{}", param.ty)?;
    if param.by_ref {
        f.write_str(" &")?;
    }
    if param.variadic {
        f.write_str(" ...")?;
    }
    if let Some(name) = &param.name {
        if !param.by_ref && !param.variadic {
            f.write_str(" ")?;
        }
        write!(f, "${name}")?;
    }
    if param.optional {
        f.write_str("=")?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod tests;
