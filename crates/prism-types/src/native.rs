//! Native type hints.
//!
//! Compiles the language's own type syntax into [`Type`]. Reserved
//! keywords are matched case-insensitively; everything else is a class name
//! resolved through the [`TypeContext`].

use crate::context::TypeContext;
use crate::ty::Type;
use prism_syntax::{Name, TypeHint};

/// Compile a native type hint.
pub fn compile_hint(hint: &TypeHint, context: &TypeContext) -> Type {
    match hint {
        TypeHint::Identifier(name) => compile_identifier(name, context),
        TypeHint::Nullable(inner) => Type::nullable(compile_hint(inner, context)),
        TypeHint::Union(members) => {
            Type::union(members.iter().map(|member| compile_hint(member, context)).collect::<Vec<_>>())
        }
        TypeHint::Intersection(members) => Type::intersection(
            members
                .iter()
                .map(|member| compile_hint(member, context))
                .collect::<Vec<_>>(),
        ),
    }
}

fn compile_identifier(name: &Name, context: &TypeContext) -> Type {
    if name.is_unqualified() {
        if let Some(keyword) = keyword_type(name.as_str(), context) {
            return keyword;
        }
    }
    Type::named(context.names.resolve_class(name))
}

fn keyword_type(name: &str, context: &TypeContext) -> Option<Type> {
    let ty = match name.to_ascii_lowercase().as_str() {
        "int" => Type::Int,
        "float" => Type::Float,
        "string" => Type::String,
        "bool" => Type::Bool,
        "true" => Type::True,
        "false" => Type::False,
        "null" => Type::Null,
        "void" => Type::Void,
        "never" => Type::Never,
        "mixed" => Type::Mixed,
        "object" => Type::Object,
        "array" => Type::array(),
        "iterable" => Type::iterable(),
        "callable" => Type::callable(),
        "static" => Type::Static,
        // Unbound outside a class; kept as written.
        "self" => Type::named(context.self_name().unwrap_or_else(|| "self".to_string())),
        "parent" => Type::named(
            context
                .parent_class
                .clone()
                .unwrap_or_else(|| "parent".to_string()),
        ),
        _ => return None,
    };
    Some(ty)
}

#[cfg(test)]
#[path = "../tests/native_tests.rs"]
mod tests;
