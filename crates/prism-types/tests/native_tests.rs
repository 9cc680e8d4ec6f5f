use super::*;
use crate::context::NameContext;
use crate::id::ClassId;
use prism_syntax::builder::{hint, intersection, nullable, union};

fn context() -> TypeContext {
    TypeContext::new(NameContext::new(Some("App")))
        .with_class(ClassId::named("App\\User"), Some("App\\Model".to_string()))
}

#[test]
fn test_keywords_are_case_insensitive() {
    let context = context();
    assert_eq!(compile_hint(&hint("INT"), &context), Type::Int);
    assert_eq!(compile_hint(&hint("Mixed"), &context), Type::Mixed);
    assert_eq!(compile_hint(&hint("array"), &context), Type::array());
}

#[test]
fn test_self_and_parent_bind_to_classes() {
    let context = context();
    assert_eq!(compile_hint(&hint("self"), &context), Type::named("App\\User"));
    assert_eq!(compile_hint(&hint("parent"), &context), Type::named("App\\Model"));
    assert_eq!(compile_hint(&hint("static"), &context), Type::Static);
}

#[test]
fn test_class_names_resolve_in_namespace() {
    let context = context();
    assert_eq!(compile_hint(&hint("Post"), &context), Type::named("App\\Post"));
    assert_eq!(compile_hint(&hint("\\DateTime"), &context), Type::named("DateTime"));
}

#[test]
fn test_nullable_union_and_intersection() {
    let context = context();
    assert_eq!(
        compile_hint(&nullable(hint("string")), &context),
        Type::Union(vec![Type::String, Type::Null])
    );
    assert_eq!(
        compile_hint(&union([hint("int"), hint("null")]), &context),
        Type::Union(vec![Type::Int, Type::Null])
    );
    assert_eq!(
        compile_hint(&intersection([hint("Countable"), hint("Traversable")]), &context),
        Type::Intersection(vec![Type::named("App\\Countable"), Type::named("App\\Traversable")])
    );
}
