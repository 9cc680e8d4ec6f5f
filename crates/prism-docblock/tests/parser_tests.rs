use super::*;

fn ident(name: &str) -> TypeNode {
    TypeNode::Identifier(name.to_string())
}

#[test]
fn test_union_of_keywords() {
    assert_eq!(
        parse_type("int|string|null").unwrap(),
        TypeNode::Union(vec![ident("int"), ident("string"), ident("null")])
    );
}

#[test]
fn test_nullable_array_suffix() {
    assert_eq!(
        parse_type("?Foo[]").unwrap(),
        TypeNode::Nullable(Box::new(TypeNode::ArrayOf(Box::new(ident("Foo")))))
    );
}

#[test]
fn test_nested_generics() {
    assert_eq!(
        parse_type("array<int, list<string>>").unwrap(),
        TypeNode::Generic {
            base: "array".to_string(),
            args: vec![
                ident("int"),
                TypeNode::Generic {
                    base: "list".to_string(),
                    args: vec![ident("string")],
                },
            ],
        }
    );
}

#[test]
fn test_array_shape_with_optional_key_and_unsealed_tail() {
    assert_eq!(
        parse_type("array{id: int, name?: string, ...}").unwrap(),
        TypeNode::Shape {
            base: "array".to_string(),
            items: vec![
                ShapeItemNode {
                    key: Some(ShapeKeyNode::Identifier("id".to_string())),
                    optional: false,
                    value: ident("int"),
                },
                ShapeItemNode {
                    key: Some(ShapeKeyNode::Identifier("name".to_string())),
                    optional: true,
                    value: ident("string"),
                },
            ],
            sealed: false,
        }
    );
}

#[test]
fn test_positional_list_shape() {
    let TypeNode::Shape { base, items, sealed } = parse_type("list{int, ?string}").unwrap() else {
        panic!("expected shape");
    };
    assert_eq!(base, "list");
    assert!(sealed);
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|item| item.key.is_none()));
}

#[test]
fn test_callable_signature() {
    assert_eq!(
        parse_type("callable(int, string=): void").unwrap(),
        TypeNode::Callable {
            base: "callable".to_string(),
            params: vec![
                CallableParamNode {
                    ty: ident("int"),
                    name: None,
                    by_ref: false,
                    variadic: false,
                    optional: false,
                },
                CallableParamNode {
                    ty: ident("string"),
                    name: None,
                    by_ref: false,
                    variadic: false,
                    optional: true,
                },
            ],
            ret: Some(Box::new(ident("void"))),
        }
    );
}

#[test]
fn test_closure_by_ref_and_variadic_params() {
    let TypeNode::Callable { params, .. } =
        parse_type("Closure(int &$x, string ...$rest): void").unwrap()
    else {
        panic!("expected callable");
    };
    assert!(params[0].by_ref);
    assert_eq!(params[0].name.as_deref(), Some("x"));
    assert!(params[1].variadic);
    assert_eq!(params[1].name.as_deref(), Some("rest"));
}

#[test]
fn test_parameter_conditional() {
    assert_eq!(
        parse_type("($x is string ? int : float)").unwrap(),
        TypeNode::Conditional {
            subject: SubjectNode::Parameter("x".to_string()),
            target: Box::new(ident("string")),
            if_true: Box::new(ident("int")),
            if_false: Box::new(ident("float")),
            negated: false,
        }
    );
}

#[test]
fn test_negated_type_conditional() {
    let TypeNode::Conditional {
        subject, negated, ..
    } = parse_type("T is not null ? T : never").unwrap()
    else {
        panic!("expected conditional");
    };
    assert_eq!(subject, SubjectNode::Type(Box::new(ident("T"))));
    assert!(negated);
}

#[test]
fn test_const_fetch_and_wildcard() {
    assert_eq!(
        parse_type("Foo::BAR_*").unwrap(),
        TypeNode::ConstFetch {
            class: "Foo".to_string(),
            name: "BAR_*".to_string(),
        }
    );
    assert_eq!(
        parse_type("self::class").unwrap(),
        TypeNode::ConstFetch {
            class: "self".to_string(),
            name: "class".to_string(),
        }
    );
}

#[test]
fn test_offset_access() {
    assert_eq!(
        parse_type("T['key']").unwrap(),
        TypeNode::OffsetAccess {
            base: Box::new(ident("T")),
            offset: Box::new(TypeNode::StringLiteral("key".to_string())),
        }
    );
}

#[test]
fn test_prefix_leaves_description() {
    let (ty, rest) = parse_type_prefix("int $x the description").unwrap();
    assert_eq!(ty, ident("int"));
    assert_eq!(rest, "$x the description");

    let (_, rest) = parse_type_prefix("array <b>html</b>").unwrap();
    assert_eq!(rest, "<b>html</b>");
}

#[test]
fn test_unlexable_description_is_not_an_error() {
    let (ty, rest) = parse_type_prefix("int 'unterminated").unwrap();
    assert_eq!(ty, ident("int"));
    assert_eq!(rest.trim_start(), "'unterminated");
}

#[test]
fn test_malformed_types_fail() {
    assert!(parse_type("array<int").is_err());
    assert!(parse_type("int garbage").is_err());
    assert!(parse_type("array{id: }").is_err());
    assert!(parse_type("").is_err());
}

#[test]
fn test_nesting_depth_is_bounded() {
    let text = format!("{}int", "?".repeat(200));
    assert_eq!(parse_type(&text), Err(DocParseError::TooDeep));
}
