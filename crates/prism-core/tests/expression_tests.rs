use super::*;
use crate::data;
use crate::error::{EvaluationError, ReflectionError};
use crate::session::Reflect;
use crate::typed_map::TypedMap;
use prism_syntax::{Expr, MagicConstant};
use prism_syntax::builder::*;
use prism_types::{DeclId, NameContext, ShapeKind, Type};
use rustc_hash::FxHashMap;

fn names() -> NameContext {
    let mut names = NameContext::new(Some("App"));
    names.import_class("Bar", "Lib\\Bar");
    names
}

fn fetch(name: &str) -> Expression {
    Expression::ConstantFetch {
        primary: name.to_string(),
        fallback: None,
    }
}

fn local(expr: &Expression) -> Result<Value, EvaluationError> {
    expr.evaluate(&LocalContext, None)
}

/// Declarations served from a map.
#[derive(Default)]
struct Declarations {
    maps: FxHashMap<DeclId, TypedMap>,
}

impl Declarations {
    fn with(mut self, id: DeclId, data: TypedMap) -> Self {
        self.maps.insert(id, data);
        self
    }
}

impl Reflect for Declarations {
    fn reflect(&self, id: &DeclId) -> crate::error::Result<TypedMap> {
        self.maps
            .get(id)
            .cloned()
            .ok_or_else(|| ReflectionError::DeclarationNotFound(id.clone()))
    }
}

fn constant_map(value: Expression) -> TypedMap {
    TypedMap::new().with(&data::VALUE, value)
}

// =============================================================================
// Compilation
// =============================================================================

#[test]
fn test_keyword_constants_fold() {
    let names = names();
    let scope = CompileScope::new(&names);
    assert_eq!(
        compile(&const_fetch("TRUE"), &scope).unwrap(),
        Expression::Value(Value::Bool(true))
    );
    assert_eq!(compile(&const_fetch("null"), &scope).unwrap(), Expression::Value(Value::Null));
}

#[test]
fn test_unqualified_constant_gets_global_fallback() {
    let names = names();
    let scope = CompileScope::new(&names);
    assert_eq!(
        compile(&const_fetch("LIMIT"), &scope).unwrap(),
        Expression::ConstantFetch {
            primary: "App\\LIMIT".to_string(),
            fallback: Some("LIMIT".to_string()),
        }
    );
    assert_eq!(
        compile(&const_fetch("\\LIMIT"), &scope).unwrap(),
        Expression::ConstantFetch {
            primary: "LIMIT".to_string(),
            fallback: None,
        }
    );
}

#[test]
fn test_self_and_parent_are_bound() {
    let names = names();
    let class = ClassId::named("App\\Foo");
    let scope = CompileScope::new(&names).with_class(&class, Some("App\\Base"), false);
    assert_eq!(
        compile(&class_const("self", "A"), &scope).unwrap(),
        Expression::ClassConstantFetch {
            class: ClassTarget::Class(class.clone()),
            name: "A".to_string(),
        }
    );
    assert_eq!(
        compile(&class_const("parent", "B"), &scope).unwrap(),
        Expression::ClassConstantFetch {
            class: ClassTarget::Class(ClassId::named("App\\Base")),
            name: "B".to_string(),
        }
    );
    assert_eq!(
        compile(&class_const("static", "C"), &scope).unwrap(),
        Expression::ClassConstantFetch {
            class: ClassTarget::Static,
            name: "C".to_string(),
        }
    );
}

#[test]
fn test_parent_without_parent_is_not_constant() {
    let names = names();
    let class = ClassId::named("App\\Foo");
    let scope = CompileScope::new(&names).with_class(&class, None, false);
    assert!(matches!(
        compile(&class_const("parent", "B"), &scope),
        Err(EvaluationError::NotConstant(_))
    ));
    assert!(matches!(
        compile(&class_const("self", "B"), &CompileScope::new(&names)),
        Err(EvaluationError::NotConstant(_))
    ));
}

#[test]
fn test_class_name_literal_uses_imports() {
    let names = names();
    let scope = CompileScope::new(&names);
    assert_eq!(
        compile(&class_const("Bar", "class"), &scope).unwrap(),
        Expression::Value(Value::String("Lib\\Bar".to_string()))
    );
    assert_eq!(
        compile(&class_const("Baz", "class"), &scope).unwrap(),
        Expression::Value(Value::String("App\\Baz".to_string()))
    );
}

#[test]
fn test_magic_constants_fold() {
    let names = names();
    let class = ClassId::named("App\\Foo");
    let scope = CompileScope::new(&names)
        .with_file(Some("src/Foo.php"))
        .with_class(&class, None, false)
        .with_function("run");
    let folded = |constant| compile(&magic(constant, 12), &scope).unwrap();
    let text = |value: &str| Expression::Value(Value::String(value.to_string()));

    assert_eq!(folded(MagicConstant::Line), Expression::Value(Value::Int(12)));
    assert_eq!(folded(MagicConstant::File), text("src/Foo.php"));
    assert_eq!(folded(MagicConstant::Dir), text("src"));
    assert_eq!(folded(MagicConstant::Namespace), text("App"));
    assert_eq!(folded(MagicConstant::Class), text("App\\Foo"));
    assert_eq!(folded(MagicConstant::Trait), text(""));
    assert_eq!(folded(MagicConstant::Method), text("App\\Foo::run"));
    assert_eq!(folded(MagicConstant::Property), text(""));
}

#[test]
fn test_class_magic_in_trait_is_empty() {
    let names = names();
    let class = ClassId::named("App\\Greets");
    let scope = CompileScope::new(&names).with_class(&class, None, true);
    let class_magic = compile(&magic(MagicConstant::Class, 1), &scope).unwrap();
    let trait_magic = compile(&magic(MagicConstant::Trait, 1), &scope).unwrap();
    assert_eq!(class_magic, Expression::Value(Value::String(String::new())));
    assert_eq!(trait_magic, Expression::Value(Value::String("App\\Greets".to_string())));
}

#[test]
fn test_runtime_constructs_are_rejected() {
    let names = names();
    let scope = CompileScope::new(&names);
    assert!(matches!(
        compile(&variable("x"), &scope),
        Err(EvaluationError::NotConstant("variable"))
    ));
    assert!(matches!(
        compile(&closure().expr(), &scope),
        Err(EvaluationError::NotConstant("closure"))
    ));
}

#[test]
fn test_coalesce_on_element_compiles_to_guarded_fetch() {
    let names = names();
    let scope = CompileScope::new(&names);
    let expr = binary(
        prism_syntax::BinaryOp::Coalesce,
        dim(list([int(1)]), int(3)),
        string("none"),
    );
    let compiled = compile(&expr, &scope).unwrap();
    assert!(matches!(compiled, Expression::ArrayFetchCoalesce { .. }));
    assert_eq!(local(&compiled).unwrap(), Value::String("none".to_string()));
}

// =============================================================================
// Evaluation
// =============================================================================

#[test]
fn test_short_circuit_skips_undefined_operands() {
    let and = Expression::Binary {
        op: BinaryOp::LogicalAnd,
        left: Box::new(Expression::Value(Value::Bool(false))),
        right: Box::new(fetch("MISSING")),
    };
    assert_eq!(local(&and).unwrap(), Value::Bool(false));

    let coalesce = Expression::Binary {
        op: BinaryOp::Coalesce,
        left: Box::new(Expression::Value(Value::Int(1))),
        right: Box::new(fetch("MISSING")),
    };
    assert_eq!(local(&coalesce).unwrap(), Value::Int(1));

    let elvis = Expression::Ternary {
        condition: Box::new(Expression::Value(Value::Int(5))),
        then: None,
        otherwise: Box::new(fetch("MISSING")),
    };
    assert_eq!(local(&elvis).unwrap(), Value::Int(5));
}

#[test]
fn test_undefined_constant() {
    let expr = Expression::ConstantFetch {
        primary: "App\\MISSING".to_string(),
        fallback: Some("MISSING".to_string()),
    };
    assert!(matches!(
        local(&expr),
        Err(EvaluationError::UndefinedConstant(name)) if name == "App\\MISSING"
    ));
}

#[test]
fn test_builtin_constants_resolve_locally() {
    let expr = Expression::ConstantFetch {
        primary: "App\\PHP_INT_MAX".to_string(),
        fallback: Some("PHP_INT_MAX".to_string()),
    };
    assert_eq!(local(&expr).unwrap(), Value::Int(i64::MAX));
}

#[test]
fn test_static_is_bound_late() {
    let expr = Expression::ClassConstantFetch {
        class: ClassTarget::Static,
        name: "class".to_string(),
    };
    let class = ClassId::named("App\\Child");
    assert_eq!(
        expr.evaluate(&LocalContext, Some(&class)).unwrap(),
        Value::String("App\\Child".to_string())
    );
    assert!(matches!(local(&expr), Err(EvaluationError::UnboundStatic)));
}

#[test]
fn test_array_literal_with_spread() {
    let names = names();
    let scope = CompileScope::new(&names);
    let expr = Expr::Array(vec![
        prism_syntax::ArrayItem {
            key: None,
            value: int(1),
            spread: false,
        },
        spread(list([int(2), int(3)])),
        prism_syntax::ArrayItem {
            key: Some(string("k")),
            value: int(4),
            spread: false,
        },
    ]);
    let value = local(&compile(&expr, &scope).unwrap()).unwrap();
    assert_eq!(
        value,
        Value::Array(vec![
            (ArrayKey::Int(0), Value::Int(1)),
            (ArrayKey::Int(1), Value::Int(2)),
            (ArrayKey::Int(2), Value::Int(3)),
            (ArrayKey::String("k".to_string()), Value::Int(4)),
        ])
    );
}

#[test]
fn test_instantiation_evaluates_arguments() {
    let names = names();
    let scope = CompileScope::new(&names);
    let expr = new("Bar", [binary(prism_syntax::BinaryOp::Add, int(1), int(2))]);
    assert_eq!(
        local(&compile(&expr, &scope).unwrap()).unwrap(),
        Value::Object {
            class: ClassId::named("Lib\\Bar"),
            arguments: vec![(None, Value::Int(3))],
        }
    );
}

#[test]
fn test_missing_array_key() {
    let expr = Expression::ArrayFetch {
        array: Box::new(Expression::Value(Value::Array(Vec::new()))),
        key: Box::new(Expression::Value(Value::String("x".to_string()))),
    };
    assert!(matches!(
        local(&expr),
        Err(EvaluationError::UndefinedKey(key)) if key == "\"x\""
    ));
}

#[test]
fn test_nesting_limit() {
    let mut expr = Expression::Value(Value::Bool(true));
    for _ in 0..300 {
        expr = Expression::Unary {
            op: UnaryOp::Not,
            operand: Box::new(expr),
        };
    }
    assert!(matches!(local(&expr), Err(EvaluationError::TooDeep)));
}

// =============================================================================
// Evaluator
// =============================================================================

#[test]
fn test_constants_refer_to_each_other() {
    let declarations = Declarations::default()
        .with(
            DeclId::constant("App\\BASE"),
            constant_map(Expression::Value(Value::Int(40))),
        )
        .with(
            DeclId::constant("App\\ANSWER"),
            constant_map(Expression::Binary {
                op: BinaryOp::Add,
                left: Box::new(fetch("App\\BASE")),
                right: Box::new(Expression::Value(Value::Int(2))),
            }),
        );
    let evaluator = Evaluator::new(&declarations, 64);
    assert_eq!(fetch("App\\ANSWER").evaluate(&evaluator, None).unwrap(), Value::Int(42));
}

#[test]
fn test_circular_constants() {
    let declarations = Declarations::default()
        .with(DeclId::constant("A"), constant_map(fetch("B")))
        .with(DeclId::constant("B"), constant_map(fetch("A")));
    let evaluator = Evaluator::new(&declarations, 64);
    assert!(matches!(
        fetch("A").evaluate(&evaluator, None),
        Err(EvaluationError::CircularReference(_))
    ));
}

#[test]
fn test_class_constants_bind_static_to_their_class() {
    let class = ClassId::named("App\\Limits");
    let constants: data::Members = [
        ("MIN".to_string(), constant_map(Expression::Value(Value::Int(1)))),
        (
            "NEXT".to_string(),
            constant_map(Expression::Binary {
                op: BinaryOp::Add,
                left: Box::new(Expression::ClassConstantFetch {
                    class: ClassTarget::Static,
                    name: "MIN".to_string(),
                }),
                right: Box::new(Expression::Value(Value::Int(1))),
            }),
        ),
        (
            "Open".to_string(),
            TypedMap::new().with(&data::ENUM_CASE, true),
        ),
    ]
    .into_iter()
    .collect();
    let declarations = Declarations::default().with(
        DeclId::Class(class.clone()),
        TypedMap::new().with(&data::CONSTANTS, constants),
    );
    let evaluator = Evaluator::new(&declarations, 64);
    let get = |name: &str| {
        Expression::ClassConstantFetch {
            class: ClassTarget::Class(class.clone()),
            name: name.to_string(),
        }
        .evaluate(&evaluator, None)
    };

    assert_eq!(get("NEXT").unwrap(), Value::Int(2));
    assert_eq!(
        get("Open").unwrap(),
        Value::EnumCase {
            class: class.clone(),
            case: "Open".to_string(),
        }
    );
    assert!(matches!(
        get("MAX"),
        Err(EvaluationError::UndefinedClassConstant { name, .. }) if name == "MAX"
    ));
}

#[test]
fn test_reflection_failures_surface() {
    let declarations = Declarations::default();
    let evaluator = Evaluator::new(&declarations, 64);
    let expr = Expression::ClassConstantFetch {
        class: ClassTarget::Class(ClassId::named("Nope")),
        name: "A".to_string(),
    };
    assert!(matches!(
        expr.evaluate(&evaluator, None),
        Err(EvaluationError::Reflection(error))
            if matches!(*error, ReflectionError::DeclarationNotFound(_))
    ));
}

// =============================================================================
// Inference
// =============================================================================

#[test]
fn test_literal_types() {
    assert_eq!(infer_type(&Expression::Value(Value::Int(1))), Some(Type::IntLiteral(1)));
    let list = Expression::Value(Value::Array(vec![
        (ArrayKey::Int(0), Value::Int(1)),
        (ArrayKey::Int(1), Value::Int(2)),
    ]));
    let Some(Type::Shape { kind, items, .. }) = infer_type(&list) else {
        panic!("expected a shape");
    };
    assert_eq!(kind, ShapeKind::List);
    assert_eq!(items.len(), 2);
}

#[test]
fn test_structural_types() {
    let concat = Expression::Binary {
        op: BinaryOp::Concat,
        left: Box::new(fetch("X")),
        right: Box::new(Expression::Value(Value::String("a".to_string()))),
    };
    assert_eq!(infer_type(&concat), Some(Type::String));

    let object = Expression::Instantiation {
        class: ClassTarget::Class(ClassId::named("App\\Money")),
        arguments: vec![Argument {
            name: None,
            value: fetch("X"),
        }],
    };
    assert_eq!(infer_type(&object), Some(Type::named("App\\Money")));
    assert_eq!(infer_type(&fetch("X")), None);

    let divide = Expression::Binary {
        op: BinaryOp::Divide,
        left: Box::new(fetch("X")),
        right: Box::new(Expression::Value(Value::Int(2))),
    };
    assert_eq!(infer_type(&divide), Some(Type::union([Type::Int, Type::Float])));
}

#[test]
fn test_widening() {
    assert_eq!(widen(&Type::IntLiteral(3)), Type::Int);
    assert_eq!(widen(&Type::True), Type::Bool);
    let list = type_of_value(&Value::Array(vec![
        (ArrayKey::Int(0), Value::Int(1)),
        (ArrayKey::Int(1), Value::String("a".to_string())),
    ]));
    assert_eq!(widen(&list), Type::list_of(Type::union([Type::Int, Type::String])));
    let map = type_of_value(&Value::Array(vec![(
        ArrayKey::String("a".to_string()),
        Value::Float(1.5),
    )]));
    assert_eq!(widen(&map), Type::array_of(Type::String, Type::Float));
    assert_eq!(widen(&type_of_value(&Value::Array(Vec::new()))), Type::array());
}
