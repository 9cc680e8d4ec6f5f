use super::*;
use crate::expression::ClassTarget;
use prism_syntax::builder::*;

fn reflect_all(tree: SourceFile) -> Vec<(DeclId, TypedMap)> {
    let base = TypedMap::new().with(&data::FILE, "src/a.php".to_string());
    NodeReflector::collect(&tree, &base)
        .into_iter()
        .map(|declaration| {
            let id = declaration.id.clone();
            (id, declaration.materialize().unwrap())
        })
        .collect()
}

fn reflect_one(tree: SourceFile, id: &DeclId) -> TypedMap {
    reflect_all(tree)
        .into_iter()
        .find(|(candidate, _)| candidate == id)
        .map(|(_, data)| data)
        .unwrap()
}

fn app_user(class: ClassLikeBuilder) -> TypedMap {
    reflect_one(
        file([namespace("App", [class.statement()])]),
        &DeclId::class("App\\User"),
    )
}

#[test]
fn test_collects_top_level_declarations_in_order() {
    let tree = file([namespace(
        "App",
        [
            class("User").statement(),
            function("helper").statement(),
            const_statement("VERSION", string("1.0")),
        ],
    )]);
    let ids: Vec<DeclId> = reflect_all(tree).into_iter().map(|(id, _)| id).collect();
    assert_eq!(
        ids,
        vec![
            DeclId::class("App\\User"),
            DeclId::function("App\\helper"),
            DeclId::constant("App\\VERSION"),
        ]
    );
}

#[test]
fn test_class_facts() {
    let tree = file([namespace(
        "App",
        [
            use_class("Lib\\Model", None),
            class("User")
                .final_()
                .extends("Model")
                .implements("Jsonable")
                .doc("/** @template T */")
                .statement(),
        ],
    )]);
    let user = reflect_one(tree, &DeclId::class("App\\User"));

    assert_eq!(user.get(&data::NAME).map(String::as_str), Some("App\\User"));
    assert_eq!(user.get(&data::NAMESPACE).map(String::as_str), Some("App"));
    assert_eq!(user.get(&data::CLASS_KIND), Some(&ClassKind::Class));
    assert_eq!(user.get(&data::FILE).map(String::as_str), Some("src/a.php"));
    assert!(*user.get(&data::NATIVE_FINAL));
    assert_eq!(
        user.get(&data::UNRESOLVED_PARENT),
        Some(&UnresolvedReference::new("Lib\\Model"))
    );
    assert_eq!(
        *user.get(&data::UNRESOLVED_INTERFACES),
        vec![UnresolvedReference::new("App\\Jsonable")]
    );
    assert_eq!(user.get(&data::DOC_COMMENT).map(String::as_str), Some("/** @template T */"));
    assert!(user.contains(&data::TYPE_CONTEXT));
}

#[test]
fn test_nested_declarations_get_positional_identities() {
    let tree = file([function("make").body([
        return_(Some(anonymous_class().at(3, 9).instantiate([]))),
        expr_statement(closure().at(4, 5).expr()),
    ])
    .statement()]);
    let all = reflect_all(tree);
    let ids: Vec<&DeclId> = all.iter().map(|(id, _)| id).collect();
    let anonymous = DeclId::Class(ClassId::anonymous("src/a.php", 3, 9));
    let closure_id = DeclId::Function(FunctionId::anonymous("src/a.php", 4, 5));
    assert_eq!(ids, vec![&DeclId::function("make"), &anonymous, &closure_id]);

    let class = &all[1].1;
    assert_eq!(class.get(&data::CLASS_KIND), Some(&ClassKind::AnonymousClass));
    assert_eq!(class.get(&data::NAME).map(String::as_str), Some("class@src/a.php:3:9"));
    assert_eq!(all[2].1.get(&data::NAME).map(String::as_str), Some("{closure}"));
}

#[test]
fn test_null_default_widens_the_native_type() {
    let tree = file([function("find")
        .param(param("limit").hint(hint("int")).default(null()))
        .param(param("tags").variadic())
        .returns(nullable(hint("string")))
        .statement()]);
    let find = reflect_one(tree, &DeclId::function("find"));

    let limit = data::member(&find, &data::PARAMETERS, "limit").unwrap();
    assert_eq!(limit.get(&data::TYPE).native(), Some(&Type::nullable(Type::Int)));
    assert!(data::is_optional(&limit));

    let tags = data::member(&find, &data::PARAMETERS, "tags").unwrap();
    assert!(*tags.get(&data::VARIADIC));
    assert!(tags.get(&data::TYPE).native().is_none());

    assert_eq!(
        find.get(&data::TYPE).native(),
        Some(&Type::nullable(Type::String))
    );
}

#[test]
fn test_untyped_properties_default_to_null() {
    let user = app_user(
        class("User")
            .property(property("name"))
            .property(property("id").hint(hint("int")))
            .property(property("count").static_().default(int(0))),
    );
    let name = data::member(&user, &data::PROPERTIES, "name").unwrap();
    assert_eq!(name.get(&data::DEFAULT_VALUE), Some(&Expression::Value(Value::Null)));

    let id = data::member(&user, &data::PROPERTIES, "id").unwrap();
    assert!(id.get(&data::DEFAULT_VALUE).is_none());
    assert_eq!(id.get(&data::DECLARING_CLASS), Some(&ClassId::named("App\\User")));

    let count = data::member(&user, &data::PROPERTIES, "count").unwrap();
    assert!(*count.get(&data::STATIC));
    assert_eq!(count.get(&data::DEFAULT_VALUE), Some(&Expression::Value(Value::Int(0))));
}

#[test]
fn test_enum_facts() {
    let tree = file([namespace(
        "App",
        [enum_("Suit")
            .backed_by(hint("string"))
            .case("Hearts", Some(string("H")))
            .statement()],
    )]);
    let suit = reflect_one(tree, &DeclId::class("App\\Suit"));

    assert_eq!(suit.get(&data::CLASS_KIND), Some(&ClassKind::Enum));
    assert!(*suit.get(&data::NATIVE_FINAL));
    assert_eq!(suit.get(&data::BACKING_TYPE), Some(&Type::String));

    let hearts = data::member(&suit, &data::CONSTANTS, "Hearts").unwrap();
    assert!(*hearts.get(&data::ENUM_CASE));
    assert_eq!(
        hearts.get(&data::VALUE),
        Some(&Expression::Value(Value::String("H".to_string())))
    );
    assert_eq!(
        hearts.get(&data::TYPE).native(),
        Some(&Type::named("App\\Suit"))
    );
}

#[test]
fn test_trait_adaptations() {
    let user = app_user(
        class("User").uses(
            trait_use(["Greets", "Waves"])
                .instead_of("Greets", "bye", &["Waves"])
                .alias(Some("Greets"), "hello", Some("hi"), Some(Visibility::Protected)),
        ),
    );
    assert_eq!(
        *user.get(&data::UNRESOLVED_MIXINS),
        vec![
            UnresolvedReference::new("App\\Greets"),
            UnresolvedReference::new("App\\Waves"),
        ]
    );
    assert_eq!(
        *user.get(&data::MIXIN_PRECEDENCE),
        vec![MixinPrecedence {
            mixin: "App\\Greets".to_string(),
            method: "bye".to_string(),
            instead_of: vec!["App\\Waves".to_string()],
        }]
    );
    assert_eq!(
        *user.get(&data::MIXIN_ALIASES),
        vec![MixinAlias {
            mixin: Some("App\\Greets".to_string()),
            method: "hello".to_string(),
            alias: Some("hi".to_string()),
            visibility: Some(Visibility::Protected),
        }]
    );
}

#[test]
fn test_method_facts() {
    let user = app_user(
        class("User")
            .method(method("items").body([expr_statement(yield_(Some(int(1))))]))
            .method(method("build").static_().by_ref().returns(hint("self")))
            .method(
                method("__construct")
                    .param(param("id").promoted(Visibility::Private).readonly()),
            ),
    );

    let items = data::member(&user, &data::METHODS, "items").unwrap();
    assert!(*items.get(&data::GENERATOR));

    let build = data::member(&user, &data::METHODS, "build").unwrap();
    assert!(*build.get(&data::STATIC));
    assert!(*build.get(&data::RETURNS_REFERENCE));
    assert!(!*build.get(&data::GENERATOR));
    assert_eq!(build.get(&data::TYPE).native(), Some(&Type::named("App\\User")));

    let constructor = data::member(&user, &data::METHODS, "__construct").unwrap();
    let id = data::member(&constructor, &data::PARAMETERS, "id").unwrap();
    assert!(*id.get(&data::PROMOTED));
    assert_eq!(*id.get(&data::VISIBILITY), Visibility::Private);
    assert!(data::is_readonly(&id));
}

#[test]
fn test_class_constants_bind_self() {
    let user = app_user(
        class("User")
            .constant(constant("A", int(1)))
            .constant(constant("B", class_const("self", "A")).visibility(Visibility::Private)),
    );
    let b = data::member(&user, &data::CONSTANTS, "B").unwrap();
    assert_eq!(
        b.get(&data::VALUE),
        Some(&Expression::ClassConstantFetch {
            class: ClassTarget::Class(ClassId::named("App\\User")),
            name: "A".to_string(),
        })
    );
    assert_eq!(*b.get(&data::VISIBILITY), Visibility::Private);

    let constants = user.get(&data::CONSTANTS);
    let names: Vec<&String> = constants.keys().collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[test]
fn test_attributes_are_compiled() {
    let user = app_user(class("User").attribute(attribute("Entity", [string("users")])));
    let attributes = user.get(&data::ATTRIBUTES);
    assert_eq!(attributes.len(), 1);
    assert_eq!(
        attributes[0].get(&data::ATTRIBUTE_CLASS).map(String::as_str),
        Some("App\\Entity")
    );
    assert_eq!(
        *attributes[0].get(&data::ARGUMENTS),
        vec![Argument {
            name: None,
            value: Expression::Value(Value::String("users".to_string())),
        }]
    );
}

#[test]
fn test_non_constant_default_fails_materialization() {
    let tree = file([function("f")
        .param(param("x").default(variable("y")))
        .statement()]);
    let declarations = NodeReflector::collect(&tree, &TypedMap::new());
    assert_eq!(declarations.len(), 1);
    let result = declarations.into_iter().next().unwrap().materialize();
    assert!(matches!(
        result,
        Err(crate::error::ReflectionError::Evaluation(EvaluationError::NotConstant("variable")))
    ));
}

#[test]
fn test_failed_materialization_can_be_repeated() {
    let tree = file([function("f")
        .param(param("x").default(variable("y")))
        .statement()]);
    let declaration = NodeReflector::collect(&tree, &TypedMap::new()).remove(0);
    let retry = declaration.clone();
    assert!(declaration.materialize().is_err());
    assert!(declaration.materialize().is_err());
    assert!(matches!(
        retry.materialize(),
        Err(crate::error::ReflectionError::Evaluation(EvaluationError::NotConstant("variable")))
    ));
}
