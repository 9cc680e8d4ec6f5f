use super::*;
use crate::error::ReflectionError;
use prism_types::TypeLayers;
use rustc_hash::FxHashMap;

struct Known(FxHashMap<DeclId, TypedMap>);

impl Reflect for Known {
    fn reflect(&self, id: &DeclId) -> Result<TypedMap> {
        self.0
            .get(id)
            .cloned()
            .ok_or_else(|| ReflectionError::DeclarationNotFound(id.clone()))
    }
}

fn declared(entries: impl IntoIterator<Item = (&'static str, TypedMap)>) -> Known {
    Known(
        entries
            .into_iter()
            .map(|(name, data)| (DeclId::class(name), data))
            .collect(),
    )
}

fn template(class: &str, name: &str) -> Type {
    Type::Template(TemplateId::of_class(ClassId::named(class), name))
}

fn member(class: &str, name: &str, ty: Type) -> TypedMap {
    TypedMap::new()
        .with(&data::NAME, name.to_string())
        .with(&data::DECLARING_CLASS, ClassId::named(class))
        .with(&data::TYPE, TypeLayers::new().with_annotated(ty))
}

fn members(entries: impl IntoIterator<Item = TypedMap>) -> Members {
    entries
        .into_iter()
        .map(|member| (member.get(&data::NAME).cloned().unwrap_or_default(), member))
        .collect()
}

fn templates(names: &[&str]) -> Members {
    members(
        names
            .iter()
            .map(|name| TypedMap::new().with(&data::NAME, name.to_string())),
    )
}

fn child_of(parent: &str, arguments: Vec<Type>) -> TypedMap {
    TypedMap::new().with(
        &data::UNRESOLVED_PARENT,
        UnresolvedReference {
            name: parent.to_string(),
            arguments,
        },
    )
}

fn generic_base() -> TypedMap {
    TypedMap::new()
        .with(&data::TEMPLATES, templates(&["T"]))
        .with(&data::METHODS, members([member("Base", "get", template("Base", "T"))]))
        .with(
            &data::PROPERTIES,
            members([
                member("Base", "visible", Type::Int),
                member("Base", "secret", Type::Int).with(&data::VISIBILITY, Visibility::Private),
            ]),
        )
}

fn resolved_type(data: &TypedMap, key: &DefaultKey<Members>, name: &str) -> Option<Type> {
    data::member(data, key, name).and_then(|member| member.get(&data::TYPE).resolved().cloned())
}

#[test]
fn test_parent_members_are_substituted() {
    let reflect = declared([("Base", generic_base())]);
    let sub = resolve(&ClassId::named("Sub"), child_of("Base", vec![Type::Int]), &reflect).unwrap();

    assert_eq!(resolved_type(&sub, &data::METHODS, "get"), Some(Type::Int));
    let get = data::member(&sub, &data::METHODS, "get").unwrap();
    assert_eq!(get.get(&data::DECLARING_CLASS), Some(&ClassId::named("Base")));

    let mut parents = Supertypes::new();
    parents.insert("Base".to_string(), vec![Type::Int]);
    assert_eq!(*sub.get(&data::PARENTS), parents);
}

#[test]
fn test_private_properties_are_not_inherited() {
    let reflect = declared([("Base", generic_base())]);
    let sub = resolve(&ClassId::named("Sub"), child_of("Base", vec![Type::Int]), &reflect).unwrap();
    assert!(data::member(&sub, &data::PROPERTIES, "visible").is_some());
    assert!(data::member(&sub, &data::PROPERTIES, "secret").is_none());
}

#[test]
fn test_own_members_override_inherited_ones() {
    let reflect = declared([("Base", generic_base())]);
    let data = child_of("Base", vec![Type::Int])
        .with(&data::METHODS, members([member("Sub", "get", Type::String)]));
    let sub = resolve(&ClassId::named("Sub"), data, &reflect).unwrap();

    let get = data::member(&sub, &data::METHODS, "get").unwrap();
    assert_eq!(get.get(&data::DECLARING_CLASS), Some(&ClassId::named("Sub")));
    assert_eq!(resolved_type(&sub, &data::METHODS, "get"), Some(Type::String));
}

#[test]
fn test_method_override_ignores_case() {
    let base = TypedMap::new().with(&data::METHODS, members([member("Base", "getName", Type::Int)]));
    let reflect = declared([("Base", base)]);
    let data = child_of("Base", Vec::new())
        .with(&data::METHODS, members([member("Sub", "getname", Type::String)]));
    let sub = resolve(&ClassId::named("Sub"), data, &reflect).unwrap();

    let names: Vec<String> = sub.get(&data::METHODS).keys().cloned().collect();
    assert_eq!(names, vec!["getname".to_string()]);
    assert_eq!(resolved_type(&sub, &data::METHODS, "getname"), Some(Type::String));
}

#[test]
fn test_interface_methods_do_not_duplicate_inherited_ones() {
    let countable = TypedMap::new().with(&data::METHODS, members([member("Countable", "COUNT", Type::Mixed)]));
    let base = TypedMap::new().with(&data::METHODS, members([member("Base", "count", Type::Int)]));
    let reflect = declared([("Base", base), ("Countable", countable)]);
    let data = child_of("Base", Vec::new()).with(
        &data::UNRESOLVED_INTERFACES,
        vec![UnresolvedReference::new("Countable")],
    );
    let sub = resolve(&ClassId::named("Sub"), data, &reflect).unwrap();

    assert_eq!(sub.get(&data::METHODS).len(), 1);
    assert_eq!(resolved_type(&sub, &data::METHODS, "count"), Some(Type::Int));
}

#[test]
fn test_own_methods_shadow_mixin_methods_in_any_case() {
    let greets = TypedMap::new().with(
        &data::METHODS,
        members([member("Greets", "Hello", Type::Int), member("Greets", "bye", Type::Int)]),
    );
    let reflect = declared([("Greets", greets)]);
    let data = TypedMap::new()
        .with(&data::UNRESOLVED_MIXINS, vec![UnresolvedReference::new("Greets")])
        .with(&data::METHODS, members([member("User", "hello", Type::String)]));
    let user = resolve(&ClassId::named("User"), data, &reflect).unwrap();

    let names: Vec<String> = user.get(&data::METHODS).keys().cloned().collect();
    assert_eq!(names, vec!["hello".to_string(), "bye".to_string()]);
    let hello = data::member(&user, &data::METHODS, "hello").unwrap();
    assert_eq!(hello.get(&data::DECLARING_CLASS), Some(&ClassId::named("User")));
}

#[test]
fn test_missing_arguments_fall_back_to_constraint_or_mixed() {
    let base = generic_base().with(
        &data::TEMPLATES,
        members([
            TypedMap::new().with(&data::NAME, "T".to_string()),
            TypedMap::new()
                .with(&data::NAME, "U".to_string())
                .with(&data::CONSTRAINT, Type::String),
        ]),
    );
    let substitution = substitution(&ClassId::named("Base"), &base, &[]);
    assert_eq!(substitution.apply(&template("Base", "T")), Type::Mixed);
    assert_eq!(substitution.apply(&template("Base", "U")), Type::String);
}

#[test]
fn test_transitive_interfaces_are_substituted() {
    let mut interfaces = Supertypes::new();
    interfaces.insert("Collection".to_string(), vec![template("Base", "T")]);
    let base = generic_base().with(&data::INTERFACES, interfaces);
    let reflect = declared([("Base", base)]);

    let sub = resolve(&ClassId::named("Sub"), child_of("Base", vec![Type::Int]), &reflect).unwrap();
    assert_eq!(
        sub.get(&data::INTERFACES).get("Collection"),
        Some(&vec![Type::Int])
    );
}

#[test]
fn test_interfaces_only_fill_missing_names() {
    let countable = TypedMap::new()
        .with(
            &data::METHODS,
            members([member("Countable", "count", Type::Int), member("Countable", "get", Type::Mixed)]),
        )
        .with(&data::CONSTANTS, members([member("Countable", "MAX", Type::Int)]));
    let mut inherited = Supertypes::new();
    inherited.insert("Traversable".to_string(), Vec::new());
    let countable = countable.with(&data::INTERFACES, inherited);
    let reflect = declared([("Base", generic_base()), ("Countable", countable)]);

    let data = child_of("Base", vec![Type::Int]).with(
        &data::UNRESOLVED_INTERFACES,
        vec![UnresolvedReference::new("Countable")],
    );
    let sub = resolve(&ClassId::named("Sub"), data, &reflect).unwrap();

    let interfaces: Vec<String> = sub.get(&data::INTERFACES).keys().cloned().collect();
    assert_eq!(interfaces, vec!["Countable", "Traversable"]);
    assert_eq!(resolved_type(&sub, &data::METHODS, "get"), Some(Type::Int));
    assert!(data::member(&sub, &data::METHODS, "count").is_some());
    assert!(data::member(&sub, &data::CONSTANTS, "MAX").is_some());
}

#[test]
fn test_mixin_precedence_and_aliases() {
    let greets = TypedMap::new().with(
        &data::METHODS,
        members([member("Greets", "hello", Type::String), member("Greets", "bye", Type::String)]),
    );
    let waves = TypedMap::new().with(&data::METHODS, members([member("Waves", "bye", Type::Int)]));
    let reflect = declared([("Greets", greets), ("Waves", waves)]);

    let data = TypedMap::new()
        .with(
            &data::UNRESOLVED_MIXINS,
            vec![UnresolvedReference::new("Greets"), UnresolvedReference::new("Waves")],
        )
        .with(
            &data::MIXIN_PRECEDENCE,
            vec![MixinPrecedence {
                mixin: "Greets".to_string(),
                method: "bye".to_string(),
                instead_of: vec!["Waves".to_string()],
            }],
        )
        .with(
            &data::MIXIN_ALIASES,
            vec![MixinAlias {
                mixin: Some("Greets".to_string()),
                method: "hello".to_string(),
                alias: Some("hi".to_string()),
                visibility: Some(Visibility::Protected),
            }],
        );
    let user = resolve(&ClassId::named("User"), data, &reflect).unwrap();

    let bye = data::member(&user, &data::METHODS, "bye").unwrap();
    assert_eq!(bye.get(&data::DECLARING_CLASS), Some(&ClassId::named("Greets")));

    let hi = data::member(&user, &data::METHODS, "hi").unwrap();
    assert_eq!(hi.get(&data::NAME).map(String::as_str), Some("hi"));
    assert_eq!(*hi.get(&data::VISIBILITY), Visibility::Protected);
    assert!(data::member(&user, &data::METHODS, "hello").is_some());

    let mixins: Vec<String> = user.get(&data::MIXINS).keys().cloned().collect();
    assert_eq!(mixins, vec!["Greets".to_string(), "Waves".to_string()]);
}

#[test]
fn test_visibility_only_alias_changes_the_method() {
    let greets = TypedMap::new().with(&data::METHODS, members([member("Greets", "hello", Type::String)]));
    let reflect = declared([("Greets", greets)]);
    let data = TypedMap::new()
        .with(&data::UNRESOLVED_MIXINS, vec![UnresolvedReference::new("Greets")])
        .with(
            &data::MIXIN_ALIASES,
            vec![MixinAlias {
                mixin: None,
                method: "HELLO".to_string(),
                alias: None,
                visibility: Some(Visibility::Private),
            }],
        );
    let user = resolve(&ClassId::named("User"), data, &reflect).unwrap();
    let hello = data::member(&user, &data::METHODS, "hello").unwrap();
    assert_eq!(*hello.get(&data::VISIBILITY), Visibility::Private);
    assert_eq!(user.get(&data::METHODS).len(), 1);
}

#[test]
fn test_missing_supertype_fails() {
    let reflect = Known(FxHashMap::default());
    let result = resolve(&ClassId::named("Sub"), child_of("Base", Vec::new()), &reflect);
    assert!(matches!(
        result,
        Err(ReflectionError::DeclarationNotFound(DeclId::Class(ClassId::Named(name)))) if name == "Base"
    ));
}
