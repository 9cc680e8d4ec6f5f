use super::*;
use crate::expression::{Expression, Value};

#[test]
fn test_defaults_read_without_stored_values() {
    let data = TypedMap::new();
    assert_eq!(*data.get(&VISIBILITY), Visibility::Public);
    assert_eq!(*data.get(&VARIANCE), Variance::Invariant);
    assert!(!*data.get(&STATIC));
    assert!(data.get(&METHODS).is_empty());
    assert!(data.get(&TYPE).resolved().is_none());
    assert!(data.is_empty());
}

#[test]
fn test_readonly_and_final_combine_native_and_annotated() {
    let data = TypedMap::new();
    assert!(!is_readonly(&data));
    assert!(is_readonly(&data.with(&NATIVE_READONLY, true)));
    assert!(is_readonly(&data.with(&ANNOTATED_READONLY, true)));
    assert!(!is_final(&data.with(&NATIVE_FINAL, false)));
    assert!(is_final(&data.with(&ANNOTATED_FINAL, true)));
}

#[test]
fn test_optional_parameters() {
    let required = TypedMap::new().with(&NAME, "id".to_string());
    assert!(!is_optional(&required));
    assert!(is_optional(&required.with(&VARIADIC, true)));
    assert!(is_optional(
        &required.with(&DEFAULT_VALUE, Expression::value(Value::Null))
    ));
}

#[test]
fn test_member_lookup() {
    let save = TypedMap::new().with(&NAME, "save".to_string());
    let mut methods = Members::new();
    methods.insert("save".to_string(), save.clone());
    let class = TypedMap::new().with(&METHODS, methods);

    assert_eq!(member(&class, &METHODS, "save"), Some(save));
    assert_eq!(member(&class, &METHODS, "load"), None);
    assert_eq!(member(&class, &PROPERTIES, "save"), None);
}

#[test]
fn test_working_keys_are_stripped_together() {
    let data = TypedMap::new()
        .with(&NAME, "App\\User".to_string())
        .with(&DOC_COMMENT, "/** @final */".to_string())
        .with(&UNRESOLVED_PARENT, UnresolvedReference::new("Base"));
    let stripped = data.without(&WORKING_KEYS);
    assert_eq!(stripped.keys(), vec!["name"]);
}

#[test]
fn test_class_kind() {
    assert!(ClassKind::Class.is_class());
    assert!(ClassKind::AnonymousClass.is_class());
    assert!(!ClassKind::Interface.is_class());
    assert!(!ClassKind::Enum.is_class());
}
