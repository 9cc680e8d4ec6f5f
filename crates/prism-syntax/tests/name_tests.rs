use super::*;

#[test]
fn test_name_forms() {
    let fq = Name::from("\\App\\Model\\User");
    assert!(fq.is_fully_qualified());
    assert!(!fq.is_qualified());
    assert_eq!(fq.without_prefix(), "App\\Model\\User");

    let qualified = Name::from("Model\\User");
    assert!(qualified.is_qualified());
    assert_eq!(qualified.first_segment(), "Model");
    assert_eq!(qualified.rest_after_first(), Some("User"));

    let bare = Name::from("User");
    assert!(bare.is_unqualified());
    assert_eq!(bare.rest_after_first(), None);
    assert_eq!(bare.last_segment(), "User");

    let relative = Name::from("namespace\\User");
    assert!(relative.is_relative());
    assert!(!relative.is_qualified());
    assert_eq!(relative.without_prefix(), "User");
}

#[test]
fn test_keyword_match_is_case_insensitive() {
    assert!(Name::from("SELF").is_keyword("self"));
    assert!(Name::from("Int").is_keyword("int"));
    assert!(!Name::from("\\self").is_keyword("self"));
    assert!(!Name::from("App\\self").is_keyword("self"));
}

#[test]
fn test_last_segment_of_fully_qualified() {
    assert_eq!(Name::from("\\Foo\\Bar").last_segment(), "Bar");
}
