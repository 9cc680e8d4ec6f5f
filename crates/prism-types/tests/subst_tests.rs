use super::*;
use crate::id::ClassId;

fn template(class: &str, name: &str) -> TemplateId {
    TemplateId::of_class(ClassId::named(class), name)
}

#[test]
fn test_apply_replaces_nested_templates() {
    let t = template("Box", "T");
    let subst: TemplateSubstitution = [(t.clone(), Type::Int)].into_iter().collect();

    let ty = Type::union([
        Type::list_of(Type::Template(t.clone())),
        Type::generic("Option", vec![Type::Template(t)]),
    ]);
    assert_eq!(
        subst.apply(&ty),
        Type::union([Type::list_of(Type::Int), Type::generic("Option", vec![Type::Int])])
    );
}

#[test]
fn test_foreign_templates_are_untouched() {
    let subst: TemplateSubstitution = [(template("Box", "T"), Type::Int)].into_iter().collect();
    let other = Type::Template(template("Other", "T"));
    assert_eq!(subst.apply(&other), other);
}

#[test]
fn test_substituted_union_collapses() {
    let t = template("Box", "T");
    let subst: TemplateSubstitution = [(t.clone(), Type::Int)].into_iter().collect();
    let ty = Type::Union(vec![Type::Template(t), Type::Int]);
    assert_eq!(subst.apply(&ty), Type::Int);
}

#[test]
fn test_callable_signature_is_substituted() {
    let t = template("Box", "T");
    let subst: TemplateSubstitution = [(t.clone(), Type::String)].into_iter().collect();
    let ty = Type::Callable {
        kind: crate::ty::CallableKind::Closure,
        params: vec![CallableParam {
            ty: Type::Template(t.clone()),
            name: Some("x".to_string()),
            optional: false,
            variadic: false,
            by_ref: false,
        }],
        ret: Some(Box::new(Type::Template(t))),
    };
    let Type::Callable { params, ret, .. } = subst.apply(&ty) else {
        panic!("expected callable");
    };
    assert_eq!(params[0].ty, Type::String);
    assert_eq!(ret.as_deref(), Some(&Type::String));
}

#[test]
fn test_apply_layers() {
    let t = template("Box", "T");
    let subst: TemplateSubstitution = [(t.clone(), Type::Int)].into_iter().collect();
    let layers = TypeLayers::from_native(Some(Type::Mixed)).with_annotated(Type::Template(t));
    let applied = subst.apply_layers(&layers);
    assert_eq!(applied.native(), Some(&Type::Mixed));
    assert_eq!(applied.annotated(), Some(&Type::Int));
}
