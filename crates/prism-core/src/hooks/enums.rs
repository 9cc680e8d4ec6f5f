//! Members every enum has without declaring them.

use super::Hook;
use crate::data::{self, ClassKind, Members};
use crate::error::Result;
use crate::session::Reflect;
use crate::typed_map::TypedMap;
use prism_types::{ClassId, DeclId, Type, TypeLayers};

/// `name`, `cases()`, and for backed enums `value`, `from()`, `tryFrom()`.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnumMembersHook;

impl Hook for EnumMembersHook {
    fn name(&self) -> &'static str {
        "enum_members"
    }

    fn process(&self, id: &DeclId, data: TypedMap, _reflect: &dyn Reflect) -> Result<TypedMap> {
        let Some(class) = id.as_class() else {
            return Ok(data);
        };
        if data.get(&data::CLASS_KIND) != Some(&ClassKind::Enum) {
            return Ok(data);
        }
        let backing = data.get(&data::BACKING_TYPE).cloned();

        let mut properties = data.get(&data::PROPERTIES).into_owned();
        add(&mut properties, "name", readonly_property(class, "name", Type::String));
        if let Some(backing) = &backing {
            add(&mut properties, "value", readonly_property(class, "value", backing.clone()));
        }

        let mut methods = data.get(&data::METHODS).into_owned();
        let cases = TypeLayers::from_native(Some(Type::array()))
            .with_annotated(Type::list_of(Type::named(class.type_name())));
        add(
            &mut methods,
            "cases",
            static_method(class, "cases", Members::new(), cases),
        );
        if let Some(backing) = backing {
            let value_type = TypeLayers::from_native(Some(Type::union([Type::Int, Type::String])))
                .with_annotated(backing);
            let value = TypedMap::new()
                .with(&data::NAME, "value".to_string())
                .with(&data::TYPE, value_type);
            let parameters: Members = [("value".to_string(), value)].into_iter().collect();
            add(
                &mut methods,
                "from",
                static_method(
                    class,
                    "from",
                    parameters.clone(),
                    TypeLayers::from_native(Some(Type::Static)),
                ),
            );
            add(
                &mut methods,
                "tryFrom",
                static_method(
                    class,
                    "tryFrom",
                    parameters,
                    TypeLayers::from_native(Some(Type::nullable(Type::Static))),
                ),
            );
        }

        Ok(data
            .with(&data::PROPERTIES, properties)
            .with(&data::METHODS, methods))
    }
}

fn add(members: &mut Members, name: &str, member: TypedMap) {
    members.entry(name.to_string()).or_insert(member);
}

fn readonly_property(class: &ClassId, name: &str, ty: Type) -> TypedMap {
    TypedMap::new()
        .with(&data::NAME, name.to_string())
        .with(&data::DECLARING_CLASS, class.clone())
        .with(&data::NATIVE_READONLY, true)
        .with(&data::TYPE, TypeLayers::from_native(Some(ty)))
}

fn static_method(class: &ClassId, name: &str, parameters: Members, returns: TypeLayers) -> TypedMap {
    TypedMap::new()
        .with(&data::NAME, name.to_string())
        .with(&data::DECLARING_CLASS, class.clone())
        .with(&data::STATIC, true)
        .with(&data::PARAMETERS, parameters)
        .with(&data::TYPE, returns)
}
