//! Modifiers implied by the enclosing declaration.

use super::{Hook, find_method, map_members};
use crate::data::{self, ClassKind};
use crate::error::Result;
use crate::session::Reflect;
use crate::typed_map::TypedMap;
use prism_syntax::Visibility;
use prism_types::DeclId;

/// Interface methods are abstract.
#[derive(Clone, Copy, Debug, Default)]
pub struct InterfaceMethodsHook;

impl Hook for InterfaceMethodsHook {
    fn name(&self) -> &'static str {
        "interface_methods"
    }

    fn process(&self, _id: &DeclId, data: TypedMap, _reflect: &dyn Reflect) -> Result<TypedMap> {
        if data.get(&data::CLASS_KIND) != Some(&ClassKind::Interface) {
            return Ok(data);
        }
        map_members(&data, &data::METHODS, |_, method| Ok(method.with(&data::ABSTRACT, true)))
    }
}

/// `readonly` and `final` on a class apply to each of its own properties,
/// native to native and annotated to annotated.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClassModifiersHook;

impl Hook for ClassModifiersHook {
    fn name(&self) -> &'static str {
        "class_modifiers"
    }

    fn process(&self, _id: &DeclId, data: TypedMap, _reflect: &dyn Reflect) -> Result<TypedMap> {
        if !data.contains(&data::CLASS_KIND) {
            return Ok(data);
        }
        let flags = [
            &data::NATIVE_READONLY,
            &data::ANNOTATED_READONLY,
            &data::NATIVE_FINAL,
            &data::ANNOTATED_FINAL,
        ];
        let inherited: Vec<_> = flags.into_iter().filter(|flag| *data.get(*flag)).collect();
        if inherited.is_empty() {
            return Ok(data);
        }
        map_members(&data, &data::PROPERTIES, |_, property| {
            let mut property = property.clone();
            for flag in &inherited {
                property = property.with(*flag, true);
            }
            Ok(property)
        })
    }
}

/// Instances of a concrete class can be cloned unless `__clone` is hidden.
///
/// Runs after inheritance so that an inherited `__clone` counts.
#[derive(Clone, Copy, Debug, Default)]
pub struct CloneableHook;

impl Hook for CloneableHook {
    fn name(&self) -> &'static str {
        "cloneable"
    }

    fn process(&self, _id: &DeclId, data: TypedMap, _reflect: &dyn Reflect) -> Result<TypedMap> {
        let Some(kind) = data.get(&data::CLASS_KIND).copied() else {
            return Ok(data);
        };
        let clone_visible = find_method(&data, "__clone")
            .is_none_or(|method| *method.get(&data::VISIBILITY) == Visibility::Public);
        let cloneable = kind.is_class() && !*data.get(&data::ABSTRACT) && clone_visible;
        Ok(data.with(&data::CLONEABLE, cloneable))
    }
}
