//! Promoted constructor parameters.

use super::{Hook, find_method};
use crate::data;
use crate::error::Result;
use crate::session::Reflect;
use crate::typed_map::TypedMap;
use prism_types::DeclId;

/// Declares a property for every promoted parameter of the constructor.
#[derive(Clone, Copy, Debug, Default)]
pub struct PromotedPropertiesHook;

impl Hook for PromotedPropertiesHook {
    fn name(&self) -> &'static str {
        "promoted_properties"
    }

    fn process(&self, id: &DeclId, data: TypedMap, _reflect: &dyn Reflect) -> Result<TypedMap> {
        let Some(class) = id.as_class() else {
            return Ok(data);
        };
        let Some(constructor) = find_method(&data, "__construct") else {
            return Ok(data);
        };
        let parameters = constructor.get(&data::PARAMETERS);
        if !parameters.values().any(|parameter| *parameter.get(&data::PROMOTED)) {
            return Ok(data);
        }

        let mut properties = data.get(&data::PROPERTIES).into_owned();
        for (name, parameter) in parameters.iter() {
            if !*parameter.get(&data::PROMOTED) {
                continue;
            }
            let mut property = TypedMap::new()
                .with(&data::NAME, name.clone())
                .with(&data::DECLARING_CLASS, class.clone())
                .with(&data::VISIBILITY, *parameter.get(&data::VISIBILITY))
                .with(&data::TYPE, parameter.get(&data::TYPE).into_owned())
                .with(&data::PROMOTED, true)
                .with_opt(&data::LOCATION, parameter.get(&data::LOCATION).cloned())
                .with_opt(&data::DEPRECATION, parameter.get(&data::DEPRECATION).cloned());
            if *parameter.get(&data::NATIVE_READONLY) {
                property = property.with(&data::NATIVE_READONLY, true);
            }
            if *parameter.get(&data::ANNOTATED_READONLY) {
                property = property.with(&data::ANNOTATED_READONLY, true);
            }
            if parameter.contains(&data::ATTRIBUTES) {
                property = property.with(&data::ATTRIBUTES, parameter.get(&data::ATTRIBUTES).into_owned());
            }
            properties.insert(name.clone(), property);
        }
        Ok(data.with(&data::PROPERTIES, properties))
    }
}
