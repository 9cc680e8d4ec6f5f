//! Repeated decorators.

use super::{Hook, map_function_likes, map_members};
use crate::data;
use crate::error::Result;
use crate::session::Reflect;
use crate::typed_map::TypedMap;
use prism_types::DeclId;
use rustc_hash::FxHashMap;

/// Flags decorators whose class appears more than once on the same target.
#[derive(Clone, Copy, Debug, Default)]
pub struct AttributesRepeatedHook;

impl Hook for AttributesRepeatedHook {
    fn name(&self) -> &'static str {
        "attributes_repeated"
    }

    fn process(&self, id: &DeclId, data: TypedMap, _reflect: &dyn Reflect) -> Result<TypedMap> {
        let mut data = mark(&data);
        if id.as_class().is_some() {
            data = map_members(&data, &data::CONSTANTS, |_, member| Ok(mark(member)))?;
            data = map_members(&data, &data::PROPERTIES, |_, member| Ok(mark(member)))?;
        }
        map_function_likes(id, data, |function| {
            map_members(&mark(function), &data::PARAMETERS, |_, parameter| Ok(mark(parameter)))
        })
    }
}

fn mark(target: &TypedMap) -> TypedMap {
    if !target.contains(&data::ATTRIBUTES) {
        return target.clone();
    }
    let attributes = target.get(&data::ATTRIBUTES);
    let mut counts: FxHashMap<String, usize> = FxHashMap::default();
    for attribute in attributes.iter() {
        if let Some(class) = attribute.get(&data::ATTRIBUTE_CLASS) {
            *counts.entry(class.to_ascii_lowercase()).or_default() += 1;
        }
    }
    let marked = attributes
        .iter()
        .map(|attribute| {
            let repeated = attribute
                .get(&data::ATTRIBUTE_CLASS)
                .and_then(|class| counts.get(&class.to_ascii_lowercase()))
                .is_some_and(|count| *count > 1);
            attribute.with(&data::REPEATED, repeated)
        })
        .collect();
    target.with(&data::ATTRIBUTES, marked)
}
