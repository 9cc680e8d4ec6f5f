//! Removal of working keys.

use super::Hook;
use crate::data::{self, Members};
use crate::error::Result;
use crate::session::Reflect;
use crate::typed_map::{DefaultKey, TypedMap};
use prism_types::DeclId;

const NESTED: [&DefaultKey<Members>; 6] = [
    &data::CONSTANTS,
    &data::PROPERTIES,
    &data::METHODS,
    &data::PARAMETERS,
    &data::TEMPLATES,
    &data::TYPE_ALIASES,
];

/// Strips the working keys from a declaration and everything nested in it.
#[derive(Clone, Copy, Debug, Default)]
pub struct CleanupHook;

impl Hook for CleanupHook {
    fn name(&self) -> &'static str {
        "cleanup"
    }

    fn process(&self, _id: &DeclId, data: TypedMap, _reflect: &dyn Reflect) -> Result<TypedMap> {
        Ok(strip(&data))
    }
}

fn strip(data: &TypedMap) -> TypedMap {
    let mut data = data.without(&data::WORKING_KEYS);
    for key in NESTED {
        if !data.contains(key) {
            continue;
        }
        let members: Members = data
            .get(key)
            .iter()
            .map(|(name, member)| (name.clone(), strip(member)))
            .collect();
        data = data.with(key, members);
    }
    if data.contains(&data::ATTRIBUTES) {
        let attributes = data.get(&data::ATTRIBUTES).iter().map(strip).collect();
        data = data.with(&data::ATTRIBUTES, attributes);
    }
    data
}
