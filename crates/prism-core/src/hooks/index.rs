//! Member positions.

use super::{Hook, map_function_likes};
use crate::data::{self, Members};
use crate::error::Result;
use crate::session::Reflect;
use crate::typed_map::{DefaultKey, TypedMap};
use prism_types::DeclId;

/// Zero-based `INDEX` of every parameter and template.
#[derive(Clone, Copy, Debug, Default)]
pub struct IndexHook;

impl Hook for IndexHook {
    fn name(&self) -> &'static str {
        "index"
    }

    fn process(&self, id: &DeclId, data: TypedMap, _reflect: &dyn Reflect) -> Result<TypedMap> {
        let data = number(&data, &data::TEMPLATES);
        map_function_likes(id, data, |function| {
            Ok(number(&number(function, &data::PARAMETERS), &data::TEMPLATES))
        })
    }
}

fn number(data: &TypedMap, key: &DefaultKey<Members>) -> TypedMap {
    if !data.contains(key) {
        return data.clone();
    }
    let members = data.get(key);
    let mut numbered = Members::with_capacity(members.len());
    for (index, (name, member)) in members.iter().enumerate() {
        numbered.insert(name.clone(), member.with(&data::INDEX, index));
    }
    data.with(key, numbered)
}
