//! Inferred type layer.
//!
//! Constants get the literal type of their value; a property or parameter
//! gets the widened type of its default, since the value can change later.

use super::{Hook, map_function_likes, map_members};
use crate::data;
use crate::error::Result;
use crate::expression::{infer_type, widen};
use crate::session::Reflect;
use crate::typed_map::TypedMap;
use prism_types::{DeclId, Type};

#[derive(Clone, Copy, Debug, Default)]
pub struct InferConstantTypesHook;

impl Hook for InferConstantTypesHook {
    fn name(&self) -> &'static str {
        "infer_types"
    }

    fn process(&self, id: &DeclId, data: TypedMap, _reflect: &dyn Reflect) -> Result<TypedMap> {
        let data = match id {
            DeclId::Constant(_) => return Ok(constant(&data)),
            DeclId::Class(_) => {
                let data = map_members(&data, &data::CONSTANTS, |_, member| Ok(constant(member)))?;
                map_members(&data, &data::PROPERTIES, |_, member| Ok(default(member)))?
            }
            _ => data,
        };
        map_function_likes(id, data, |function| {
            map_members(function, &data::PARAMETERS, |_, member| Ok(default(member)))
        })
    }
}

fn with_inferred(member: &TypedMap, ty: Type) -> TypedMap {
    member.with(&data::TYPE, member.get(&data::TYPE).into_owned().with_inferred(ty))
}

fn constant(member: &TypedMap) -> TypedMap {
    if *member.get(&data::ENUM_CASE) {
        return member.clone();
    }
    match member.get(&data::VALUE).and_then(infer_type) {
        Some(ty) => with_inferred(member, ty),
        None => member.clone(),
    }
}

fn default(member: &TypedMap) -> TypedMap {
    match member.get(&data::DEFAULT_VALUE).and_then(infer_type) {
        Some(ty) => with_inferred(member, widen(&ty)),
        None => member.clone(),
    }
}
