//! Template substitution.
//!
//! When a class inherits from `Base<int>`, every member it receives from
//! `Base` has `Base`'s template `T` replaced by `int`. A
//! [`TemplateSubstitution`] is that mapping; [`TemplateSubstitution::apply`]
//! rewrites a type tree.
//!
//! Substitution is depth-limited: trees nested deeper than
//! [`MAX_SUBSTITUTION_DEPTH`](prism_common::limits::MAX_SUBSTITUTION_DEPTH)
//! are left unchanged below the limit.

use crate::id::TemplateId;
use crate::layers::TypeLayers;
use crate::ty::{CallableParam, ConditionalSubject, ShapeItem, Type};
use prism_common::recursion::{DepthCounter, RecursionProfile};
use rustc_hash::FxHashMap;
use tracing::trace;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TemplateSubstitution {
    map: FxHashMap<TemplateId, Type>,
}

impl TemplateSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, template: TemplateId, ty: Type) {
        self.map.insert(template, ty);
    }

    pub fn get(&self, template: &TemplateId) -> Option<&Type> {
        self.map.get(template)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Substitute every template reference in `ty`.
    pub fn apply(&self, ty: &Type) -> Type {
        if self.map.is_empty() {
            return ty.clone();
        }
        let mut depth = DepthCounter::with_profile(RecursionProfile::Substitution);
        self.apply_inner(ty, &mut depth)
    }

    /// Substitute every layer of a type record.
    pub fn apply_layers(&self, layers: &TypeLayers) -> TypeLayers {
        if self.map.is_empty() {
            return layers.clone();
        }
        layers.map(|ty| self.apply(ty))
    }

    fn apply_inner(&self, ty: &Type, depth: &mut DepthCounter) -> Type {
        if !depth.enter() {
            trace!(depth = depth.depth(), "substitution depth exceeded");
            return ty.clone();
        }
        let result = self.apply_children(ty, depth);
        depth.leave();
        result
    }

    fn apply_children(&self, ty: &Type, depth: &mut DepthCounter) -> Type {
        match ty {
            Type::Template(template) => match self.map.get(template) {
                Some(replacement) => {
                    trace!(template = %template, "substituted template");
                    replacement.clone()
                }
                None => ty.clone(),
            },
            Type::ClassString(Some(inner)) => Type::ClassString(Some(self.boxed(inner, depth))),
            Type::KeyOf(inner) => Type::KeyOf(self.boxed(inner, depth)),
            Type::ValueOf(inner) => Type::ValueOf(self.boxed(inner, depth)),
            Type::Array {
                key,
                value,
                non_empty,
            } => Type::Array {
                key: self.boxed(key, depth),
                value: self.boxed(value, depth),
                non_empty: *non_empty,
            },
            Type::List { value, non_empty } => Type::List {
                value: self.boxed(value, depth),
                non_empty: *non_empty,
            },
            Type::Iterable { key, value } => Type::Iterable {
                key: self.boxed(key, depth),
                value: self.boxed(value, depth),
            },
            Type::Shape {
                kind,
                items,
                sealed,
            } => Type::Shape {
                kind: *kind,
                items: self.apply_items(items, depth),
                sealed: *sealed,
            },
            Type::ObjectShape(items) => Type::ObjectShape(self.apply_items(items, depth)),
            Type::Named { class, args } => Type::Named {
                class: class.clone(),
                args: args.iter().map(|arg| self.apply_inner(arg, depth)).collect(),
            },
            Type::Callable { kind, params, ret } => Type::Callable {
                kind: *kind,
                params: params
                    .iter()
                    .map(|param| CallableParam {
                        ty: self.apply_inner(&param.ty, depth),
                        ..param.clone()
                    })
                    .collect(),
                ret: ret.as_ref().map(|ret| Box::new(self.apply_inner(ret, depth))),
            },
            Type::Union(members) => {
                Type::union(members.iter().map(|m| self.apply_inner(m, depth)).collect::<Vec<_>>())
            }
            Type::Intersection(members) => Type::intersection(
                members.iter().map(|m| self.apply_inner(m, depth)).collect::<Vec<_>>(),
            ),
            Type::OffsetAccess { base, offset } => Type::OffsetAccess {
                base: self.boxed(base, depth),
                offset: self.boxed(offset, depth),
            },
            Type::Conditional {
                subject,
                target,
                if_true,
                if_false,
                negated,
            } => Type::Conditional {
                subject: match subject {
                    ConditionalSubject::Parameter(name) => ConditionalSubject::Parameter(name.clone()),
                    ConditionalSubject::Type(inner) => ConditionalSubject::Type(self.boxed(inner, depth)),
                },
                target: self.boxed(target, depth),
                if_true: self.boxed(if_true, depth),
                if_false: self.boxed(if_false, depth),
                negated: *negated,
            },
            _ => ty.clone(),
        }
    }

    fn boxed(&self, ty: &Type, depth: &mut DepthCounter) -> Box<Type> {
        Box::new(self.apply_inner(ty, depth))
    }

    fn apply_items(&self, items: &[ShapeItem], depth: &mut DepthCounter) -> Vec<ShapeItem> {
        items
            .iter()
            .map(|item| ShapeItem {
                key: item.key.clone(),
                value: self.apply_inner(&item.value, depth),
                optional: item.optional,
            })
            .collect()
    }
}

impl FromIterator<(TemplateId, Type)> for TemplateSubstitution {
    fn from_iter<I: IntoIterator<Item = (TemplateId, Type)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
#[path = "../tests/subst_tests.rs"]
mod tests;
