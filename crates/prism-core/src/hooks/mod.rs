//! The enrichment pipeline.
//!
//! Every top-level declaration passes through the hooks in a fixed order
//! before it is cached:
//!
//! 1. documentation overlay
//! 2. inferred types of constants, properties and parameters
//! 3. promoted constructor parameters
//! 4. synthesized enum members
//! 5. interface methods made abstract
//! 6. class-level modifiers propagated to properties
//! 7. inheritance
//! 8. cloneability
//! 9. repeated decorators
//! 10. member indices
//! 11. hooks of the source unit, then hooks added by the host
//! 12. cleanup of working keys
//!
//! A hook receives the map built so far and returns the next one; maps are
//! never modified in place.

mod attributes;
mod cleanup;
mod doc_overlay;
mod enums;
mod index;
mod infer;
mod modifiers;
mod promoted;

pub use attributes::AttributesRepeatedHook;
pub use cleanup::CleanupHook;
pub use doc_overlay::DocOverlayHook;
pub use enums::EnumMembersHook;
pub use index::IndexHook;
pub use infer::InferConstantTypesHook;
pub use modifiers::{ClassModifiersHook, CloneableHook, InterfaceMethodsHook};
pub use promoted::PromotedPropertiesHook;

use crate::data::{self, Members};
use crate::error::Result;
use crate::inheritance;
use crate::options::ReflectorOptions;
use crate::session::Reflect;
use crate::typed_map::{DefaultKey, TypedMap};
use prism_types::DeclId;
use std::sync::Arc;
use tracing::trace;

pub trait Hook {
    /// Name used in traces.
    fn name(&self) -> &'static str;

    fn process(&self, id: &DeclId, data: TypedMap, reflect: &dyn Reflect) -> Result<TypedMap>;
}

/// Resolves supertypes; see [`crate::inheritance`].
#[derive(Clone, Copy, Debug, Default)]
pub struct InheritanceHook;

impl Hook for InheritanceHook {
    fn name(&self) -> &'static str {
        "inheritance"
    }

    fn process(&self, id: &DeclId, data: TypedMap, reflect: &dyn Reflect) -> Result<TypedMap> {
        match id.as_class() {
            Some(class) => inheritance::resolve(class, data, reflect),
            None => Ok(data),
        }
    }
}

// =============================================================================
// Pipeline
// =============================================================================

pub struct Pipeline {
    builtin: Vec<Arc<dyn Hook>>,
    host: Vec<Arc<dyn Hook>>,
    cleanup: Arc<dyn Hook>,
}

impl Pipeline {
    pub fn new(options: &ReflectorOptions) -> Self {
        let mut builtin: Vec<Arc<dyn Hook>> = Vec::new();
        if options.doc_comments {
            builtin.push(Arc::new(DocOverlayHook::new(options.tag_priorities.clone())));
        }
        builtin.push(Arc::new(InferConstantTypesHook));
        builtin.push(Arc::new(PromotedPropertiesHook));
        builtin.push(Arc::new(EnumMembersHook));
        builtin.push(Arc::new(InterfaceMethodsHook));
        builtin.push(Arc::new(ClassModifiersHook));
        builtin.push(Arc::new(InheritanceHook));
        builtin.push(Arc::new(CloneableHook));
        builtin.push(Arc::new(AttributesRepeatedHook));
        builtin.push(Arc::new(IndexHook));
        Self {
            builtin,
            host: Vec::new(),
            cleanup: Arc::new(CleanupHook),
        }
    }

    /// Append a hook that runs after the unit hooks, before cleanup.
    pub fn push(&mut self, hook: Arc<dyn Hook>) {
        self.host.push(hook);
    }

    /// Hook names in execution order, with `unit` standing for the unit hooks.
    pub fn names(&self) -> Vec<&'static str> {
        self.builtin
            .iter()
            .map(|hook| hook.name())
            .chain(std::iter::once("unit"))
            .chain(self.host.iter().map(|hook| hook.name()))
            .chain(std::iter::once(self.cleanup.name()))
            .collect()
    }

    pub fn run(
        &self,
        id: &DeclId,
        mut data: TypedMap,
        reflect: &dyn Reflect,
        unit_hooks: &[Arc<dyn Hook>],
    ) -> Result<TypedMap> {
        let hooks = self
            .builtin
            .iter()
            .chain(unit_hooks)
            .chain(&self.host)
            .chain(std::iter::once(&self.cleanup));
        for hook in hooks {
            trace!(hook = hook.name(), %id, "running hook");
            data = hook.process(id, data, reflect)?;
        }
        Ok(data)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Rewrite every member stored under `key`, keeping their order.
pub(crate) fn map_members(
    data: &TypedMap,
    key: &DefaultKey<Members>,
    mut f: impl FnMut(&str, &TypedMap) -> Result<TypedMap>,
) -> Result<TypedMap> {
    if !data.contains(key) {
        return Ok(data.clone());
    }
    let members = data.get(key);
    let mut mapped = Members::with_capacity(members.len());
    for (name, member) in members.iter() {
        mapped.insert(name.clone(), f(name, member)?);
    }
    Ok(data.with(key, mapped))
}

/// Apply `f` to the function-likes of a declaration: the function itself,
/// or every method of a class-like.
pub(crate) fn map_function_likes(
    id: &DeclId,
    data: TypedMap,
    mut f: impl FnMut(&TypedMap) -> Result<TypedMap>,
) -> Result<TypedMap> {
    match id {
        DeclId::Function(_) => f(&data),
        DeclId::Class(_) => map_members(&data, &data::METHODS, |_, method| f(method)),
        _ => Ok(data),
    }
}

/// Find a method by name; method names are case-insensitive.
pub(crate) fn find_method(data: &TypedMap, name: &str) -> Option<TypedMap> {
    data.get(&data::METHODS)
        .iter()
        .find(|(method, _)| method.eq_ignore_ascii_case(name))
        .map(|(_, method)| method.clone())
}

#[cfg(test)]
#[path = "../../tests/hooks_tests.rs"]
mod tests;
