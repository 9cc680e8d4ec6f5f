//! Inheritance resolution.
//!
//! Supertypes are reflected through the session, so they are fully
//! resolved (and cached) before the subtype merges their members. Members
//! are merged lowest precedence first:
//!
//! 1. mixins in declaration order; a later mixin replaces an earlier one's
//!    member unless `insteadof` says otherwise, and aliases add names
//! 2. the parent class
//! 3. interfaces, which only fill names that are still absent
//! 4. the class's own members
//!
//! Every inherited member goes through the substitution of the edge it is
//! inherited along: the supertype's templates are replaced with the
//! arguments of the reference (`@extends Base<int>`). Members keep their
//! `DECLARING_CLASS`.
//!
//! Method names collide case-insensitively: `getname()` overrides an
//! inherited `getName()`. Constant and property names are exact.

use crate::data::{self, MixinAlias, MixinPrecedence, Members, Supertypes, UnresolvedReference};
use crate::error::Result;
use crate::session::Reflect;
use crate::typed_map::{DefaultKey, TypedMap};
use prism_syntax::Visibility;
use prism_types::{ClassId, DeclId, TemplateId, TemplateSubstitution, Type};
use tracing::trace;

/// A reflected supertype and the substitution of the edge leading to it.
struct Edge {
    id: ClassId,
    data: TypedMap,
    substitution: TemplateSubstitution,
    arguments: Vec<Type>,
}

impl Edge {
    fn reflect(reference: &UnresolvedReference, reflect: &dyn Reflect) -> Result<Self> {
        let id = ClassId::named(&reference.name);
        let data = reflect.reflect(&DeclId::Class(id.clone()))?;
        let substitution = substitution(&id, &data, &reference.arguments);
        Ok(Self {
            id,
            data,
            substitution,
            arguments: reference.arguments.clone(),
        })
    }

    /// Transitive supertypes of the edge target, in the subtype's terms.
    fn supertypes(&self, key: &DefaultKey<Supertypes>) -> Vec<(String, Vec<Type>)> {
        self.data
            .get(key)
            .iter()
            .map(|(name, arguments)| {
                let arguments = arguments
                    .iter()
                    .map(|argument| self.substitution.apply(argument))
                    .collect();
                (name.clone(), arguments)
            })
            .collect()
    }

    fn member(&self, member: &TypedMap) -> TypedMap {
        substitute_member(member, &self.substitution)
    }
}

/// Templates of `class` mapped to `arguments` in declaration order.
///
/// A missing trailing argument becomes the template's constraint, or
/// `mixed` when it has none.
pub fn substitution(class: &ClassId, data: &TypedMap, arguments: &[Type]) -> TemplateSubstitution {
    let templates = data.get(&data::TEMPLATES);
    let mut substitution = TemplateSubstitution::new();
    for (index, (name, template)) in templates.iter().enumerate() {
        let ty = arguments
            .get(index)
            .cloned()
            .or_else(|| template.get(&data::CONSTRAINT).cloned())
            .unwrap_or(Type::Mixed);
        substitution.insert(TemplateId::of_class(class.clone(), name), ty);
    }
    substitution
}

/// Apply `substitution` to every type a member carries.
pub fn substitute_member(member: &TypedMap, substitution: &TemplateSubstitution) -> TypedMap {
    if substitution.is_empty() {
        return member.clone();
    }
    let mut member = member.clone();
    if member.contains(&data::TYPE) {
        member = member.with(&data::TYPE, substitution.apply_layers(&member.get(&data::TYPE)));
    }
    if member.contains(&data::THROWS) {
        let throws = member
            .get(&data::THROWS)
            .iter()
            .map(|ty| substitution.apply(ty))
            .collect();
        member = member.with(&data::THROWS, throws);
    }
    if let Some(constraint) = member.get(&data::CONSTRAINT).map(|ty| substitution.apply(ty)) {
        member = member.with(&data::CONSTRAINT, constraint);
    }
    for key in [&data::PARAMETERS, &data::TEMPLATES] {
        if member.contains(key) {
            let nested: Members = member
                .get(key)
                .iter()
                .map(|(name, nested)| (name.clone(), substitute_member(nested, substitution)))
                .collect();
            member = member.with(key, nested);
        }
    }
    member
}

#[derive(Default)]
struct Merged {
    constants: Members,
    properties: Members,
    methods: Members,
    parents: Supertypes,
    interfaces: Supertypes,
    mixins: Supertypes,
}

pub fn resolve(class: &ClassId, data: TypedMap, reflect: &dyn Reflect) -> Result<TypedMap> {
    let mut merged = Merged::default();

    let aliases = data.get(&data::MIXIN_ALIASES);
    let precedence = data.get(&data::MIXIN_PRECEDENCE);
    for reference in data.get(&data::UNRESOLVED_MIXINS).iter() {
        let edge = Edge::reflect(reference, reflect)?;
        trace!(%class, mixin = %edge.id, "merging mixin");
        merge_mixin(&mut merged, &edge, &aliases, &precedence);
    }

    if let Some(reference) = data.get(&data::UNRESOLVED_PARENT) {
        let edge = Edge::reflect(reference, reflect)?;
        trace!(%class, parent = %edge.id, "merging parent");
        merged.parents.insert(edge.id.type_name(), edge.arguments.clone());
        for (name, arguments) in edge.supertypes(&data::PARENTS) {
            merged.parents.insert(name, arguments);
        }
        for (name, arguments) in edge.supertypes(&data::INTERFACES) {
            merged.interfaces.entry(name).or_insert(arguments);
        }
        for (name, arguments) in edge.supertypes(&data::MIXINS) {
            merged.mixins.entry(name).or_insert(arguments);
        }
        for (name, constant) in edge.data.get(&data::CONSTANTS).iter() {
            if !is_private(constant) {
                merged.constants.insert(name.clone(), edge.member(constant));
            }
        }
        for (name, property) in edge.data.get(&data::PROPERTIES).iter() {
            if !is_private(property) {
                merged.properties.insert(name.clone(), edge.member(property));
            }
        }
        for (name, method) in edge.data.get(&data::METHODS).iter() {
            put_method(&mut merged.methods, name, edge.member(method));
        }
    }

    for reference in data.get(&data::UNRESOLVED_INTERFACES).iter() {
        let edge = Edge::reflect(reference, reflect)?;
        trace!(%class, interface = %edge.id, "merging interface");
        merged.interfaces.insert(edge.id.type_name(), edge.arguments.clone());
        for (name, arguments) in edge.supertypes(&data::INTERFACES) {
            merged.interfaces.entry(name).or_insert(arguments);
        }
        for (name, constant) in edge.data.get(&data::CONSTANTS).iter() {
            merged
                .constants
                .entry(name.clone())
                .or_insert_with(|| edge.member(constant));
        }
        for (name, method) in edge.data.get(&data::METHODS).iter() {
            if method_index(&merged.methods, name).is_none() {
                merged.methods.insert(name.clone(), edge.member(method));
            }
        }
    }

    for (key, inherited) in [
        (&data::CONSTANTS, &mut merged.constants),
        (&data::PROPERTIES, &mut merged.properties),
    ] {
        for (name, member) in data.get(key).iter() {
            inherited.insert(name.clone(), member.clone());
        }
    }
    for (name, method) in data.get(&data::METHODS).iter() {
        put_method(&mut merged.methods, name, method.clone());
    }

    Ok(data
        .with(&data::CONSTANTS, merged.constants)
        .with(&data::PROPERTIES, merged.properties)
        .with(&data::METHODS, merged.methods)
        .with(&data::PARENTS, merged.parents)
        .with(&data::INTERFACES, merged.interfaces)
        .with(&data::MIXINS, merged.mixins))
}

fn is_private(member: &TypedMap) -> bool {
    *member.get(&data::VISIBILITY) == Visibility::Private
}

fn method_index(methods: &Members, name: &str) -> Option<usize> {
    methods.keys().position(|existing| existing.eq_ignore_ascii_case(name))
}

/// Insert under `name`, replacing a method of the same name in any case.
/// The replacement keeps the replaced method's position.
fn put_method(methods: &mut Members, name: &str, method: TypedMap) {
    match method_index(methods, name) {
        Some(index) => {
            methods.shift_remove_index(index);
            methods.shift_insert(index, name.to_owned(), method);
        }
        None => {
            methods.insert(name.to_owned(), method);
        }
    }
}

fn merge_mixin(merged: &mut Merged, edge: &Edge, aliases: &[MixinAlias], precedence: &[MixinPrecedence]) {
    let mixin = edge.id.type_name();
    merged.mixins.insert(mixin.clone(), edge.arguments.clone());
    for (name, arguments) in edge.supertypes(&data::MIXINS) {
        merged.mixins.entry(name).or_insert(arguments);
    }

    for (name, constant) in edge.data.get(&data::CONSTANTS).iter() {
        merged.constants.insert(name.clone(), edge.member(constant));
    }
    for (name, property) in edge.data.get(&data::PROPERTIES).iter() {
        merged.properties.insert(name.clone(), edge.member(property));
    }

    let methods = edge.data.get(&data::METHODS);
    for (name, method) in methods.iter() {
        let excluded = precedence.iter().any(|rule| {
            rule.method.eq_ignore_ascii_case(name)
                && rule
                    .instead_of
                    .iter()
                    .any(|other| other.eq_ignore_ascii_case(&mixin))
        });
        if excluded {
            trace!(mixin = %mixin, method = %name, "excluded by insteadof");
            continue;
        }
        put_method(&mut merged.methods, name, edge.member(method));
    }

    for alias in aliases {
        if alias
            .mixin
            .as_ref()
            .is_some_and(|target| !target.eq_ignore_ascii_case(&mixin))
        {
            continue;
        }
        let Some((original, method)) = methods
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&alias.method))
        else {
            continue;
        };
        match &alias.alias {
            Some(new_name) => {
                let mut method = edge.member(method).with(&data::NAME, new_name.clone());
                if let Some(visibility) = alias.visibility {
                    method = method.with(&data::VISIBILITY, visibility);
                }
                put_method(&mut merged.methods, new_name, method);
            }
            None => {
                let inherited = method_index(&merged.methods, original)
                    .and_then(|index| merged.methods.get_index_mut(index));
                if let (Some(visibility), Some((_, method))) = (alias.visibility, inherited) {
                    *method = method.with(&data::VISIBILITY, visibility);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/inheritance_tests.rs"]
mod tests;
