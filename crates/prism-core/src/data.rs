//! Data keys.
//!
//! Every fact the pipeline records is one of the keys below. Top-level
//! declarations (classes, functions, constants) and every nested member
//! (class constants, properties, methods, parameters, templates, type
//! aliases) are [`TypedMap`]s built from the same vocabulary; which keys a
//! map carries depends on what it describes.
//!
//! ## Working keys
//!
//! `DOC_COMMENT`, `TYPE_CONTEXT` and the `UNRESOLVED_*`/`MIXIN_*` keys only
//! exist while a declaration is being enriched. The cleanup hook removes
//! them before a result is cached.

use crate::change::Detector;
use crate::expression::{Argument, Expression};
use crate::typed_map::{DefaultKey, Key, KeyName, TypedMap};
use indexmap::IndexMap;
use prism_common::Span;
use prism_docblock::Variance;
use prism_syntax::Visibility;
use prism_types::{ClassId, Type, TypeContext, TypeLayers};

// =============================================================================
// Value types
// =============================================================================

/// Kind of a class-like declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    AnonymousClass,
    Interface,
    Trait,
    Enum,
}

impl ClassKind {
    /// Classes (named or anonymous) can be instantiated when not abstract.
    pub fn is_class(self) -> bool {
        matches!(self, Self::Class | Self::AnonymousClass)
    }
}

/// Where a declaration is written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub file: Option<String>,
    pub span: Span,
}

/// A supertype reference before resolution: `extends Base<int>`.
///
/// `arguments` are compiled from `@extends`/`@implements`/`@use` but still
/// expressed in the subtype's own templates.
#[derive(Clone, Debug, PartialEq)]
pub struct UnresolvedReference {
    pub name: String,
    pub arguments: Vec<Type>,
}

impl UnresolvedReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }
}

/// `[Mixin::]method as [visibility] [alias];`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MixinAlias {
    pub mixin: Option<String>,
    pub method: String,
    pub alias: Option<String>,
    pub visibility: Option<Visibility>,
}

/// `Mixin::method insteadof Other, ...;`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MixinPrecedence {
    pub mixin: String,
    pub method: String,
    pub instead_of: Vec<String>,
}

/// Member collections keyed by member name, in declaration order.
pub type Members = IndexMap<String, TypedMap>;

/// Supertype name to its generic arguments.
pub type Supertypes = IndexMap<String, Vec<Type>>;

fn no(_: &TypedMap) -> bool {
    false
}

fn public(_: &TypedMap) -> Visibility {
    Visibility::Public
}

fn invariant(_: &TypedMap) -> Variance {
    Variance::Invariant
}

fn no_members(_: &TypedMap) -> Members {
    Members::new()
}

fn no_supertypes(_: &TypedMap) -> Supertypes {
    Supertypes::new()
}

fn no_types(_: &TypedMap) -> Vec<Type> {
    Vec::new()
}

fn no_layers(_: &TypedMap) -> TypeLayers {
    TypeLayers::new()
}

fn no_references(_: &TypedMap) -> Vec<UnresolvedReference> {
    Vec::new()
}

fn no_aliases(_: &TypedMap) -> Vec<MixinAlias> {
    Vec::new()
}

fn no_precedence(_: &TypedMap) -> Vec<MixinPrecedence> {
    Vec::new()
}

fn no_attributes(_: &TypedMap) -> Vec<TypedMap> {
    Vec::new()
}

fn no_arguments(_: &TypedMap) -> Vec<Argument> {
    Vec::new()
}

// =============================================================================
// Source unit
// =============================================================================

pub const FILE: Key<String> = Key::new("file");
pub const EXTENSION: Key<String> = Key::new("extension");
pub const CHANGE_DETECTOR: Key<Detector> = Key::new("change_detector");
pub const LOCATION: Key<Location> = Key::new("location");
pub const NAMESPACE: Key<String> = Key::new("namespace");

// =============================================================================
// Common facts
// =============================================================================

/// Declared name (fully qualified for top-level declarations).
pub const NAME: Key<String> = Key::new("name");
pub const DOC_COMMENT: Key<String> = Key::new("doc_comment");
pub const TYPE_CONTEXT: Key<TypeContext> = Key::new("type_context");
pub const DEPRECATION: Key<String> = Key::new("deprecation");
pub const VISIBILITY: DefaultKey<Visibility> = DefaultKey::new("visibility", public);
pub const STATIC: DefaultKey<bool> = DefaultKey::new("static", no);
pub const ABSTRACT: DefaultKey<bool> = DefaultKey::new("abstract", no);
pub const NATIVE_FINAL: DefaultKey<bool> = DefaultKey::new("native_final", no);
pub const ANNOTATED_FINAL: DefaultKey<bool> = DefaultKey::new("annotated_final", no);
pub const NATIVE_READONLY: DefaultKey<bool> = DefaultKey::new("native_readonly", no);
pub const ANNOTATED_READONLY: DefaultKey<bool> = DefaultKey::new("annotated_readonly", no);
/// Type of a constant, property or parameter; return type of a function-like.
pub const TYPE: DefaultKey<TypeLayers> = DefaultKey::new("type", no_layers);
/// Class that wrote the member, kept when the member is inherited.
pub const DECLARING_CLASS: Key<ClassId> = Key::new("declaring_class");
/// Zero-based position of a parameter or template.
pub const INDEX: Key<usize> = Key::new("index");

// =============================================================================
// Decorators
// =============================================================================

pub const ATTRIBUTES: DefaultKey<Vec<TypedMap>> = DefaultKey::new("attributes", no_attributes);
pub const ATTRIBUTE_CLASS: Key<String> = Key::new("attribute_class");
pub const ARGUMENTS: DefaultKey<Vec<Argument>> = DefaultKey::new("arguments", no_arguments);
/// More than one decorator of the same class on the same target.
pub const REPEATED: DefaultKey<bool> = DefaultKey::new("repeated", no);

// =============================================================================
// Class-likes
// =============================================================================

pub const CLASS_KIND: Key<ClassKind> = Key::new("class_kind");
pub const CLONEABLE: DefaultKey<bool> = DefaultKey::new("cloneable", no);
pub const BACKING_TYPE: Key<Type> = Key::new("backing_type");

pub const UNRESOLVED_PARENT: Key<UnresolvedReference> = Key::new("unresolved_parent");
pub const UNRESOLVED_INTERFACES: DefaultKey<Vec<UnresolvedReference>> =
    DefaultKey::new("unresolved_interfaces", no_references);
pub const UNRESOLVED_MIXINS: DefaultKey<Vec<UnresolvedReference>> =
    DefaultKey::new("unresolved_mixins", no_references);
pub const MIXIN_ALIASES: DefaultKey<Vec<MixinAlias>> = DefaultKey::new("mixin_aliases", no_aliases);
pub const MIXIN_PRECEDENCE: DefaultKey<Vec<MixinPrecedence>> =
    DefaultKey::new("mixin_precedence", no_precedence);

/// Ancestors, nearest first.
pub const PARENTS: DefaultKey<Supertypes> = DefaultKey::new("parents", no_supertypes);
/// Every implemented interface, including inherited ones.
pub const INTERFACES: DefaultKey<Supertypes> = DefaultKey::new("interfaces", no_supertypes);
pub const MIXINS: DefaultKey<Supertypes> = DefaultKey::new("mixins", no_supertypes);

pub const CONSTANTS: DefaultKey<Members> = DefaultKey::new("constants", no_members);
pub const PROPERTIES: DefaultKey<Members> = DefaultKey::new("properties", no_members);
pub const METHODS: DefaultKey<Members> = DefaultKey::new("methods", no_members);
pub const TYPE_ALIASES: DefaultKey<Members> = DefaultKey::new("type_aliases", no_members);

// =============================================================================
// Members
// =============================================================================

/// Value of a constant or backed enum case.
pub const VALUE: Key<Expression> = Key::new("value");
/// Default of a property or parameter.
pub const DEFAULT_VALUE: Key<Expression> = Key::new("default_value");
pub const ENUM_CASE: DefaultKey<bool> = DefaultKey::new("enum_case", no);
pub const PROMOTED: DefaultKey<bool> = DefaultKey::new("promoted", no);
pub const VARIADIC: DefaultKey<bool> = DefaultKey::new("variadic", no);
pub const BY_REFERENCE: DefaultKey<bool> = DefaultKey::new("by_reference", no);

// =============================================================================
// Function-likes
// =============================================================================

pub const PARAMETERS: DefaultKey<Members> = DefaultKey::new("parameters", no_members);
pub const TEMPLATES: DefaultKey<Members> = DefaultKey::new("templates", no_members);
pub const RETURNS_REFERENCE: DefaultKey<bool> = DefaultKey::new("returns_reference", no);
pub const GENERATOR: DefaultKey<bool> = DefaultKey::new("generator", no);
pub const THROWS: DefaultKey<Vec<Type>> = DefaultKey::new("throws", no_types);

// =============================================================================
// Templates and aliases
// =============================================================================

pub const VARIANCE: DefaultKey<Variance> = DefaultKey::new("variance", invariant);
pub const CONSTRAINT: Key<Type> = Key::new("constraint");
pub const ALIAS_TYPE: Key<Type> = Key::new("alias_type");

/// Keys that only exist during enrichment.
pub const WORKING_KEYS: [&dyn KeyName; 7] = [
    &DOC_COMMENT,
    &TYPE_CONTEXT,
    &UNRESOLVED_PARENT,
    &UNRESOLVED_INTERFACES,
    &UNRESOLVED_MIXINS,
    &MIXIN_ALIASES,
    &MIXIN_PRECEDENCE,
];

// =============================================================================
// Accessors
// =============================================================================

/// Native `readonly` or annotated `@readonly`.
pub fn is_readonly(data: &TypedMap) -> bool {
    *data.get(&NATIVE_READONLY) || *data.get(&ANNOTATED_READONLY)
}

/// Native `final` or annotated `@final`.
pub fn is_final(data: &TypedMap) -> bool {
    *data.get(&NATIVE_FINAL) || *data.get(&ANNOTATED_FINAL)
}

/// Parameter with a default or collecting the rest of the arguments.
pub fn is_optional(parameter: &TypedMap) -> bool {
    parameter.contains(&DEFAULT_VALUE) || *parameter.get(&VARIADIC)
}

/// Look up a nested member map.
pub fn member(data: &TypedMap, key: &DefaultKey<Members>, name: &str) -> Option<TypedMap> {
    data.get(key).get(name).cloned()
}

#[cfg(test)]
#[path = "../tests/data_tests.rs"]
mod tests;
