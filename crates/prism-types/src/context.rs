//! Name and type resolution scopes.
//!
//! A [`NameContext`] is the namespace plus `use` imports active at a
//! declaration. A [`TypeContext`] extends it with what a type expression can
//! refer to: the enclosing class and its parent, active template parameters
//! and the class's type aliases.
//!
//! Names are case-sensitive throughout.

use crate::id::{ClassId, TemplateId, TemplateSite};
use prism_syntax::Name;
use rustc_hash::FxHashMap;

/// A resolved function or constant name.
///
/// Unqualified function and constant names inside a namespace fall back to
/// the global namespace when the namespaced candidate does not exist.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResolvedName {
    /// The name to try first.
    pub primary: String,
    /// Global fallback, only for unqualified names inside a namespace.
    pub fallback: Option<String>,
}

// =============================================================================
// NameContext
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameContext {
    namespace: Option<String>,
    class_imports: FxHashMap<String, String>,
    function_imports: FxHashMap<String, String>,
    constant_imports: FxHashMap<String, String>,
}

impl NameContext {
    pub fn new(namespace: Option<&str>) -> Self {
        Self {
            namespace: namespace
                .map(|ns| ns.trim_matches('\\').to_string())
                .filter(|ns| !ns.is_empty()),
            ..Self::default()
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn import_class(&mut self, alias: &str, target: &str) {
        self.class_imports
            .insert(alias.to_string(), strip_leading(target).to_string());
    }

    pub fn import_function(&mut self, alias: &str, target: &str) {
        self.function_imports
            .insert(alias.to_string(), strip_leading(target).to_string());
    }

    pub fn import_constant(&mut self, alias: &str, target: &str) {
        self.constant_imports
            .insert(alias.to_string(), strip_leading(target).to_string());
    }

    /// Prefix `name` with the current namespace.
    pub fn qualify(&self, name: &str) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}\\{name}"),
            None => name.to_string(),
        }
    }

    /// Resolve a class-like name.
    pub fn resolve_class(&self, name: &Name) -> String {
        if name.is_fully_qualified() {
            return name.without_prefix().to_string();
        }
        if name.is_relative() {
            return self.qualify(name.without_prefix());
        }
        let first = name.first_segment();
        if let Some(target) = self.class_imports.get(first) {
            return match name.rest_after_first() {
                Some(rest) => format!("{target}\\{rest}"),
                None => target.clone(),
            };
        }
        self.qualify(name.as_str())
    }

    pub fn resolve_function(&self, name: &Name) -> ResolvedName {
        self.resolve_with_fallback(name, &self.function_imports)
    }

    pub fn resolve_constant(&self, name: &Name) -> ResolvedName {
        self.resolve_with_fallback(name, &self.constant_imports)
    }

    fn resolve_with_fallback(
        &self,
        name: &Name,
        imports: &FxHashMap<String, String>,
    ) -> ResolvedName {
        let single = |primary: String| ResolvedName {
            primary,
            fallback: None,
        };

        if name.is_fully_qualified() {
            return single(name.without_prefix().to_string());
        }
        if name.is_relative() {
            return single(self.qualify(name.without_prefix()));
        }
        if name.is_qualified() {
            // Qualified names go through class-style namespace imports.
            return single(self.resolve_class(name));
        }
        if let Some(target) = imports.get(name.as_str()) {
            return single(target.clone());
        }
        match &self.namespace {
            Some(_) => ResolvedName {
                primary: self.qualify(name.as_str()),
                fallback: Some(name.as_str().to_string()),
            },
            None => single(name.as_str().to_string()),
        }
    }
}

fn strip_leading(name: &str) -> &str {
    name.strip_prefix('\\').unwrap_or(name)
}

// =============================================================================
// TypeContext
// =============================================================================

/// Everything a type expression at a given declaration may reference.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeContext {
    pub names: NameContext,
    /// The enclosing class-like, bound for `self` and used for aliases.
    pub self_class: Option<ClassId>,
    /// The resolved parent class name, bound for `parent`.
    pub parent_class: Option<String>,
    /// Active templates, outermost first. Later entries shadow earlier ones.
    templates: Vec<TemplateId>,
    /// Local alias name -> (declaring class name, alias name).
    aliases: FxHashMap<String, (String, String)>,
}

impl TypeContext {
    pub fn new(names: NameContext) -> Self {
        Self {
            names,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_class(mut self, class: ClassId, parent: Option<String>) -> Self {
        self.self_class = Some(class);
        self.parent_class = parent;
        self
    }

    /// Add template names declared at `site`.
    #[must_use]
    pub fn with_templates<'a>(
        mut self,
        site: &TemplateSite,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        for name in names {
            self.templates.push(TemplateId {
                site: site.clone(),
                name: name.to_string(),
            });
        }
        self
    }

    /// Make `local` refer to the alias `name` declared by `class`.
    #[must_use]
    pub fn with_alias(mut self, local: &str, class: &str, name: &str) -> Self {
        self.aliases
            .insert(local.to_string(), (class.to_string(), name.to_string()));
        self
    }

    pub fn resolve_template(&self, name: &str) -> Option<&TemplateId> {
        self.templates.iter().rev().find(|t| t.name == name)
    }

    pub fn resolve_alias(&self, name: &str) -> Option<(&str, &str)> {
        self.aliases
            .get(name)
            .map(|(class, alias)| (class.as_str(), alias.as_str()))
    }

    pub fn templates(&self) -> &[TemplateId] {
        &self.templates
    }

    /// The name `self` is bound to.
    pub fn self_name(&self) -> Option<String> {
        self.self_class.as_ref().map(ClassId::type_name)
    }
}

#[cfg(test)]
#[path = "../tests/context_tests.rs"]
mod tests;
