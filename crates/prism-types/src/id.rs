//! Declaration identities.
//!
//! Every reflectable unit has a `DeclId`. Identities are plain values: two
//! identities are the same declaration exactly when they compare equal, so
//! they serve as keys for the session buffer, the external cache and
//! cross references between declarations.
//!
//! ## Textual form
//!
//! `Display` yields a stable text used for cache fingerprints:
//!
//! | Identity | Text |
//! |----------|------|
//! | class | `App\User` |
//! | anonymous class | `class@src/a.php:12:9` |
//! | function | `App\helper()` |
//! | closure | `function@src/a.php:3:5` |
//! | constant | `const App\VERSION` |
//! | class constant | `App\User::TABLE` |
//! | property | `App\User::$name` |
//! | method | `App\User::save()` |
//! | parameter | `App\User::save()#$force` |
//! | template | `App\Box<T>` |
//! | type alias | `App\User@type Row` |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Strip a leading namespace separator.
fn normalize(name: &str) -> String {
    name.strip_prefix('\\').unwrap_or(name).to_string()
}

// =============================================================================
// Top-level identities
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConstantId(String);

impl ConstantId {
    pub fn new(name: &str) -> Self {
        Self(normalize(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FunctionId {
    Named(String),
    /// Closures and arrow functions, keyed by where they start.
    Anonymous { file: String, line: u32, column: u32 },
}

impl FunctionId {
    pub fn named(name: &str) -> Self {
        Self::Named(normalize(name))
    }

    pub fn anonymous(file: &str, line: u32, column: u32) -> Self {
        Self::Anonymous {
            file: file.to_string(),
            line,
            column,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Anonymous { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClassId {
    Named(String),
    /// `new class { ... }`, keyed by where it starts. Several anonymous
    /// classes can share a line, hence the column.
    Anonymous { file: String, line: u32, column: u32 },
}

impl ClassId {
    pub fn named(name: &str) -> Self {
        Self::Named(normalize(name))
    }

    pub fn anonymous(file: &str, line: u32, column: u32) -> Self {
        Self::Anonymous {
            file: file.to_string(),
            line,
            column,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Anonymous { .. } => None,
        }
    }

    /// The name used inside type expressions (`Named` types, `DECLARING_CLASS`).
    pub fn type_name(&self) -> String {
        match self {
            Self::Named(name) => name.clone(),
            Self::Anonymous { .. } => self.to_string(),
        }
    }
}

/// A function or a method: anything that owns parameters and templates.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FunctionLikeId {
    Function(FunctionId),
    Method { class: ClassId, name: String },
}

impl FunctionLikeId {
    pub fn to_decl(&self) -> DeclId {
        match self {
            Self::Function(function) => DeclId::Function(function.clone()),
            Self::Method { class, name } => DeclId::Method {
                class: class.clone(),
                name: name.clone(),
            },
        }
    }
}

/// Where a template parameter is declared.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TemplateSite {
    Class(ClassId),
    FunctionLike(FunctionLikeId),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateId {
    pub site: TemplateSite,
    pub name: String,
}

impl TemplateId {
    pub fn of_class(class: ClassId, name: &str) -> Self {
        Self {
            site: TemplateSite::Class(class),
            name: name.to_string(),
        }
    }

    pub fn of_function_like(function: FunctionLikeId, name: &str) -> Self {
        Self {
            site: TemplateSite::FunctionLike(function),
            name: name.to_string(),
        }
    }
}

// =============================================================================
// DeclId
// =============================================================================

/// Identity of any reflectable declaration or member.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeclId {
    Constant(ConstantId),
    Function(FunctionId),
    Class(ClassId),
    ClassConstant { class: ClassId, name: String },
    Property { class: ClassId, name: String },
    Method { class: ClassId, name: String },
    Parameter { function: FunctionLikeId, name: String },
    Template(TemplateId),
    Alias { class: ClassId, name: String },
}

impl DeclId {
    pub fn class(name: &str) -> Self {
        Self::Class(ClassId::named(name))
    }

    pub fn function(name: &str) -> Self {
        Self::Function(FunctionId::named(name))
    }

    pub fn constant(name: &str) -> Self {
        Self::Constant(ConstantId::new(name))
    }

    pub fn class_constant(class: &ClassId, name: &str) -> Self {
        Self::ClassConstant {
            class: class.clone(),
            name: name.to_string(),
        }
    }

    pub fn property(class: &ClassId, name: &str) -> Self {
        Self::Property {
            class: class.clone(),
            name: name.to_string(),
        }
    }

    pub fn method(class: &ClassId, name: &str) -> Self {
        Self::Method {
            class: class.clone(),
            name: name.to_string(),
        }
    }

    pub fn parameter(function: &FunctionLikeId, name: &str) -> Self {
        Self::Parameter {
            function: function.clone(),
            name: name.to_string(),
        }
    }

    pub fn alias(class: &ClassId, name: &str) -> Self {
        Self::Alias {
            class: class.clone(),
            name: name.to_string(),
        }
    }

    /// Whether this identity is a standalone declaration a locator can find.
    pub fn is_top_level(&self) -> bool {
        matches!(self, Self::Constant(_) | Self::Function(_) | Self::Class(_))
    }

    /// The identity that owns this member, one level up.
    ///
    /// Parameters are owned by their function or method, templates by their
    /// declaring site, everything else by its class.
    pub fn owner(&self) -> Option<DeclId> {
        match self {
            Self::Constant(_) | Self::Function(_) | Self::Class(_) => None,
            Self::ClassConstant { class, .. }
            | Self::Property { class, .. }
            | Self::Method { class, .. }
            | Self::Alias { class, .. } => Some(Self::Class(class.clone())),
            Self::Parameter { function, .. } => Some(function.to_decl()),
            Self::Template(template) => Some(match &template.site {
                TemplateSite::Class(class) => Self::Class(class.clone()),
                TemplateSite::FunctionLike(function) => function.to_decl(),
            }),
        }
    }

    /// The top-level declaration this identity lives in.
    pub fn root(&self) -> DeclId {
        let mut current = self.clone();
        while let Some(owner) = current.owner() {
            current = owner;
        }
        current
    }

    /// The member name for nested identities.
    pub fn member_name(&self) -> Option<&str> {
        match self {
            Self::Constant(_) | Self::Function(_) | Self::Class(_) => None,
            Self::ClassConstant { name, .. }
            | Self::Property { name, .. }
            | Self::Method { name, .. }
            | Self::Parameter { name, .. }
            | Self::Alias { name, .. } => Some(name),
            Self::Template(template) => Some(&template.name),
        }
    }

    pub fn as_class(&self) -> Option<&ClassId> {
        match self {
            Self::Class(class) => Some(class),
            _ => None,
        }
    }
}

// =============================================================================
// Display
// =============================================================================

impl fmt::Display for ConstantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "const {}", self.0)
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}()"),
            Self::Anonymous { file, line, column } => {
                write!(f, "function@{file}:{line}:{column}")
            }
        }
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Anonymous { file, line, column } => {
                write!(f, "class@{file}:{line}:{column}")
            }
        }
    }
}

impl fmt::Display for FunctionLikeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(function) => write!(f, "{function}"),
            Self::Method { class, name } => write!(f, "{class}::{name}()"),
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.site {
            TemplateSite::Class(class) => write!(f, "{class}<{}>", self.name),
            TemplateSite::FunctionLike(function) => write!(f, "{function}<{}>", self.name),
        }
    }
}

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(constant) => write!(f, "{constant}"),
            Self::Function(function) => write!(f, "{function}"),
            Self::Class(class) => write!(f, "{class}"),
            Self::ClassConstant { class, name } => write!(f, "{class}::{name}"),
            Self::Property { class, name } => write!(f, "{class}::${name}"),
            Self::Method { class, name } => write!(f, "{class}::{name}()"),
            Self::Parameter { function, name } => write!(f, "{function}#${name}"),
            Self::Template(template) => write!(f, "{template}"),
            Self::Alias { class, name } => write!(f, "{class}@type {name}"),
        }
    }
}

#[cfg(test)]
#[path = "../tests/id_tests.rs"]
mod tests;
