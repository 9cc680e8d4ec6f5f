//! The type representation.
//!
//! Native hints and documentation types compile into the same `Type` tree.
//! Names inside a `Type` are always fully resolved (no leading `\`, imports
//! applied); `self` and `parent` are bound to concrete classes when the type
//! is compiled, while `static` stays late-bound.
//!
//! Integer refinements are ranges: `positive-int` is `IntRange { min: 1 }`,
//! `int<0, 10>` is `IntRange { min: 0, max: 10 }`.

use crate::id::TemplateId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    /// `array{...}`
    Array,
    /// `list{...}`
    List,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKey {
    Int(i64),
    String(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeItem {
    /// `None` for positional items (`array{int, string}`).
    pub key: Option<ShapeKey>,
    pub value: Type,
    pub optional: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallableKind {
    Callable,
    Closure,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallableParam {
    pub ty: Type,
    pub name: Option<String>,
    pub optional: bool,
    pub variadic: bool,
    pub by_ref: bool,
}

/// The thing a conditional type tests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ConditionalSubject {
    /// `($param is T ? A : B)`
    Parameter(String),
    /// `(T is X ? A : B)`
    Type(Box<Type>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Type {
    // Bottom / top / unit
    Never,
    Void,
    Null,
    Mixed,

    // Scalars
    Bool,
    True,
    False,
    Int,
    IntRange {
        min: Option<i64>,
        max: Option<i64>,
    },
    IntLiteral(i64),
    Float,
    FloatLiteral(f64),
    String,
    NonEmptyString,
    NumericString,
    LiteralString,
    NonFalsyString,
    StringLiteral(String),
    /// `class-string` / `class-string<T>`
    ClassString(Option<Box<Type>>),
    Scalar,
    Numeric,
    ArrayKey,
    Resource,
    Object,

    // Collections
    Array {
        key: Box<Type>,
        value: Box<Type>,
        non_empty: bool,
    },
    List {
        value: Box<Type>,
        non_empty: bool,
    },
    Iterable {
        key: Box<Type>,
        value: Box<Type>,
    },
    Shape {
        kind: ShapeKind,
        items: Vec<ShapeItem>,
        /// `false` when the shape ends with `...`.
        sealed: bool,
    },
    ObjectShape(Vec<ShapeItem>),

    // References
    /// A class-like, optionally with generic arguments.
    Named {
        class: String,
        args: Vec<Type>,
    },
    /// `static` / `$this`, bound late to the class the member is used on.
    Static,
    Template(TemplateId),
    /// A type alias declared (or imported) by a class.
    Alias {
        class: String,
        name: String,
    },
    /// `Foo::BAR` in a type position.
    ClassConstant {
        class: String,
        name: String,
    },

    // Signatures
    Callable {
        kind: CallableKind,
        params: Vec<CallableParam>,
        ret: Option<Box<Type>>,
    },

    // Operators
    Union(Vec<Type>),
    Intersection(Vec<Type>),
    KeyOf(Box<Type>),
    ValueOf(Box<Type>),
    OffsetAccess {
        base: Box<Type>,
        offset: Box<Type>,
    },
    Conditional {
        subject: ConditionalSubject,
        target: Box<Type>,
        if_true: Box<Type>,
        if_false: Box<Type>,
        negated: bool,
    },
}

impl Type {
    /// `positive-int`
    pub const fn positive_int() -> Self {
        Self::IntRange {
            min: Some(1),
            max: None,
        }
    }

    /// `negative-int`
    pub const fn negative_int() -> Self {
        Self::IntRange {
            min: None,
            max: Some(-1),
        }
    }

    /// `non-negative-int`
    pub const fn non_negative_int() -> Self {
        Self::IntRange {
            min: Some(0),
            max: None,
        }
    }

    /// `non-positive-int`
    pub const fn non_positive_int() -> Self {
        Self::IntRange {
            min: None,
            max: Some(0),
        }
    }

    /// A class reference without generic arguments.
    pub fn named(class: impl Into<String>) -> Self {
        Self::Named {
            class: class.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(class: impl Into<String>, args: Vec<Type>) -> Self {
        Self::Named {
            class: class.into(),
            args,
        }
    }

    /// `array` (`array<array-key, mixed>`).
    pub fn array() -> Self {
        Self::Array {
            key: Box::new(Self::ArrayKey),
            value: Box::new(Self::Mixed),
            non_empty: false,
        }
    }

    pub fn array_of(key: Type, value: Type) -> Self {
        Self::Array {
            key: Box::new(key),
            value: Box::new(value),
            non_empty: false,
        }
    }

    pub fn list_of(value: Type) -> Self {
        Self::List {
            value: Box::new(value),
            non_empty: false,
        }
    }

    /// `iterable` (`iterable<mixed, mixed>`).
    pub fn iterable() -> Self {
        Self::Iterable {
            key: Box::new(Self::Mixed),
            value: Box::new(Self::Mixed),
        }
    }

    /// `callable` without a signature.
    pub fn callable() -> Self {
        Self::Callable {
            kind: CallableKind::Callable,
            params: Vec::new(),
            ret: None,
        }
    }

    /// `?T`
    pub fn nullable(inner: Type) -> Self {
        Self::union([inner, Self::Null])
    }

    /// Build a union, flattening nested unions and dropping duplicates.
    ///
    /// An empty union is `never`; a single member is returned as-is.
    pub fn union(members: impl IntoIterator<Item = Type>) -> Self {
        let mut flat: Vec<Type> = Vec::new();
        for member in members {
            match member {
                Self::Union(inner) => {
                    for ty in inner {
                        if !flat.contains(&ty) {
                            flat.push(ty);
                        }
                    }
                }
                Self::Never => {}
                other => {
                    if !flat.contains(&other) {
                        flat.push(other);
                    }
                }
            }
        }
        match flat.len() {
            0 => Self::Never,
            1 => flat.pop().unwrap_or(Self::Never),
            _ => Self::Union(flat),
        }
    }

    /// Build an intersection, flattening nested intersections.
    pub fn intersection(members: impl IntoIterator<Item = Type>) -> Self {
        let mut flat: Vec<Type> = Vec::new();
        for member in members {
            match member {
                Self::Intersection(inner) => {
                    for ty in inner {
                        if !flat.contains(&ty) {
                            flat.push(ty);
                        }
                    }
                }
                other => {
                    if !flat.contains(&other) {
                        flat.push(other);
                    }
                }
            }
        }
        match flat.len() {
            0 => Self::Mixed,
            1 => flat.pop().unwrap_or(Self::Mixed),
            _ => Self::Intersection(flat),
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            Self::Null | Self::Mixed => true,
            Self::Union(members) => members.iter().any(Self::is_nullable),
            _ => false,
        }
    }

    /// Whether any template reference occurs in this type.
    pub fn has_templates(&self) -> bool {
        let mut found = false;
        self.walk(&mut |ty| {
            if matches!(ty, Type::Template(_)) {
                found = true;
            }
        });
        found
    }

    /// Visit this type and every nested type, pre-order.
    pub fn walk(&self, f: &mut dyn FnMut(&Type)) {
        f(self);
        match self {
            Self::ClassString(Some(inner)) | Self::KeyOf(inner) | Self::ValueOf(inner) => {
                inner.walk(f);
            }
            Self::Array { key, value, .. } | Self::Iterable { key, value } => {
                key.walk(f);
                value.walk(f);
            }
            Self::List { value, .. } => value.walk(f),
            Self::Shape { items, .. } | Self::ObjectShape(items) => {
                for item in items {
                    item.value.walk(f);
                }
            }
            Self::Named { args, .. } => {
                for arg in args {
                    arg.walk(f);
                }
            }
            Self::Callable { params, ret, .. } => {
                for param in params {
                    param.ty.walk(f);
                }
                if let Some(ret) = ret {
                    ret.walk(f);
                }
            }
            Self::Union(members) | Self::Intersection(members) => {
                for member in members {
                    member.walk(f);
                }
            }
            Self::OffsetAccess { base, offset } => {
                base.walk(f);
                offset.walk(f);
            }
            Self::Conditional {
                subject,
                target,
                if_true,
                if_false,
                ..
            } => {
                if let ConditionalSubject::Type(subject) = subject {
                    subject.walk(f);
                }
                target.walk(f);
                if_true.walk(f);
                if_false.walk(f);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
#[path = "../tests/ty_tests.rs"]
mod tests;
