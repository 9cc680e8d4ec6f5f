//! Native / annotated / inferred type records.

use crate::ty::Type;
use serde::{Deserialize, Serialize};

/// Up to three independent type facts about one declaration slot.
///
/// - `native`: the language's own type hint.
/// - `annotated`: the documentation type.
/// - `inferred`: derived from a value or default expression.
///
/// [`resolved`](Self::resolved) picks annotated, then native, then inferred.
/// A native type, once present, is never replaced.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeLayers {
    native: Option<Type>,
    annotated: Option<Type>,
    inferred: Option<Type>,
}

impl TypeLayers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_native(native: Option<Type>) -> Self {
        Self {
            native,
            ..Self::default()
        }
    }

    pub fn native(&self) -> Option<&Type> {
        self.native.as_ref()
    }

    pub fn annotated(&self) -> Option<&Type> {
        self.annotated.as_ref()
    }

    pub fn inferred(&self) -> Option<&Type> {
        self.inferred.as_ref()
    }

    /// The best available type.
    pub fn resolved(&self) -> Option<&Type> {
        self.annotated
            .as_ref()
            .or(self.native.as_ref())
            .or(self.inferred.as_ref())
    }

    /// Set the native layer unless one is already present.
    #[must_use]
    pub fn with_native(mut self, native: Type) -> Self {
        if self.native.is_none() {
            self.native = Some(native);
        }
        self
    }

    #[must_use]
    pub fn with_annotated(mut self, annotated: Type) -> Self {
        self.annotated = Some(annotated);
        self
    }

    #[must_use]
    pub fn with_inferred(mut self, inferred: Type) -> Self {
        self.inferred = Some(inferred);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.native.is_none() && self.annotated.is_none() && self.inferred.is_none()
    }

    /// Apply `f` to every present layer.
    #[must_use]
    pub fn map(&self, mut f: impl FnMut(&Type) -> Type) -> Self {
        Self {
            native: self.native.as_ref().map(&mut f),
            annotated: self.annotated.as_ref().map(&mut f),
            inferred: self.inferred.as_ref().map(&mut f),
        }
    }
}

#[cfg(test)]
#[path = "../tests/layers_tests.rs"]
mod tests;
