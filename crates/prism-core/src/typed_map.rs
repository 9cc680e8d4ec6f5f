//! The attribute store.
//!
//! A [`TypedMap`] is an immutable bag of facts about one declaration or
//! member. Keys are declared once (see [`crate::data`]) together with the
//! type of their value:
//!
//! - [`Key<V>`] reads as `Option<&V>`: absence is a valid state.
//! - [`DefaultKey<V>`] reads as `V` (borrowed when stored), falling back to a
//!   default computed from the map itself.
//!
//! Every setter returns a new map. Values are reference-counted, so a new map
//! shares every value it did not replace with the map it was derived from.

use rustc_hash::FxHashMap;
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;

/// A key was read through [`TypedMap::require`] or modified through
/// [`TypedMap::modify`] without a stored value or a default.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("attribute `{key}` is not present")]
pub struct KeyNotPresent {
    pub key: &'static str,
}

// =============================================================================
// Values
// =============================================================================

/// A value that can be stored in a [`TypedMap`].
///
/// Implemented for every `Clone + PartialEq + Debug + Send + Sync` type; the
/// trait exists to compare and print type-erased values.
pub trait AttrValue: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn AttrValue) -> bool;
}

impl<T> AttrValue for T
where
    T: Any + Clone + PartialEq + fmt::Debug + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn AttrValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

// =============================================================================
// Keys
// =============================================================================

/// Anything that names an entry; used by the type-independent operations.
pub trait KeyName {
    fn key_name(&self) -> &'static str;
}

/// A typed key.
pub trait AttributeKey: KeyName {
    type Value: AttrValue + Clone;
    type Read<'m>;

    /// Read this key from `map`.
    fn read<'m>(&self, map: &'m TypedMap) -> Self::Read<'m>;

    /// The value used when nothing is stored.
    fn fallback(&self, map: &TypedMap) -> Option<Self::Value>;
}

/// An optional fact.
pub struct Key<V> {
    name: &'static str,
    _value: PhantomData<fn() -> V>,
}

impl<V> Key<V> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _value: PhantomData,
        }
    }
}

impl<V> KeyName for Key<V> {
    fn key_name(&self) -> &'static str {
        self.name
    }
}

impl<V: AttrValue + Clone> AttributeKey for Key<V> {
    type Value = V;
    type Read<'m> = Option<&'m V>;

    fn read<'m>(&self, map: &'m TypedMap) -> Option<&'m V> {
        map.stored::<V>(self.name)
    }

    fn fallback(&self, _map: &TypedMap) -> Option<V> {
        None
    }
}

/// A fact with a computed default.
pub struct DefaultKey<V> {
    name: &'static str,
    default: fn(&TypedMap) -> V,
}

impl<V> DefaultKey<V> {
    pub const fn new(name: &'static str, default: fn(&TypedMap) -> V) -> Self {
        Self { name, default }
    }
}

impl<V> KeyName for DefaultKey<V> {
    fn key_name(&self) -> &'static str {
        self.name
    }
}

impl<V: AttrValue + Clone> AttributeKey for DefaultKey<V> {
    type Value = V;
    type Read<'m> = Cow<'m, V>;

    fn read<'m>(&self, map: &'m TypedMap) -> Cow<'m, V> {
        match map.stored::<V>(self.name) {
            Some(value) => Cow::Borrowed(value),
            None => Cow::Owned((self.default)(map)),
        }
    }

    fn fallback(&self, map: &TypedMap) -> Option<V> {
        Some((self.default)(map))
    }
}

// =============================================================================
// TypedMap
// =============================================================================

#[derive(Clone, Default)]
pub struct TypedMap {
    entries: Arc<FxHashMap<&'static str, Arc<dyn AttrValue>>>,
}

impl TypedMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn stored<V: AttrValue>(&self, name: &str) -> Option<&V> {
        self.entries
            .get(name)
            .and_then(|value| value.as_ref().as_any().downcast_ref::<V>())
    }

    /// Read a key: `Option<&V>` for [`Key`], `Cow<V>` for [`DefaultKey`].
    pub fn get<K: AttributeKey>(&self, key: &K) -> K::Read<'_> {
        key.read(self)
    }

    /// Read an optional key that must be present.
    pub fn require<V: AttrValue + Clone>(&self, key: &Key<V>) -> Result<&V, KeyNotPresent> {
        self.stored::<V>(key.key_name()).ok_or(KeyNotPresent {
            key: key.key_name(),
        })
    }

    #[must_use]
    pub fn with<K: AttributeKey>(&self, key: &K, value: K::Value) -> Self {
        let mut entries = (*self.entries).clone();
        entries.insert(key.key_name(), Arc::new(value));
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Set `key` only when `value` is `Some`.
    #[must_use]
    pub fn with_opt<K: AttributeKey>(&self, key: &K, value: Option<K::Value>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self.clone(),
        }
    }

    #[must_use]
    pub fn without(&self, keys: &[&dyn KeyName]) -> Self {
        if !keys.iter().any(|key| self.entries.contains_key(key.key_name())) {
            return self.clone();
        }
        let mut entries = (*self.entries).clone();
        for key in keys {
            entries.remove(key.key_name());
        }
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Combine two maps; entries of `other` win.
    #[must_use]
    pub fn merge(&self, other: &TypedMap) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut entries = (*self.entries).clone();
        for (name, value) in other.entries.iter() {
            entries.insert(*name, Arc::clone(value));
        }
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Replace the value of `key` with `f(old)`.
    ///
    /// The old value is the stored one, else the key's default; an optional
    /// key with nothing stored is an error.
    pub fn modify<K: AttributeKey>(
        &self,
        key: &K,
        f: impl FnOnce(K::Value) -> K::Value,
    ) -> Result<Self, KeyNotPresent> {
        let current = match self.stored::<K::Value>(key.key_name()) {
            Some(value) => value.clone(),
            None => key.fallback(self).ok_or(KeyNotPresent {
                key: key.key_name(),
            })?,
        };
        Ok(self.with(key, f(current)))
    }

    pub fn contains(&self, key: &dyn KeyName) -> bool {
        self.entries.contains_key(key.key_name())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of the stored keys, sorted.
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = self.entries.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Whether both maps share the same storage.
    pub fn ptr_eq(&self, other: &TypedMap) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl PartialEq for TypedMap {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        self.entries.len() == other.entries.len()
            && self.entries.iter().all(|(name, value)| {
                other
                    .entries
                    .get(name)
                    .is_some_and(|theirs| value.as_ref().dyn_eq(theirs.as_ref()))
            })
    }
}

impl fmt::Debug for TypedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for name in self.keys() {
            if let Some(value) = self.entries.get(name) {
                map.entry(&name, value);
            }
        }
        map.finish()
    }
}

#[cfg(test)]
#[path = "../tests/typed_map_tests.rs"]
mod tests;
