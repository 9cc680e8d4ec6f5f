//! External cache of finished declarations.
//!
//! Entries are keyed by a [`Fingerprint`] of the identity's textual form
//! and the [`OptionsDigest`] of the session that reflected it, so sessions
//! with different options never read each other's maps. A cache is shared between sessions, possibly across threads, so
//! implementations are `Send + Sync`.

use crate::options::ReflectorOptions;
use crate::typed_map::TypedMap;
use dashmap::DashMap;
use prism_types::DeclId;
use std::fmt;

/// Bumped whenever the shape of cached maps changes.
pub const FORMAT_VERSION: u32 = 1;

/// See [`ReflectorOptions::digest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OptionsDigest([u8; 32]);

impl From<blake3::Hash> for OptionsDigest {
    fn from(hash: blake3::Hash) -> Self {
        Self(*hash.as_bytes())
    }
}

impl Default for OptionsDigest {
    fn default() -> Self {
        ReflectorOptions::default().digest()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of(id: &DeclId, options: &OptionsDigest) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"prism:");
        hasher.update(&FORMAT_VERSION.to_le_bytes());
        hasher.update(&options.0);
        hasher.update(id.to_string().as_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..16])
    }
}

pub trait Cache: Send + Sync {
    fn get(&self, key: &Fingerprint) -> Option<TypedMap>;

    fn set(&self, key: Fingerprint, data: TypedMap);

    fn set_multiple(&self, entries: Vec<(Fingerprint, TypedMap)>) {
        for (key, data) in entries {
            self.set(key, data);
        }
    }
}

/// Concurrent in-process cache.
#[derive(Default)]
pub struct InMemoryCache {
    entries: DashMap<Fingerprint, TypedMap>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &Fingerprint) -> bool {
        self.entries.contains_key(key)
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl Cache for InMemoryCache {
    fn get(&self, key: &Fingerprint) -> Option<TypedMap> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: Fingerprint, data: TypedMap) {
        self.entries.insert(key, data);
    }
}

/// Stores nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullCache;

impl Cache for NullCache {
    fn get(&self, _key: &Fingerprint) -> Option<TypedMap> {
        None
    }

    fn set(&self, _key: Fingerprint, _data: TypedMap) {}
}

#[cfg(test)]
#[path = "../tests/cache_tests.rs"]
mod tests;
