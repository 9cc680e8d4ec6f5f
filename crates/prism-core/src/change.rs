//! Change detection for cached declarations.
//!
//! A locator may seed a source unit with a [`ChangeDetector`] under
//! `CHANGE_DETECTOR`. The detector travels with every declaration of that
//! unit into the cache; a cached result whose detector reports a change is
//! ignored and the declaration is reflected again.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub trait ChangeDetector: fmt::Debug + Send + Sync {
    /// Stable text describing what is watched and its recorded state.
    fn stamp(&self) -> String;

    /// Whether the watched source differs from the recorded state.
    fn has_changed(&self) -> bool;
}

/// Shared handle stored in a `TypedMap`; two handles are equal when their
/// stamps are.
#[derive(Clone, Debug)]
pub struct Detector(Arc<dyn ChangeDetector>);

impl Detector {
    pub fn new(detector: impl ChangeDetector + 'static) -> Self {
        Self(Arc::new(detector))
    }

    pub fn stamp(&self) -> String {
        self.0.stamp()
    }

    pub fn has_changed(&self) -> bool {
        self.0.has_changed()
    }
}

impl PartialEq for Detector {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.stamp() == other.stamp()
    }
}

/// Compares the blake3 hash of a file with the hash recorded when the
/// source unit was located.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentHashDetector {
    path: PathBuf,
    hash: blake3::Hash,
}

impl ContentHashDetector {
    /// Record the current contents of `path`.
    pub fn for_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let contents = std::fs::read(&path)?;
        Ok(Self {
            hash: blake3::hash(&contents),
            path,
        })
    }

    /// Record `contents` as the state of `path` without reading it.
    pub fn for_contents(path: impl Into<PathBuf>, contents: &[u8]) -> Self {
        Self {
            path: path.into(),
            hash: blake3::hash(contents),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChangeDetector for ContentHashDetector {
    fn stamp(&self) -> String {
        format!("{}#{}", self.path.display(), self.hash.to_hex())
    }

    fn has_changed(&self) -> bool {
        match std::fs::read(&self.path) {
            Ok(contents) => blake3::hash(&contents) != self.hash,
            // A file that can no longer be read has changed.
            Err(_) => true,
        }
    }
}

#[cfg(test)]
#[path = "../tests/change_tests.rs"]
mod tests;
