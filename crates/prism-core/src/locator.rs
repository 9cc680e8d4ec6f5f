//! Source locators.
//!
//! A locator maps a top-level identity to the source unit that declares it.
//! The unit carries the code to parse, base facts shared by every
//! declaration it contains (file name, change detector) and hooks that only
//! apply to its declarations.

use crate::change::{ContentHashDetector, Detector};
use crate::data;
use crate::hooks::Hook;
use crate::typed_map::TypedMap;
use prism_types::DeclId;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LocatorError {
    pub message: String,
}

impl LocatorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Code plus the facts every declaration in it starts from.
#[derive(Clone)]
pub struct SourceUnit {
    pub code: String,
    pub base: TypedMap,
    pub hooks: Vec<Arc<dyn Hook>>,
}

impl SourceUnit {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            base: TypedMap::new(),
            hooks: Vec::new(),
        }
    }

    /// Seed `FILE` and `EXTENSION` from a path.
    #[must_use]
    pub fn with_file(mut self, path: &str) -> Self {
        self.base = self.base.with(&data::FILE, path.to_string()).with_opt(
            &data::EXTENSION,
            Path::new(path)
                .extension()
                .map(|extension| extension.to_string_lossy().into_owned()),
        );
        self
    }

    #[must_use]
    pub fn with_base(mut self, base: TypedMap) -> Self {
        self.base = self.base.merge(&base);
        self
    }

    #[must_use]
    pub fn with_hook(mut self, hook: Arc<dyn Hook>) -> Self {
        self.hooks.push(hook);
        self
    }
}

impl fmt::Debug for SourceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceUnit")
            .field("code", &self.code)
            .field("base", &self.base)
            .field(
                "hooks",
                &self.hooks.iter().map(|hook| hook.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

pub trait Locator {
    /// The unit declaring `id`, `Ok(None)` when this locator does not know it.
    fn locate(&self, id: &DeclId) -> Result<Option<SourceUnit>, LocatorError>;
}

// =============================================================================
// MemoryLocator
// =============================================================================

struct Registered<T> {
    source: T,
    declares: Vec<DeclId>,
    hooks: Vec<Arc<dyn Hook>>,
}

/// Units held in memory, each registered with the identities it declares.
#[derive(Default)]
pub struct MemoryLocator {
    units: Vec<Registered<(String, String)>>,
}

impl MemoryLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &mut self,
        path: &str,
        code: &str,
        declares: impl IntoIterator<Item = DeclId>,
    ) -> &mut Self {
        self.add_with_hooks(path, code, declares, Vec::new())
    }

    /// Register a unit whose declarations also run `hooks`.
    pub fn add_with_hooks(
        &mut self,
        path: &str,
        code: &str,
        declares: impl IntoIterator<Item = DeclId>,
        hooks: Vec<Arc<dyn Hook>>,
    ) -> &mut Self {
        self.units.push(Registered {
            source: (path.to_string(), code.to_string()),
            declares: declares.into_iter().collect(),
            hooks,
        });
        self
    }
}

impl Locator for MemoryLocator {
    fn locate(&self, id: &DeclId) -> Result<Option<SourceUnit>, LocatorError> {
        let Some(unit) = self.units.iter().find(|unit| unit.declares.contains(id)) else {
            return Ok(None);
        };
        let (path, code) = &unit.source;
        trace!(%id, path, "located in memory");
        let mut located = SourceUnit::new(code.clone()).with_file(path);
        located.hooks = unit.hooks.clone();
        Ok(Some(located))
    }
}

// =============================================================================
// FileLocator
// =============================================================================

/// Files on disk, each registered with the identities it declares.
///
/// Located units carry a [`ContentHashDetector`], so cached declarations
/// are reflected again once their file changes.
#[derive(Default)]
pub struct FileLocator {
    files: Vec<Registered<PathBuf>>,
}

impl FileLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<PathBuf>, declares: impl IntoIterator<Item = DeclId>) -> &mut Self {
        self.files.push(Registered {
            source: path.into(),
            declares: declares.into_iter().collect(),
            hooks: Vec::new(),
        });
        self
    }
}

impl Locator for FileLocator {
    fn locate(&self, id: &DeclId) -> Result<Option<SourceUnit>, LocatorError> {
        let Some(file) = self.files.iter().find(|file| file.declares.contains(id)) else {
            return Ok(None);
        };
        let path = &file.source;
        let contents = std::fs::read(path)
            .map_err(|error| LocatorError::new(format!("cannot read {}: {error}", path.display())))?;
        let detector = ContentHashDetector::for_contents(path.clone(), &contents);
        let code = String::from_utf8(contents)
            .map_err(|_| LocatorError::new(format!("{} is not valid UTF-8", path.display())))?;
        trace!(%id, path = %path.display(), "located on disk");
        let mut located = SourceUnit::new(code)
            .with_file(&path.to_string_lossy())
            .with_base(TypedMap::new().with(&data::CHANGE_DETECTOR, Detector::new(detector)));
        located.hooks = file.hooks.clone();
        Ok(Some(located))
    }
}

#[cfg(test)]
#[path = "../tests/locator_tests.rs"]
mod tests;
