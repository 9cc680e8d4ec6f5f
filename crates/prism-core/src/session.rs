//! Reflection sessions.
//!
//! A [`Session`] turns identities into finished [`TypedMap`]s:
//!
//! ```text
//! Unrequested -> Locating -> Parsing -> Enriching -> Cached
//! ```
//!
//! Parsing a unit yields every declaration in it; the ones not asked for
//! wait in the session buffer as deferred declarations. Enrichment may
//! reflect other identities (supertypes, constants) re-entrantly; asking
//! for an identity that is still in flight is a cycle.
//!
//! Finished maps are kept in the buffer and written to the external cache
//! in one batch when the outermost reflection returns. Failed identities are
//! reset to `Unrequested` and never written.

use crate::cache::{Cache, Fingerprint, NullCache, OptionsDigest};
use crate::data;
use crate::error::{EvaluationError, ReflectionError, Result};
use crate::expression::{Evaluator, Expression, Value};
use crate::hooks::{Hook, Pipeline};
use crate::locator::Locator;
use crate::options::ReflectorOptions;
use crate::parser::Parser;
use crate::reflector::{DeferredDeclaration, NodeReflector};
use crate::typed_map::{DefaultKey, TypedMap};
use prism_common::limits::{STACK_GROWTH, STACK_RED_ZONE};
use prism_common::recursion::RecursionProfile;
use prism_types::{ClassId, DeclId};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::sync::Arc;
use tracing::{debug, trace};

/// Anything that can reflect declarations.
pub trait Reflect {
    fn reflect(&self, id: &DeclId) -> Result<TypedMap>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolutionState {
    Unrequested,
    Locating,
    Parsing,
    Enriching,
    Cached,
}

enum Buffered {
    Pending {
        declaration: DeferredDeclaration,
        hooks: Vec<Arc<dyn Hook>>,
    },
    Resolved(TypedMap),
}

pub struct Session {
    locators: Vec<Box<dyn Locator>>,
    parser: Box<dyn Parser>,
    cache: Arc<dyn Cache>,
    options: ReflectorOptions,
    options_digest: OptionsDigest,
    pipeline: Pipeline,
    max_depth: u32,
    states: RefCell<FxHashMap<DeclId, ResolutionState>>,
    buffer: RefCell<FxHashMap<DeclId, Buffered>>,
    in_flight: RefCell<Vec<DeclId>>,
    pending_writes: RefCell<Vec<(Fingerprint, TypedMap)>>,
}

impl Session {
    pub fn builder(parser: impl Parser + 'static) -> SessionBuilder {
        SessionBuilder::new(parser)
    }

    pub fn options(&self) -> &ReflectorOptions {
        &self.options
    }

    /// Cache key of `id` under this session's options.
    pub fn fingerprint(&self, id: &DeclId) -> Fingerprint {
        Fingerprint::of(id, &self.options_digest)
    }

    pub fn state(&self, id: &DeclId) -> ResolutionState {
        self.states
            .borrow()
            .get(id)
            .copied()
            .unwrap_or(ResolutionState::Unrequested)
    }

    /// Hook names in the order they run.
    pub fn hook_names(&self) -> Vec<&'static str> {
        self.pipeline.names()
    }

    /// Evaluate an expression against the declarations of this session.
    pub fn evaluate(&self, expr: &Expression, static_class: Option<&ClassId>) -> Result<Value, EvaluationError> {
        let evaluator = Evaluator::new(self, self.options.max_evaluation_depth);
        expr.evaluate(&evaluator, static_class)
    }

    fn set_state(&self, id: &DeclId, state: ResolutionState) {
        debug!(%id, ?state, "state transition");
        self.states.borrow_mut().insert(id.clone(), state);
    }

    fn reset(&self, id: &DeclId) {
        debug!(%id, "reset after failure");
        self.states.borrow_mut().remove(id);
    }

    fn resolved(&self, id: &DeclId) -> Option<TypedMap> {
        match self.buffer.borrow().get(id) {
            Some(Buffered::Resolved(data)) => Some(data.clone()),
            _ => None,
        }
    }

    /// The entry stays buffered until it resolves, so a failed attempt can be retried.
    fn pending(&self, id: &DeclId) -> Option<(DeferredDeclaration, Vec<Arc<dyn Hook>>)> {
        match self.buffer.borrow().get(id) {
            Some(Buffered::Pending { declaration, hooks }) => Some((declaration.clone(), hooks.clone())),
            _ => None,
        }
    }

    fn reflect_top_level(&self, id: &DeclId) -> Result<TypedMap> {
        if let Some(data) = self.resolved(id) {
            trace!(%id, "buffer hit");
            return Ok(data);
        }

        {
            let in_flight = self.in_flight.borrow();
            if in_flight.contains(id) {
                let mut chain = in_flight.clone();
                chain.push(id.clone());
                return Err(ReflectionError::CyclicResolution { chain });
            }
            if in_flight.len() >= self.max_depth as usize {
                return Err(ReflectionError::DepthExceeded {
                    id: id.clone(),
                    limit: self.max_depth,
                });
            }
        }

        self.in_flight.borrow_mut().push(id.clone());
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || self.resolve(id));
        let outermost = {
            let mut in_flight = self.in_flight.borrow_mut();
            in_flight.pop();
            in_flight.is_empty()
        };

        let result = match result {
            Ok((data, cached)) => {
                self.buffer
                    .borrow_mut()
                    .insert(id.clone(), Buffered::Resolved(data.clone()));
                self.set_state(id, ResolutionState::Cached);
                if !cached {
                    self.pending_writes
                        .borrow_mut()
                        .push((self.fingerprint(id), data.clone()));
                }
                Ok(data)
            }
            Err(error) => {
                self.reset(id);
                Err(error)
            }
        };

        if outermost {
            let writes = std::mem::take(&mut *self.pending_writes.borrow_mut());
            if !writes.is_empty() {
                debug!(count = writes.len(), "flushing cache writes");
                self.cache.set_multiple(writes);
            }
        }
        result
    }

    /// The finished map, and whether it came from the cache.
    fn resolve(&self, id: &DeclId) -> Result<(TypedMap, bool)> {
        let fingerprint = self.fingerprint(id);
        if let Some(data) = self.cache.get(&fingerprint) {
            let stale = data
                .get(&data::CHANGE_DETECTOR)
                .is_some_and(|detector| detector.has_changed());
            if !stale {
                debug!(%id, "cache hit");
                return Ok((data, true));
            }
            debug!(%id, "stale cache entry");
        } else {
            debug!(%id, "cache miss");
        }

        let (declaration, hooks) = match self.pending(id) {
            Some(pending) => pending,
            None => self.locate_and_parse(id)?,
        };
        self.set_state(id, ResolutionState::Enriching);
        let data = declaration.materialize()?;
        let data = self.pipeline.run(id, data, self, &hooks)?;
        Ok((data, false))
    }

    fn locate_and_parse(&self, id: &DeclId) -> Result<(DeferredDeclaration, Vec<Arc<dyn Hook>>)> {
        self.set_state(id, ResolutionState::Locating);
        let mut located = None;
        for locator in &self.locators {
            match locator.locate(id) {
                Ok(Some(unit)) => {
                    located = Some(unit);
                    break;
                }
                Ok(None) => {}
                Err(source) => {
                    return Err(ReflectionError::LocatorFailed {
                        id: id.clone(),
                        source,
                    });
                }
            }
        }
        let unit = located.ok_or_else(|| ReflectionError::DeclarationNotFound(id.clone()))?;

        self.set_state(id, ResolutionState::Parsing);
        let file = unit.base.get(&data::FILE).cloned();
        let tree = self
            .parser
            .parse(&unit.code, file.as_deref())
            .map_err(|source| ReflectionError::ParseFailed {
                id: id.clone(),
                source,
            })?;

        let mut target = None;
        let mut buffer = self.buffer.borrow_mut();
        for declaration in NodeReflector::collect(&tree, &unit.base) {
            if declaration.id == *id {
                target = Some(declaration.clone());
            }
            let hooks = unit.hooks.clone();
            buffer
                .entry(declaration.id.clone())
                .or_insert_with(|| Buffered::Pending { declaration, hooks });
        }
        debug!(%id, buffered = buffer.len(), "parsed source unit");
        target
            .map(|declaration| (declaration, unit.hooks))
            .ok_or_else(|| ReflectionError::DeclarationNotFound(id.clone()))
    }

    /// Members are reflected through their owner.
    fn reflect_member(&self, id: &DeclId, owner: &DeclId) -> Result<TypedMap> {
        let owner_data = self.reflect(owner)?;
        let key: &DefaultKey<data::Members> = match id {
            DeclId::ClassConstant { .. } => &data::CONSTANTS,
            DeclId::Property { .. } => &data::PROPERTIES,
            DeclId::Method { .. } => &data::METHODS,
            DeclId::Parameter { .. } => &data::PARAMETERS,
            DeclId::Template(_) => &data::TEMPLATES,
            DeclId::Alias { .. } => &data::TYPE_ALIASES,
            DeclId::Constant(_) | DeclId::Function(_) | DeclId::Class(_) => {
                return Err(ReflectionError::DeclarationNotFound(id.clone()));
            }
        };
        id.member_name()
            .and_then(|name| data::member(&owner_data, key, name))
            .ok_or_else(|| ReflectionError::DeclarationNotFound(id.clone()))
    }
}

impl Reflect for Session {
    fn reflect(&self, id: &DeclId) -> Result<TypedMap> {
        match id.owner() {
            Some(owner) => self.reflect_member(id, &owner),
            None => self.reflect_top_level(id),
        }
    }
}

// =============================================================================
// Builder
// =============================================================================

pub struct SessionBuilder {
    locators: Vec<Box<dyn Locator>>,
    parser: Box<dyn Parser>,
    cache: Arc<dyn Cache>,
    options: ReflectorOptions,
    hooks: Vec<Arc<dyn Hook>>,
}

impl SessionBuilder {
    pub fn new(parser: impl Parser + 'static) -> Self {
        Self {
            locators: Vec::new(),
            parser: Box::new(parser),
            cache: Arc::new(NullCache),
            options: ReflectorOptions::default(),
            hooks: Vec::new(),
        }
    }

    /// Locators are asked in the order they are added.
    #[must_use]
    pub fn locator(mut self, locator: impl Locator + 'static) -> Self {
        self.locators.push(Box::new(locator));
        self
    }

    #[must_use]
    pub fn cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn options(mut self, options: ReflectorOptions) -> Self {
        self.options = options;
        self
    }

    /// A hook run for every declaration after the unit hooks.
    #[must_use]
    pub fn hook(mut self, hook: impl Hook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn build(self) -> Session {
        let mut pipeline = Pipeline::new(&self.options);
        for hook in self.hooks {
            pipeline.push(hook);
        }
        Session {
            locators: self.locators,
            parser: self.parser,
            cache: self.cache,
            pipeline,
            max_depth: RecursionProfile::Reflection.max_depth(),
            options_digest: self.options.digest(),
            options: self.options,
            states: RefCell::new(FxHashMap::default()),
            buffer: RefCell::new(FxHashMap::default()),
            in_flight: RefCell::new(Vec::new()),
            pending_writes: RefCell::new(Vec::new()),
        }
    }
}

#[cfg(test)]
#[path = "../tests/session_tests.rs"]
mod tests;
