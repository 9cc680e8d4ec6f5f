//! Guards for recursive walks.
//!
//! Reflection recurses in several places: constants that reference other
//! constants, nested type expressions, substitution over type trees and
//! supertypes reflected while their subtype is in flight.
//!
//! - [`RecursionGuard`] tracks the keys on the current path, so a key seen
//!   twice is reported as a cycle. It also bounds depth and total work.
//! - [`DepthCounter`] only bounds depth, for walks that may revisit a key.
//!
//! Call sites pick a [`RecursionProfile`] instead of spelling out limits.

use crate::limits;
use rustc_hash::FxHashSet;
use std::hash::Hash;

// =============================================================================
// Profiles
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// Constants referencing constants, enum case values, attribute
    /// arguments.
    Evaluation,
    /// Nesting of documentation type expressions.
    TypeParsing,
    /// Template substitution over a type tree.
    Substitution,
    /// Declarations reflected while another one is in flight.
    Reflection,
    Custom { max_depth: u32, max_iterations: u32 },
}

impl RecursionProfile {
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::Evaluation => limits::MAX_EVALUATION_DEPTH,
            Self::TypeParsing => limits::MAX_TYPE_NESTING_DEPTH,
            Self::Substitution => limits::MAX_SUBSTITUTION_DEPTH,
            Self::Reflection => limits::MAX_REFLECTION_DEPTH,
            Self::Custom { max_depth, .. } => max_depth,
        }
    }

    pub const fn max_iterations(self) -> u32 {
        match self {
            Self::Custom { max_iterations, .. } => max_iterations,
            _ => limits::MAX_GUARDED_ITERATIONS,
        }
    }
}

/// Outcome of [`RecursionGuard::enter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    Entered,
    /// The key is already on the current path.
    Cycle,
    DepthExceeded,
    IterationExceeded,
}

impl RecursionResult {
    pub fn is_entered(self) -> bool {
        self == Self::Entered
    }

    pub fn is_cycle(self) -> bool {
        self == Self::Cycle
    }

    pub fn is_exceeded(self) -> bool {
        matches!(self, Self::DepthExceeded | Self::IterationExceeded)
    }
}

// =============================================================================
// RecursionGuard
// =============================================================================

/// Path-tracking guard.
///
/// Every successful [`enter`](Self::enter) must be paired with a
/// [`leave`](Self::leave) for the same key.
pub struct RecursionGuard<K: Hash + Eq + Clone> {
    path: FxHashSet<K>,
    iterations: u32,
    max_depth: u32,
    max_iterations: u32,
}

impl<K: Hash + Eq + Clone> RecursionGuard<K> {
    pub fn new(max_depth: u32, max_iterations: u32) -> Self {
        Self {
            path: FxHashSet::default(),
            iterations: 0,
            max_depth,
            max_iterations,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth(), profile.max_iterations())
    }

    /// Every attempt counts against the iteration budget, failed ones too.
    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.iterations = self.iterations.saturating_add(1);
        if self.iterations > self.max_iterations {
            RecursionResult::IterationExceeded
        } else if self.path.contains(&key) {
            RecursionResult::Cycle
        } else if self.depth() >= self.max_depth {
            RecursionResult::DepthExceeded
        } else {
            self.path.insert(key);
            RecursionResult::Entered
        }
    }

    pub fn leave(&mut self, key: &K) {
        let removed = self.path.remove(key);
        debug_assert!(removed, "left a key that was never entered");
    }

    pub fn is_visiting(&self, key: &K) -> bool {
        self.path.contains(key)
    }

    pub fn depth(&self) -> u32 {
        self.path.len() as u32
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

// =============================================================================
// DepthCounter
// =============================================================================

#[derive(Debug)]
pub struct DepthCounter {
    depth: u32,
    max_depth: u32,
    exceeded: bool,
}

impl DepthCounter {
    pub fn new(max_depth: u32) -> Self {
        Self {
            depth: 0,
            max_depth,
            exceeded: false,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth())
    }

    /// Go one level deeper; `false` once the limit is reached.
    pub fn enter(&mut self) -> bool {
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return false;
        }
        self.depth += 1;
        true
    }

    pub fn leave(&mut self) {
        debug_assert!(self.depth > 0, "left a DepthCounter at depth 0");
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Stays set after the counter climbs back down.
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }
}

#[cfg(test)]
#[path = "../tests/recursion_tests.rs"]
mod tests;
