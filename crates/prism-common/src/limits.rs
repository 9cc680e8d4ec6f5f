//! Centralized limits and thresholds for the declaration model.
//!
//! This module provides shared constants for recursion depths and capacity
//! limits used throughout the workspace. Keeping them in one place prevents
//! inconsistent copies drifting apart between crates.
//!
//! Recursion limits that are enforced through a [`RecursionGuard`] are
//! exposed via [`RecursionProfile`] presets, which read their values from
//! the constants below.
//!
//! [`RecursionGuard`]: crate::recursion::RecursionGuard
//! [`RecursionProfile`]: crate::recursion::RecursionProfile

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting of constant-expression evaluation.
///
/// Evaluating a default value may fetch a class constant whose value fetches
/// another constant, and so on. Each hop adds a nested evaluation; past this
/// depth the evaluator reports an error instead of overflowing the stack.
///
/// # Example
///
/// ```php
/// class A { const X = B::Y + 1; }
/// class B { const Y = C::Z * 2; }
/// // ... 128 levels of indirection ...
/// ```
pub const MAX_EVALUATION_DEPTH: u32 = 128;

/// Maximum nesting of a documentation type expression.
///
/// `array<array<array<...>>>` and deeply nested shapes are parsed
/// recursively; this bounds the parser's stack usage.
pub const MAX_TYPE_NESTING_DEPTH: u32 = 64;

/// Maximum depth of generic substitution.
///
/// Substitution walks a type tree; pathological inputs can nest deeply.
pub const MAX_SUBSTITUTION_DEPTH: u32 = 256;

/// Maximum number of nested reflections on a single call stack.
///
/// Reflecting a class recursively reflects its parent, interfaces and
/// mixins. Genuine hierarchies are shallow; a deeper stack indicates a
/// runaway resolution.
pub const MAX_REFLECTION_DEPTH: u32 = 256;

// =============================================================================
// Stack Limits
// =============================================================================

/// Remaining stack below which a nested reflection moves to a fresh segment.
///
/// One reflection level runs the whole hook pipeline before it can reflect
/// the next supertype, so the zone has to cover a full level.
pub const STACK_RED_ZONE: usize = 256 * 1024;

/// Size of each stack segment allocated once the red zone is reached.
pub const STACK_GROWTH: usize = 4 * 1024 * 1024;

// =============================================================================
// Iteration Limits
// =============================================================================

/// Total budget of guarded steps for a single evaluation or parse.
pub const MAX_GUARDED_ITERATIONS: u32 = 100_000;
