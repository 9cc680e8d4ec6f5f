//! Common types and utilities for the prism declaration model.
//!
//! This crate provides foundational types used across all prism crates:
//! - Source spans (`Span`) for declaration locations
//! - Documentation comment utilities
//! - Centralized limits and thresholds
//! - A recursion guard for cycle detection and depth limiting

// Span - Source location tracking (lines, columns and byte offsets)
pub mod span;
pub use span::Span;

// Centralized limits and thresholds
pub mod limits;

// Documentation comment utilities
pub mod comments;

// Cycle detection and depth limiting for recursive computations
pub mod recursion;
pub use recursion::{RecursionGuard, RecursionProfile, RecursionResult};
