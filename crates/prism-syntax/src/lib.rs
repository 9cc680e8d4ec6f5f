//! Syntax tree contract for the prism declaration model.
//!
//! Parsing itself is done by an external collaborator. This crate defines
//! the tree that such a parser hands over: files, namespaces, imports,
//! class-likes and their members, functions, constants, native type hints
//! and the constant-expression subset of the expression grammar.
//!
//! Declarations that the reflector builds facts for are held behind `Arc`
//! so that deferred fact builders can keep them alive without copying.
//!
//! The [`builder`] module offers a fluent way to assemble trees, used by
//! fixture parsers and tests.

pub mod ast;
pub mod builder;
pub mod name;

pub use ast::*;
pub use name::Name;
