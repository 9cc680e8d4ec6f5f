//! Documentation comment type grammar.
//!
//! Doc comments carry a richer type language than native hints: integer
//! ranges, literal and shape types, generics, conditional types, templates
//! and type aliases. This crate covers the whole path from comment text to
//! [`prism_types::Type`]:
//!
//! 1. [`tags::split_tags`] splits a comment into raw `@tag` entries.
//! 2. [`tags::parse_doc_block`] reads the entries into a [`DocBlock`],
//!    settling vendor-prefix conflicts with a [`TagPrioritizer`].
//! 3. [`parser`] turns each type expression into a [`TypeNode`].
//! 4. [`compile::compile_type`] resolves a `TypeNode` against a
//!    `TypeContext`.

pub mod compile;
pub mod error;
pub mod lexer;
pub mod node;
pub mod parser;
pub mod priority;
pub mod tags;

pub use compile::compile_type;
pub use error::{AnnotationError, DocParseError};
pub use node::TypeNode;
pub use parser::{parse_type, parse_type_prefix};
pub use priority::TagPrioritizer;
pub use tags::{
    DocBlock, ImportedTypeTag, ParamTag, TemplateTag, TypeAliasTag, VarTag, Variance,
    parse_doc_block,
};
