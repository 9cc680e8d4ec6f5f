//! Declaration identities and types.
//!
//! This crate is the vocabulary shared by the documentation overlay and the
//! reflection core:
//!
//! - **Identities** (`DeclId`): structural value keys for every declaration
//!   and member.
//! - **Types** (`Type`): one representation for native hints and the richer
//!   documentation grammar.
//! - **Layers** (`TypeLayers`): native / annotated / inferred records with a
//!   computed resolved view.
//! - **Contexts**: name and type resolution scopes.
//! - **Substitution**: template replacement across inheritance edges.

pub mod context;
mod format;
pub mod id;
pub mod layers;
pub mod native;
pub mod subst;
pub mod ty;

pub use context::{NameContext, ResolvedName, TypeContext};
pub use id::{ClassId, ConstantId, DeclId, FunctionId, FunctionLikeId, TemplateId, TemplateSite};
pub use layers::TypeLayers;
pub use subst::TemplateSubstitution;
pub use ty::{CallableKind, CallableParam, ConditionalSubject, ShapeItem, ShapeKey, ShapeKind, Type};
