//! Reflection of declarations for the prism declaration model.
//!
//! A [`Session`] locates the source unit that declares an identity, parses
//! it, turns the syntax tree into an attribute map, runs the enrichment
//! [`hooks`] and caches the result. Maps are immutable: every hook returns
//! a new one.
//!
//! ```ignore
//! let session = Session::builder(parser)
//!     .locator(locator)
//!     .cache(Arc::new(InMemoryCache::new()))
//!     .build();
//! let class = session.reflect(&DeclId::class("App\\User"))?;
//! ```

pub mod cache;
pub mod change;
pub mod data;
pub mod error;
pub mod expression;
pub mod hooks;
pub mod inheritance;
pub mod locator;
pub mod options;
pub mod parser;
pub mod reflector;
pub mod session;
pub mod tracing_config;
pub mod typed_map;

pub use cache::{Cache, Fingerprint, InMemoryCache, NullCache};
pub use change::{ChangeDetector, ContentHashDetector, Detector};
pub use error::{EvaluationError, ReflectionError, Result};
pub use expression::{Expression, Value};
pub use hooks::Hook;
pub use locator::{FileLocator, Locator, LocatorError, MemoryLocator, SourceUnit};
pub use options::ReflectorOptions;
pub use parser::{FixtureParser, ParseError, Parser};
pub use session::{Reflect, ResolutionState, Session, SessionBuilder};
pub use typed_map::{AttributeKey, DefaultKey, Key, KeyName, KeyNotPresent, TypedMap};
