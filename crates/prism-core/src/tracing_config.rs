//! Opt-in diagnostics for reflection runs.
//!
//! Logging stays off until `PRISM_LOG` holds an [`EnvFilter`] directive.
//! `RUST_LOG` is read when `PRISM_LOG` is unset. `PRISM_LOG_FORMAT` selects
//! the output, one of `text`, `tree` or `json`:
//!
//! ```bash
//! PRISM_LOG=prism_core::session=debug PRISM_LOG_FORMAT=tree cargo test -p prism-core
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};
use tracing_tree::HierarchicalLayer;

const FILTER_VAR: &str = "PRISM_LOG";
const FORMAT_VAR: &str = "PRISM_LOG_FORMAT";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    /// Events nested under their spans.
    Tree,
    Json,
}

impl LogFormat {
    /// Unknown names fall back to plain text.
    pub fn parse(name: &str) -> Self {
        if name.eq_ignore_ascii_case("tree") {
            Self::Tree
        } else if name.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

fn directives() -> Option<String> {
    std::env::var(FILTER_VAR)
        .or_else(|_| std::env::var(EnvFilter::DEFAULT_ENV))
        .ok()
}

/// Install a global stderr subscriber when a filter is configured.
///
/// A subscriber that is already installed is left in place.
pub fn init_tracing() {
    let Some(directives) = directives() else {
        return;
    };
    let filter = EnvFilter::builder().parse_lossy(directives);
    let format = std::env::var(FORMAT_VAR)
        .map(|name| LogFormat::parse(&name))
        .unwrap_or_default();

    let registry = Registry::default().with(filter);
    let installed = match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Tree => registry
            .with(
                HierarchicalLayer::new(2)
                    .with_targets(true)
                    .with_bracketed_fields(true),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };
    if installed.is_ok() {
        tracing::debug!(?format, "diagnostics enabled");
    }
}
