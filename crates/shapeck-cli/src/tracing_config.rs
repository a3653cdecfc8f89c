//! Tracing configuration.
//!
//! Supports three output formats controlled by `SHAPECK_LOG_FORMAT`:
//!
//! - `text` (default): Standard `tracing-subscriber` flat output
//! - `tree`: Hierarchical indented output via `tracing-tree`
//! - `json`: One JSON object per span/event
//!
//! ```bash
//! SHAPECK_LOG=debug SHAPECK_LOG_FORMAT=tree shapeck shapes.json
//! SHAPECK_LOG="shapeck_solver::registry=trace" shapeck shapes.json
//! ```
//!
//! The subscriber is only initialised when `SHAPECK_LOG` (or `RUST_LOG`) is
//! set. A bare level in `SHAPECK_LOG` only raises the shapeck crates; use
//! full directives to see events from dependencies.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Tree,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("SHAPECK_LOG_FORMAT").unwrap_or_default())
    }
}

/// Crates whose events a bare level in `SHAPECK_LOG` applies to.
const SHAPECK_TARGETS: &[&str] = &["shapeck_solver", "shapeck_cli", "shapeck_common"];

/// Expand a `SHAPECK_LOG` value into filter directives.
///
/// A bare level (`debug`) is scoped to the shapeck crates with everything
/// else at `warn`. A value that already names targets is used verbatim.
pub fn filter_directives(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() || value.contains('=') || value.contains(',') {
        return value.to_string();
    }
    let mut directives = vec!["warn".to_string()];
    directives.extend(SHAPECK_TARGETS.iter().map(|target| format!("{target}={value}")));
    directives.join(",")
}

/// `SHAPECK_LOG` takes precedence over `RUST_LOG`.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("SHAPECK_LOG") {
        EnvFilter::builder().parse_lossy(filter_directives(&val))
    } else {
        EnvFilter::from_default_env()
    }
}

/// Initialise the global tracing subscriber. Output goes to stderr.
pub fn init_tracing() {
    let has_shapeck_log = std::env::var("SHAPECK_LOG").is_ok();
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !has_shapeck_log && !has_rust_log {
        return;
    }

    let filter = build_filter();

    match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_targets(true);

            Registry::default().with(filter).with(tree_layer).init();
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);

            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
