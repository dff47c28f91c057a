//! origami core
//!
//! Source-to-source rewrite engine for markup-in-expression documents. It
//! folds the reserved control-flow tags (`$if`/`$else-if`/`$else`, `$for`,
//! `$let`) into equivalent plain-expression form (nested ternaries,
//! `.map` over sequences, immediately-invoked lambdas), keeping the output
//! byte-for-byte substitutable in the surrounding build pipeline and
//! producing a position map back to the original source.

pub mod config;
pub mod diagnostics;
pub mod discovery;
pub mod edit;
pub mod error;
pub mod executor;
pub mod result;
pub mod rewrite;
pub mod syntax; // Host markup-in-expression tree (lossless, Rowan-based)

// Re-export commonly used types
pub use config::{Config, DEFAULT_GUARD_CALLEE, FilesConfig, TransformConfig};
pub use diagnostics::{Diagnostic, Location, Severity, render_json, render_report};
pub use discovery::{DefaultFileDiscovery, FileDiscovery};
pub use edit::{EditBuffer, PositionMap, Segment};
pub use error::{ErrorKind, OrigamiError};
pub use executor::{ExecutionSummary, FileOutcome, FileResult, TransformExecutor};
pub use result::{Result, ResultExt};
pub use rewrite::{ControlForm, RewriteOutcome, RewriteOutput, Rewriter};

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    init_tracing_with_filter("origami=info");
}

/// Initialize the tracing subscriber with a default filter, overridable via
/// `RUST_LOG`
pub fn init_tracing_with_filter(default_filter: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod lib_tests {
    #[test]
    fn version_is_wired() {
        assert!(!super::VERSION.is_empty());
    }
}
