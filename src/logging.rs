//! Tracing subscriber setup.
//!
//! Logs go to stderr so the stdio MCP transport owns stdout. `RUST_LOG`
//! overrides the default filter.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `verbose` lowers the default level to debug.
pub fn init(verbose: bool) {
    let default = if verbose {
        "local_docs=debug,tower_http=debug"
    } else {
        "local_docs=info"
    };

    // Ignore the error when a subscriber is already installed (tests).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
