//! Bootstrap utilities for orderhub binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing with the ORDERHUB_LOG environment variable.
///
/// Defaults to "info" level if ORDERHUB_LOG is not set.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("ORDERHUB_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Config file path from the first command-line argument, if given.
pub fn parse_config_path() -> Option<String> {
    std::env::args().nth(1)
}
