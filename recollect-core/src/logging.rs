//! Logging infrastructure for recollect
//!
//! Diagnostics go to stderr so stdout stays reserved for exported data.

use crate::config::LoggingConfig;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Initialize the logging system
///
/// Sets up tracing with:
/// - Warning/diagnostic output on stderr
/// - Configurable log level via config or RUST_LOG env var
pub fn init(config: &LoggingConfig) {
    // Build the filter from config or env var
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

/// Initialize logging for tests (logs to stdout)
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .with_span_events(FmtSpan::CLOSE)
        .try_init();
}
