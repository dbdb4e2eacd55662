//! Logging setup for the driver

use tracing_subscriber::prelude::*;

/// Initialize logging with sensible defaults.
///
/// Logs go to stderr so stdout only carries the JSON report.
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,meal_map_lib=info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);
    tracing_subscriber::registry().with(fmt_layer).init();

    #[cfg(feature = "profiling")]
    tracing::info!("Logging initialized (profiling scopes emitted as tracing spans)");
    #[cfg(not(feature = "profiling"))]
    tracing::debug!("Logging initialized");
}
