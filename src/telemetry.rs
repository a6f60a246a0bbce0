use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::TelemetryConfig;

/// Initialize structured logging.
///
/// Configures:
/// - `tracing-subscriber::fmt`, compact or JSON.
/// - `EnvFilter` for dynamic log levels (`RUST_LOG` wins over the configured filter).
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(config: &TelemetryConfig) -> bool {
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let registry = tracing_subscriber::registry().with(filter_layer);

    let result = if config.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    };

    result.is_ok()
}
