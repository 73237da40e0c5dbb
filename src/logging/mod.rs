// Logging module for structured logging using the tracing crate

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

static INIT_RESULT: OnceLock<Result<(), String>> = OnceLock::new();

/// Initialize the tracing subscriber with the default logging config.
///
/// The subscriber is configured with:
/// - JSON formatting for easy parsing by log aggregation systems
/// - Filtering from `RUST_LOG`, falling back to `info`
/// - Output to stdout
///
/// Calling it more than once is harmless: the first call wins and later
/// calls return its result.
///
/// # Examples
///
/// ```
/// use markscale::logging::init_subscriber;
///
/// init_subscriber().expect("Failed to initialize logging");
/// tracing::info!("Geometry engine ready");
/// ```
pub fn init_subscriber() -> Result<(), String> {
    init_with(&LoggingConfig::default())
}

/// Initialize the tracing subscriber from a [`LoggingConfig`].
///
/// `RUST_LOG` takes precedence over `config.level`.
pub fn init_with(config: &LoggingConfig) -> Result<(), String> {
    INIT_RESULT
        .get_or_init(|| {
            let filter = EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.level))
                .map_err(|e| format!("Invalid log filter '{}': {}", config.level, e))?;

            let builder = tracing_subscriber::fmt().with_env_filter(filter);
            let result = match config.format {
                LogFormat::Json => builder.json().try_init(),
                LogFormat::Pretty => builder.pretty().try_init(),
            };

            // Another global subscriber (e.g. a test harness) is fine
            if let Err(e) = result {
                eprintln!("tracing subscriber already set: {}", e);
            }
            Ok(())
        })
        .clone()
}
