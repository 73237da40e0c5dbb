// Logging tests
//
// These tests verify structured logging setup using the tracing crate.
// Structured logging provides:
// - JSON-formatted events for log aggregation systems
// - Per-image fields (image name, strategy, error) on batch events
// - Filtering through RUST_LOG

use markscale::config::{LogFormat, LoggingConfig};

/// Test: Can initialize tracing subscriber
///
/// Initialization happens once per process. Every later call, including
/// one with a different config, returns the first result instead of
/// failing on the already-installed global subscriber.
///
/// Test scenarios:
/// 1. First initialization succeeds
/// 2. A second call is a no-op
/// 3. A call with a different format is a no-op too
#[test]
fn test_can_initialize_tracing_subscriber() {
    use markscale::logging::{init_subscriber, init_with};

    assert!(init_subscriber().is_ok());
    assert!(init_subscriber().is_ok());
    assert!(init_with(&LoggingConfig {
        level: "trace".to_string(),
        format: LogFormat::Pretty,
    })
    .is_ok());

    tracing::info!(images = 3, strategy = "fixed", "logging initialized");
}

/// Test: Logging config defaults
///
/// JSON output at `info` unless the config says otherwise.
#[test]
fn test_logging_config_defaults() {
    let config = LoggingConfig::default();
    assert_eq!(config.level, "info");
    assert_eq!(config.format, LogFormat::Json);

    let parsed: LoggingConfig = serde_yaml::from_str("format: pretty").unwrap();
    assert_eq!(parsed.level, "info");
    assert_eq!(parsed.format, LogFormat::Pretty);
}
