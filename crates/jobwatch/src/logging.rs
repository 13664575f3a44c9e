//! Logging setup built on tracing-subscriber.
//!
//! Records emitted through the `log` facade are bridged into tracing with
//! `tracing_log::LogTracer`, so the database layer's `log::` calls and the
//! intake's tracing spans end up in the same output.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::LoggingError;

/// Builds the filter: `RUST_LOG` if set and valid, else the configured level.
pub fn build_env_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| LoggingError::Filter(format!("'{}': {}", level, e)))
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = build_env_filter(&config.level)?;
    let registry = Registry::default().with(filter);

    let installed = match config.format {
        LogFormat::Text => {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_names(true);
            tracing::subscriber::set_global_default(registry.with(layer))
        }
        LogFormat::Json => {
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true);
            tracing::subscriber::set_global_default(registry.with(layer))
        }
    };
    installed.map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    tracing_log::LogTracer::init().map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    tracing::debug!(level = %config.level, format = ?config.format, "Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_build_env_filter_accepts_levels() {
        std::env::remove_var("RUST_LOG");
        for level in ["trace", "debug", "info", "warn", "error"] {
            assert!(build_env_filter(level).is_ok(), "level {}", level);
        }
    }

    #[test]
    #[serial]
    fn test_second_init_fails() {
        let config = LoggingConfig::default();
        // Another test may have installed it already
        let _ = init_logging(&config);
        let err = init_logging(&config).unwrap_err();
        assert!(matches!(err, LoggingError::AlreadyInitialized(_)));
    }
}
