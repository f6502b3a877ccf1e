//! # Hold Telemetry
//!
//! Logging for the hold server. Every arrival, release batch, and per-request
//! release is a `tracing` event; this crate turns them into human-readable
//! lines on stdout for the operator watching the terminal.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hold_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_logging(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HOLD_LOG_LEVEL` | `info` | Log filter, falls back to `RUST_LOG` |
//! | `HOLD_LOG_TARGETS` | `false` | Print module targets |
//! | `HOLD_LOG_THREADS` | `false` | Print thread names |

mod config;

pub use config::{TelemetryConfig, DEFAULT_LOG_LEVEL};

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter {filter:?}: {reason}")]
    Filter { filter: String, reason: String },

    #[error("Failed to install global subscriber: {0}")]
    Install(String),
}

/// Build the filter for `config`
pub fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.log_level).map_err(|e| TelemetryError::Filter {
        filter: config.log_level.clone(),
        reason: e.to_string(),
    })
}

/// Install the global subscriber writing human-readable lines to stdout.
///
/// Fails if a global subscriber is already set.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = build_filter(config)?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(config.show_targets)
        .with_thread_names(config.show_thread_names);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| TelemetryError::Install(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_accepts_directives() {
        let config = TelemetryConfig {
            log_level: "info,hold_gateway=debug".into(),
            ..TelemetryConfig::default()
        };
        assert!(build_filter(&config).is_ok());
    }

    #[test]
    fn test_build_filter_rejects_garbage() {
        let config = TelemetryConfig {
            log_level: "hold_gateway=loudest".into(),
            ..TelemetryConfig::default()
        };
        let err = build_filter(&config).unwrap_err();
        assert!(matches!(err, TelemetryError::Filter { .. }));
    }
}
