//! Telemetry configuration from environment variables.

use std::env;

/// Default log filter
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration for operator-facing logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Log filter directive (trace, debug, info, warn, error, or full `EnvFilter` syntax)
    pub log_level: String,

    /// Whether to print the emitting module with each line
    pub show_targets: bool,

    /// Whether to print the emitting thread with each line
    pub show_thread_names: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            show_targets: false,
            show_thread_names: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `HOLD_LOG_LEVEL` or `RUST_LOG`: Log filter (default: info)
    /// - `HOLD_LOG_TARGETS`: Show module targets (default: false)
    /// - `HOLD_LOG_THREADS`: Show thread names (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| {
            lookup(key)
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false)
        };

        Self {
            log_level: lookup("HOLD_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),

            show_targets: flag("HOLD_LOG_TARGETS"),

            show_thread_names: flag("HOLD_LOG_THREADS"),
        }
    }
}
