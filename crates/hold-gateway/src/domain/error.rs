//! Server-level errors.
//!
//! Nothing here reaches an HTTP client; these only surface at startup or
//! when the accept loop dies.

use crate::domain::config::ConfigError;
use std::net::SocketAddr;

/// Hold server errors
#[derive(Debug, thiserror::Error)]
pub enum HoldError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Server socket bind error
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Accept loop failed after startup
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Result type for server operations
pub type HoldResult<T> = Result<T, HoldError>;
