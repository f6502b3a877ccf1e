//! Server configuration.
//!
//! The only recognized option is `PORT`. Everything else uses defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Default listen port when `PORT` is unset or empty
pub const DEFAULT_PORT: u16 = 8080;

/// Environment variable holding the listen port
pub const PORT_ENV: &str = "PORT";

/// Main server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldConfig {
    /// HTTP listener configuration
    pub http: HttpConfig,
}

impl HoldConfig {
    /// Build configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `PORT`: listen port (default: 8080, also used when set but empty).
    ///   `0` asks the OS for an ephemeral port.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(PORT_ENV).filter(|raw| !raw.is_empty()) {
            config.http.port = raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?;
        }

        Ok(config)
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address (all interfaces)
    pub host: IpAddr,
    /// Port (default: 8080)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid port: {0:?}")]
    InvalidPort(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_port_when_unset() {
        let config = HoldConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.http.port, DEFAULT_PORT);
        assert_eq!(config.http_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_default_port_when_empty() {
        let config = HoldConfig::from_lookup(lookup_from(&[("PORT", "")])).unwrap();
        assert_eq!(config.http.port, 8080);
    }

    #[test]
    fn test_custom_port() {
        let config = HoldConfig::from_lookup(lookup_from(&[("PORT", "3000")])).unwrap();
        assert_eq!(config.http.port, 3000);
        assert_eq!(config.http_addr().port(), 3000);
    }

    #[test]
    fn test_invalid_port() {
        let err = HoldConfig::from_lookup(lookup_from(&[("PORT", "http")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidPort("http".into()));

        let err = HoldConfig::from_lookup(lookup_from(&[("PORT", "70000")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(_)));
    }

    #[test]
    fn test_zero_port_is_ephemeral() {
        let config = HoldConfig::from_lookup(lookup_from(&[("PORT", "0")])).unwrap();
        assert_eq!(config.http.port, 0);
    }

    #[test]
    fn test_port_is_not_trimmed() {
        let err = HoldConfig::from_lookup(lookup_from(&[("PORT", " 3000")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidPort(" 3000".into()));
    }
}
