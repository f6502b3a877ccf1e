//! Domain types for the hold server.
//!
//! Configuration, errors, the response payload, and the pending-request
//! registry. No I/O lives here.

pub mod config;
pub mod error;
pub mod registry;
pub mod types;

// Re-exports for convenience
pub use config::{ConfigError, HoldConfig, HttpConfig};
pub use error::{HoldError, HoldResult};
pub use registry::{HoldTicket, PendingRegistry, PendingRequest, PendingStats, Release};
pub use types::TimestampBody;
