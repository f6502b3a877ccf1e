//! Hold Gateway - an HTTP server that holds response bodies until released.
//!
//! Every inbound request is answered with `200 OK` headers right away, then
//! its body is withheld until the operator releases all pending requests at
//! once. Useful for reproducing races, thundering herds, and slow-server
//! behavior by hand.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        HOLD GATEWAY                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐                     ┌──────────────────┐   │
//! │  │ HTTP handler │   one per request   │ Release trigger  │   │
//! │  │  (catch-all) │                     │ (operator input) │   │
//! │  └──────┬───────┘                     └────────┬─────────┘   │
//! │         │ register                    drain_all│             │
//! │  ┌──────┴──────────────────────────────────────┴─────────┐   │
//! │  │                 Pending Registry                      │   │
//! │  │   Vec<PendingRequest> + counter under one mutex       │   │
//! │  └──────────────────────────┬────────────────────────────┘   │
//! │                             │ oneshot per request            │
//! │                             ▼                                │
//! │                handler resumes, writes timestamp             │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use hold_gateway::{HoldConfig, HoldServerService};
//!
//! let service = HoldServerService::bind(HoldConfig::from_env()?).await?;
//! service.trigger().spawn_stdin()?;
//! service
//!     .serve_with_shutdown(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod middleware;
pub mod ports;
pub mod service;

// Re-exports for public API
pub use adapters::{build_router, HttpState, ReleaseOutcome, ReleaseTrigger};
pub use domain::config::{ConfigError, HoldConfig, HttpConfig, DEFAULT_PORT};
pub use domain::error::{HoldError, HoldResult};
pub use domain::registry::{HoldTicket, PendingRegistry, PendingRequest, PendingStats, Release};
pub use domain::types::TimestampBody;
pub use ports::{Clock, FixedClock, SystemClock};
pub use service::HoldServerService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
