//! Adapters connecting the registry to the outside world.
//!
//! - `http`: catch-all HTTP handler that holds response bodies
//! - `trigger`: operator input loop that releases them

pub mod http;
pub mod trigger;

pub use http::{build_router, HttpState};
pub use trigger::{ReleaseOutcome, ReleaseTrigger};
