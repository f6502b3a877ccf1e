//! Middleware for the hold server.

pub mod tracing;

pub use self::tracing::{client_addr, HeldRequestSpan, HeldRequestSpanLayer, SEQUENCE_FIELD};
