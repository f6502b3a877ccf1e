//! Ports (trait seams) for the hold server.

pub mod outbound;

pub use outbound::{Clock, FixedClock, SystemClock};
