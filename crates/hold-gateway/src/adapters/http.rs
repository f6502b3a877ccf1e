//! HTTP adapter - the catch-all request handler.
//!
//! Every request, whatever its method or path, is registered, answered with
//! `200 OK` and `Content-Type: text/plain` straight away, and then left with
//! an open body until its batch is released.

use crate::domain::registry::{HoldTicket, PendingRegistry};
use crate::domain::types::TimestampBody;
use crate::middleware::{client_addr, HeldRequestSpanLayer, SEQUENCE_FIELD};
use crate::ports::outbound::Clock;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use bytes::Bytes;
use futures::{future, stream, Stream, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, Instrument, Span};

/// Content type sent with the flushed headers
pub const CONTENT_TYPE: &str = "text/plain";

/// Application state shared across handlers
#[derive(Clone)]
pub struct HttpState {
    pub registry: Arc<PendingRegistry>,
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    pub fn with_clock(registry: Arc<PendingRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }
}

/// Build the router: one fallback route catching every method and path
pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .fallback(hold_request)
        .layer(HeldRequestSpanLayer)
        .with_state(state)
}

async fn hold_request(State(state): State<HttpState>, req: Request) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let remote_addr = client_addr(&req)
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let ticket = state
        .registry
        .register(remote_addr.as_str(), path.as_str(), method.as_str());

    let span = Span::current();
    span.record(SEQUENCE_FIELD, ticket.sequence);

    info!(
        sequence = ticket.sequence,
        pending = ticket.pending_count,
        "Request #{}: {} {} from {}",
        ticket.sequence,
        method,
        path,
        remote_addr
    );
    info!(
        "Pending requests: {} (Press ENTER to release all)",
        ticket.pending_count
    );

    let body = Body::from_stream(held_body(ticket, state.clock, span));

    (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response()
}

/// Body that yields nothing until released, then a single timestamp line.
///
/// Ends empty if the release signal is dropped without firing.
fn held_body(
    ticket: HoldTicket,
    clock: Arc<dyn Clock>,
    span: Span,
) -> impl Stream<Item = Result<Bytes, serde_json::Error>> + Send + 'static {
    stream::once(wait_for_release(ticket, clock).instrument(span)).filter_map(future::ready)
}

async fn wait_for_release(
    ticket: HoldTicket,
    clock: Arc<dyn Clock>,
) -> Option<Result<Bytes, serde_json::Error>> {
    let HoldTicket {
        sequence,
        arrived_at,
        release,
        ..
    } = ticket;

    let release = match release.await {
        Ok(release) => release,
        Err(_) => {
            debug!(sequence, "Release signal dropped without firing");
            return None;
        }
    };

    let waited = release.released_at.saturating_duration_since(arrived_at);
    info!(
        sequence,
        batch = release.batch,
        waited_ms = waited.as_millis() as u64,
        "Request #{}: Response body sent after waiting {:?}",
        sequence,
        waited
    );

    Some(TimestampBody::at(clock.now()).to_bytes())
}
