//! Tracing middleware.
//!
//! Opens a `held_request` span per request. The handler records the
//! sequence number into it and the held body stream is instrumented with the
//! same span, so arrival and release lines share context.

use axum::{extract::ConnectInfo, http::Request};
use std::net::SocketAddr;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{field, info_span, instrument::Instrumented, Instrument, Span};

/// Span field the handler fills in once the request is registered
pub const SEQUENCE_FIELD: &str = "hold.sequence";

/// Wraps every request in a `held_request` span
#[derive(Debug, Clone, Copy, Default)]
pub struct HeldRequestSpanLayer;

impl<S> Layer<S> for HeldRequestSpanLayer {
    type Service = HeldRequestSpan<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HeldRequestSpan(inner)
    }
}

/// Service half of [`HeldRequestSpanLayer`].
///
/// The inner future is instrumented in place, so the handler and anything it
/// logs before returning headers run inside the span.
#[derive(Debug, Clone)]
pub struct HeldRequestSpan<S>(S);

impl<S, B> Service<Request<B>> for HeldRequestSpan<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Instrumented<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.0.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let span = request_span(&req);
        let future = span.in_scope(|| self.0.call(req));
        future.instrument(span)
    }
}

fn request_span<B>(req: &Request<B>) -> Span {
    let client = client_addr(req)
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    info_span!(
        "held_request",
        http.method = %req.method(),
        http.target = %req.uri().path(),
        client.address = %client,
        hold.sequence = field::Empty,
    )
}

/// Peer address of the connection, when the server was started with connect info
pub fn client_addr<B>(req: &Request<B>) -> Option<SocketAddr> {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|connect_info| connect_info.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_client_addr_from_connect_info() {
        let addr: SocketAddr = "192.168.1.20:41000".parse().unwrap();
        let mut req = Request::new(Body::empty());
        req.extensions_mut().insert(ConnectInfo(addr));

        assert_eq!(client_addr(&req), Some(addr));
    }

    #[test]
    fn test_request_span_is_named_held_request() {
        let req = Request::builder()
            .method("POST")
            .uri("/orders?id=3")
            .body(Body::empty())
            .unwrap();

        let span = request_span(&req);

        // Disabled when no subscriber is installed; metadata is still present
        if let Some(metadata) = span.metadata() {
            assert_eq!(metadata.name(), "held_request");
            assert!(metadata.fields().field(SEQUENCE_FIELD).is_some());
        }
    }

    #[test]
    fn test_client_addr_missing() {
        let req = Request::new(Body::empty());
        assert_eq!(client_addr(&req), None);
    }
}
