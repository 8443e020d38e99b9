//! Request spans.
//!
//! Every inbound request gets one span carrying its request ID, so log lines
//! emitted while forwarding can be correlated.

use axum::{body::Body, http::Request};
use tracing::Span;

use crate::http::request::request_id;

/// Span for one inbound request (used by `TraceLayer::make_span_with`).
pub fn make_request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        request_id = %request_id(request.headers()),
        method = %request.method(),
        path = %request.uri().path(),
    )
}
