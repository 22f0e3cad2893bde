//! Request spans.
//!
//! Every request runs inside one `request` span carrying the request ID, so
//! events logged by the dispatcher, the auth gate and the operations can be
//! correlated.

use axum::body::Body;
use axum::http::Request;
use tracing::Span;

use crate::http::request::request_id_of;

/// Span factory for `tower_http::trace::TraceLayer`.
pub fn make_request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        request_id = %request_id_of(request),
        method = %request.method(),
        path = %request.uri().path(),
    )
}
