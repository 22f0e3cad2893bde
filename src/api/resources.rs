//! Resource operation seam.
//!
//! The dispatcher hands every matched non-session route to a
//! [`ResourceOperations`] implementation. Storage-backed resource handlers
//! live behind this trait; their responses are returned to the client
//! untouched.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use futures_util::future::BoxFuture;

use crate::http::response::json_error;
use crate::routing::{Operation, RequestContext};

/// Handlers for the resource families (workouts, routines, comments, ...).
pub trait ResourceOperations: Send + Sync + 'static {
    /// Run `operation`. `ctx` carries path params and, for private routes,
    /// the authenticated subject.
    fn call(
        &self,
        operation: Operation,
        ctx: RequestContext,
        request: Request<Body>,
    ) -> BoxFuture<'_, Response>;
}

/// Answers every operation with 501. Used until a backend is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnimplementedResources;

impl ResourceOperations for UnimplementedResources {
    fn call(
        &self,
        operation: Operation,
        ctx: RequestContext,
        _request: Request<Body>,
    ) -> BoxFuture<'_, Response> {
        Box::pin(async move {
            tracing::debug!(
                request_id = %ctx.request_id(),
                operation = %operation,
                "No handler registered for operation"
            );
            json_error(
                StatusCode::NOT_IMPLEMENTED,
                "not_implemented",
                "operation is not implemented",
            )
        })
    }
}
