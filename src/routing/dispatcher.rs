//! Request dispatch.
//!
//! # Responsibilities
//! - Resolve the request against the route table
//! - Answer unmatched requests with the uniform 404 body
//! - Invoke public operations directly, private ones through the auth gate
//! - Record request metrics
//!
//! # Design Decisions
//! - No retries and no side effects beyond logging and metrics
//! - The operation's response is returned unchanged

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};

use super::context::RequestContext;
use super::router::{Resolution, Router};
use super::table::Operation;
use crate::api::Endpoints;
use crate::auth::AuthGate;
use crate::http::request::request_id_of;
use crate::http::response::ApiError;
use crate::observability::metrics;

/// Routes every request to exactly one operation or to NotFound.
#[derive(Clone)]
pub struct Dispatcher {
    router: Arc<Router>,
    gate: AuthGate,
    endpoints: Endpoints,
}

impl Dispatcher {
    pub fn new(router: Arc<Router>, gate: AuthGate, endpoints: Endpoints) -> Self {
        Self {
            router,
            gate,
            endpoints,
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub async fn dispatch(&self, request: Request<Body>) -> Response {
        let start = Instant::now();
        let request_id = request_id_of(&request);
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        let (operation, response) = match self.router.resolve(&method, &path) {
            Resolution::NotFound => {
                tracing::debug!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    "No route matched"
                );
                (None, ApiError::RouteNotFound.into_response())
            }
            Resolution::Public(matched) => {
                let operation = matched.route.operation;
                let ctx = RequestContext::new(request_id, operation, matched.params);
                let response = self.endpoints.call(operation, ctx, request).await;
                (Some(operation), response)
            }
            Resolution::Private(matched) => {
                let operation = matched.route.operation;
                let ctx = RequestContext::new(request_id, operation, matched.params);
                let response = self
                    .gate
                    .guard(request, ctx, |ctx, request| {
                        self.endpoints.call(operation, ctx, request)
                    })
                    .await;
                (Some(operation), response)
            }
        };

        let status = response.status().as_u16();
        let label = operation.map_or("none", |op| op.as_str());
        metrics::record_request(method.as_str(), status, label, start);
        tracing::debug!(method = %method, path = %path, operation = label, status, "Request dispatched");

        response
    }

    /// Operation a request would reach, without invoking it.
    pub fn operation_for(&self, request: &Request<Body>) -> Option<Operation> {
        self.router
            .resolve(request.method(), request.uri().path())
            .route()
            .map(|route| route.operation)
    }
}
