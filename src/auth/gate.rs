//! Auth gate: bearer credential check in front of private operations.
//!
//! # Responsibilities
//! - Extract the bearer token from the Authorization header
//! - Verify it with the token service
//! - Bind the subject into the request context and run the operation
//!
//! # Design Decisions
//! - Every rejection renders the same 401; the reason is only logged
//! - The wrapped operation's response passes through untouched
//! - Stateless apart from the shared token service

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request};
use axum::response::{IntoResponse, Response};

use super::token::{Subject, TokenError, TokenService};
use crate::http::response::ApiError;
use crate::observability::metrics;
use crate::routing::RequestContext;

/// Why a request was turned away.
#[derive(Debug, thiserror::Error)]
pub enum GateRejection {
    #[error("missing Authorization header")]
    MissingCredential,

    #[error("Authorization header is not a bearer credential")]
    MalformedHeader,

    #[error("credential rejected: {0}")]
    InvalidCredential(#[from] TokenError),
}

impl GateRejection {
    /// Short label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            GateRejection::MissingCredential => "missing_credential",
            GateRejection::MalformedHeader => "malformed_header",
            GateRejection::InvalidCredential(e) => e.reason(),
        }
    }
}

/// Guard applied by the dispatcher to private routes.
#[derive(Clone)]
pub struct AuthGate {
    tokens: Arc<TokenService>,
}

impl AuthGate {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Resolve the caller from request headers.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Subject, GateRejection> {
        let token = extract_bearer(headers)?;
        Ok(self.tokens.verify_access(token)?)
    }

    /// Run `operation` only if the request carries a valid access token.
    pub async fn guard<F, Fut>(
        &self,
        request: Request<Body>,
        mut ctx: RequestContext,
        operation: F,
    ) -> Response
    where
        F: FnOnce(RequestContext, Request<Body>) -> Fut,
        Fut: Future<Output = Response>,
    {
        match self.authenticate(request.headers()) {
            Ok(subject) => {
                ctx.bind_subject(subject);
                operation(ctx, request).await
            }
            Err(rejection) => {
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    operation = %ctx.operation(),
                    reason = rejection.reason(),
                    "Request rejected by auth gate"
                );
                metrics::record_auth_failure(rejection.reason());
                ApiError::Unauthenticated.into_response()
            }
        }
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively; the token must be non-empty.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, GateRejection> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(GateRejection::MissingCredential)?;
    let value = value.to_str().map_err(|_| GateRejection::MalformedHeader)?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or(GateRejection::MalformedHeader)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(GateRejection::MalformedHeader);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(GateRejection::MalformedHeader);
    }
    Ok(token)
}
