//! Session endpoints: login, refresh, logout.
//!
//! # Data Flow
//! ```text
//! POST /auth/login    {assertion, device_id?}
//!     → IdentityOracle::verify → AccountDirectory::resolve_or_provision
//!     → TokenService::issue → 200 TokenPair
//!
//! POST /auth/refresh  {refresh_token}
//!     → TokenService::refresh → 200 TokenPair
//!
//! POST /logout        {refresh_token}     (behind the auth gate)
//!     → TokenService::revoke → 204
//! ```

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::auth::{AccountDirectory, IdentityOracle, OracleError, TokenError, TokenService};
use crate::http::response::ApiError;
use crate::routing::RequestContext;

/// Session bodies are tiny; anything larger is rejected before parsing.
const MAX_SESSION_BODY: usize = 16 * 1024;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub assertion: String,
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

/// Handlers for the session entrypoints.
#[derive(Clone)]
pub struct SessionEndpoints {
    tokens: Arc<TokenService>,
    oracle: Arc<dyn IdentityOracle>,
    accounts: Arc<dyn AccountDirectory>,
}

impl SessionEndpoints {
    pub fn new(
        tokens: Arc<TokenService>,
        oracle: Arc<dyn IdentityOracle>,
        accounts: Arc<dyn AccountDirectory>,
    ) -> Self {
        Self {
            tokens,
            oracle,
            accounts,
        }
    }

    pub async fn login(&self, ctx: RequestContext, request: Request<Body>) -> Response {
        match self.try_login(&ctx, request).await {
            Ok(response) => response,
            Err(e) => e.into_response(),
        }
    }

    async fn try_login(
        &self,
        ctx: &RequestContext,
        request: Request<Body>,
    ) -> Result<Response, ApiError> {
        let body: LoginRequest = read_json(request).await?;

        let external = self.oracle.verify(&body.assertion).await.map_err(|e| {
            match &e {
                OracleError::Unavailable(_) => {
                    tracing::warn!(request_id = %ctx.request_id(), error = %e, "Identity provider unavailable")
                }
                _ => tracing::debug!(request_id = %ctx.request_id(), error = %e, "Identity assertion rejected"),
            }
            ApiError::OracleVerificationFailed
        })?;

        let subject = self
            .accounts
            .resolve_or_provision(&external)
            .await
            .map_err(|e| {
                tracing::error!(request_id = %ctx.request_id(), error = %e, "Account lookup failed");
                ApiError::Internal
            })?;

        let pair = self
            .tokens
            .issue(&subject, body.device_id)
            .await
            .map_err(|e| internal(ctx, e))?;

        Ok(Json(pair).into_response())
    }

    pub async fn refresh(&self, ctx: RequestContext, request: Request<Body>) -> Response {
        match self.try_refresh(&ctx, request).await {
            Ok(response) => response,
            Err(e) => e.into_response(),
        }
    }

    async fn try_refresh(
        &self,
        ctx: &RequestContext,
        request: Request<Body>,
    ) -> Result<Response, ApiError> {
        let body: RefreshRequest = read_json(request).await?;
        match self.tokens.refresh(&body.refresh_token).await {
            Ok(pair) => Ok(Json(pair).into_response()),
            Err(TokenError::InvalidSession) => {
                tracing::debug!(request_id = %ctx.request_id(), "Refresh with invalid session");
                Err(ApiError::InvalidSession)
            }
            Err(e) => Err(internal(ctx, e)),
        }
    }

    /// Revoke the presented refresh token. Unknown tokens still yield 204.
    pub async fn logout(&self, ctx: RequestContext, request: Request<Body>) -> Response {
        match self.try_logout(&ctx, request).await {
            Ok(()) => StatusCode::NO_CONTENT.into_response(),
            Err(e) => e.into_response(),
        }
    }

    async fn try_logout(&self, ctx: &RequestContext, request: Request<Body>) -> Result<(), ApiError> {
        let body: LogoutRequest = read_json(request).await?;
        self.tokens
            .revoke(&body.refresh_token)
            .await
            .map_err(|e| internal(ctx, e))?;
        tracing::debug!(
            request_id = %ctx.request_id(),
            subject = ?ctx.subject().map(|s| s.as_str()),
            "Logout processed"
        );
        Ok(())
    }
}

fn internal(ctx: &RequestContext, error: TokenError) -> ApiError {
    tracing::error!(request_id = %ctx.request_id(), error = %error, "Token service failure");
    ApiError::Internal
}

async fn read_json<T: DeserializeOwned>(request: Request<Body>) -> Result<T, ApiError> {
    let bytes = to_bytes(request.into_body(), MAX_SESSION_BODY)
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::BadRequest(e.to_string()))
}
