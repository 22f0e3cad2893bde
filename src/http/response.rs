//! Error responses.
//!
//! # Responsibilities
//! - Define the API error taxonomy
//! - Render every error as a JSON body with a fixed message per kind
//!
//! # Design Decisions
//! - Messages never carry the underlying cause; causes go to the log
//! - 401 responses advertise the bearer scheme via `WWW-Authenticate`
//! - Resource operation responses are never rewritten here

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Errors the API itself can answer with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("no route for request")]
    RouteNotFound,

    #[error("missing or invalid access token")]
    Unauthenticated,

    #[error("refresh session is not valid")]
    InvalidSession,

    #[error("identity assertion could not be verified")]
    OracleVerificationFailed,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::Unauthenticated
            | ApiError::InvalidSession
            | ApiError::OracleVerificationFailed => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::RouteNotFound => "not_found",
            ApiError::Unauthenticated => "unauthenticated",
            ApiError::InvalidSession => "invalid_session",
            ApiError::OracleVerificationFailed => "identity_verification_failed",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Internal => "internal_error",
        }
    }

    /// Client-facing message. Fixed per kind.
    pub fn message(&self) -> &'static str {
        match self {
            ApiError::RouteNotFound => "resource not found",
            ApiError::Unauthenticated => "authentication required",
            ApiError::InvalidSession => "session is no longer valid",
            ApiError::OracleVerificationFailed => "identity could not be verified",
            ApiError::BadRequest(_) => "request body is invalid",
            ApiError::Internal => "internal server error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = json_error(self.status(), self.code(), self.message());
        if self.status() == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// JSON error body `{"error": code, "message": message}`.
pub fn json_error(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({ "error": code, "message": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let response = ApiError::RouteNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());

        let body = body_json(response).await;
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["message"], "resource not found");
    }

    #[tokio::test]
    async fn test_unauthenticated_has_challenge() {
        let response = ApiError::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
        assert_eq!(body_json(response).await["error"], "unauthenticated");
    }

    #[tokio::test]
    async fn test_bad_request_hides_detail() {
        let response = ApiError::BadRequest("expected value at line 1".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["message"], "request body is invalid");
        assert!(!body.to_string().contains("line 1"));
    }
}
