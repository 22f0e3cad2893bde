//! Token service: access token signing/verification and refresh rotation.
//!
//! # Responsibilities
//! - Issue HS256 access tokens and opaque refresh tokens
//! - Verify access tokens (algorithm, signature, expiry, claims)
//! - Rotate refresh tokens exactly once
//! - Revoke refresh tokens (logout)
//!
//! # Design Decisions
//! - The header algorithm is checked before the signature so a token
//!   declaring another algorithm is rejected as such
//! - Expiry is checked against the clock at verification with zero leeway
//! - Only the digest of a refresh token is stored

use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::session::{refresh_key, SessionRecord, SessionStore, SessionStoreError};
use crate::config::AuthConfig;
use crate::observability::metrics;

/// The only accepted signing algorithm.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Length of generated refresh tokens.
const REFRESH_TOKEN_LEN: usize = 48;

/// Identifier of an authenticated local account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subject(String);

impl Subject {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Subject {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Subject {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
    pub jti: String,
}

/// An access/refresh pair handed to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Token service failures.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("malformed token claims")]
    MalformedClaims,

    #[error("unexpected signing algorithm: {0:?}")]
    WrongAlgorithm(Algorithm),

    #[error("refresh session is not valid")]
    InvalidSession,

    #[error("failed to sign token: {0}")]
    Signing(String),

    #[error(transparent)]
    Store(#[from] SessionStoreError),
}

impl TokenError {
    /// Short label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::Expired => "expired",
            TokenError::MalformedClaims => "malformed_claims",
            TokenError::WrongAlgorithm(_) => "wrong_algorithm",
            TokenError::InvalidSession => "invalid_session",
            TokenError::Signing(_) => "signing",
            TokenError::Store(_) => "store",
        }
    }
}

/// Seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Issues and verifies credentials.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
    sessions: Arc<dyn SessionStore>,
}

impl TokenService {
    /// Build from validated configuration and a session store.
    pub fn new(config: &AuthConfig, sessions: Arc<dyn SessionStore>) -> Self {
        let secret = config.signing_secret.as_bytes();

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_ttl_secs: config.access_ttl_secs,
            refresh_ttl_secs: config.refresh_ttl_secs,
            sessions,
        }
    }

    /// Issue a fresh access/refresh pair and open a session for `subject`.
    ///
    /// An empty subject is refused with [`TokenError::MalformedClaims`], the
    /// same error [`verify_access`](Self::verify_access) reports for it.
    pub async fn issue(
        &self,
        subject: &Subject,
        device_id: Option<String>,
    ) -> Result<TokenPair, TokenError> {
        if subject.as_str().is_empty() {
            return Err(TokenError::MalformedClaims);
        }
        let pair = self
            .issue_for_session(subject, device_id, Uuid::new_v4())
            .await?;
        metrics::record_session_event("issued");
        tracing::info!(subject = %subject, "Session issued");
        Ok(pair)
    }

    /// Verify an access token and return its subject.
    pub fn verify_access(&self, token: &str) -> Result<Subject, TokenError> {
        let header = decode_header(token).map_err(|_| TokenError::MalformedClaims)?;
        if header.alg != SIGNING_ALGORITHM {
            return Err(TokenError::WrongAlgorithm(header.alg));
        }

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::InvalidAlgorithm => TokenError::WrongAlgorithm(header.alg),
                _ => TokenError::MalformedClaims,
            }
        })?;

        if data.claims.sub.is_empty() {
            return Err(TokenError::MalformedClaims);
        }
        Ok(Subject::from(data.claims.sub))
    }

    /// Exchange a refresh token for a new pair, invalidating the old token.
    ///
    /// Unknown, already rotated, revoked and expired tokens all fail with
    /// [`TokenError::InvalidSession`].
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, TokenError> {
        let record = self
            .sessions
            .take(&refresh_key(refresh_token))
            .await?
            .ok_or(TokenError::InvalidSession)?;

        if record.is_expired(unix_now()) {
            tracing::debug!(session_id = %record.session_id, "Expired refresh token presented");
            return Err(TokenError::InvalidSession);
        }

        let pair = self
            .issue_for_session(&record.subject, record.device_id, record.session_id)
            .await?;
        metrics::record_session_event("rotated");
        tracing::debug!(session_id = %record.session_id, subject = %record.subject, "Session rotated");
        Ok(pair)
    }

    /// Revoke a refresh token. Unknown or already revoked tokens are not an error.
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), TokenError> {
        if let Some(record) = self.sessions.take(&refresh_key(refresh_token)).await? {
            metrics::record_session_event("revoked");
            tracing::info!(session_id = %record.session_id, subject = %record.subject, "Session revoked");
        }
        Ok(())
    }

    /// Drop expired session records. Returns the number removed.
    pub async fn purge_expired(&self) -> Result<usize, TokenError> {
        Ok(self.sessions.purge_expired(unix_now()).await?)
    }

    async fn issue_for_session(
        &self,
        subject: &Subject,
        device_id: Option<String>,
        session_id: Uuid,
    ) -> Result<TokenPair, TokenError> {
        let now = unix_now();
        let access_token = self.sign_access(subject, now)?;

        let refresh_token = generate_refresh_token();
        let record = SessionRecord {
            session_id,
            subject: subject.clone(),
            device_id,
            issued_at: now,
            expires_at: now.saturating_add(self.refresh_ttl_secs),
        };
        self.sessions.insert(refresh_key(&refresh_token), record).await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_ttl_secs,
        })
    }

    fn sign_access(&self, subject: &Subject, now: u64) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject.as_str().to_string(),
            iat: now,
            exp: now.saturating_add(self.access_ttl_secs),
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

fn generate_refresh_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_TOKEN_LEN)
        .map(char::from)
        .collect()
}
