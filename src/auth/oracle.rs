//! Third-party identity assertion verification.
//!
//! The login endpoint hands the caller's assertion to an [`IdentityOracle`]
//! and only ever sees a verified external subject or an error.

use futures_util::future::BoxFuture;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::config::IdentityConfig;

/// Stable identifier of a person at an identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExternalSubject {
    pub issuer: String,
    pub subject: String,
}

/// Errors returned by an identity oracle.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("assertion rejected: {0}")]
    Rejected(String),

    #[error("assertion has expired")]
    Expired,

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Verifies identity assertions issued by an external provider.
pub trait IdentityOracle: Send + Sync + 'static {
    fn verify<'a>(&'a self, assertion: &'a str) -> BoxFuture<'a, Result<ExternalSubject, OracleError>>;
}

#[derive(Debug, Deserialize)]
struct AssertionClaims {
    iss: String,
    sub: String,
}

/// Oracle for HS256-signed JWT assertions sharing a secret with the provider.
///
/// An empty shared secret leaves the oracle without a key; every assertion is
/// then rejected.
pub struct JwtAssertionOracle {
    decoding_key: Option<DecodingKey>,
    validation: Validation,
}

impl JwtAssertionOracle {
    pub fn new(config: &IdentityConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Self {
            decoding_key: (!config.shared_secret.is_empty())
                .then(|| DecodingKey::from_secret(config.shared_secret.as_bytes())),
            validation,
        }
    }

    fn verify_assertion(&self, assertion: &str) -> Result<ExternalSubject, OracleError> {
        let key = self
            .decoding_key
            .as_ref()
            .ok_or_else(|| OracleError::Rejected("no identity secret configured".to_string()))?;
        let data = decode::<AssertionClaims>(assertion, key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => OracleError::Expired,
                _ => OracleError::Rejected(e.to_string()),
            })?;

        let claims = data.claims;
        if claims.sub.is_empty() {
            return Err(OracleError::Rejected("empty subject".to_string()));
        }
        Ok(ExternalSubject {
            issuer: claims.iss,
            subject: claims.sub,
        })
    }
}

impl IdentityOracle for JwtAssertionOracle {
    fn verify<'a>(&'a self, assertion: &'a str) -> BoxFuture<'a, Result<ExternalSubject, OracleError>> {
        Box::pin(async move { self.verify_assertion(assertion) })
    }
}
