//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, TTLs ordered, addresses parse)
//! - Enforce presence and strength of the signing and identity secrets
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ApiConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ApiConfig;

/// Minimum accepted length in bytes for either shared secret.
pub const MIN_SECRET_LEN: usize = 32;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("auth.signing_secret is required")]
    MissingSigningSecret,

    #[error("auth.signing_secret must be at least 32 bytes")]
    WeakSigningSecret,

    #[error("identity.shared_secret is required")]
    MissingIdentitySecret,

    #[error("identity.shared_secret must be at least 32 bytes")]
    WeakIdentitySecret,

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("auth.refresh_ttl_secs must exceed auth.access_ttl_secs")]
    RefreshShorterThanAccess,

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &ApiConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let secret = &config.auth.signing_secret;
    if secret.is_empty() {
        errors.push(ValidationError::MissingSigningSecret);
    } else if secret.len() < MIN_SECRET_LEN {
        errors.push(ValidationError::WeakSigningSecret);
    }

    let identity_secret = &config.identity.shared_secret;
    if identity_secret.is_empty() {
        errors.push(ValidationError::MissingIdentitySecret);
    } else if identity_secret.len() < MIN_SECRET_LEN {
        errors.push(ValidationError::WeakIdentitySecret);
    }

    if config.auth.access_ttl_secs == 0 {
        errors.push(ValidationError::Zero { field: "auth.access_ttl_secs" });
    }
    if config.auth.refresh_ttl_secs == 0 {
        errors.push(ValidationError::Zero { field: "auth.refresh_ttl_secs" });
    } else if config.auth.refresh_ttl_secs <= config.auth.access_ttl_secs {
        errors.push(ValidationError::RefreshShorterThanAccess);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::Zero { field: "listener.max_connections" });
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ApiConfig {
        let mut config = ApiConfig::default();
        config.auth.signing_secret = "x".repeat(MIN_SECRET_LEN);
        config.identity.shared_secret = "y".repeat(MIN_SECRET_LEN);
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let config = ApiConfig::default();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::MissingSigningSecret,
                ValidationError::MissingIdentitySecret,
            ]
        );
    }

    #[test]
    fn test_identity_secret_is_required() {
        let mut config = valid_config();
        config.identity.shared_secret.clear();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MissingIdentitySecret]);

        config.identity.shared_secret = "short".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::WeakIdentitySecret]);
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid_config();
        config.auth.signing_secret = "short".to_string();
        config.timeouts.request_secs = 0;
        config.listener.bind_address = "not-an-address".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::WeakSigningSecret));
        assert!(errors.contains(&ValidationError::Zero { field: "timeouts.request_secs" }));
    }

    #[test]
    fn test_refresh_must_outlive_access() {
        let mut config = valid_config();
        config.auth.refresh_ttl_secs = config.auth.access_ttl_secs;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::RefreshShorterThanAccess]);
    }
}
