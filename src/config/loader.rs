//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ApiConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable that overrides `auth.signing_secret`.
pub const SIGNING_SECRET_ENV: &str = "LIFTLOG_SIGNING_SECRET";

/// Environment variable that overrides `identity.shared_secret`.
pub const IDENTITY_SECRET_ENV: &str = "LIFTLOG_IDENTITY_SECRET";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ApiConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ApiConfig = toml::from_str(&content)?;
    finalize(config)
}

/// Validate a configuration built without a file (defaults plus environment).
pub fn load_default_config() -> Result<ApiConfig, ConfigError> {
    finalize(ApiConfig::default())
}

fn finalize(mut config: ApiConfig) -> Result<ApiConfig, ConfigError> {
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply secret overrides from the environment. Empty values are ignored.
fn apply_env_overrides<F>(config: &mut ApiConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(secret) = lookup(SIGNING_SECRET_ENV).filter(|v| !v.is_empty()) {
        config.auth.signing_secret = secret;
    }
    if let Some(secret) = lookup(IDENTITY_SECRET_ENV).filter(|v| !v.is_empty()) {
        config.identity.shared_secret = secret;
    }
}
