//! Configuration validation rules.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Algorithm identifiers a verifier may be configured with.
pub const KNOWN_ALGORITHMS: &[&str] = &["HS256", "HS512"];

/// Log formats understood by the telemetry setup.
pub const KNOWN_LOG_FORMATS: &[&str] = &["pretty", "compact", "json"];

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

/// Validate a fully merged configuration.
///
/// The issuer account and secret may still be empty here; commands that
/// issue or verify tokens call [`Config::require_issuer`].
///
/// # Errors
///
/// Returns [`ConfigError::ValidationError`] naming the first invalid field.
pub fn validate(config: &Config) -> ConfigResult<()> {
    if config.issuer.ttl_secs == 0 {
        return Err(invalid("issuer.ttl_secs", "must be greater than zero"));
    }
    if i64::try_from(config.issuer.ttl_secs).is_err() {
        return Err(invalid("issuer.ttl_secs", "too large"));
    }

    if config.verify.algorithms.is_empty() {
        return Err(invalid("verify.algorithms", "at least one algorithm is required"));
    }
    if let Some(unknown) = config
        .verify
        .algorithms
        .iter()
        .find(|alg| !KNOWN_ALGORITHMS.contains(&alg.as_str()))
    {
        return Err(invalid(
            "verify.algorithms",
            format!("unsupported algorithm {unknown:?}"),
        ));
    }
    if i64::try_from(config.verify.leeway_secs).is_err() {
        return Err(invalid("verify.leeway_secs", "too large"));
    }

    if config.logging.level.trim().is_empty() {
        return Err(invalid("logging.level", "must not be empty"));
    }
    if !KNOWN_LOG_FORMATS.contains(&config.logging.format.to_ascii_lowercase().as_str()) {
        return Err(invalid(
            "logging.format",
            format!("expected one of {KNOWN_LOG_FORMATS:?}"),
        ));
    }

    Ok(())
}

impl Config {
    /// Check that an issuer identity and secret are configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if either is empty.
    pub fn require_issuer(&self) -> ConfigResult<()> {
        if self.issuer.account.is_empty() {
            return Err(invalid(
                "issuer.account",
                "not set (config file or WARDEN_ACCOUNT)",
            ));
        }
        self.require_secret()
    }

    /// Check that a signing secret is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if the secret is empty.
    pub fn require_secret(&self) -> ConfigResult<()> {
        if self.issuer.secret.is_empty() {
            return Err(invalid(
                "issuer.secret",
                "not set (config file or WARDEN_SECRET)",
            ));
        }
        Ok(())
    }
}
