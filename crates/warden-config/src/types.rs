//! Configuration struct definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Token issuance settings.
    pub issuer: IssuerConfig,
    /// Token verification settings.
    pub verify: VerifyConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Identity and key used to issue capability tokens.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuerConfig {
    /// Account identity placed in the `iss` claim.
    pub account: String,
    /// Shared signing secret. Never printed.
    pub secret: String,
    /// Default token lifetime in seconds.
    pub ttl_secs: u64,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            account: String::new(),
            secret: String::new(),
            ttl_secs: 3600,
        }
    }
}

impl fmt::Debug for IssuerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuerConfig")
            .field("account", &self.account)
            .field("secret", &redact(&self.secret))
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

/// Placeholder shown instead of a secret.
pub(crate) fn redact(secret: &str) -> &'static str {
    if secret.is_empty() { "" } else { "<redacted>" }
}

/// Verification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Seconds a token may be past its expiry and still be accepted.
    pub leeway_secs: u64,
    /// Accepted algorithm identifiers.
    pub algorithms: Vec<String>,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            leeway_secs: 0,
            algorithms: vec!["HS256".to_owned(), "HS512".to_owned()],
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level filter, e.g. `info` or `warden_crypto=debug`.
    pub level: String,
    /// `pretty`, `compact` or `json`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            format: "compact".to_owned(),
        }
    }
}
