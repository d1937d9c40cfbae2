#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Layered configuration for Warden.
//!
//! # Usage
//!
//! ```rust,no_run
//! use warden_config::Config;
//!
//! let resolved = Config::load(None).unwrap();
//! println!("issuing as: {}", resolved.config.issuer.account);
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Config file**: the path passed explicitly, otherwise
//!    `<config dir>/warden/config.toml`
//! 2. **Environment variables** (`WARDEN_*`), fallback only
//! 3. **Embedded defaults** (`defaults.toml` compiled into binary)
//!
//! # Design
//!
//! This crate has **no dependencies on other internal warden crates**.
//! Algorithm identifiers and log formats stay strings here; the CLI converts
//! them into domain types.

/// Environment variable fallback resolution.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::ResolvedConfig;
pub use types::*;

impl Config {
    /// Load configuration with full precedence chain.
    ///
    /// See [`loader::load`] for the full algorithm.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed or the final
    /// configuration fails validation.
    pub fn load(path: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(path)
    }

    /// Load configuration from a single file on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }

    /// Render as TOML with the secret redacted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if serialization fails.
    pub fn to_redacted_toml(&self) -> ConfigResult<String> {
        let mut shown = self.clone();
        shown.issuer.secret = types::redact(&self.issuer.secret).to_owned();
        toml::to_string_pretty(&shown).map_err(|e| ConfigError::ValidationError {
            field: "<config>".to_owned(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_toml() {
        let mut config = Config::default();
        config.issuer.account = "AC123".into();
        config.issuer.secret = "hunter2".into();
        let shown = config.to_redacted_toml().unwrap();
        assert!(shown.contains("AC123"));
        assert!(shown.contains("<redacted>"));
        assert!(!shown.contains("hunter2"));
    }
}
