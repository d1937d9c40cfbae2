//! Capability-related error types.

use thiserror::Error;
use warden_crypto::CryptoError;

/// Errors that can occur while building or verifying capability tokens.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// Client name is empty or not ASCII alphanumeric.
    #[error("invalid client name {name:?}: {reason}")]
    InvalidClientName {
        /// The rejected client name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An incoming client name was already granted on this builder.
    #[error("client name already set to {existing:?}")]
    ClientNameAlreadySet {
        /// The name granted first.
        existing: String,
    },

    /// Application id for an outgoing grant is empty.
    #[error("application id must not be empty")]
    InvalidApplicationId,

    /// A scope entry does not follow the scope grammar.
    #[error("invalid scope {scope:?}: {reason}")]
    InvalidScope {
        /// The offending scope text.
        scope: String,
        /// Why it is invalid.
        reason: String,
    },

    /// Token expiry is in the past.
    #[error("capability token expired at {exp}")]
    TokenExpired {
        /// The `exp` claim, seconds since the epoch.
        exp: i64,
    },

    /// Token codec error.
    #[error("token error: {0}")]
    Crypto(#[from] CryptoError),
}

/// Result type for capability operations.
pub type CapabilityResult<T> = Result<T, CapabilityError>;
