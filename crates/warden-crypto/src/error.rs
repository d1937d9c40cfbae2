//! Token codec error types.

use thiserror::Error;

/// Errors that can occur while signing, encoding or verifying a token.
///
/// Every variant means "do not trust this token". None of them carries
/// partially decoded claims.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Wrong number of segments, or a segment is not valid base64url JSON.
    #[error("malformed token: {reason}")]
    MalformedToken {
        /// What was wrong with the token.
        reason: String,
    },

    /// The header declares no algorithm.
    #[error("token header does not declare an algorithm")]
    MissingAlgorithm,

    /// The algorithm identifier is not one of `HS256` / `HS512`.
    #[error("algorithm not supported: {0}")]
    UnsupportedAlgorithm(String),

    /// The recomputed signature differs from the one carried by the token.
    #[error("signature verification failed")]
    SignatureMismatch,

    /// A header or payload could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl CryptoError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedToken {
            reason: reason.into(),
        }
    }
}

/// Result type for token codec operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
