//! Supported signing algorithms.

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha512};

use crate::error::{CryptoError, CryptoResult};

type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

/// A keyed-hash signing algorithm.
///
/// Only symmetric HMAC algorithms exist. Identifiers are matched exactly,
/// so `"hs256"` or `"none"` are rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// HMAC over SHA-256.
    #[default]
    #[serde(rename = "HS256")]
    Hs256,
    /// HMAC over SHA-512.
    #[serde(rename = "HS512")]
    Hs512,
}

impl Algorithm {
    /// All supported algorithms.
    pub const ALL: [Self; 2] = [Self::Hs256, Self::Hs512];

    /// The wire identifier placed in the token header.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hs256 => "HS256",
            Self::Hs512 => "HS512",
        }
    }

    /// Length in bytes of a signature produced by this algorithm.
    #[must_use]
    pub const fn signature_len(self) -> usize {
        match self {
            Self::Hs256 => 32,
            Self::Hs512 => 64,
        }
    }

    /// Compute the raw HMAC of `message` under `key`.
    pub(crate) fn mac(self, key: &[u8], message: &[u8]) -> CryptoResult<Vec<u8>> {
        // HMAC accepts keys of any length; the error arm is unreachable in practice.
        let invalid_key = |_| CryptoError::Serialization("invalid HMAC key".to_owned());
        let bytes = match self {
            Self::Hs256 => {
                let mut mac = HmacSha256::new_from_slice(key).map_err(invalid_key)?;
                mac.update(message);
                mac.finalize().into_bytes().to_vec()
            },
            Self::Hs512 => {
                let mut mac = HmacSha512::new_from_slice(key).map_err(invalid_key)?;
                mac.update(message);
                mac.finalize().into_bytes().to_vec()
            },
        };
        Ok(bytes)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HS256" => Ok(Self::Hs256),
            "HS512" => Ok(Self::Hs512),
            other => Err(CryptoError::UnsupportedAlgorithm(other.to_owned())),
        }
    }
}
