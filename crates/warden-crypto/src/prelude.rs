//! Prelude module - commonly used types for convenient import.
//!
//! Use `use warden_crypto::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust
//! use warden_crypto::prelude::*;
//!
//! let secret = SigningSecret::from("key");
//! let token = jwt::encode(&serde_json::json!({"iss": "AC1"}), &secret, Algorithm::Hs256).unwrap();
//! let claims: serde_json::Value = jwt::decode(&token, &secret).unwrap();
//! assert_eq!(claims["iss"], "AC1");
//! ```

// Errors
pub use crate::{CryptoError, CryptoResult};

// Keys and algorithms
pub use crate::{Algorithm, SigningSecret};

// Codec
pub use crate::jwt;
pub use crate::jwt::Header;
