//! Warden Crypto - Signed token codec for capability tokens.
//!
//! This crate provides:
//! - HMAC signing over SHA-256 and SHA-512 (`HS256`, `HS512`)
//! - The three-segment token format (`header.payload.signature`)
//! - Base64url framing without padding
//! - Constant-time signature verification
//!
//! The codec is payload-agnostic: any `Serialize` value can be signed and any
//! `DeserializeOwned` value can be recovered. Claims semantics live in
//! `warden-capabilities`.
//!
//! # Example
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use warden_crypto::{Algorithm, SigningSecret, jwt};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Claims {
//!     sub: String,
//! }
//!
//! let secret = SigningSecret::from("s3cr3t");
//! let claims = Claims { sub: "alice".into() };
//!
//! let token = jwt::encode(&claims, &secret, Algorithm::Hs256).unwrap();
//! let decoded: Claims = jwt::decode(&token, &secret).unwrap();
//! assert_eq!(decoded, claims);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod jwt;
pub mod prelude;

mod algorithm;
mod encoding;
mod error;
mod secret;

pub use algorithm::Algorithm;
pub use error::{CryptoError, CryptoResult};
pub use jwt::Header;
pub use secret::SigningSecret;
