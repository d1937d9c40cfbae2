//! Three-segment signed tokens.
//!
//! Wire format:
//!
//! ```text
//! base64url(header) "." base64url(payload) "." base64url(signature)
//! ```
//!
//! The header is `{"typ":"JWT","alg":"<identifier>"}`. The payload is the
//! compact JSON serialization of the caller's value; its key order is the
//! `Serialize` order of that value (declaration order for derived structs),
//! which makes the signed bytes deterministic. The signature is the raw HMAC
//! of the first two segments joined by `.`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::algorithm::Algorithm;
use crate::encoding::{decode_segment, encode_segment};
use crate::error::{CryptoError, CryptoResult};
use crate::secret::SigningSecret;

/// Token type written to every header.
pub const TOKEN_TYPE: &str = "JWT";

/// A token header as found on the wire.
///
/// Both fields are optional when parsing so that a missing algorithm can be
/// reported as [`CryptoError::MissingAlgorithm`] instead of a parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Token type, `"JWT"` for tokens produced here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    /// Declared algorithm identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
}

impl Header {
    /// The header written for `algorithm`.
    #[must_use]
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            typ: Some(TOKEN_TYPE.to_owned()),
            alg: Some(algorithm.as_str().to_owned()),
        }
    }

    /// Resolve the declared algorithm.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::MissingAlgorithm`] if `alg` is absent or empty,
    /// or [`CryptoError::UnsupportedAlgorithm`] if it is not supported.
    pub fn algorithm(&self) -> CryptoResult<Algorithm> {
        match self.alg.as_deref() {
            None | Some("") => Err(CryptoError::MissingAlgorithm),
            Some(alg) => alg.parse(),
        }
    }
}

/// The three raw segments of a token.
struct Segments<'a> {
    header: &'a str,
    payload: &'a str,
    signature: &'a str,
}

impl<'a> Segments<'a> {
    fn split(token: &'a str) -> CryptoResult<Self> {
        let mut parts = token.split('.');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(header), Some(payload), Some(signature), None) => Ok(Self {
                header,
                payload,
                signature,
            }),
            _ => Err(CryptoError::malformed("wrong number of segments")),
        }
    }

    fn signing_input(&self) -> String {
        format!("{}.{}", self.header, self.payload)
    }
}

/// Compute the raw signature of `message`.
///
/// # Errors
///
/// Infallible for the supported algorithms; see [`sign_with`] for the
/// identifier-based variant that can reject an algorithm.
pub fn sign(
    message: &[u8],
    secret: &SigningSecret,
    algorithm: Algorithm,
) -> CryptoResult<Vec<u8>> {
    algorithm.mac(secret.expose(), message)
}

/// Compute the raw signature of `message` for an algorithm identifier.
///
/// # Errors
///
/// Returns [`CryptoError::UnsupportedAlgorithm`] if `algorithm` is not
/// `HS256` or `HS512`.
pub fn sign_with(
    message: &[u8],
    secret: &SigningSecret,
    algorithm: &str,
) -> CryptoResult<Vec<u8>> {
    sign(message, secret, algorithm.parse()?)
}

/// Encode and sign `payload`.
///
/// Pure function of its inputs: the same payload, secret and algorithm always
/// produce the same token.
///
/// # Errors
///
/// Returns [`CryptoError::Serialization`] if `payload` cannot be serialized
/// to JSON.
pub fn encode<T: Serialize + ?Sized>(
    payload: &T,
    secret: &SigningSecret,
    algorithm: Algorithm,
) -> CryptoResult<String> {
    let header = serde_json::to_vec(&Header::new(algorithm))
        .map_err(|e| CryptoError::Serialization(e.to_string()))?;
    let payload =
        serde_json::to_vec(payload).map_err(|e| CryptoError::Serialization(e.to_string()))?;

    let mut token = encode_segment(&header);
    token.push('.');
    token.push_str(&encode_segment(&payload));

    let signature = sign(token.as_bytes(), secret, algorithm)?;
    token.push('.');
    token.push_str(&encode_segment(&signature));

    debug!(alg = %algorithm, "encoded signed token");
    Ok(token)
}

/// Decode `token` and verify its signature under `secret`.
///
/// # Errors
///
/// - [`CryptoError::MalformedToken`] if the token does not have exactly three
///   segments, a segment is not base64url JSON, or the payload does not match
///   `T`.
/// - [`CryptoError::MissingAlgorithm`] if the header has no `alg`.
/// - [`CryptoError::UnsupportedAlgorithm`] if `alg` is not supported.
/// - [`CryptoError::SignatureMismatch`] if the signature does not verify.
pub fn decode<T: DeserializeOwned>(token: &str, secret: &SigningSecret) -> CryptoResult<T> {
    decode_with(token, secret, true)
}

/// Decode `token` without checking its signature.
///
/// The result is untrusted input. Use this only to inspect a token, never
/// to authorize anything.
///
/// # Errors
///
/// Returns [`CryptoError::MalformedToken`] if the token is structurally invalid.
pub fn decode_unverified<T: DeserializeOwned>(token: &str) -> CryptoResult<T> {
    let segments = Segments::split(token)?;
    parse_header(segments.header)?;
    into_payload(parse_payload(segments.payload)?)
}

/// Decode `token`, verifying the signature when `verify` is true.
///
/// # Errors
///
/// See [`decode`]. With `verify == false` only structural errors are possible.
pub fn decode_with<T: DeserializeOwned>(
    token: &str,
    secret: &SigningSecret,
    verify: bool,
) -> CryptoResult<T> {
    let segments = Segments::split(token)?;
    let header = parse_header(segments.header)?;
    let payload = parse_payload(segments.payload)?;

    if verify {
        let algorithm = header.algorithm()?;
        verify_signature(&segments, secret, algorithm)?;
        debug!(alg = %algorithm, "verified signed token");
    }

    into_payload(payload)
}

/// Parse the header of `token` without verifying anything else.
///
/// # Errors
///
/// Returns [`CryptoError::MalformedToken`] if the token is structurally invalid.
pub fn decode_header(token: &str) -> CryptoResult<Header> {
    let segments = Segments::split(token)?;
    parse_header(segments.header)
}

fn parse_header(segment: &str) -> CryptoResult<Header> {
    let bytes =
        decode_segment(segment).map_err(|e| CryptoError::malformed(format!("header: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| CryptoError::malformed(format!("header: {e}")))
}

fn parse_payload(segment: &str) -> CryptoResult<serde_json::Value> {
    let bytes =
        decode_segment(segment).map_err(|e| CryptoError::malformed(format!("payload: {e}")))?;
    let value: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|e| CryptoError::malformed(format!("payload: {e}")))?;
    if value.is_null() {
        return Err(CryptoError::malformed("payload: null"));
    }
    Ok(value)
}

fn into_payload<T: DeserializeOwned>(value: serde_json::Value) -> CryptoResult<T> {
    serde_json::from_value(value).map_err(|e| CryptoError::malformed(format!("payload: {e}")))
}

fn verify_signature(
    segments: &Segments<'_>,
    secret: &SigningSecret,
    algorithm: Algorithm,
) -> CryptoResult<()> {
    // A signature segment that does not even decode cannot match.
    let Ok(provided) = decode_segment(segments.signature) else {
        warn!(alg = %algorithm, "token signature segment is not valid base64url");
        return Err(CryptoError::SignatureMismatch);
    };

    let expected = sign(segments.signing_input().as_bytes(), secret, algorithm)?;

    // `ct_eq` on slices of different lengths returns false without leaking
    // the position of the first differing byte.
    if bool::from(expected.ct_eq(&provided)) {
        Ok(())
    } else {
        warn!(alg = %algorithm, "token signature verification failed");
        Err(CryptoError::SignatureMismatch)
    }
}
