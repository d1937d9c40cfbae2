//! Capability token verification.

use std::sync::Arc;

use tracing::{debug, warn};
use warden_crypto::{Algorithm, CryptoError, SigningSecret, jwt};

use crate::claims::CapabilityClaims;
use crate::clock::{Clock, SystemClock};
use crate::error::{CapabilityError, CapabilityResult};

/// Verifies capability tokens issued with a shared secret.
///
/// A token is accepted only if its declared algorithm is allowed, its
/// signature verifies and it has not expired.
///
/// # Example
///
/// ```
/// use warden_capabilities::{Capability, CapabilityVerifier};
///
/// let mut capability = Capability::new("AC123", "s3cr3t");
/// capability.allow_client_incoming("bob")?;
/// let token = capability.generate_token()?;
///
/// let claims = CapabilityVerifier::new("s3cr3t").verify(&token)?;
/// assert_eq!(claims.iss, "AC123");
/// assert!(claims.grants("client", "incoming"));
/// # Ok::<(), warden_capabilities::CapabilityError>(())
/// ```
#[derive(Debug)]
pub struct CapabilityVerifier {
    secret: SigningSecret,
    algorithms: Vec<Algorithm>,
    leeway_secs: i64,
    clock: Arc<dyn Clock>,
}

impl CapabilityVerifier {
    /// Create a verifier accepting every supported algorithm, with no leeway.
    #[must_use]
    pub fn new(secret: impl Into<SigningSecret>) -> Self {
        Self {
            secret: secret.into(),
            algorithms: Algorithm::ALL.to_vec(),
            leeway_secs: 0,
            clock: Arc::new(SystemClock),
        }
    }

    /// Read the time from `clock`.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Accept tokens that expired up to `secs` seconds ago.
    #[must_use]
    pub fn with_leeway(mut self, secs: i64) -> Self {
        self.leeway_secs = secs;
        self
    }

    /// Restrict the accepted algorithms.
    #[must_use]
    pub fn with_algorithms(mut self, algorithms: impl IntoIterator<Item = Algorithm>) -> Self {
        self.algorithms = algorithms.into_iter().collect();
        self
    }

    /// Verify `token` and return its claims.
    ///
    /// # Errors
    ///
    /// - [`CapabilityError::Crypto`] for any codec failure (malformed token,
    ///   missing or unsupported or disallowed algorithm, signature mismatch).
    /// - [`CapabilityError::TokenExpired`] if `exp` is not after the current
    ///   time minus the leeway.
    pub fn verify(&self, token: &str) -> CapabilityResult<CapabilityClaims> {
        let algorithm = jwt::decode_header(token)?.algorithm()?;
        if !self.algorithms.contains(&algorithm) {
            warn!(alg = %algorithm, "capability token algorithm not allowed");
            return Err(CryptoError::UnsupportedAlgorithm(algorithm.to_string()).into());
        }

        let claims: CapabilityClaims = jwt::decode(token, &self.secret)?;

        let now = self.clock.now().timestamp();
        if now >= claims.exp.saturating_add(self.leeway_secs) {
            debug!(exp = claims.exp, now, "capability token expired");
            return Err(CapabilityError::TokenExpired { exp: claims.exp });
        }

        debug!(issuer = %claims.iss, exp = claims.exp, "verified capability token");
        Ok(claims)
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use crate::capability::Capability;
    use crate::clock::FixedClock;
    use chrono::Duration;

    const NOW_MS: i64 = 1_700_000_000_000;

    fn fixed(millis: i64) -> Arc<dyn Clock> {
        Arc::new(FixedClock::from_unix_millis(millis).unwrap())
    }

    fn token(ttl_secs: i64) -> String {
        let mut cap = Capability::with_clock("AC123", "s3cr3t", fixed(NOW_MS));
        cap.allow_client_incoming("bob").unwrap();
        cap.generate_token_with_ttl(Duration::seconds(ttl_secs))
            .unwrap()
    }

    fn verifier_at(millis: i64) -> CapabilityVerifier {
        CapabilityVerifier::new("s3cr3t").with_clock(fixed(millis))
    }

    #[test]
    fn test_valid_token() {
        let claims = verifier_at(NOW_MS).verify(&token(60)).unwrap();
        assert_eq!(claims.iss, "AC123");
        assert_eq!(claims.exp, 1_700_000_060);
        assert_eq!(claims.scope, "scope:client:incoming?clientName=bob");
    }

    #[test]
    fn test_expired_token() {
        // exp = NOW + 60; at exactly exp the token is no longer valid.
        let verifier = verifier_at(NOW_MS + 60_000);
        assert!(matches!(
            verifier.verify(&token(60)),
            Err(CapabilityError::TokenExpired { exp: 1_700_000_060 })
        ));
        assert!(verifier_at(NOW_MS + 59_000).verify(&token(60)).is_ok());
    }

    #[test]
    fn test_leeway() {
        let verifier = verifier_at(NOW_MS + 70_000).with_leeway(30);
        assert!(verifier.verify(&token(60)).is_ok());
        let verifier = verifier_at(NOW_MS + 95_000).with_leeway(30);
        assert!(verifier.verify(&token(60)).is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let verifier = CapabilityVerifier::new("other").with_clock(fixed(NOW_MS));
        assert!(matches!(
            verifier.verify(&token(60)),
            Err(CapabilityError::Crypto(CryptoError::SignatureMismatch))
        ));
    }

    #[test]
    fn test_disallowed_algorithm() {
        let verifier = verifier_at(NOW_MS).with_algorithms([Algorithm::Hs512]);
        assert!(matches!(
            verifier.verify(&token(60)),
            Err(CapabilityError::Crypto(CryptoError::UnsupportedAlgorithm(ref alg))) if alg == "HS256"
        ));
    }

    #[test]
    fn test_malformed_token() {
        assert!(matches!(
            verifier_at(NOW_MS).verify("not-a-token"),
            Err(CapabilityError::Crypto(CryptoError::MalformedToken { .. }))
        ));
    }

    #[test]
    fn test_foreign_payload_shape() {
        let secret = SigningSecret::from("s3cr3t");
        let token = jwt::encode(&serde_json::json!({"sub": "x"}), &secret, Algorithm::Hs256)
            .unwrap();
        assert!(matches!(
            verifier_at(NOW_MS).verify(&token),
            Err(CapabilityError::Crypto(CryptoError::MalformedToken { .. }))
        ));
    }
}
