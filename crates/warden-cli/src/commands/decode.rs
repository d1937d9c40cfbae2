//! Decode command - print the claims of a token.

use std::sync::Arc;

use anyhow::{Context, Result};
use warden_capabilities::SystemClock;
use warden_config::Config;
use warden_crypto::jwt;

use crate::config_bridge;

/// Decode `token` into pretty-printed JSON claims.
///
/// With `verify` the signature is checked against the configured secret and
/// the token must not be expired. Without it any well-formed token decodes,
/// including payloads that are not capability claims.
pub(crate) fn decode_claims(config: &Config, token: &str, verify: bool) -> Result<String> {
    let token = token.trim();
    let claims = if verify {
        let verifier = config_bridge::to_verifier(config, Arc::new(SystemClock))?;
        let claims = verifier.verify(token).context("token rejected")?;
        serde_json::to_value(claims)?
    } else {
        jwt::decode_unverified::<serde_json::Value>(token).context("malformed token")?
    };
    Ok(serde_json::to_string_pretty(&claims)?)
}

/// Decode a token and print its claims to stdout.
pub(crate) fn run_decode(config: &Config, token: &str, verify: bool) -> Result<()> {
    if !verify {
        tracing::warn!("signature not verified");
    }
    println!("{}", decode_claims(config, token, verify)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use warden_capabilities::Capability;

    fn configured() -> Config {
        let mut config = Config::default();
        config.issuer.account = "AC123".into();
        config.issuer.secret = "s3cr3t".into();
        config
    }

    fn token(secret: &str, ttl: Duration) -> String {
        let mut cap = Capability::new("AC123", secret);
        cap.allow_client_incoming("bob").unwrap();
        cap.generate_token_with_ttl(ttl).unwrap()
    }

    #[test]
    fn test_decode_verified() {
        let printed = decode_claims(&configured(), &token("s3cr3t", Duration::hours(1)), true)
            .unwrap();
        let claims: serde_json::Value = serde_json::from_str(&printed).unwrap();
        assert_eq!(claims["iss"], "AC123");
        assert_eq!(claims["scope"], "scope:client:incoming?clientName=bob");
    }

    #[test]
    fn test_decode_rejects_wrong_secret() {
        let token = token("other", Duration::hours(1));
        assert!(decode_claims(&configured(), &token, true).is_err());
        assert!(decode_claims(&configured(), &token, false).is_ok());
    }

    #[test]
    fn test_decode_rejects_expired() {
        let token = token("s3cr3t", Duration::hours(-1));
        assert!(decode_claims(&configured(), &token, true).is_err());
        assert!(decode_claims(&configured(), &token, false).is_ok());
    }

    #[test]
    fn test_decode_without_secret() {
        let token = token("s3cr3t", Duration::hours(1));
        assert!(decode_claims(&Config::default(), &token, true).is_err());
        assert!(decode_claims(&Config::default(), &token, false).is_ok());
    }

    #[test]
    fn test_decode_garbage() {
        assert!(decode_claims(&configured(), "not.a.token", false).is_err());
    }
}
