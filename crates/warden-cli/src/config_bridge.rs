//! Bridge from `warden_config::Config` to domain types.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Duration;
use warden_capabilities::{Capability, CapabilityVerifier, Clock};
use warden_config::Config;
use warden_crypto::Algorithm;
use warden_telemetry::{LogConfig, LogFormat};

/// Logging settings from config. Unknown formats fall back to compact.
pub(crate) fn to_log_config(config: &Config) -> LogConfig {
    let format = config
        .logging
        .format
        .parse::<LogFormat>()
        .unwrap_or_default();
    LogConfig::new(config.logging.level.clone()).with_format(format)
}

/// Configured verification algorithms.
pub(crate) fn algorithms(config: &Config) -> Result<Vec<Algorithm>> {
    config
        .verify
        .algorithms
        .iter()
        .map(|alg| {
            alg.parse::<Algorithm>()
                .with_context(|| format!("verify.algorithms: {alg}"))
        })
        .collect()
}

/// Default token lifetime from config.
pub(crate) fn default_ttl(config: &Config) -> Result<Duration> {
    let secs = i64::try_from(config.issuer.ttl_secs).context("issuer.ttl_secs out of range")?;
    Duration::try_seconds(secs).context("issuer.ttl_secs out of range")
}

/// An empty capability builder for the configured issuer.
pub(crate) fn to_capability(config: &Config, clock: Arc<dyn Clock>) -> Result<Capability> {
    config.require_issuer()?;
    Ok(Capability::with_clock(
        config.issuer.account.clone(),
        config.issuer.secret.clone(),
        clock,
    ))
}

/// A verifier using the configured secret, algorithms and leeway.
pub(crate) fn to_verifier(config: &Config, clock: Arc<dyn Clock>) -> Result<CapabilityVerifier> {
    config.require_secret()?;
    let leeway =
        i64::try_from(config.verify.leeway_secs).context("verify.leeway_secs out of range")?;
    Ok(CapabilityVerifier::new(config.issuer.secret.clone())
        .with_algorithms(algorithms(config)?)
        .with_leeway(leeway)
        .with_clock(clock))
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_capabilities::FixedClock;

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock::from_unix_millis(1_700_000_000_000).unwrap())
    }

    fn configured() -> Config {
        let mut config = Config::default();
        config.issuer.account = "AC123".into();
        config.issuer.secret = "s3cr3t".into();
        config
    }

    #[test]
    fn test_log_config() {
        let mut config = Config::default();
        config.logging.level = "debug".into();
        config.logging.format = "json".into();
        let log = to_log_config(&config);
        assert_eq!(log.level, "debug");
        assert_eq!(log.format, LogFormat::Json);
    }

    #[test]
    fn test_algorithms() {
        let mut config = Config::default();
        assert_eq!(
            algorithms(&config).unwrap(),
            vec![Algorithm::Hs256, Algorithm::Hs512]
        );
        config.verify.algorithms = vec!["none".into()];
        assert!(algorithms(&config).is_err());
    }

    #[test]
    fn test_capability_requires_issuer() {
        assert!(to_capability(&Config::default(), clock()).is_err());
        let cap = to_capability(&configured(), clock()).unwrap();
        assert_eq!(cap.issuer(), "AC123");
    }

    #[test]
    fn test_issue_and_verify_through_config() {
        let config = configured();
        let mut cap = to_capability(&config, clock()).unwrap();
        cap.allow_client_incoming("bob").unwrap();
        let token = cap
            .generate_token_with_ttl(default_ttl(&config).unwrap())
            .unwrap();

        let claims = to_verifier(&config, clock()).unwrap().verify(&token).unwrap();
        assert_eq!(claims.exp, 1_700_003_600);
    }
}
