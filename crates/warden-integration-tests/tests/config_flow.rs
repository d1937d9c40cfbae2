//! Loading issuer settings from a config file and issuing with them.

use std::io::Write;
use std::sync::Arc;

use chrono::Duration;
use warden_capabilities::{Capability, CapabilityVerifier, Clock, FixedClock};
use warden_config::{Config, ConfigError};
use warden_crypto::Algorithm;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock::from_unix_millis(1_700_000_000_000).unwrap())
}

#[test]
fn issue_and_verify_from_config_file() {
    let file = write_config(
        r#"
        [issuer]
        account = "AC123"
        secret = "s3cr3t"
        ttl_secs = 120

        [verify]
        leeway_secs = 30
        algorithms = ["HS256"]
        "#,
    );
    let config = Config::load_file(file.path()).unwrap();
    config.require_issuer().unwrap();

    let mut cap = Capability::with_clock(
        config.issuer.account.clone(),
        config.issuer.secret.clone(),
        clock(),
    );
    cap.allow_client_incoming("bob").unwrap();
    let ttl = Duration::seconds(i64::try_from(config.issuer.ttl_secs).unwrap());
    let token = cap.generate_token_with_ttl(ttl).unwrap();

    let algorithms: Vec<Algorithm> = config
        .verify
        .algorithms
        .iter()
        .map(|a| a.parse().unwrap())
        .collect();
    let verifier = CapabilityVerifier::new(config.issuer.secret.clone())
        .with_algorithms(algorithms)
        .with_leeway(i64::try_from(config.verify.leeway_secs).unwrap())
        .with_clock(clock());

    let claims = verifier.verify(&token).unwrap();
    assert_eq!(claims.iss, "AC123");
    assert_eq!(claims.exp, 1_700_000_120);
}

#[test]
fn incomplete_config_cannot_issue() {
    let file = write_config("[issuer]\naccount = \"AC123\"\n");
    let config = Config::load_file(file.path()).unwrap();
    assert!(matches!(
        config.require_issuer(),
        Err(ConfigError::ValidationError { ref field, .. }) if field == "issuer.secret"
    ));
}

#[test]
fn redacted_output_hides_secret() {
    let file = write_config("[issuer]\naccount = \"AC123\"\nsecret = \"hunter2\"\n");
    let config = Config::load_file(file.path()).unwrap();

    let shown = config.to_redacted_toml().unwrap();
    assert!(!shown.contains("hunter2"));
    assert!(!format!("{config:?}").contains("hunter2"));
}
