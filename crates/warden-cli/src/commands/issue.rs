//! Issue command - build and sign a capability token.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::Duration;
use clap::Args;
use warden_capabilities::{Capability, ScopeParams, SystemClock};
use warden_config::Config;

use crate::config_bridge;

/// Grants and lifetime for `warden issue`.
#[derive(Debug, Args)]
pub(crate) struct IssueArgs {
    /// Allow incoming connections for this client name
    #[arg(long, value_name = "NAME")]
    pub(crate) incoming: Option<String>,

    /// Allow outgoing connections to this application
    #[arg(long, value_name = "APPSID")]
    pub(crate) outgoing: Option<String>,

    /// Parameter passed to the outgoing application (repeatable)
    #[arg(long = "app-param", value_name = "K=V", value_parser = parse_key_value, requires = "outgoing")]
    pub(crate) app_params: Vec<(String, String)>,

    /// Allow subscribing to the event stream
    #[arg(long)]
    pub(crate) stream: bool,

    /// Event stream filter (repeatable)
    #[arg(long = "filter", value_name = "K=V", value_parser = parse_key_value, requires = "stream")]
    pub(crate) filters: Vec<(String, String)>,

    /// Token lifetime in seconds (defaults to `issuer.ttl_secs`)
    #[arg(long, value_name = "SECS")]
    pub(crate) ttl: Option<u64>,
}

/// Split `key=value` at the first `=`. The value may be empty.
pub(crate) fn parse_key_value(raw: &str) -> Result<(String, String)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("expected KEY=VALUE, got {raw:?}");
    };
    if key.is_empty() {
        bail!("empty key in {raw:?}");
    }
    Ok((key.to_owned(), value.to_owned()))
}

/// Apply the requested grants to `capability`.
pub(crate) fn apply_grants(capability: &mut Capability, args: &IssueArgs) -> Result<()> {
    if let Some(name) = &args.incoming {
        capability.allow_client_incoming(name)?;
    }
    if let Some(app_sid) = &args.outgoing {
        capability.allow_client_outgoing(app_sid, ScopeParams::from(args.app_params.clone()))?;
    }
    if args.stream {
        capability.allow_event_stream(ScopeParams::from(args.filters.clone()))?;
    }
    Ok(())
}

fn resolve_ttl(config: &Config, args: &IssueArgs) -> Result<Duration> {
    match args.ttl {
        Some(secs) => {
            let secs = i64::try_from(secs).context("--ttl out of range")?;
            Duration::try_seconds(secs).context("--ttl out of range")
        },
        None => config_bridge::default_ttl(config),
    }
}

/// Issue a token and print it to stdout.
pub(crate) fn run_issue(config: &Config, args: &IssueArgs) -> Result<()> {
    let mut capability = config_bridge::to_capability(config, Arc::new(SystemClock))?;
    apply_grants(&mut capability, args)?;

    if capability.scopes().is_empty() {
        tracing::warn!("issuing a token with no grants");
    }

    let ttl = resolve_ttl(config, args)?;
    let token = capability
        .generate_token_with_ttl(ttl)
        .context("failed to sign token")?;
    tracing::debug!(
        scopes = capability.scopes().len(),
        ttl_secs = ttl.num_seconds(),
        "issued token"
    );
    println!("{token}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_capabilities::FixedClock;

    fn args() -> IssueArgs {
        IssueArgs {
            incoming: None,
            outgoing: None,
            app_params: Vec::new(),
            stream: false,
            filters: Vec::new(),
            ttl: None,
        }
    }

    fn capability() -> Capability {
        Capability::with_clock(
            "AC123",
            "s3cr3t",
            Arc::new(FixedClock::from_unix_millis(0).unwrap()),
        )
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("foo=bar").unwrap(),
            ("foo".to_owned(), "bar".to_owned())
        );
        assert_eq!(
            parse_key_value("expr=a=b").unwrap(),
            ("expr".to_owned(), "a=b".to_owned())
        );
        assert_eq!(
            parse_key_value("empty=").unwrap(),
            ("empty".to_owned(), String::new())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_apply_all_grants() {
        let mut cap = capability();
        let args = IssueArgs {
            incoming: Some("bob".into()),
            outgoing: Some("AP1".into()),
            app_params: vec![("foo".into(), "bar".into())],
            stream: true,
            filters: vec![("type".into(), "calls".into())],
            ..args()
        };
        apply_grants(&mut cap, &args).unwrap();

        assert_eq!(
            cap.scope_strings(),
            vec![
                "scope:client:incoming?clientName=bob",
                "scope:client:outgoing?appSid=AP1&appParams=foo%3Dbar&clientName=bob",
                "scope:stream:subscribe?path=%2F2010-04-01%2FEvents&params=type%3Dcalls",
            ]
        );
    }

    #[test]
    fn test_invalid_client_name_rejected() {
        let mut cap = capability();
        let args = IssueArgs {
            incoming: Some("bob smith".into()),
            ..args()
        };
        assert!(apply_grants(&mut cap, &args).is_err());
    }

    #[test]
    fn test_ttl_override() {
        let config = Config::default();
        assert_eq!(resolve_ttl(&config, &args()).unwrap(), Duration::seconds(3600));
        let args = IssueArgs {
            ttl: Some(60),
            ..args()
        };
        assert_eq!(resolve_ttl(&config, &args).unwrap(), Duration::seconds(60));
    }

    #[test]
    fn test_cli_requires_grant_flags() {
        use clap::Parser;

        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            issue: IssueArgs,
        }

        assert!(TestCli::try_parse_from(["warden", "--app-param", "a=b"]).is_err());
        assert!(TestCli::try_parse_from(["warden", "--filter", "a=b"]).is_err());
        let parsed =
            TestCli::try_parse_from(["warden", "--outgoing", "AP1", "--app-param", "a=b"])
                .unwrap();
        assert_eq!(parsed.issue.app_params, vec![("a".into(), "b".into())]);
    }
}
