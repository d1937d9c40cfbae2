//! Environment variable fallbacks.
//!
//! Env vars are **fallback**, not override: they are merged below every
//! config file, so a value set in a file always wins.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// Expected shape of an env var value.
#[derive(Clone, Copy)]
enum EnvKind {
    String,
    Integer,
}

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    section: &'static str,
    field: &'static str,
    kind: EnvKind,
}

/// All supported `WARDEN_*` env var mappings.
const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "WARDEN_ACCOUNT",
        section: "issuer",
        field: "account",
        kind: EnvKind::String,
    },
    EnvMapping {
        var_name: "WARDEN_SECRET",
        section: "issuer",
        field: "secret",
        kind: EnvKind::String,
    },
    EnvMapping {
        var_name: "WARDEN_TTL",
        section: "issuer",
        field: "ttl_secs",
        kind: EnvKind::Integer,
    },
    EnvMapping {
        var_name: "WARDEN_LEEWAY",
        section: "verify",
        field: "leeway_secs",
        kind: EnvKind::Integer,
    },
    EnvMapping {
        var_name: "WARDEN_LOG_LEVEL",
        section: "logging",
        field: "level",
        kind: EnvKind::String,
    },
    EnvMapping {
        var_name: "WARDEN_LOG_FORMAT",
        section: "logging",
        field: "format",
        kind: EnvKind::String,
    },
];

/// Snapshot the process environment for the supported variables.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    ENV_MAPPINGS
        .iter()
        .filter_map(|m| {
            std::env::var(m.var_name)
                .ok()
                .map(|v| (m.var_name.to_owned(), v))
        })
        .collect()
}

/// Build a TOML overlay from the env vars present in `env`.
///
/// # Errors
///
/// Returns [`ConfigError::EnvError`] if an integer variable does not parse.
pub fn env_overlay(env: &HashMap<String, String>) -> ConfigResult<toml::Value> {
    let mut root = toml::Table::new();

    for mapping in ENV_MAPPINGS {
        let Some(raw) = env.get(mapping.var_name) else {
            continue;
        };

        let value = match mapping.kind {
            EnvKind::String => toml::Value::String(raw.clone()),
            EnvKind::Integer => {
                let n: i64 = raw.trim().parse().map_err(|_| ConfigError::EnvError {
                    var_name: mapping.var_name.to_owned(),
                    message: format!("expected a non-negative integer, got {raw:?}"),
                })?;
                if n < 0 {
                    return Err(ConfigError::EnvError {
                        var_name: mapping.var_name.to_owned(),
                        message: format!("expected a non-negative integer, got {raw:?}"),
                    });
                }
                toml::Value::Integer(n)
            },
        };

        debug!(var = mapping.var_name, "applying env fallback");
        let section = root
            .entry(mapping.section)
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        if let toml::Value::Table(table) = section {
            table.insert(mapping.field.to_owned(), value);
        }
    }

    Ok(toml::Value::Table(root))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_overlay_sections() {
        let overlay = env_overlay(&env(&[
            ("WARDEN_ACCOUNT", "AC123"),
            ("WARDEN_TTL", "60"),
            ("WARDEN_LOG_LEVEL", "debug"),
        ]))
        .unwrap();

        assert_eq!(overlay["issuer"]["account"].as_str(), Some("AC123"));
        assert_eq!(overlay["issuer"]["ttl_secs"].as_integer(), Some(60));
        assert_eq!(overlay["logging"]["level"].as_str(), Some("debug"));
        assert!(overlay.get("verify").is_none());
    }

    #[test]
    fn test_bad_integer() {
        for bad in ["soon", "-5", ""] {
            assert!(matches!(
                env_overlay(&env(&[("WARDEN_TTL", bad)])),
                Err(ConfigError::EnvError { ref var_name, .. }) if var_name == "WARDEN_TTL"
            ));
        }
    }

    #[test]
    fn test_unknown_vars_ignored() {
        let overlay = env_overlay(&env(&[("WARDEN_NOPE", "x")])).unwrap();
        assert_eq!(overlay.as_table().map(toml::Table::len), Some(0));
    }
}
