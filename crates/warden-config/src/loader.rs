//! Config file discovery and layered loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge env var fallbacks (`WARDEN_*`)
//! 3. Merge the config file: the explicit path if given, otherwise the user
//!    file `<config dir>/warden/config.toml` when it exists
//! 4. Deserialize merged tree → `Config`
//! 5. Validate

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{collect_env_vars, env_overlay};
use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// A loaded configuration and the files that contributed to it.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The final configuration.
    pub config: Config,
    /// Config files merged, in order.
    pub loaded_files: Vec<PathBuf>,
}

/// Load configuration from the process environment.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a file is unreadable or malformed, an env var
/// is malformed, or the final configuration fails validation.
pub fn load(path: Option<&Path>) -> ConfigResult<ResolvedConfig> {
    load_with_env(path, &collect_env_vars())
}

/// Load configuration with an explicit environment snapshot.
///
/// # Errors
///
/// See [`load`].
pub fn load_with_env(
    path: Option<&Path>,
    env: &HashMap<String, String>,
) -> ConfigResult<ResolvedConfig> {
    // 1. Embedded defaults.
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    // 2. Env fallbacks.
    deep_merge(&mut merged, &env_overlay(env)?);

    // 3. Config file.
    let mut loaded_files = Vec::new();
    let file = if let Some(explicit) = path {
        // An explicitly requested file must exist.
        let overlay = read_file(explicit)?.ok_or_else(|| ConfigError::ReadError {
            path: explicit.display().to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })?;
        Some((overlay, explicit.to_path_buf()))
    } else if let Some(user_path) = user_config_path() {
        read_file(&user_path)?.map(|overlay| (overlay, user_path))
    } else {
        None
    };
    if let Some((overlay, file_path)) = file {
        deep_merge(&mut merged, &overlay);
        info!(path = %file_path.display(), "loaded config file");
        loaded_files.push(file_path);
    }

    // 4. Deserialize.
    let config: Config = merged.try_into().map_err(|e| ConfigError::ParseError {
        path: loaded_files
            .last()
            .map_or_else(|| "<merged>".to_owned(), |p| p.display().to_string()),
        source: e,
    })?;

    // 5. Validate.
    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        loaded_files,
    })
}

/// Load a single file on top of the defaults, ignoring the environment.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
/// validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    load_with_env(Some(path), &HashMap::new()).map(|resolved| resolved.config)
}

/// User-level config file location, if a home directory can be determined.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "warden")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Read and parse a TOML file. Returns `Ok(None)` if it does not exist.
fn read_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    toml::from_str(&contents)
        .map(Some)
        .map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })
}

/// Deep-merge `overlay` into `base`. Tables merge key by key; any other
/// overlay value replaces the base value.
pub fn deep_merge(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                if let Some(base_val) = base_table.get_mut(key) {
                    deep_merge(base_val, overlay_val);
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
        },
    }
}
