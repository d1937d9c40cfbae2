//! Subscriber setup for the `warden` binary.
//!
//! Tokens and decoded claims go to stdout, so every log line is written to
//! stderr. The default level is `warn` to keep piped output clean.

use std::fmt;
use std::io::IsTerminal;
use std::str::FromStr;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt as tracing_fmt};

use crate::error::{TelemetryError, TelemetryResult};

/// Level used when none is configured.
pub const DEFAULT_LEVEL: &str = "warn";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human oriented.
    Pretty,
    /// One line per event.
    #[default]
    Compact,
    /// Newline-delimited JSON.
    Json,
}

impl LogFormat {
    /// Lowercase name as used in config files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Compact => "compact",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Pretty, Self::Compact, Self::Json]
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| TelemetryError::ConfigError(format!("unknown log format: {s}")))
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Base filter, e.g. `warn` or `info,warden_crypto=debug`.
    pub level: String,
    /// Line format.
    pub format: LogFormat,
    /// Colorize output. Defaults to whether stderr is a terminal.
    pub ansi: bool,
    /// Extra per-target directives applied on top of `level`.
    pub directives: Vec<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL)
    }
}

impl LogConfig {
    /// Settings with the given base level and compact output.
    #[must_use]
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            format: LogFormat::default(),
            ansi: std::io::stderr().is_terminal(),
            directives: Vec::new(),
        }
    }

    /// Set the line format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Add a per-target directive such as `warden_capabilities=debug`.
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Never emit ANSI escapes.
    #[must_use]
    pub fn without_ansi(mut self) -> Self {
        self.ansi = false;
        self
    }

    fn env_filter(&self) -> TelemetryResult<EnvFilter> {
        let invalid = |e: &dyn fmt::Display| TelemetryError::ConfigError(e.to_string());

        let mut filter = EnvFilter::try_new(&self.level).map_err(|e| invalid(&e))?;
        for directive in &self.directives {
            filter = filter.add_directive(directive.parse().map_err(|e| invalid(&e))?);
        }
        Ok(filter)
    }
}

/// Install the global subscriber, writing to stderr.
///
/// # Errors
///
/// Returns [`TelemetryError::ConfigError`] for an unparsable level or
/// directive and [`TelemetryError::InitError`] if a global subscriber is
/// already installed.
pub fn setup_logging(config: &LogConfig) -> TelemetryResult<()> {
    let filter = config.env_filter()?;

    let layer = match config.format {
        LogFormat::Json => tracing_fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_fmt::layer()
            .pretty()
            .with_ansi(config.ansi)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => tracing_fmt::layer()
            .compact()
            .with_ansi(config.ansi)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .map_err(|e| TelemetryError::InitError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = LogConfig::new("debug")
            .with_format(LogFormat::Json)
            .with_directive("warden_crypto=trace")
            .without_ansi();

        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.directives, vec!["warden_crypto=trace"]);
        assert!(!config.ansi);
    }

    #[test]
    fn test_default_is_quiet() {
        let config = LogConfig::default();
        assert_eq!(config.level, DEFAULT_LEVEL);
        assert_eq!(config.format, LogFormat::Compact);
        assert!(config.directives.is_empty());
    }

    #[test]
    fn test_env_filter() {
        let config = LogConfig::new("info").with_directive("warden_capabilities=debug");
        assert!(config.env_filter().is_ok());

        let bad = LogConfig::new("info").with_directive("warden_crypto=verbose");
        assert!(matches!(
            bad.env_filter(),
            Err(TelemetryError::ConfigError(_))
        ));
    }

    #[test]
    fn test_format_names() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());

        for format in [LogFormat::Pretty, LogFormat::Compact, LogFormat::Json] {
            assert_eq!(format.to_string().parse::<LogFormat>().unwrap(), format);
        }
    }
}
