//! Warden CLI - issue and inspect capability tokens.
//!
//! Reads the issuer identity and signing secret from the layered config
//! (`warden config` shows the resolved values) and prints tokens or decoded
//! claims to stdout. Logs go to stderr.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config_bridge;

use commands::{config, decode, issue};

/// Warden - capability tokens for client and event stream access
#[derive(Parser)]
#[command(name = "warden")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "WARDEN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue a signed capability token
    Issue(issue::IssueArgs),

    /// Decode a token and print its claims
    Decode {
        /// The token to decode
        token: String,

        /// Skip signature and expiry checks
        #[arg(long)]
        no_verify: bool,
    },

    /// Show the resolved configuration (secret redacted)
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let resolved = warden_config::Config::load(cli.config.as_deref());

    // Set up logging from config, with --verbose override.
    let log_config = if let Ok(r) = &resolved {
        let mut lc = config_bridge::to_log_config(&r.config);
        if cli.verbose {
            "debug".clone_into(&mut lc.level);
        }
        lc
    } else {
        // Fallback if config loading fails.
        let level = if cli.verbose { "debug" } else { "warn" };
        warden_telemetry::LogConfig::new(level).with_format(warden_telemetry::LogFormat::Compact)
    };
    if let Err(e) = warden_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let resolved = resolved?;
    for path in &resolved.loaded_files {
        tracing::debug!(path = %path.display(), "using config file");
    }

    match cli.command {
        Commands::Issue(args) => issue::run_issue(&resolved.config, &args)?,
        Commands::Decode { token, no_verify } => {
            decode::run_decode(&resolved.config, &token, !no_verify)?;
        },
        Commands::Config => config::show_config(&resolved)?,
    }

    Ok(())
}
