//! CLI subcommands.

pub(crate) mod config;
pub(crate) mod decode;
pub(crate) mod issue;
