//! Config command - print the resolved configuration.

use warden_config::ResolvedConfig;

/// Print which files were loaded and the merged config with the secret redacted.
pub(crate) fn show_config(resolved: &ResolvedConfig) -> anyhow::Result<()> {
    if resolved.loaded_files.is_empty() {
        println!("# no config file loaded; defaults and WARDEN_* environment only");
    }
    for path in &resolved.loaded_files {
        println!("# loaded: {}", path.display());
    }
    print!("{}", resolved.config.to_redacted_toml()?);
    Ok(())
}
