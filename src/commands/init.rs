use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Writes a config file holding the built-in settings and tables to `config_path`, so that they
/// can be edited.
///
/// # Errors
/// - Returns an error if the file exists and `force` is false.
/// - Returns an error if any file operations fail.
pub async fn init(config_path: &Path, force: bool) -> Result<Out<()>> {
    let config = Config::create(config_path, force)
        .await
        .context("Unable to create the config file")?;
    Ok(format!("Wrote the default config to {}", config.path().display()).into())
}
