//! Configuration loading from TOML files

use anyhow::{Context, Result};
use std::path::Path;

use super::types::MonitorConfig;

/// Load configuration from a TOML file
///
/// Fields missing from the file keep their defaults. The result is not
/// validated here because command line overrides are applied afterwards;
/// call [`MonitorConfig::validate`] on the merged config.
pub fn load_config(config_path: impl AsRef<Path>) -> Result<MonitorConfig> {
    let config_path = config_path.as_ref();
    let config_content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file '{}'", config_path.display()))?;

    let config: MonitorConfig = toml::from_str(&config_content)
        .with_context(|| format!("Failed to parse config file '{}'", config_path.display()))?;

    tracing::debug!(path = %config_path.display(), "Loaded configuration file");
    Ok(config)
}
