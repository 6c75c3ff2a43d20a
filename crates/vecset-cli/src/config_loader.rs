//! Configuration loading utilities for CLI commands

use anyhow::{Context, Result};
use std::path::Path;
use vecset_core::config::{CliConfigOverrides, LayeredConfig};

/// Config file looked up in the working directory
pub const CONFIG_FILE: &str = "vecset.toml";

/// Defaults, then `vecset.toml` when present, then `VECSET_*` variables
pub fn load_config() -> Result<LayeredConfig> {
    load_config_from(Path::new(CONFIG_FILE))
}

pub fn load_config_from(config_path: &Path) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    if config_path.is_file() {
        config = config
            .load_from_file(config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?;
    }

    Ok(config.load_from_env())
}

/// Load layered configuration with CLI overrides, then validate it
pub fn load_config_with_overrides(overrides: CliConfigOverrides) -> Result<LayeredConfig> {
    let mut config = load_config()?;
    config.update_from_cli(overrides);
    config.validate()?;
    Ok(config)
}
