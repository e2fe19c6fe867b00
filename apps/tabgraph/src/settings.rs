//! # Configuration Files
//!
//! Loads [`TransformConfig`] from TOML. Every section is optional; missing
//! keys keep their defaults.
//!
//! Lookup order:
//! 1. `--config <path>`
//! 2. `TABGRAPH_CONFIG` environment variable
//! 3. Built-in defaults

use crate::input::{validate_file_path, validate_file_size};
use std::path::{Path, PathBuf};
use tabgraph_core::{TabgraphError, TransformConfig};

/// Environment variable naming a configuration file.
pub const CONFIG_ENV_VAR: &str = "TABGRAPH_CONFIG";

/// Maximum configuration file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Resolve and load the run configuration.
pub fn load_config(path: Option<&Path>) -> Result<TransformConfig, TabgraphError> {
    let path: Option<PathBuf> = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

    let Some(path) = path else {
        tracing::debug!("no configuration file, using defaults");
        return Ok(TransformConfig::default());
    };

    let validated = validate_file_path(&path)?;
    validate_file_size(&validated, MAX_CONFIG_FILE_SIZE)?;
    let text = std::fs::read_to_string(&validated)
        .map_err(|e| TabgraphError::IoError(format!("Read config: {}", e)))?;

    let config = parse_config(&text)?;
    tracing::info!(path = %validated.display(), "configuration loaded");
    Ok(config)
}

/// Parse and validate a TOML document.
pub fn parse_config(text: &str) -> Result<TransformConfig, TabgraphError> {
    let config: TransformConfig =
        toml::from_str(text).map_err(|e| TabgraphError::InvalidConfig(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Render a configuration as TOML.
pub fn render_config(config: &TransformConfig) -> Result<String, TabgraphError> {
    toml::to_string_pretty(config).map_err(|e| TabgraphError::InvalidConfig(e.to_string()))
}
