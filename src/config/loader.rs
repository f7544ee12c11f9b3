//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::AppConfig;
use crate::common::errors::{BotError, Result};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with POLYARB__)
/// 2. Configuration file (TOML format)
/// 3. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("POLYARB")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| BotError::Configuration(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| BotError::Configuration(e.to_string()))
}

/// Load configuration from environment variables only
///
/// Reads a `.env` file when present, then falls back to defaults for
/// anything not set.
pub fn load_from_env() -> Result<AppConfig> {
    dotenvy::dotenv().ok();
    load_config(None)
}
