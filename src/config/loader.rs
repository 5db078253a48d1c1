//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::AppConfig;
use crate::common::errors::{MirrorError, Result};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Credential environment variables (POLYMARKET_*, TG_*)
/// 2. Environment variables (prefixed with APP_)
/// 3. Configuration file (TOML format)
/// 4. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("APP")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| MirrorError::Configuration(e.to_string()))?;

    let mut app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| MirrorError::Configuration(e.to_string()))?;

    apply_credential_env(&mut app_config);
    Ok(app_config)
}

/// Secrets are conventionally passed through the environment (a `.env`
/// file in development), overriding whatever the file says.
fn apply_credential_env(config: &mut AppConfig) {
    if let Ok(v) = std::env::var("POLYMARKET_API_KEY") {
        config.polymarket.api_key = Some(v);
    }
    if let Ok(v) = std::env::var("POLYMARKET_API_SECRET") {
        config.polymarket.api_secret = Some(v);
    }
    if let Ok(v) = std::env::var("POLYMARKET_API_PASSPHRASE") {
        config.polymarket.api_passphrase = Some(v);
    }
    if let Ok(v) = std::env::var("TG_BOT_TOKEN") {
        config.telegram.bot_token = Some(v);
    }
    if let Ok(v) = std::env::var("TG_CHANNEL") {
        config.telegram.chat_id = Some(v);
    }
}
