//! Configuration types

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::errors::{MirrorError, Result};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Polymarket endpoints and credentials
    #[serde(default)]
    pub polymarket: PolymarketConfig,
    /// Mirroring behaviour
    #[serde(default)]
    pub mirror: MirrorConfig,
    /// Sweep cadence and feed paging
    #[serde(default)]
    pub sweep: SweepConfig,
    /// Telegram notification credentials
    #[serde(default)]
    pub telegram: TelegramConfig,
    /// Tracked address -> display name. Loaded once at startup;
    /// adding or removing addresses requires a restart.
    #[serde(default)]
    pub wallets: HashMap<String, String>,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

impl AppConfig {
    /// Startup validation. Any failure here is fatal: the process must
    /// not start on a broken configuration.
    pub fn validate(&self) -> Result<()> {
        if self.wallets.is_empty() {
            return Err(MirrorError::Configuration(
                "no tracked wallets configured".to_string(),
            ));
        }
        if self.mirror.scale_factor <= Decimal::ZERO {
            return Err(MirrorError::Configuration(format!(
                "scale_factor must be positive, got {}",
                self.mirror.scale_factor
            )));
        }
        if self.mirror.enabled && self.polymarket.credentials().is_none() {
            return Err(MirrorError::Configuration(
                "mirroring is enabled but CLOB api_key/api_secret/api_passphrase are not all set"
                    .to_string(),
            ));
        }
        if self.telegram.bot_token.is_some() != self.telegram.chat_id.is_some() {
            return Err(MirrorError::Configuration(
                "telegram bot_token and chat_id must be set together".to_string(),
            ));
        }
        Ok(())
    }
}

/// Polymarket platform configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolymarketConfig {
    /// Base URL for the Data API trade feed
    #[serde(default = "default_data_api_url")]
    pub data_api_url: String,
    /// Base URL for the CLOB REST API
    #[serde(default = "default_clob_url")]
    pub clob_url: String,
    /// API key for order submission
    #[serde(default)]
    pub api_key: Option<String>,
    /// API secret for signing requests
    #[serde(default)]
    pub api_secret: Option<String>,
    /// API passphrase
    #[serde(default)]
    pub api_passphrase: Option<String>,
}

impl PolymarketConfig {
    /// Full credential set, or `None` if any part is missing
    pub fn credentials(&self) -> Option<ApiCredentials> {
        match (&self.api_key, &self.api_secret, &self.api_passphrase) {
            (Some(key), Some(secret), Some(passphrase)) => Some(ApiCredentials::new(
                key.clone(),
                secret.clone(),
                passphrase.clone(),
            )),
            _ => None,
        }
    }
}

impl Default for PolymarketConfig {
    fn default() -> Self {
        Self {
            data_api_url: default_data_api_url(),
            clob_url: default_clob_url(),
            api_key: None,
            api_secret: None,
            api_passphrase: None,
        }
    }
}

fn default_data_api_url() -> String {
    "https://data-api.polymarket.com".to_string()
}

fn default_clob_url() -> String {
    "https://clob.polymarket.com".to_string()
}

/// Mirroring behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// When false, trades are observed and notified but never mirrored
    #[serde(default)]
    pub enabled: bool,
    /// Multiplier applied to the observed trade's notional
    #[serde(default = "default_scale_factor")]
    pub scale_factor: Decimal,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            scale_factor: default_scale_factor(),
        }
    }
}

fn default_scale_factor() -> Decimal {
    Decimal::ONE
}

/// Sweep cadence and feed paging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Target interval between sweep starts in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Steady-state page size for the trade feed
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
    /// Rewind window for bootstrapping addresses with no history
    #[serde(default = "default_bootstrap_rewind")]
    pub bootstrap_rewind_secs: i64,
    /// Path of the durable cursor file
    #[serde(default = "default_cursor_file")]
    pub cursor_file: String,
    /// Timeout for feed/dispatch/notify network calls in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            page_limit: default_page_limit(),
            bootstrap_rewind_secs: default_bootstrap_rewind(),
            cursor_file: default_cursor_file(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_page_limit() -> u32 {
    250
}

fn default_bootstrap_rewind() -> i64 {
    180
}

fn default_cursor_file() -> String {
    "cursors.json".to_string()
}

fn default_request_timeout() -> u64 {
    8
}

/// Telegram notification credentials. Leave both unset to log
/// notifications instead of delivering them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl AppSettings {
    /// Parse the configured level for the tracing subscriber.
    /// Unrecognized values fall back to `info`.
    pub fn tracing_level(&self) -> tracing::Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "info" => tracing::Level::INFO,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// API credentials for order submission
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    pub api_key: String,
    pub api_secret: String,
    pub passphrase: String,
}

impl ApiCredentials {
    pub fn new(api_key: String, api_secret: String, passphrase: String) -> Self {
        Self {
            api_key,
            api_secret,
            passphrase,
        }
    }
}
