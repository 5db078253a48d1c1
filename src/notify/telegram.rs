//! Telegram Bot API notifier

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::common::errors::{MirrorError, Result};
use crate::common::traits::Notifier;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";
/// Cap on honoring a 429 retry_after so delivery stays bounded
const MAX_RETRY_AFTER: Duration = Duration::from_secs(5);

/// Sends Markdown messages via the Bot API `sendMessage` endpoint.
/// Retries once on a rate-limit signal, within a bounded delay;
/// anything else is reported as a notification error for the engine
/// to log.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Client,
    send_url: String,
    chat_id: String,
}

#[derive(Debug, Deserialize)]
struct TelegramError {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<TelegramRetryParams>,
}

#[derive(Debug, Deserialize)]
struct TelegramRetryParams {
    #[serde(default)]
    retry_after: Option<u64>,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, chat_id: &str, timeout: Duration) -> Result<Self> {
        Self::with_api_base(DEFAULT_API_BASE, bot_token, chat_id, timeout)
    }

    /// Point the notifier at a different API host (used by tests)
    pub fn with_api_base(
        api_base: &str,
        bot_token: &str,
        chat_id: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MirrorError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            send_url: format!(
                "{}/bot{}/sendMessage",
                api_base.trim_end_matches('/'),
                bot_token
            ),
            chat_id: chat_id.to_string(),
        })
    }

    async fn post_message(&self, text: &str) -> Result<reqwest::Response> {
        let payload = json!({
            "chat_id": self.chat_id,
            "text": text,
            "parse_mode": "Markdown",
            "disable_web_page_preview": true,
        });
        self.client
            .post(&self.send_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MirrorError::Notification(e.to_string()))
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    #[instrument(skip(self, text))]
    async fn deliver(&self, text: &str) -> Result<()> {
        let response = self.post_message(text).await?;
        if response.status().is_success() {
            debug!("notification delivered");
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = serde_json::from_str::<TelegramError>(&body)
                .ok()
                .and_then(|e| e.parameters)
                .and_then(|p| p.retry_after)
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(1))
                .min(MAX_RETRY_AFTER);
            warn!("telegram rate limited, retrying after {:?}", retry_after);
            tokio::time::sleep(retry_after).await;

            let retry = self.post_message(text).await?;
            if retry.status().is_success() {
                return Ok(());
            }
            let retry_body = retry.text().await.unwrap_or_default();
            return Err(MirrorError::Notification(format!(
                "still rate limited: {}",
                retry_body
            )));
        }

        let description = serde_json::from_str::<TelegramError>(&body)
            .ok()
            .and_then(|e| e.description)
            .unwrap_or(body);
        Err(MirrorError::Notification(format!(
            "telegram error {}: {}",
            status, description
        )))
    }
}
