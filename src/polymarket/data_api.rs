//! Feed fetcher backed by the Polymarket Data API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use super::messages::{DataApiTrade, TradesResponse};
use crate::common::errors::{MirrorError, Result};
use crate::common::traits::TradeFeed;
use crate::common::types::TradeRecord;

/// Read-only client for the Data API `/trades` feed.
#[derive(Debug, Clone)]
pub struct DataApiClient {
    client: Client,
    base_url: String,
}

impl DataApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MirrorError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl TradeFeed for DataApiClient {
    /// Fetch one page of trades for `address`. Records that fail to
    /// parse are dropped individually with a warning; the page itself
    /// only fails on transport errors or an unreadable body.
    #[instrument(skip(self))]
    async fn fetch(&self, address: &str, limit: u32, offset: u32) -> Result<Vec<TradeRecord>> {
        let url = format!(
            "{}/trades?user={}&limit={}&offset={}",
            self.base_url,
            address.to_lowercase(),
            limit,
            offset
        );
        debug!("fetching trades from: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MirrorError::InvalidResponse(format!(
                "Data API returned status {}: {}",
                status, body
            )));
        }

        let envelope: TradesResponse = response.json().await.map_err(|e| {
            MirrorError::InvalidResponse(format!("unreadable trades payload: {}", e))
        })?;

        let mut records = Vec::new();
        for item in envelope.into_items() {
            let trade = match serde_json::from_value::<DataApiTrade>(item) {
                Ok(trade) => trade,
                Err(e) => {
                    warn!("dropping unparseable trade for {}: {}", address, e);
                    continue;
                }
            };
            match trade.into_record(address) {
                Ok(record) => records.push(record),
                Err(e) => warn!("dropping malformed trade for {}: {}", address, e),
            }
        }
        Ok(records)
    }
}
