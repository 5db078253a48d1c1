//! Order dispatcher backed by the Polymarket CLOB

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use super::auth::ClobSigner;
use super::messages::{MarketOrderRequest, OrderBookResponse, OrderResponse};
use crate::common::errors::{MirrorError, Result};
use crate::common::traits::OrderDispatcher;
use crate::common::types::OrderIntent;
use crate::config::types::ApiCredentials;

const ORDER_PATH: &str = "/order";

/// CLOB client: submits fill-or-kill market orders and reads the book
/// for sell sizing. Quote reads are public; order submission requires
/// the L2 credential set.
#[derive(Debug, Clone)]
pub struct ClobClient {
    client: Client,
    base_url: String,
    signer: Option<ClobSigner>,
}

impl ClobClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MirrorError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            signer: None,
        })
    }

    /// Attach order-signing credentials
    pub fn with_credentials(mut self, credentials: ApiCredentials) -> Self {
        self.signer = Some(ClobSigner::new(credentials));
        self
    }

    pub fn can_trade(&self) -> bool {
        self.signer.is_some()
    }
}

#[async_trait]
impl OrderDispatcher for ClobClient {
    /// Submit a market order. Buys carry USDC notional as the amount,
    /// sells carry shares; [`MarketOrderRequest`] encodes that venue
    /// contract.
    #[instrument(skip(self))]
    async fn submit(&self, intent: &OrderIntent) -> Result<()> {
        let signer = self.signer.as_ref().ok_or_else(|| {
            MirrorError::Dispatch("CLOB credentials not configured".to_string())
        })?;

        let (amount, side) = match intent {
            OrderIntent::BuyNotional { notional, .. } => (*notional, intent.side()),
            OrderIntent::SellShares { shares, .. } => (*shares, intent.side()),
        };
        let order = MarketOrderRequest {
            token_id: intent.token_id().to_string(),
            amount,
            side,
            order_type: "FOK".to_string(),
        };
        let body = serde_json::to_string(&order)
            .map_err(|e| MirrorError::Dispatch(e.to_string()))?;

        let url = format!("{}{}", self.base_url, ORDER_PATH);
        debug!("posting market order to {}: {}", url, body);

        let headers = signer.headers("POST", ORDER_PATH, &body)?;
        let response = headers
            .apply_to_request(self.client.post(&url))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| MirrorError::Dispatch(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MirrorError::Dispatch(format!(
                "CLOB returned status {}: {}",
                status, body
            )));
        }

        let order_response: OrderResponse = response
            .json()
            .await
            .map_err(|e| MirrorError::Dispatch(e.to_string()))?;
        if !order_response.success {
            return Err(MirrorError::Dispatch(
                order_response
                    .error_msg
                    .unwrap_or_else(|| "order rejected".to_string()),
            ));
        }
        Ok(())
    }

    /// Best bid from the top of the book, `None` when there are no
    /// bids.
    #[instrument(skip(self))]
    async fn best_bid(&self, token_id: &str) -> Result<Option<Decimal>> {
        let url = format!("{}/book?token_id={}", self.base_url, token_id);
        debug!("fetching order book from: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MirrorError::InvalidResponse(format!(
                "book endpoint returned status {}: {}",
                status, body
            )));
        }

        let book: OrderBookResponse = response.json().await.map_err(|e| {
            MirrorError::InvalidResponse(format!("unreadable book payload: {}", e))
        })?;

        book.bids
            .first()
            .map(|level| {
                level.price.parse().map_err(|e| {
                    MirrorError::InvalidResponse(format!("invalid bid price: {}", e))
                })
            })
            .transpose()
    }
}
