//! Polymarket wire payload types (Data API and CLOB)

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::common::errors::{MirrorError, Result};
use crate::common::types::{Side, TradeRecord};

/// One trade as returned by the Data API `/trades` endpoint.
///
/// Deserialization is deliberately lenient: a corrupt timestamp or a
/// missing numeric field coerces to zero instead of failing, so one
/// bad record cannot halt a sweep. The only hard requirement is the
/// side, checked during conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataApiTrade {
    /// Token ID of the traded outcome
    #[serde(default)]
    pub asset: String,
    #[serde(default)]
    pub side: Option<Side>,
    #[serde(default)]
    pub size: Decimal,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: i64,
    #[serde(default, rename = "transactionHash")]
    pub transaction_hash: String,
    #[serde(default, rename = "logIndex")]
    pub log_index: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub outcome: Option<String>,
}

impl DataApiTrade {
    /// Convert into the unified record, attributing the trade to
    /// `address`. Fails with `MalformedRecord` only when the side is
    /// missing; the notional is derived as size x price.
    pub fn into_record(self, address: &str) -> Result<TradeRecord> {
        let side = self.side.ok_or_else(|| {
            MirrorError::MalformedRecord(format!(
                "trade {} has no side",
                self.transaction_hash
            ))
        })?;

        Ok(TradeRecord {
            address: address.to_lowercase(),
            asset_id: self.asset,
            side,
            size: self.size,
            price: self.price,
            notional: self.size * self.price,
            title: self.title.or(self.slug).unwrap_or_default(),
            outcome: self.outcome.unwrap_or_default(),
            tx_hash: self.transaction_hash,
            log_index: self.log_index,
            timestamp: self.timestamp,
        })
    }
}

/// Accepts a unix-seconds timestamp as a number or numeric string;
/// anything else coerces to 0.
fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(0),
        serde_json::Value::String(s) => s.parse().unwrap_or(0),
        _ => 0,
    })
}

/// The `/trades` endpoint returns either a bare array or an object
/// wrapping it under `trades`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TradesResponse {
    List(Vec<serde_json::Value>),
    Envelope {
        #[serde(default)]
        trades: Vec<serde_json::Value>,
    },
}

impl TradesResponse {
    pub fn into_items(self) -> Vec<serde_json::Value> {
        match self {
            TradesResponse::List(items) => items,
            TradesResponse::Envelope { trades } => trades,
        }
    }
}

/// A price level in the CLOB order book response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: String,
    pub size: String,
}

/// CLOB `/book` response (the fields we consume)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBookResponse {
    #[serde(default)]
    pub market: String,
    #[serde(default)]
    pub asset_id: String,
    #[serde(default)]
    pub bids: Vec<BookLevel>,
    #[serde(default)]
    pub asks: Vec<BookLevel>,
}

/// Market order submission payload for the CLOB.
///
/// `amount` is USDC notional for buys and a share quantity for sells;
/// the venue's market-order contract, preserved exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketOrderRequest {
    pub token_id: String,
    pub amount: Decimal,
    pub side: Side,
    /// Fill-or-kill for market orders
    pub order_type: String,
}

/// CLOB order submission response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, rename = "errorMsg")]
    pub error_msg: Option<String>,
    #[serde(default, rename = "orderID")]
    pub order_id: Option<String>,
}
