//! Unified domain types used across the mirror engine

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// A single settled trade observed on the feed for a tracked address.
/// Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Wallet address that executed the trade (lowercased)
    pub address: String,
    /// Token/asset ID of the traded outcome
    pub asset_id: String,
    /// Side of the observed trade
    pub side: Side,
    /// Trade size in shares
    pub size: Decimal,
    /// Execution price (0.00 to 1.00)
    pub price: Decimal,
    /// USDC notional of the trade (size x price when the feed omits it)
    pub notional: Decimal,
    /// Human-readable market title
    #[serde(default)]
    pub title: String,
    /// Outcome label (e.g. "Yes"/"No")
    #[serde(default)]
    pub outcome: String,
    /// Settlement transaction hash
    pub tx_hash: String,
    /// Log index within the settlement transaction
    #[serde(default)]
    pub log_index: u64,
    /// Unix timestamp in seconds
    pub timestamp: i64,
}

/// An executable order intent produced by the mirror translator.
///
/// The venue accepts USDC notional directly for market buys but
/// requires a share quantity for market sells. That asymmetry is a
/// venue contract and is encoded in the type.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderIntent {
    /// Market buy sized by USDC notional
    BuyNotional { token_id: String, notional: Decimal },
    /// Market sell sized by shares
    SellShares { token_id: String, shares: Decimal },
}

impl OrderIntent {
    /// Token this intent trades
    pub fn token_id(&self) -> &str {
        match self {
            OrderIntent::BuyNotional { token_id, .. } => token_id,
            OrderIntent::SellShares { token_id, .. } => token_id,
        }
    }

    pub fn side(&self) -> Side {
        match self {
            OrderIntent::BuyNotional { .. } => Side::Buy,
            OrderIntent::SellShares { .. } => Side::Sell,
        }
    }
}

impl std::fmt::Display for OrderIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderIntent::BuyNotional { notional, .. } => {
                write!(f, "BUY ${notional}")
            }
            OrderIntent::SellShares { shares, .. } => {
                write!(f, "SELL {shares} shares")
            }
        }
    }
}

/// Why a trade was not mirrored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Missing token ID or non-positive scaled notional
    InvalidPayload,
    /// No bid available to convert sell notional into shares
    NoLiquidity,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::InvalidPayload => write!(f, "invalid trade payload"),
            SkipReason::NoLiquidity => write!(f, "no liquidity to size sell"),
        }
    }
}

/// Outcome of one mirror attempt, carried into the notification
#[derive(Debug, Clone, PartialEq)]
pub enum MirrorOutcome {
    /// Mirroring disabled; the trade was observed and notified only
    Observed,
    /// Order submitted successfully
    Mirrored(OrderIntent),
    /// Order submission failed; the trade is still marked seen
    Failed { intent: OrderIntent, error: String },
    /// Translation decided not to mirror
    Skipped(SkipReason),
}
