//! Trait definitions for the external collaborators
//!
//! The synchronization engine only sees these seams; the Polymarket
//! Data API, the CLOB order path and Telegram are implementations.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::errors::Result;
use super::types::{OrderIntent, TradeRecord};

/// A paginated, timestamp-ordered source of settled trades for one
/// address. Must support a tiny page (limit 1, bootstrap) as well as
/// the steady-state page size.
#[async_trait]
pub trait TradeFeed: Send + Sync {
    /// Fetch up to `limit` trades for `address`, starting at `offset`.
    /// The page is not guaranteed to be sorted.
    async fn fetch(&self, address: &str, limit: u32, offset: u32) -> Result<Vec<TradeRecord>>;
}

/// Executes order intents against the venue.
///
/// Treated as idempotent-unsafe: the engine never calls `submit`
/// twice for the same trade pointer.
#[async_trait]
pub trait OrderDispatcher: Send + Sync {
    /// Submit a market order. An `Err` means the trade is notified as
    /// failed but still marked seen.
    async fn submit(&self, intent: &OrderIntent) -> Result<()>;

    /// Best current bid for a token, used to size sell orders.
    /// `None` when the book has no bids.
    async fn best_bid(&self, token_id: &str) -> Result<Option<Decimal>>;
}

/// Delivers a formatted notification. May retry internally on
/// rate-limit signals but must stay within a bounded timeout.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, text: &str) -> Result<()>;
}
