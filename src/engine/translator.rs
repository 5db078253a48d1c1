//! Mirror translation: observed trade -> executable order intent

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::common::traits::OrderDispatcher;
use crate::common::types::{OrderIntent, Side, SkipReason, TradeRecord};

/// Result of translating one observed trade
#[derive(Debug, Clone, PartialEq)]
pub enum Translation {
    /// Ready to dispatch
    Order(OrderIntent),
    /// Deliberately not mirrored
    Skip(SkipReason),
}

/// Converts a new trade into an order intent scaled to the configured
/// notional.
///
/// Market buys are sized directly in USDC notional; market sells must
/// be sized in shares, so the target notional is converted using the
/// best current bid. Getting that conversion wrong misprices an order
/// by orders of magnitude, hence the two distinct intent variants.
#[derive(Debug, Clone)]
pub struct MirrorTranslator {
    scale_factor: Decimal,
}

impl MirrorTranslator {
    pub fn new(scale_factor: Decimal) -> Self {
        Self { scale_factor }
    }

    /// Translate `trade` into an intent or a skip decision. Quote
    /// transport failures count as missing liquidity: the trade is
    /// skipped, not retried.
    pub async fn translate(
        &self,
        trade: &TradeRecord,
        quotes: &dyn OrderDispatcher,
    ) -> Translation {
        let target_notional = trade.notional * self.scale_factor;
        if target_notional <= Decimal::ZERO || trade.asset_id.is_empty() {
            return Translation::Skip(SkipReason::InvalidPayload);
        }

        match trade.side {
            Side::Buy => Translation::Order(OrderIntent::BuyNotional {
                token_id: trade.asset_id.clone(),
                notional: target_notional,
            }),
            Side::Sell => self.size_sell(trade, target_notional, quotes).await,
        }
    }

    async fn size_sell(
        &self,
        trade: &TradeRecord,
        target_notional: Decimal,
        quotes: &dyn OrderDispatcher,
    ) -> Translation {
        let best_bid = match quotes.best_bid(&trade.asset_id).await {
            Ok(bid) => bid,
            Err(e) => {
                warn!("best bid lookup failed for {}: {}", trade.asset_id, e);
                None
            }
        };

        let Some(bid) = best_bid.filter(|b| *b > Decimal::ZERO) else {
            return Translation::Skip(SkipReason::NoLiquidity);
        };

        let shares = target_notional / bid;
        if shares <= Decimal::ZERO {
            return Translation::Skip(SkipReason::NoLiquidity);
        }
        debug!(
            "sized sell for {}: notional {} / bid {} = {} shares",
            trade.asset_id, target_notional, bid, shares
        );
        Translation::Order(OrderIntent::SellShares {
            token_id: trade.asset_id.clone(),
            shares,
        })
    }
}
