//! Markdown formatting for trade notifications

use chrono::DateTime;

use crate::common::types::{MirrorOutcome, TradeRecord};

/// Render one processed trade as a Telegram Markdown message.
pub fn trade_message(trade: &TradeRecord, name: &str, outcome: &MirrorOutcome) -> String {
    let ts_str = DateTime::from_timestamp(trade.timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| trade.timestamp.to_string());

    let mut msg = format!(
        "*{}* — *{}* {} @ {}\n`{}` — {}\n`token_id:` `{}`\n`tx:` `{}`\n{} UTC",
        name,
        trade.side,
        trade.size,
        trade.price,
        trade.outcome,
        trade.title,
        trade.asset_id,
        trade.tx_hash,
        ts_str,
    );
    msg.push('\n');
    msg.push_str(&outcome_line(outcome));
    msg
}

fn outcome_line(outcome: &MirrorOutcome) -> String {
    match outcome {
        MirrorOutcome::Observed => "_observed (mirroring off)_".to_string(),
        MirrorOutcome::Mirrored(intent) => format!("✅ mirrored: {}", intent),
        MirrorOutcome::Failed { intent, error } => {
            format!("❌ mirror failed ({}): {}", intent, error)
        }
        MirrorOutcome::Skipped(reason) => format!("⏭ skipped: {}", reason),
    }
}
