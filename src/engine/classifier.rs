//! Trade classification: which records of a fetched page are new
//!
//! The feed may return a burst of same-sweep trades in any order.
//! Classification sorts oldest-first so that processing preserves the
//! causal order of position build-up vs. unwind, and so the cursor
//! advances incrementally: a crash mid-burst loses at most the
//! partially processed tail, never an earlier trade.

use crate::common::types::TradeRecord;
use crate::cursor::{Cursor, TradePointer};

/// Compute the ordered subset of `page` that is strictly new relative
/// to `cursor`, sorted ascending by trade pointer.
///
/// A record is new iff its timestamp is past the cursor, or it shares
/// the cursor's timestamp, has not been seen in that second, and its
/// pointer is strictly greater. Records older than the cursor (feed
/// pagination quirks) are silently excluded; there is no backward
/// replay. Idempotent until the cursor advances.
pub fn classify(mut page: Vec<TradeRecord>, cursor: &Cursor) -> Vec<TradeRecord> {
    page.sort_by_cached_key(TradePointer::of);

    let last = &cursor.last_pointer;
    page.retain(|record| {
        let pointer = TradePointer::of(record);
        pointer.timestamp > last.timestamp
            || (pointer.timestamp == last.timestamp
                && !cursor.same_ts_seen.contains(&pointer.tx_hash)
                && pointer > *last)
    });
    page
}
