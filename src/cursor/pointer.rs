//! Trade pointer: the comparable identity of a trade event

use serde::{Deserialize, Serialize};

use crate::common::types::TradeRecord;

/// Ordered identity of a single trade event.
///
/// Ordering is lexicographic on (timestamp, tx_hash, log_index); the
/// derive relies on field declaration order. Two pointers are equal
/// iff all three fields match. Within one address's history the feed
/// is append-only, so pointers are totally ordered and never reorder.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TradePointer {
    /// Unix timestamp in seconds
    pub timestamp: i64,
    /// Settlement transaction hash
    pub tx_hash: String,
    /// Log index within the transaction
    #[serde(default)]
    pub log_index: u64,
}

impl TradePointer {
    pub fn new(timestamp: i64, tx_hash: impl Into<String>, log_index: u64) -> Self {
        Self {
            timestamp,
            tx_hash: tx_hash.into(),
            log_index,
        }
    }

    /// Pure extraction from a fetched record. Malformed timestamps are
    /// already coerced to zero at deserialization, so this never fails.
    pub fn of(record: &TradeRecord) -> Self {
        Self {
            timestamp: record.timestamp,
            tx_hash: record.tx_hash.clone(),
            log_index: record.log_index,
        }
    }

    /// Wall-clock pointer with an empty hash, used as the bootstrap
    /// fallback for addresses with no trade history.
    pub fn at(timestamp: i64) -> Self {
        Self {
            timestamp,
            tx_hash: String::new(),
            log_index: 0,
        }
    }
}

impl std::fmt::Display for TradePointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.timestamp, self.tx_hash, self.log_index)
    }
}
