//! polymarket-mirror Library
//!
//! Watches a set of Polymarket wallet addresses, detects newly
//! executed trades through the paginated Data API feed, and reacts to
//! each trade exactly once: optionally mirroring it as a scaled
//! market order and delivering a Telegram notification.

pub mod common;
pub mod config;
pub mod cursor;
pub mod engine;
pub mod notify;
pub mod polymarket;

// Re-export commonly used types
pub use common::errors::{MirrorError, Result};
pub use common::traits::{Notifier, OrderDispatcher, TradeFeed};
pub use common::types::{MirrorOutcome, OrderIntent, Side, SkipReason, TradeRecord};
pub use config::types::AppConfig;
pub use cursor::{Cursor, CursorStore, TradePointer};
pub use engine::{classify, MirrorTranslator, SweepSettings, SyncEngine, Translation};
pub use notify::{LogNotifier, TelegramNotifier};
pub use polymarket::{ClobClient, DataApiClient};
