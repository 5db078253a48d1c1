//! Common test utilities and fixtures
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use polymarket_mirror::common::errors::{MirrorError, Result};
use polymarket_mirror::common::traits::{Notifier, OrderDispatcher, TradeFeed};
use polymarket_mirror::common::types::{OrderIntent, Side, TradeRecord};

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// Unique temp path for a cursor file, one per call
pub fn temp_cursor_path() -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "mirror-test-cursors-{}-{}.json",
        std::process::id(),
        n
    ))
}

/// Build a trade record with a derived notional
pub fn trade(address: &str, timestamp: i64, tx_hash: &str, side: Side) -> TradeRecord {
    trade_sized(address, timestamp, tx_hash, side, dec!(20), dec!(0.5))
}

pub fn trade_sized(
    address: &str,
    timestamp: i64,
    tx_hash: &str,
    side: Side,
    size: Decimal,
    price: Decimal,
) -> TradeRecord {
    TradeRecord {
        address: address.to_lowercase(),
        asset_id: "token123".to_string(),
        side,
        size,
        price,
        notional: size * price,
        title: "Will it rain tomorrow?".to_string(),
        outcome: "Yes".to_string(),
        tx_hash: tx_hash.to_string(),
        log_index: 0,
        timestamp,
    }
}

enum FeedStep {
    Page(Vec<TradeRecord>),
    Failure,
}

/// Scriptable trade feed: pages are queued per address and consumed
/// in order; an exhausted queue yields empty pages.
#[derive(Default)]
pub struct ScriptedFeed {
    steps: Mutex<HashMap<String, VecDeque<FeedStep>>>,
}

impl ScriptedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_page(&self, address: &str, page: Vec<TradeRecord>) {
        self.steps
            .lock()
            .unwrap()
            .entry(address.to_lowercase())
            .or_default()
            .push_back(FeedStep::Page(page));
    }

    pub fn push_failure(&self, address: &str) {
        self.steps
            .lock()
            .unwrap()
            .entry(address.to_lowercase())
            .or_default()
            .push_back(FeedStep::Failure);
    }
}

#[async_trait]
impl TradeFeed for ScriptedFeed {
    async fn fetch(&self, address: &str, _limit: u32, _offset: u32) -> Result<Vec<TradeRecord>> {
        let step = self
            .steps
            .lock()
            .unwrap()
            .get_mut(&address.to_lowercase())
            .and_then(|queue| queue.pop_front());
        match step {
            Some(FeedStep::Page(page)) => Ok(page),
            Some(FeedStep::Failure) => {
                Err(MirrorError::TransientFetch("scripted timeout".to_string()))
            }
            None => Ok(Vec::new()),
        }
    }
}

/// Recording dispatcher with a fixed best bid and optional failure
pub struct FakeDispatcher {
    pub submissions: Mutex<Vec<OrderIntent>>,
    pub fail_submit: AtomicBool,
    pub bid: Mutex<Option<Decimal>>,
}

impl FakeDispatcher {
    pub fn new() -> Self {
        Self {
            submissions: Mutex::new(Vec::new()),
            fail_submit: AtomicBool::new(false),
            bid: Mutex::new(Some(dec!(0.25))),
        }
    }

    pub fn submitted(&self) -> Vec<OrderIntent> {
        self.submissions.lock().unwrap().clone()
    }
}

impl Default for FakeDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderDispatcher for FakeDispatcher {
    async fn submit(&self, intent: &OrderIntent) -> Result<()> {
        self.submissions.lock().unwrap().push(intent.clone());
        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(MirrorError::Dispatch("scripted rejection".to_string()));
        }
        Ok(())
    }

    async fn best_bid(&self, _token_id: &str) -> Result<Option<Decimal>> {
        Ok(*self.bid.lock().unwrap())
    }
}

/// Collects delivered notifications
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
    pub fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, text: &str) -> Result<()> {
        self.messages.lock().unwrap().push(text.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(MirrorError::Notification("scripted failure".to_string()));
        }
        Ok(())
    }
}
