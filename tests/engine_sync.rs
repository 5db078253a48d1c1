//! Integration tests for the synchronization engine
//!
//! All collaborators are in-memory fakes; each test drives the engine
//! sweep by sweep and inspects dispatches, notifications and cursor
//! state.

mod common;

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use tokio::sync::RwLock;

use polymarket_mirror::common::types::{OrderIntent, Side};
use polymarket_mirror::cursor::{CursorStore, TradePointer};
use polymarket_mirror::engine::{MirrorTranslator, SweepSettings, SyncEngine};

use common::{
    temp_cursor_path, trade, trade_sized, FakeDispatcher, RecordingNotifier, ScriptedFeed,
};

struct Harness {
    feed: Arc<ScriptedFeed>,
    dispatcher: Arc<FakeDispatcher>,
    notifier: Arc<RecordingNotifier>,
    store: Arc<RwLock<CursorStore>>,
    engine: Arc<SyncEngine>,
}

fn harness(wallets: &[(&str, &str)], mirror_enabled: bool) -> Harness {
    let feed = Arc::new(ScriptedFeed::new());
    let dispatcher = Arc::new(FakeDispatcher::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let store = Arc::new(RwLock::new(CursorStore::load(temp_cursor_path())));

    let engine = SyncEngine::new(
        feed.clone(),
        dispatcher.clone(),
        notifier.clone(),
        store.clone(),
        MirrorTranslator::new(dec!(1)),
        wallets
            .iter()
            .map(|(a, n)| (a.to_string(), n.to_string()))
            .collect::<HashMap<_, _>>(),
        SweepSettings {
            poll_interval: Duration::from_millis(2000),
            page_limit: 50,
            bootstrap_rewind_secs: 180,
            mirror_enabled,
        },
    );

    Harness {
        feed,
        dispatcher,
        notifier,
        store,
        engine,
    }
}

async fn seed_cursor(h: &Harness, address: &str, pointer: TradePointer) {
    h.store.write().await.bootstrap(address, pointer);
}

async fn cursor_pointer(h: &Harness, address: &str) -> TradePointer {
    h.store
        .read()
        .await
        .get(address)
        .expect("cursor missing")
        .last_pointer
        .clone()
}

#[test_log::test(tokio::test)]
async fn test_burst_is_processed_in_order_and_cursor_lands_on_last_trade() {
    let h = harness(&[("0xAAA", "Sharky")], true);
    seed_cursor(&h, "0xaaa", TradePointer::new(1000, "0xaa", 0)).await;
    h.store
        .write()
        .await
        .advance("0xaaa", &TradePointer::new(1000, "0xaa", 0));

    // duplicate of the cursor trade plus two genuinely new ones, shuffled
    h.feed.push_page(
        "0xaaa",
        vec![
            trade("0xaaa", 1001, "0xcc", Side::Buy),
            trade("0xaaa", 1000, "0xaa", Side::Buy),
            trade("0xaaa", 1000, "0xbb", Side::Buy),
        ],
    );

    h.engine.sweep().await;

    let submitted = h.dispatcher.submitted();
    assert_eq!(submitted.len(), 2, "one dispatch per new trade");
    assert_eq!(
        submitted,
        vec![
            OrderIntent::BuyNotional {
                token_id: "token123".to_string(),
                notional: dec!(10.0),
            },
            OrderIntent::BuyNotional {
                token_id: "token123".to_string(),
                notional: dec!(10.0),
            },
        ]
    );
    assert_eq!(h.notifier.delivered().len(), 2);

    let store = h.store.read().await;
    let cursor = store.get("0xaaa").unwrap();
    assert_eq!(cursor.last_pointer, TradePointer::new(1001, "0xcc", 0));
    assert!(cursor.same_ts_seen.contains("0xcc"));
    assert_eq!(cursor.same_ts_seen.len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_feed_failure_isolates_addresses() {
    let h = harness(&[("0xAAA", "A"), ("0xBBB", "B")], true);
    seed_cursor(&h, "0xaaa", TradePointer::at(1000)).await;
    seed_cursor(&h, "0xbbb", TradePointer::at(1000)).await;

    h.feed.push_failure("0xaaa");
    h.feed.push_page("0xbbb", vec![trade("0xbbb", 1005, "0xb1", Side::Buy)]);

    h.engine.sweep().await;

    assert_eq!(cursor_pointer(&h, "0xaaa").await, TradePointer::at(1000));
    assert_eq!(
        cursor_pointer(&h, "0xbbb").await,
        TradePointer::new(1005, "0xb1", 0)
    );

    // next sweep: both are attempted again and A catches up
    h.feed.push_page("0xaaa", vec![trade("0xaaa", 1006, "0xa1", Side::Buy)]);
    h.feed.push_page("0xbbb", vec![trade("0xbbb", 1005, "0xb1", Side::Buy)]);
    h.engine.sweep().await;

    assert_eq!(
        cursor_pointer(&h, "0xaaa").await,
        TradePointer::new(1006, "0xa1", 0)
    );
    assert_eq!(h.dispatcher.submitted().len(), 2, "duplicate page did not re-dispatch");
}

#[test_log::test(tokio::test)]
async fn test_dispatch_failure_still_advances_cursor_and_notifies() {
    let h = harness(&[("0xAAA", "Sharky")], true);
    seed_cursor(&h, "0xaaa", TradePointer::at(1000)).await;
    h.dispatcher.fail_submit.store(true, Ordering::SeqCst);

    h.feed.push_page("0xaaa", vec![trade("0xaaa", 1005, "0xa1", Side::Buy)]);
    h.engine.sweep().await;

    // the trade counts as seen regardless of the mirror outcome
    assert_eq!(
        cursor_pointer(&h, "0xaaa").await,
        TradePointer::new(1005, "0xa1", 0)
    );
    let messages = h.notifier.delivered();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("mirror failed"));
    assert!(messages[0].contains("scripted rejection"));

    // a failed mirror never retries
    h.feed.push_page("0xaaa", vec![trade("0xaaa", 1005, "0xa1", Side::Buy)]);
    h.engine.sweep().await;
    assert_eq!(h.dispatcher.submitted().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_notifier_failure_does_not_block_cursor() {
    let h = harness(&[("0xAAA", "Sharky")], true);
    seed_cursor(&h, "0xaaa", TradePointer::at(1000)).await;
    h.notifier.fail.store(true, Ordering::SeqCst);

    h.feed.push_page("0xaaa", vec![trade("0xaaa", 1005, "0xa1", Side::Buy)]);
    h.engine.sweep().await;

    assert_eq!(
        cursor_pointer(&h, "0xaaa").await,
        TradePointer::new(1005, "0xa1", 0)
    );
}

#[test_log::test(tokio::test)]
async fn test_mirror_disabled_notifies_without_dispatching() {
    let h = harness(&[("0xAAA", "Sharky")], false);
    seed_cursor(&h, "0xaaa", TradePointer::at(1000)).await;

    h.feed.push_page("0xaaa", vec![trade("0xaaa", 1005, "0xa1", Side::Sell)]);
    h.engine.sweep().await;

    assert!(h.dispatcher.submitted().is_empty());
    let messages = h.notifier.delivered();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("mirroring off"));
    assert_eq!(
        cursor_pointer(&h, "0xaaa").await,
        TradePointer::new(1005, "0xa1", 0)
    );
}

#[test_log::test(tokio::test)]
async fn test_sell_is_mirrored_in_shares_at_best_bid() {
    let h = harness(&[("0xAAA", "Sharky")], true);
    seed_cursor(&h, "0xaaa", TradePointer::at(1000)).await;
    // notional 100 at a 0.25 bid -> 400 shares
    h.feed.push_page(
        "0xaaa",
        vec![trade_sized("0xaaa", 1005, "0xa1", Side::Sell, dec!(200), dec!(0.5))],
    );

    h.engine.sweep().await;

    assert_eq!(
        h.dispatcher.submitted(),
        vec![OrderIntent::SellShares {
            token_id: "token123".to_string(),
            shares: dec!(400),
        }]
    );
}

#[test_log::test(tokio::test)]
async fn test_sell_without_liquidity_is_skipped_but_seen() {
    let h = harness(&[("0xAAA", "Sharky")], true);
    seed_cursor(&h, "0xaaa", TradePointer::at(1000)).await;
    *h.dispatcher.bid.lock().unwrap() = None;

    h.feed.push_page("0xaaa", vec![trade("0xaaa", 1005, "0xa1", Side::Sell)]);
    h.engine.sweep().await;

    assert!(h.dispatcher.submitted().is_empty());
    let messages = h.notifier.delivered();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("no liquidity to size sell"));
    assert_eq!(
        cursor_pointer(&h, "0xaaa").await,
        TradePointer::new(1005, "0xa1", 0)
    );
}

#[test_log::test(tokio::test)]
async fn test_same_timestamp_trades_across_pages_process_exactly_once() {
    let h = harness(&[("0xAAA", "Sharky")], true);
    seed_cursor(&h, "0xaaa", TradePointer::at(2000)).await;

    // first page carries one trade at t=2000
    h.feed.push_page("0xaaa", vec![trade("0xaaa", 2000, "0xa1", Side::Buy)]);
    h.engine.sweep().await;
    assert_eq!(h.dispatcher.submitted().len(), 1);

    // second page re-delivers it together with a new same-second trade
    h.feed.push_page(
        "0xaaa",
        vec![
            trade("0xaaa", 2000, "0xa1", Side::Buy),
            trade("0xaaa", 2000, "0xa2", Side::Buy),
        ],
    );
    h.engine.sweep().await;
    assert_eq!(h.dispatcher.submitted().len(), 2, "only the unseen trade dispatched");

    // third page re-delivers both: nothing new
    h.feed.push_page(
        "0xaaa",
        vec![
            trade("0xaaa", 2000, "0xa1", Side::Buy),
            trade("0xaaa", 2000, "0xa2", Side::Buy),
        ],
    );
    h.engine.sweep().await;
    assert_eq!(h.dispatcher.submitted().len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_bootstrap_uses_latest_trade_and_skips_history() {
    let h = harness(&[("0xAAA", "Sharky")], true);

    // bootstrap page (limit 1): the wallet's most recent trade
    h.feed.push_page("0xaaa", vec![trade("0xaaa", 5000, "0xold", Side::Buy)]);
    // steady-state page: full recent history plus one newer trade
    h.feed.push_page(
        "0xaaa",
        vec![
            trade("0xaaa", 4000, "0xancient", Side::Buy),
            trade("0xaaa", 5000, "0xold", Side::Buy),
            trade("0xaaa", 5001, "0xnew", Side::Buy),
        ],
    );

    h.engine.bootstrap_missing().await;
    assert_eq!(
        cursor_pointer(&h, "0xaaa").await,
        TradePointer::new(5000, "0xold", 0)
    );

    h.engine.sweep().await;
    assert_eq!(h.dispatcher.submitted().len(), 1, "only the post-bootstrap trade mirrors");
    assert_eq!(
        cursor_pointer(&h, "0xaaa").await,
        TradePointer::new(5001, "0xnew", 0)
    );
}

#[test_log::test(tokio::test)]
async fn test_bootstrap_with_no_history_captures_trades_after_start() {
    let h = harness(&[("0xAAA", "Sharky")], true);
    let now = chrono::Utc::now().timestamp();

    // empty history
    h.feed.push_page("0xaaa", vec![]);
    h.engine.bootstrap_missing().await;

    let pointer = cursor_pointer(&h, "0xaaa").await;
    assert!(pointer.tx_hash.is_empty());
    let rewound = now - pointer.timestamp;
    assert!((175..=180).contains(&rewound), "rewind window applied: {}", rewound);

    // a trade landing one second after startup is classified as new
    h.feed.push_page("0xaaa", vec![trade("0xaaa", now + 1, "0xa1", Side::Buy)]);
    h.engine.sweep().await;
    assert_eq!(h.dispatcher.submitted().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_bootstrap_fetch_failure_retries_next_sweep() {
    let h = harness(&[("0xAAA", "Sharky")], true);

    h.feed.push_failure("0xaaa");
    h.engine.bootstrap_missing().await;
    assert!(h.store.read().await.get("0xaaa").is_none());

    // the address is skipped by the sweep until bootstrapped
    h.feed.push_page("0xaaa", vec![trade("0xaaa", 1005, "0xa1", Side::Buy)]);
    h.engine.sweep().await;
    assert!(h.dispatcher.submitted().is_empty());

    h.feed.push_page("0xaaa", vec![trade("0xaaa", 5000, "0xold", Side::Buy)]);
    h.engine.bootstrap_missing().await;
    assert_eq!(
        cursor_pointer(&h, "0xaaa").await,
        TradePointer::new(5000, "0xold", 0)
    );
}

#[test_log::test(tokio::test)]
async fn test_cursor_survives_restart() {
    let path = temp_cursor_path();
    {
        let feed = Arc::new(ScriptedFeed::new());
        let dispatcher = Arc::new(FakeDispatcher::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let store = Arc::new(RwLock::new(CursorStore::load(&path)));
        let engine = SyncEngine::new(
            feed.clone(),
            dispatcher,
            notifier,
            store.clone(),
            MirrorTranslator::new(dec!(1)),
            HashMap::from([("0xAAA".to_string(), "Sharky".to_string())]),
            SweepSettings {
                poll_interval: Duration::from_millis(2000),
                page_limit: 50,
                bootstrap_rewind_secs: 180,
                mirror_enabled: true,
            },
        );

        store.write().await.bootstrap("0xaaa", TradePointer::at(1000));
        feed.push_page("0xaaa", vec![trade("0xaaa", 1005, "0xa1", Side::Buy)]);
        engine.sweep().await;
    }

    // a fresh process sees the advanced cursor and replays nothing
    let reloaded = CursorStore::load(&path);
    assert_eq!(
        reloaded.get("0xaaa").unwrap().last_pointer,
        TradePointer::new(1005, "0xa1", 0)
    );
    std::fs::remove_file(&path).ok();
}
