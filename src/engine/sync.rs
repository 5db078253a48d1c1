//! Synchronization engine and sweep scheduler
//!
//! Drives fixed-cadence polling sweeps over the tracked-address set.
//! Each sweep fetches a page per address, classifies the genuinely new
//! trades, mirrors and notifies each one in ascending pointer order,
//! and advances the durable cursor after every trade so a crash
//! mid-burst replays at most one trade.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::{watch, RwLock};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::classifier::classify;
use super::translator::{MirrorTranslator, Translation};
use crate::common::traits::{Notifier, OrderDispatcher, TradeFeed};
use crate::common::types::{MirrorOutcome, TradeRecord};
use crate::cursor::{CursorStore, TradePointer};
use crate::notify::format;

/// Floor on inter-sweep delay so a slow sweep can never spin-loop
const MIN_SWEEP_DELAY: Duration = Duration::from_millis(100);

/// Sweep behaviour knobs, derived from [`crate::config::AppConfig`]
#[derive(Debug, Clone)]
pub struct SweepSettings {
    /// Target interval between sweep starts
    pub poll_interval: Duration,
    /// Steady-state feed page size
    pub page_limit: u32,
    /// Bootstrap rewind for addresses with no trade history, so trades
    /// landing during startup are not missed
    pub bootstrap_rewind_secs: i64,
    /// When false the engine observes and notifies without dispatching
    pub mirror_enabled: bool,
}

/// Orchestrates fetch -> classify -> mirror -> notify -> advance for
/// every tracked address, once per sweep.
pub struct SyncEngine {
    feed: Arc<dyn TradeFeed>,
    dispatcher: Arc<dyn OrderDispatcher>,
    notifier: Arc<dyn Notifier>,
    store: Arc<RwLock<CursorStore>>,
    translator: MirrorTranslator,
    /// Lowercased address -> display name, immutable for the run
    wallets: HashMap<String, String>,
    settings: SweepSettings,
}

impl SyncEngine {
    pub fn new(
        feed: Arc<dyn TradeFeed>,
        dispatcher: Arc<dyn OrderDispatcher>,
        notifier: Arc<dyn Notifier>,
        store: Arc<RwLock<CursorStore>>,
        translator: MirrorTranslator,
        wallets: HashMap<String, String>,
        settings: SweepSettings,
    ) -> Arc<Self> {
        let wallets = wallets
            .into_iter()
            .map(|(address, name)| (address.to_lowercase(), name))
            .collect();
        Arc::new(Self {
            feed,
            dispatcher,
            notifier,
            store,
            translator,
            wallets,
            settings,
        })
    }

    /// Run sweeps until the shutdown signal fires. The in-flight sweep
    /// always completes, so the last processed trade is persisted
    /// before exit.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        info!(
            "starting sync engine: {} wallets, interval {:?}, mirroring {}",
            self.wallets.len(),
            self.settings.poll_interval,
            if self.settings.mirror_enabled { "on" } else { "off" }
        );

        loop {
            let sweep_start = Instant::now();
            self.bootstrap_missing().await;
            self.sweep().await;

            let elapsed = sweep_start.elapsed();
            let delay = self
                .settings
                .poll_interval
                .saturating_sub(elapsed)
                .max(MIN_SWEEP_DELAY);
            debug!("sweep took {:?}, sleeping {:?}", elapsed, delay);

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => {
                    info!("shutdown signal received, stopping");
                    break;
                }
            }
        }
    }

    /// Install cursors for addresses that have none yet.
    ///
    /// The fallback is the address's single most recent trade, so a
    /// wallet's entire history is never replayed on first run. For an
    /// address with no history at all the fallback is wall-clock time
    /// minus the configured rewind. Fetch failures leave the address
    /// un-bootstrapped; it is retried at the start of every sweep and
    /// skipped by `sweep` until then.
    pub async fn bootstrap_missing(&self) {
        let missing: Vec<String> = {
            let store = self.store.read().await;
            self.wallets
                .keys()
                .filter(|address| store.get(address).is_none())
                .cloned()
                .collect()
        };
        if missing.is_empty() {
            return;
        }

        let mut bootstrapped = false;
        for address in missing {
            let fallback = match self.feed.fetch(&address, 1, 0).await {
                Ok(page) => match page.iter().max_by_key(|t| TradePointer::of(t)) {
                    Some(latest) => TradePointer::of(latest),
                    None => {
                        let now = chrono::Utc::now().timestamp();
                        TradePointer::at(now - self.settings.bootstrap_rewind_secs)
                    }
                },
                Err(e) => {
                    warn!("bootstrap fetch failed for {}: {}", address, e);
                    continue;
                }
            };
            info!("bootstrapped {} at {}", address, fallback);
            self.store.write().await.bootstrap(&address, fallback);
            bootstrapped = true;
        }

        if bootstrapped {
            let store = self.store.read().await;
            if let Err(e) = store.persist() {
                error!("failed to persist bootstrap cursors: {}", e);
            }
        }
    }

    /// One full pass over the tracked-address set. Addresses are
    /// processed concurrently, one future per address; each future is
    /// the only mutator of its address's cursor. All futures are joined
    /// before returning, so sweeps never overlap.
    pub async fn sweep(&self) {
        let sweeps = self
            .wallets
            .iter()
            .map(|(address, name)| self.process_address(address, name));
        join_all(sweeps).await;
    }

    /// Fetch -> classify -> process for one address. Any feed failure
    /// skips this address for the sweep without touching its cursor or
    /// the other addresses.
    async fn process_address(&self, address: &str, name: &str) {
        let page = match self
            .feed
            .fetch(address, self.settings.page_limit, 0)
            .await
        {
            Ok(page) => page,
            Err(e) => {
                warn!("feed fetch failed for {}: {}", address, e);
                return;
            }
        };
        if page.is_empty() {
            debug!("empty page for {}", address);
            return;
        }

        let cursor = match self.store.read().await.get(address) {
            Some(cursor) => cursor.clone(),
            // not bootstrapped yet (bootstrap fetch keeps failing)
            None => return,
        };

        let fresh = classify(page, &cursor);
        if fresh.is_empty() {
            debug!("no new trades for {} (cursor {})", address, cursor.last_pointer);
            return;
        }
        info!("{} new trade(s) for {} ({})", fresh.len(), name, address);

        for trade in fresh {
            let outcome = self.mirror(&trade).await;
            self.notify(&trade, name, &outcome).await;
            self.advance_and_persist(address, &trade).await;
        }
    }

    /// Mirror one trade, best-effort. Every branch yields an outcome
    /// for the notification; none of them blocks cursor advancement.
    async fn mirror(&self, trade: &TradeRecord) -> MirrorOutcome {
        if !self.settings.mirror_enabled {
            return MirrorOutcome::Observed;
        }

        match self.translator.translate(trade, self.dispatcher.as_ref()).await {
            Translation::Skip(reason) => {
                debug!("skipping mirror of {}: {}", trade.tx_hash, reason);
                MirrorOutcome::Skipped(reason)
            }
            Translation::Order(intent) => match self.dispatcher.submit(&intent).await {
                Ok(()) => {
                    info!("mirrored {} as {}", trade.tx_hash, intent);
                    MirrorOutcome::Mirrored(intent)
                }
                Err(e) => {
                    // best-effort: the trade is still marked seen and
                    // a failed mirror never retries
                    warn!("dispatch failed for {}: {}", trade.tx_hash, e);
                    MirrorOutcome::Failed {
                        intent,
                        error: e.to_string(),
                    }
                }
            },
        }
    }

    async fn notify(&self, trade: &TradeRecord, name: &str, outcome: &MirrorOutcome) {
        let text = format::trade_message(trade, name, outcome);
        if let Err(e) = self.notifier.deliver(&text).await {
            warn!("notification failed for {}: {}", trade.tx_hash, e);
        }
    }

    /// Advance the cursor for a fully processed trade and persist
    /// immediately, before the next trade in the burst.
    async fn advance_and_persist(&self, address: &str, trade: &TradeRecord) {
        let pointer = TradePointer::of(trade);
        let store = &mut *self.store.write().await;
        store.advance(address, &pointer);
        if let Err(e) = store.persist() {
            // risks reprocessing on restart, which classification
            // tolerates; reordering would not be
            error!("cursor persist failed for {}: {}", address, e);
        }
    }
}
