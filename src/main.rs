//! polymarket-mirror - Main Entry Point
//!
//! Polls tracked Polymarket wallets for new trades, mirrors them as
//! scaled market orders and notifies each outcome via Telegram.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::{watch, RwLock};
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use polymarket_mirror::common::traits::Notifier;
use polymarket_mirror::config::load_config;
use polymarket_mirror::cursor::CursorStore;
use polymarket_mirror::engine::{MirrorTranslator, SweepSettings, SyncEngine};
use polymarket_mirror::notify::{LogNotifier, TelegramNotifier};
use polymarket_mirror::polymarket::{ClobClient, DataApiClient};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides the
    /// configured `settings.log_level` when set
    #[arg(long)]
    log_level: Option<String>,

    /// Observe and notify without dispatching any orders
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let mut config = load_config(Some(&args.config)).context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;
    if let Some(level) = args.log_level {
        config.settings.log_level = level;
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.settings.tracing_level())
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mirror_enabled = config.mirror.enabled && !args.dry_run;
    if config.mirror.enabled && args.dry_run {
        info!("--dry-run: mirroring forced off for this run");
    }

    let timeout = Duration::from_secs(config.sweep.request_timeout_secs);

    let feed = Arc::new(DataApiClient::new(&config.polymarket.data_api_url, timeout)?);

    let mut clob = ClobClient::new(&config.polymarket.clob_url, timeout)?;
    if let Some(credentials) = config.polymarket.credentials() {
        clob = clob.with_credentials(credentials);
    }
    let dispatcher = Arc::new(clob);

    let notifier: Arc<dyn Notifier> = match (&config.telegram.bot_token, &config.telegram.chat_id) {
        (Some(token), Some(chat_id)) => {
            Arc::new(TelegramNotifier::new(token, chat_id, timeout)?)
        }
        _ => {
            warn!("telegram not configured, notifications go to the log");
            Arc::new(LogNotifier)
        }
    };

    let store = Arc::new(RwLock::new(CursorStore::load(&config.sweep.cursor_file)));

    let engine = SyncEngine::new(
        feed,
        dispatcher,
        notifier,
        store,
        MirrorTranslator::new(config.mirror.scale_factor),
        config.wallets.clone(),
        SweepSettings {
            poll_interval: Duration::from_millis(config.sweep.poll_interval_ms),
            page_limit: config.sweep.page_limit,
            bootstrap_rewind_secs: config.sweep.bootstrap_rewind_secs,
            mirror_enabled,
        },
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received shutdown signal, finishing current sweep...");
            let _ = shutdown_tx.send(true);
        }
    });

    engine.run(shutdown_rx).await;
    info!("sync engine stopped");
    Ok(())
}
