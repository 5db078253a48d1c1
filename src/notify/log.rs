//! Log-only notifier, used when Telegram is not configured

use async_trait::async_trait;
use tracing::info;

use crate::common::errors::Result;
use crate::common::traits::Notifier;

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, text: &str) -> Result<()> {
        info!("notification: {}", text.replace('\n', " | "));
        Ok(())
    }
}
