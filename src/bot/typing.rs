use crate::bot::Messenger;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Telegram shows a chat action for about five seconds; refresh a bit sooner.
const REFRESH_INTERVAL: Duration = Duration::from_secs(4);

/// Keeps the "typing" indicator visible in a chat until dropped.
pub struct TypingIndicator {
    refresher: JoinHandle<()>,
}

impl TypingIndicator {
    /// Sends the first indicator before returning, then refreshes it in the background.
    pub async fn start(messenger: Arc<dyn Messenger>, chat_id: i64) -> Self {
        if let Err(e) = messenger.send_typing(chat_id).await {
            tracing::debug!(chat_id, error = %e, "Failed to send typing indicator");
        }

        let refresher = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(REFRESH_INTERVAL);
            ticker.tick().await; // first tick completes immediately
            loop {
                ticker.tick().await;
                if let Err(e) = messenger.send_typing(chat_id).await {
                    tracing::debug!(chat_id, error = %e, "Failed to refresh typing indicator");
                }
            }
        });

        Self { refresher }
    }
}

impl Drop for TypingIndicator {
    fn drop(&mut self) {
        self.refresher.abort();
    }
}
