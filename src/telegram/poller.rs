use crate::telegram::{Message, TelegramClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const CONFLICT_BACKOFF: Duration = Duration::from_secs(2);
const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Long-polling `getUpdates` loop that forwards incoming messages.
pub struct Poller {
    client: Arc<TelegramClient>,
    timeout_secs: u64,
}

impl Poller {
    pub fn new(client: Arc<TelegramClient>, timeout_secs: u64) -> Self {
        Self {
            client,
            timeout_secs,
        }
    }

    /// Polls until the receiving side of `tx` is dropped.
    ///
    /// Each update is acknowledged by advancing the offset past it, whether or
    /// not it carried a message. Errors are logged and polling resumes after a
    /// short pause.
    pub async fn listen(&self, tx: mpsc::Sender<Message>) {
        let mut offset: i64 = 0;

        tracing::info!(timeout_secs = self.timeout_secs, "Telegram poller listening for messages");

        while !tx.is_closed() {
            let updates = match self.client.get_updates(offset, self.timeout_secs).await {
                Ok(updates) => updates,
                Err(e) if e.is_conflict() => {
                    tracing::warn!(
                        error = %e,
                        "Telegram polling conflict; ensure only one bot process uses this token"
                    );
                    tokio::time::sleep(CONFLICT_BACKOFF).await;
                    continue;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Telegram getUpdates failed");
                    tokio::time::sleep(ERROR_BACKOFF).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);

                let Some(message) = update.message else {
                    continue;
                };
                if tx.send(message).await.is_err() {
                    return;
                }
            }
        }
    }
}
