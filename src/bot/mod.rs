//! Chat side of the bot: command parsing, routing and message delivery.
//!
//! Every command is a one-shot request: fetch the feed, normalize the entries
//! that are needed, send them. Nothing is kept between requests.
//!
//! - [`Command`] - parsing of `/name@bot args` message texts
//! - [`Router`] - command name to handler map, built once at startup
//! - [`Messenger`] - outbound side of the chat platform
//! - [`serve`] - consumes incoming messages and runs one task per command

mod command;
mod router;
mod typing;

pub use command::Command;
pub use router::{HandlerFn, Request, Router, FETCH_FAILED_MESSAGE, INTRO_MESSAGE, READ_USAGE};
pub use typing::TypingIndicator;

use crate::feed::{Entry, FeedSource, FetchError, NewsItem};
use crate::telegram::{Message, TelegramClient, TelegramError};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors a command handler can end with.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("Failed to fetch news feed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Invalid count {0:?}: expected a non-negative whole number")]
    InvalidCount(String),

    #[error("Telegram request failed: {0}")]
    Transport(#[from] TelegramError),
}

/// Outbound messages to a chat.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TelegramError>;

    async fn send_photo(&self, chat_id: i64, photo_url: &str) -> Result<(), TelegramError>;

    async fn send_typing(&self, chat_id: i64) -> Result<(), TelegramError>;
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        self.send_message(chat_id, text).await
    }

    async fn send_photo(&self, chat_id: i64, photo_url: &str) -> Result<(), TelegramError> {
        TelegramClient::send_photo(self, chat_id, photo_url).await
    }

    async fn send_typing(&self, chat_id: i64) -> Result<(), TelegramError> {
        self.send_chat_action(chat_id, "typing").await
    }
}

/// Shared handler state: where entries come from and where messages go.
pub struct Bot {
    feed: Arc<dyn FeedSource>,
    messenger: Arc<dyn Messenger>,
}

impl Bot {
    pub fn new(feed: Arc<dyn FeedSource>, messenger: Arc<dyn Messenger>) -> Self {
        Self { feed, messenger }
    }

    pub fn messenger(&self) -> Arc<dyn Messenger> {
        Arc::clone(&self.messenger)
    }

    pub(crate) async fn fetch_entries(&self) -> Result<Vec<Entry>, BotError> {
        Ok(self.feed.fetch_entries().await?)
    }

    pub(crate) async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), BotError> {
        Ok(self.messenger.send_text(chat_id, text).await?)
    }

    /// Sends the title, image and summary/author/date messages of one entry,
    /// in that order.
    ///
    /// A failed send is logged and the next message still goes out; nothing
    /// is retried.
    pub(crate) async fn send_entry(&self, chat_id: i64, entry: &Entry) {
        let item = NewsItem::from_entry(entry);

        if let Err(e) = self.messenger.send_text(chat_id, &item.title).await {
            tracing::warn!(chat_id, part = "title", error = %e, "Failed to send entry message");
        }
        if let Err(e) = self.messenger.send_photo(chat_id, &item.image_url).await {
            tracing::warn!(
                chat_id,
                part = "image",
                image_url = %item.image_url,
                error = %e,
                "Failed to send entry message"
            );
        }
        if let Err(e) = self.messenger.send_text(chat_id, &item.text).await {
            tracing::warn!(chat_id, part = "text", error = %e, "Failed to send entry message");
        }
    }

    /// Tells the chat a command failed, when there is something useful to say.
    pub(crate) async fn report_failure(&self, chat_id: i64, command: &str, error: &BotError) {
        let reply = match error {
            BotError::Fetch(_) => {
                tracing::error!(chat_id, command, error = %error, "Command failed");
                Some(FETCH_FAILED_MESSAGE)
            }
            BotError::InvalidCount(_) => {
                tracing::info!(chat_id, command, error = %error, "Rejected command arguments");
                Some(READ_USAGE)
            }
            BotError::Transport(_) => {
                tracing::warn!(chat_id, command, error = %error, "Command failed");
                None
            }
        };

        if let Some(reply) = reply {
            if let Err(e) = self.messenger.send_text(chat_id, reply).await {
                tracing::warn!(chat_id, error = %e, "Failed to report command failure");
            }
        }
    }
}

/// Runs commands from incoming messages until `messages` is closed.
///
/// Each command runs in its own task; commands from different chats are
/// independent and may interleave.
pub async fn serve(
    bot: Arc<Bot>,
    router: Arc<Router>,
    mut messages: mpsc::Receiver<Message>,
    bot_username: Option<String>,
) {
    while let Some(message) = messages.recv().await {
        let chat_id = message.chat.id;
        let Some(command) = message
            .text
            .as_deref()
            .and_then(|text| Command::parse(text, bot_username.as_deref()))
        else {
            tracing::debug!(chat_id, message_id = message.message_id, "Ignoring non-command message");
            continue;
        };

        let bot = Arc::clone(&bot);
        let router = Arc::clone(&router);
        tokio::spawn(async move {
            router.dispatch(&bot, chat_id, &command).await;
        });
    }
}
