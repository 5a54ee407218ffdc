//! Telegram Bot API client.
//!
//! Only the handful of methods the bot uses are implemented: `getMe`,
//! `getUpdates` (long polling), `sendMessage`, `sendPhoto` and
//! `sendChatAction`.
//!
//! # Example
//!
//! ```rust,ignore
//! use newsph_bot::telegram::TelegramClient;
//!
//! let client = TelegramClient::new(reqwest::Client::new(), token);
//! client.send_message(chat_id, "Hello, World!").await?;
//! ```

mod client;
mod error;
mod poller;
mod types;

pub use client::{TelegramClient, MAX_MESSAGE_LENGTH};
pub use error::TelegramError;
pub use poller::Poller;
pub use types::{Chat, Message, Update, User};
