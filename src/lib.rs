//! NewsPH bot: relays entries of a single RSS news feed to Telegram chats.
//!
//! - [`feed`] fetches the feed and normalizes entries into display fields
//! - [`telegram`] is a minimal Bot API client with a long-polling listener
//! - [`bot`] parses chat commands and routes them to handlers
//! - [`config`] loads settings and the bot token

pub mod bot;
pub mod config;
pub mod feed;
pub mod telegram;
pub mod util;
