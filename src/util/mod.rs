//! Small helpers shared by the feed and Telegram layers.
//!
//! - **URL validation**: the configured feed URL must be an absolute http(s) URL
//! - **Text truncation**: character-based truncation for Telegram's message limit

mod text;
mod url;

pub use self::text::truncate_chars;
pub use self::url::{validate_feed_url, UrlValidationError};
