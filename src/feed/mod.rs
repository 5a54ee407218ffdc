//! Feed module: fetching the news feed and normalizing its entries.
//!
//! - [`fetcher`] - HTTP retrieval of the feed document, one fresh fetch per call
//! - [`parser`] - RSS/Atom parsing via the `feed-rs` crate
//! - [`entry`] - Projection of a raw entry onto the fields the bot displays
//!
//! # Example
//!
//! ```ignore
//! use newsph_bot::feed::{FeedReader, FeedSource, NewsItem, DEFAULT_FEED_URL};
//!
//! let reader = FeedReader::new(reqwest::Client::new(), DEFAULT_FEED_URL);
//! let entries = reader.fetch_entries().await?;
//! let item = NewsItem::from_entry(&entries[0]);
//! ```

mod entry;
mod fetcher;
mod parser;

pub use entry::{
    extract_author, extract_author_and_date, extract_image, extract_published, extract_summary,
    extract_title, summary_from_html, Entry, NewsItem,
};
pub use fetcher::{FeedReader, FeedSource, FetchError, DEFAULT_FEED_URL};
pub use parser::parse_entries;
