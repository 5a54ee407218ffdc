//! Projection of raw feed entries onto the fields the bot displays.
//!
//! Every projection is total: a missing or malformed attribute becomes an
//! empty string for that field only, and never fails the whole entry.

use chrono::{DateTime, Utc};
use feed_rs::model::{self, Person};
use scraper::{Html, Selector};

/// Role name `feed-rs` assigns to the person built from an RSS `<author>`
/// element; the element text itself lands in `email`.
const RSS_AUTHOR_ROLE: &str = "author";

/// A feed entry as `feed-rs` parsed it, plus its publication date as written.
#[derive(Debug, Clone)]
pub struct Entry {
    pub parsed: model::Entry,
    /// Text of the entry's date element, untouched. `None` when absent.
    pub published: Option<String>,
}

impl Entry {
    /// Entry for a document whose date text is not available; the parsed
    /// timestamp stands in for it.
    pub fn from_parsed(parsed: model::Entry) -> Self {
        let published = parsed.published.map(render_timestamp);
        Self { parsed, published }
    }
}

/// One feed entry reduced to what a chat shows for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsItem {
    pub title: String,
    pub image_url: String,
    pub summary: String,
    /// Summary, author and publication date joined by newlines.
    pub text: String,
}

impl NewsItem {
    pub fn from_entry(entry: &Entry) -> Self {
        Self {
            title: extract_title(entry),
            image_url: extract_image(entry),
            summary: extract_summary(entry),
            text: extract_author_and_date(entry),
        }
    }
}

pub fn extract_title(entry: &Entry) -> String {
    entry
        .parsed
        .title
        .as_ref()
        .map(|t| t.content.clone())
        .unwrap_or_default()
}

/// Locator of the entry's first media attachment. `feed-rs` also files RSS
/// `<enclosure>` elements under media, so an enclosure URL counts.
///
/// Unlike [`extract_summary`] there is no iframe fallback here.
pub fn extract_image(entry: &Entry) -> String {
    entry
        .parsed
        .media
        .iter()
        .flat_map(|media| media.content.iter())
        .next()
        .and_then(|content| content.url.as_ref())
        .map(|url| url.to_string())
        .unwrap_or_default()
}

pub fn extract_summary(entry: &Entry) -> String {
    entry
        .parsed
        .summary
        .as_ref()
        .map(|s| summary_from_html(&s.content))
        .unwrap_or_default()
}

/// Text of the first `div` in `html`, or the `src` of the first `iframe`
/// when that text is empty.
///
/// Markup without a `div` yields an empty string, even if it has an iframe.
pub fn summary_from_html(html: &str) -> String {
    let (Ok(div_selector), Ok(iframe_selector)) = (Selector::parse("div"), Selector::parse("iframe"))
    else {
        return String::new();
    };

    let document = Html::parse_fragment(html);
    let Some(div) = document.select(&div_selector).next() else {
        return String::new();
    };

    let text: String = div.text().collect();
    if !text.is_empty() {
        return text;
    }

    document
        .select(&iframe_selector)
        .next()
        .and_then(|iframe| iframe.value().attr("src"))
        .map(str::to_string)
        .unwrap_or_default()
}

pub fn extract_author(entry: &Entry) -> String {
    entry
        .parsed
        .authors
        .first()
        .map(display_name)
        .unwrap_or_default()
}

/// Publication date exactly as the feed wrote it. Entries without one stay
/// empty; the `updated` timestamp is not substituted.
pub fn extract_published(entry: &Entry) -> String {
    entry.published.clone().unwrap_or_default()
}

/// Summary, author and date separated by `\n`. Empty pieces still take their
/// line, so a missing author shows up as a blank line.
pub fn extract_author_and_date(entry: &Entry) -> String {
    format!(
        "{}\n{}\n{}",
        extract_summary(entry),
        extract_author(entry),
        extract_published(entry)
    )
}

fn display_name(person: &Person) -> String {
    match person.email.as_deref() {
        Some(email) if person.name == RSS_AUTHOR_ROLE => email.to_string(),
        _ => person.name.clone(),
    }
}

fn render_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc2822()
}
