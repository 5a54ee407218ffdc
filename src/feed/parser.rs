use crate::feed::{Entry, FetchError};
use feed_rs::parser;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Parses an RSS or Atom document into its entries, in document order.
///
/// Each entry carries its publication date as the text the feed wrote,
/// read from the markup because `feed-rs` only keeps the parsed timestamp.
/// Documents whose dates cannot be lined up with the parsed entries (JSON
/// Feed, or markup `feed-rs` reads differently) fall back to that timestamp.
pub fn parse_entries(bytes: &[u8]) -> Result<Vec<Entry>, FetchError> {
    let feed = parser::parse(bytes).map_err(|e| FetchError::Parse(e.to_string()))?;

    let entries = match scan_published_dates(bytes) {
        Some(dates) if dates.len() == feed.entries.len() => feed
            .entries
            .into_iter()
            .zip(dates)
            .map(|(parsed, published)| Entry { parsed, published })
            .collect(),
        _ => {
            tracing::debug!(
                entries = feed.entries.len(),
                "Publication dates not readable from markup, using parsed timestamps"
            );
            feed.entries.into_iter().map(Entry::from_parsed).collect()
        }
    };
    Ok(entries)
}

/// Raw text of the first date element of every `<item>`/`<entry>`, one slot
/// per entry in document order. `None` when the document is not well-formed XML.
fn scan_published_dates(bytes: &[u8]) -> Option<Vec<Option<String>>> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut dates: Vec<Option<String>> = Vec::new();
    // Element depth below the open <item>/<entry>, if any
    let mut depth: Option<usize> = None;
    let mut capture: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).ok()? {
            Event::Start(e) => match depth {
                None if is_entry_element(&e) => {
                    dates.push(None);
                    depth = Some(0);
                }
                None => {}
                Some(level) => {
                    if level == 0 && is_date_element(&e) && needs_date(&dates) {
                        capture = Some(String::new());
                    }
                    depth = Some(level + 1);
                }
            },
            Event::Empty(e) => match depth {
                None if is_entry_element(&e) => dates.push(None),
                Some(0) if is_date_element(&e) && needs_date(&dates) => {
                    if let Some(slot) = dates.last_mut() {
                        *slot = Some(String::new());
                    }
                }
                _ => {}
            },
            Event::End(_) => match depth {
                Some(0) => depth = None,
                Some(level) => {
                    if level == 1 {
                        if let (Some(text), Some(slot)) = (capture.take(), dates.last_mut()) {
                            *slot = Some(text.trim().to_string());
                        }
                    }
                    depth = Some(level - 1);
                }
                None => {}
            },
            Event::Text(t) => {
                if let Some(text) = capture.as_mut() {
                    match t.unescape() {
                        Ok(unescaped) => text.push_str(&unescaped),
                        Err(_) => text.push_str(&String::from_utf8_lossy(&t)),
                    }
                }
            }
            Event::CData(c) => {
                if let Some(text) = capture.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Some(dates)
}

fn is_entry_element(e: &BytesStart<'_>) -> bool {
    matches!(e.local_name().as_ref(), b"item" | b"entry")
}

/// RSS `pubDate`, Atom `published` (and Atom 0.3 `issued`), Dublin Core `dc:date`.
fn is_date_element(e: &BytesStart<'_>) -> bool {
    matches!(e.local_name().as_ref(), b"pubDate" | b"published" | b"issued")
        || e.name().as_ref() == b"dc:date"
}

/// The first date element of an entry wins.
fn needs_date(dates: &[Option<String>]) -> bool {
    matches!(dates.last(), Some(None))
}
