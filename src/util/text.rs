use std::borrow::Cow;

/// Ellipsis string used for truncation
const ELLIPSIS: &str = "...";
const ELLIPSIS_LEN: usize = 3;

/// Truncates a string to at most `max_chars` Unicode scalar values.
///
/// If truncation is necessary the result ends with "..." and is exactly
/// `max_chars` characters long. Strings that already fit are returned
/// borrowed.
///
/// For limits of 3 or fewer there is no room for the ellipsis, so the string
/// is cut without one.
///
/// # Examples
///
/// ```
/// use newsph_bot::util::truncate_chars;
///
/// assert_eq!(truncate_chars("Short", 10), "Short");
/// assert_eq!(truncate_chars("Hello World", 8), "Hello...");
/// assert_eq!(truncate_chars("Balita", 2), "Ba");
/// ```
pub fn truncate_chars(s: &str, max_chars: usize) -> Cow<'_, str> {
    let Some((cut, _)) = s.char_indices().nth(max_chars) else {
        return Cow::Borrowed(s);
    };

    if max_chars <= ELLIPSIS_LEN {
        return Cow::Owned(s[..cut].to_string());
    }

    let keep = s
        .char_indices()
        .nth(max_chars - ELLIPSIS_LEN)
        .map_or(s.len(), |(idx, _)| idx);
    let mut out = String::with_capacity(keep + ELLIPSIS.len());
    out.push_str(&s[..keep]);
    out.push_str(ELLIPSIS);
    Cow::Owned(out)
}
