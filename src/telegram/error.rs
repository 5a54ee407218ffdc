use thiserror::Error;

/// Telegram API errors
#[derive(Debug, Error)]
pub enum TelegramError {
    /// HTTP request failed. The request URL is stripped since it embeds the bot token.
    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    /// Telegram API answered with `ok: false`
    #[error("Telegram API error {code}: {description}")]
    Api { code: i64, description: String },

    /// Telegram API answered `ok: true` without a `result`
    #[error("Telegram {0} response had no result")]
    MissingResult(String),
}

impl TelegramError {
    pub(crate) fn http(err: reqwest::Error) -> Self {
        Self::Http(err.without_url())
    }

    /// Another process is polling `getUpdates` with the same token.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Api { code: 409, .. })
    }
}
