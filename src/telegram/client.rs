use crate::telegram::types::{ApiResponse, Update, User};
use crate::telegram::TelegramError;
use crate::util::truncate_chars;
use secrecy::{ExposeSecret, SecretString};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::json;
use std::time::Duration;

const API_BASE: &str = "https://api.telegram.org";

/// Telegram's maximum message length for text messages
pub const MAX_MESSAGE_LENGTH: usize = 4096;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Slack on top of the long-poll timeout before the HTTP request itself gives up.
const POLL_GRACE: Duration = Duration::from_secs(10);

/// Telegram Bot API client
#[derive(Debug)]
pub struct TelegramClient {
    client: reqwest::Client,
    api_base: String,
    token: SecretString,
}

impl TelegramClient {
    pub fn new(client: reqwest::Client, token: SecretString) -> Self {
        Self::with_api_base(client, token, API_BASE)
    }

    /// Client against a different API host (a local Bot API server or a mock).
    pub fn with_api_base(
        client: reqwest::Client,
        token: SecretString,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.token.expose_secret())
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<T, TelegramError> {
        let resp = self
            .client
            .post(self.api_url(method))
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(TelegramError::http)?;

        let status = resp.status();
        let payload: ApiResponse<T> = match resp.json().await {
            Ok(payload) => payload,
            Err(e) if status.is_success() => return Err(TelegramError::http(e)),
            Err(_) => {
                return Err(TelegramError::Api {
                    code: i64::from(status.as_u16()),
                    description: status.to_string(),
                })
            }
        };

        if !payload.ok {
            return Err(TelegramError::Api {
                code: payload
                    .error_code
                    .unwrap_or_else(|| i64::from(status.as_u16())),
                description: payload.description.unwrap_or_default(),
            });
        }

        payload
            .result
            .ok_or_else(|| TelegramError::MissingResult(method.to_string()))
    }

    /// The bot's own account, used to recognise `/command@username` mentions.
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &json!({}), REQUEST_TIMEOUT).await
    }

    /// Long-polls for message updates with `update_id >= offset`.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let body = json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ["message"]
        });
        self.call(
            "getUpdates",
            &body,
            Duration::from_secs(timeout_secs) + POLL_GRACE,
        )
        .await
    }

    /// Send a text message. Text over [`MAX_MESSAGE_LENGTH`] characters is truncated.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let text = truncate_chars(text, MAX_MESSAGE_LENGTH);
        let body = json!({
            "chat_id": chat_id,
            "text": text,
        });
        self.call::<IgnoredAny>("sendMessage", &body, REQUEST_TIMEOUT)
            .await?;
        Ok(())
    }

    /// Send a photo by URL; Telegram downloads it itself.
    pub async fn send_photo(&self, chat_id: i64, photo_url: &str) -> Result<(), TelegramError> {
        let body = json!({
            "chat_id": chat_id,
            "photo": photo_url,
        });
        self.call::<IgnoredAny>("sendPhoto", &body, REQUEST_TIMEOUT)
            .await?;
        Ok(())
    }

    /// Show a chat action such as `typing`. Telegram clears it after about five seconds.
    pub async fn send_chat_action(&self, chat_id: i64, action: &str) -> Result<(), TelegramError> {
        let body = json!({
            "chat_id": chat_id,
            "action": action,
        });
        self.call::<IgnoredAny>("sendChatAction", &body, REQUEST_TIMEOUT)
            .await?;
        Ok(())
    }
}
