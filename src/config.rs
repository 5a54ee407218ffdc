//! Configuration file parser for ~/.config/newsph-bot/config.toml.
//!
//! The config file is optional — a missing file yields `Config::default()`.
//! Unknown keys are silently ignored by serde (with `deny_unknown_fields` off),
//! though we log a warning when the file contains potential typos.
//!
//! The bot token can come from three places, checked in order:
//! the `NEWSPH_BOT_TOKEN` environment variable, a legacy `Token.json` file
//! (`{"NewsPH": "<token>"}`), and the `bot_token` key of the config file.
use crate::feed::DEFAULT_FEED_URL;
use crate::util::{validate_feed_url, UrlValidationError};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the bot token.
pub const TOKEN_ENV_VAR: &str = "NEWSPH_BOT_TOKEN";

/// Key of the bot token inside a legacy `Token.json` file.
const TOKEN_FILE_KEY: &str = "NewsPH";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid feed_url: {0}")]
    InvalidFeedUrl(#[from] UrlValidationError),

    #[error("Invalid token file {path}: {reason}")]
    TokenFile { path: String, reason: String },

    #[error("No bot token found: set NEWSPH_BOT_TOKEN, pass --token-file, or add bot_token to the config file")]
    MissingToken,
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level bot configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
///
/// Custom Debug impl masks `bot_token` to keep it out of logs.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Telegram bot token. The environment variable and token file take precedence.
    pub bot_token: Option<String>,

    /// RSS/Atom feed relayed to chats.
    pub feed_url: String,

    /// Timeout for a single feed fetch, in seconds.
    pub request_timeout_secs: u64,

    /// Long-poll timeout passed to `getUpdates`, in seconds.
    pub poll_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot_token: None,
            feed_url: DEFAULT_FEED_URL.to_string(),
            request_timeout_secs: 30,
            poll_timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "[REDACTED]"))
            .field("feed_url", &self.feed_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenFile {
    #[serde(rename = "NewsPH")]
    news_ph: Option<String>,
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted (serde default behavior), logged as warning
    /// - `feed_url` that is not an http(s) URL → `Err(ConfigError::InvalidFeedUrl)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse the TOML content first as a raw table to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = [
                "bot_token",
                "feed_url",
                "request_timeout_secs",
                "poll_timeout_secs",
            ];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        tracing::info!(path = %path.display(), feed_url = %config.feed_url, "Loaded configuration");
        Ok(config)
    }

    /// Checks values serde cannot: the feed URL must be an http(s) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_feed_url(&self.feed_url)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Resolves the bot token from the environment, `token_file`, or the config file.
    pub fn resolve_token(&self, token_file: Option<&Path>) -> Result<SecretString, ConfigError> {
        self.resolve_token_from(std::env::var(TOKEN_ENV_VAR).ok(), token_file)
    }

    fn resolve_token_from(
        &self,
        env_token: Option<String>,
        token_file: Option<&Path>,
    ) -> Result<SecretString, ConfigError> {
        if let Some(token) = non_empty(env_token) {
            tracing::debug!("Using bot token from {}", TOKEN_ENV_VAR);
            return Ok(SecretString::from(token));
        }

        if let Some(path) = token_file {
            if let Some(token) = read_token_file(path)? {
                tracing::debug!(path = %path.display(), "Using bot token from token file");
                return Ok(SecretString::from(token));
            }
        }

        non_empty(self.bot_token.clone())
            .map(SecretString::from)
            .ok_or(ConfigError::MissingToken)
    }
}

/// Reads the `NewsPH` key of a legacy `Token.json` file.
///
/// A file without the key (or with an empty value) yields `Ok(None)` so the
/// caller can fall back to the config file.
fn read_token_file(path: &Path) -> Result<Option<String>, ConfigError> {
    let token_file_error = |reason: String| ConfigError::TokenFile {
        path: path.display().to_string(),
        reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| token_file_error(e.to_string()))?;
    let parsed: TokenFile =
        serde_json::from_str(&content).map_err(|e| token_file_error(e.to_string()))?;

    if parsed.news_ph.is_none() {
        tracing::warn!(path = %path.display(), key = TOKEN_FILE_KEY, "Token file has no bot token key");
    }
    Ok(non_empty(parsed.news_ph))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.poll_timeout_secs, 30);
        assert!(config.bot_token.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/newsph_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let dir = temp_dir("newsph_config_test_whitespace");
        let path = dir.join("config.toml");
        std::fs::write(&path, "   \n  \n  ").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.feed_url, DEFAULT_FEED_URL);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let dir = temp_dir("newsph_config_test_partial");
        let path = dir.join("config.toml");
        std::fs::write(&path, "request_timeout_secs = 10\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.feed_url, DEFAULT_FEED_URL); // default
        assert_eq!(config.poll_timeout_secs, 30); // default

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let dir = temp_dir("newsph_config_test_full");
        let path = dir.join("config.toml");

        let content = r#"
bot_token = "123:ABC"
feed_url = "https://news.example.com/rss.xml"
request_timeout_secs = 15
poll_timeout_secs = 50
"#;
        std::fs::write(&path, content).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.bot_token.as_deref(), Some("123:ABC"));
        assert_eq!(config.feed_url, "https://news.example.com/rss.xml");
        assert_eq!(config.request_timeout_secs, 15);
        assert_eq!(config.poll_timeout_secs, 50);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let dir = temp_dir("newsph_config_test_invalid");
        let path = dir.join("config.toml");
        std::fs::write(&path, "this is not [valid toml").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let dir = temp_dir("newsph_config_test_unknown");
        let path = dir.join("config.toml");
        std::fs::write(&path, "poll_timeout_secs = 5\ntotally_fake_key = 42\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.poll_timeout_secs, 5);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let dir = temp_dir("newsph_config_test_wrongtype");
        let path = dir.join("config.toml");
        std::fs::write(&path, "feed_url = 42\n").unwrap();

        assert!(Config::load(&path).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_non_http_feed_url_rejected() {
        let dir = temp_dir("newsph_config_test_bad_url");
        let path = dir.join("config.toml");
        std::fs::write(&path, "feed_url = \"file:///etc/passwd\"\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFeedUrl(_)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = temp_dir("newsph_config_test_too_large");
        let path = dir.join("config.toml");
        std::fs::write(&path, "a".repeat(1_048_577)).unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_debug_masks_bot_token() {
        let config = Config {
            bot_token: Some("super-secret-token-12345".to_string()),
            ..Config::default()
        };

        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("super-secret-token-12345"));
        assert!(debug_output.contains("[REDACTED]"));
    }

    #[test]
    fn test_env_token_takes_precedence() {
        let dir = temp_dir("newsph_config_test_env_precedence");
        let token_path = dir.join("Token.json");
        std::fs::write(&token_path, r#"{"NewsPH": "file-token"}"#).unwrap();
        let config = Config {
            bot_token: Some("config-token".to_string()),
            ..Config::default()
        };

        let token = config
            .resolve_token_from(Some("env-token".to_string()), Some(&token_path))
            .unwrap();
        assert_eq!(token.expose_secret(), "env-token");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_token_file_before_config() {
        let dir = temp_dir("newsph_config_test_token_file");
        let token_path = dir.join("Token.json");
        std::fs::write(
            &token_path,
            r#"{"NewsPH": "file-token", "OtherBot": "ignored"}"#,
        )
        .unwrap();
        let config = Config {
            bot_token: Some("config-token".to_string()),
            ..Config::default()
        };

        let token = config.resolve_token_from(None, Some(&token_path)).unwrap();
        assert_eq!(token.expose_secret(), "file-token");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_token_file_without_key_falls_back_to_config() {
        let dir = temp_dir("newsph_config_test_token_file_no_key");
        let token_path = dir.join("Token.json");
        std::fs::write(&token_path, r#"{"OtherBot": "ignored"}"#).unwrap();
        let config = Config {
            bot_token: Some("config-token".to_string()),
            ..Config::default()
        };

        let token = config.resolve_token_from(None, Some(&token_path)).unwrap();
        assert_eq!(token.expose_secret(), "config-token");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_malformed_token_file_is_error() {
        let dir = temp_dir("newsph_config_test_token_file_bad");
        let token_path = dir.join("Token.json");
        std::fs::write(&token_path, "{not json").unwrap();

        let err = Config::default()
            .resolve_token_from(None, Some(&token_path))
            .unwrap_err();
        assert!(matches!(err, ConfigError::TokenFile { .. }));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_token_everywhere() {
        let err = Config::default()
            .resolve_token_from(Some("   ".to_string()), None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingToken));
    }
}
