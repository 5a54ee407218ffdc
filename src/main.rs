use anyhow::{Context, Result};
use clap::Parser;
use newsph_bot::bot::{self, Bot, Router};
use newsph_bot::config::Config;
use newsph_bot::feed::{FeedReader, FeedSource, NewsItem};
use newsph_bot::telegram::{Poller, TelegramClient};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Get the config directory path (~/.config/newsph-bot/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("newsph-bot"))
}

#[derive(Parser, Debug)]
#[command(
    name = "newsph-bot",
    about = "Telegram bot relaying the latest Philippine news from an RSS feed"
)]
struct Args {
    /// Config file (default: ~/.config/newsph-bot/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Legacy Token.json file holding the bot token under the "NewsPH" key
    #[arg(long, value_name = "FILE")]
    token_file: Option<PathBuf>,

    /// Feed to relay instead of the configured one
    #[arg(long, value_name = "URL")]
    feed_url: Option<String>,

    /// Print the first COUNT normalized entries and exit without starting the bot
    #[arg(long, value_name = "COUNT")]
    preview: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => get_config_dir()?.join("config.toml"),
    };
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    if let Some(feed_url) = args.feed_url {
        config.feed_url = feed_url;
        config.validate().context("Invalid --feed-url")?;
    }

    let http = reqwest::Client::builder()
        .user_agent(concat!("newsph-bot/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let reader = FeedReader::new(http.clone(), config.feed_url.clone())
        .with_timeout(config.request_timeout());

    if let Some(count) = args.preview {
        return preview(&reader, count).await;
    }

    let token = config
        .resolve_token(args.token_file.as_deref())
        .context("Failed to load bot token")?;
    let telegram = Arc::new(TelegramClient::new(http, token));

    let me = telegram
        .get_me()
        .await
        .context("Failed to reach Telegram (is the bot token valid?)")?;
    tracing::info!(
        bot_id = me.id,
        username = me.username.as_deref().unwrap_or("unknown"),
        feed = %reader.url(),
        "Bot started"
    );

    let router = Arc::new(Router::new());
    tracing::debug!(commands = ?router.commands(), "Registered commands");
    let bot = Arc::new(Bot::new(Arc::new(reader), telegram.clone()));

    let (message_tx, message_rx) = mpsc::channel(64);
    let poller = Poller::new(telegram, config.poll_timeout_secs);

    tokio::select! {
        _ = poller.listen(message_tx) => {
            tracing::warn!("Telegram poller stopped");
        }
        _ = bot::serve(bot, router, message_rx, me.username) => {
            tracing::warn!("Command dispatcher stopped");
        }
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl-C")?;
            tracing::info!("Shutting down");
        }
    }

    Ok(())
}

/// Prints normalized entries the way a chat would receive them.
async fn preview(reader: &FeedReader, count: usize) -> Result<()> {
    let entries = reader
        .fetch_entries()
        .await
        .with_context(|| format!("Failed to fetch feed {}", reader.url()))?;

    for (index, entry) in entries.iter().take(count).enumerate() {
        let item = NewsItem::from_entry(entry);
        println!("#{index} {}", item.title);
        println!("image: {}", item.image_url);
        println!("{}", item.text);
        println!();
    }

    if entries.len() < count {
        eprintln!("Feed has only {} entries", entries.len());
    }
    Ok(())
}
