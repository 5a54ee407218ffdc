use crate::bot::{Bot, BotError, Command, TypingIndicator};
use futures::future::BoxFuture;
use rand::Rng;
use std::collections::HashMap;
use std::num::IntErrorKind;

/// Reply to `/start`.
pub const INTRO_MESSAGE: &str = "NewsPH_Bot has been created to provide you with the latest news updates from the most popular news sources in the Philippines.";

/// Reply to `/read` with an argument that is not a count.
pub const READ_USAGE: &str = "Usage: /read [count]";

/// Reply when the feed cannot be fetched or parsed.
pub const FETCH_FAILED_MESSAGE: &str = "Sorry, the news feed could not be loaded right now.";

/// One invocation of a command in a chat.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    pub chat_id: i64,
    pub args: &'a [String],
}

pub type HandlerFn = for<'a> fn(&'a Bot, Request<'a>) -> BoxFuture<'a, Result<(), BotError>>;

/// Maps command names to their handlers.
pub struct Router {
    handlers: HashMap<&'static str, HandlerFn>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, HandlerFn> = HashMap::new();
        handlers.insert("start", on_start as HandlerFn);
        handlers.insert("news", on_news as HandlerFn);
        handlers.insert("random", on_random as HandlerFn);
        handlers.insert("read", on_read as HandlerFn);
        handlers.insert("all", on_all as HandlerFn);
        Self { handlers }
    }

    pub fn handler(&self, name: &str) -> Option<HandlerFn> {
        self.handlers.get(name).copied()
    }

    /// Registered command names, sorted.
    pub fn commands(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Runs the handler for `command` with the typing indicator shown.
    ///
    /// Returns `false` without touching the chat when no handler is registered.
    pub async fn dispatch(&self, bot: &Bot, chat_id: i64, command: &Command) -> bool {
        let Some(handler) = self.handler(&command.name) else {
            tracing::debug!(chat_id, command = %command.name, "Ignoring unknown command");
            return false;
        };

        tracing::info!(chat_id, command = %command.name, args = ?command.args, "Handling command");
        let _typing = TypingIndicator::start(bot.messenger(), chat_id).await;

        let request = Request {
            chat_id,
            args: &command.args,
        };
        if let Err(e) = handler(bot, request).await {
            bot.report_failure(chat_id, &command.name, &e).await;
        }
        true
    }
}

fn on_start<'a>(bot: &'a Bot, req: Request<'a>) -> BoxFuture<'a, Result<(), BotError>> {
    Box::pin(async move { bot.send_text(req.chat_id, INTRO_MESSAGE).await })
}

fn on_news<'a>(bot: &'a Bot, req: Request<'a>) -> BoxFuture<'a, Result<(), BotError>> {
    Box::pin(async move {
        let entries = bot.fetch_entries().await?;
        match entries.first() {
            Some(entry) => bot.send_entry(req.chat_id, entry).await,
            None => tracing::info!(chat_id = req.chat_id, "Feed has no entries"),
        }
        Ok(())
    })
}

fn on_random<'a>(bot: &'a Bot, req: Request<'a>) -> BoxFuture<'a, Result<(), BotError>> {
    Box::pin(async move {
        let entries = bot.fetch_entries().await?;
        let index = {
            let mut rng = rand::rng();
            pick_random_index(entries.len(), &mut rng)
        };
        match index {
            Some(index) => {
                tracing::debug!(
                    chat_id = req.chat_id,
                    index,
                    total = entries.len(),
                    "Picked random entry"
                );
                bot.send_entry(req.chat_id, &entries[index]).await;
            }
            None => tracing::info!(chat_id = req.chat_id, "Feed has no entries"),
        }
        Ok(())
    })
}

fn on_read<'a>(bot: &'a Bot, req: Request<'a>) -> BoxFuture<'a, Result<(), BotError>> {
    Box::pin(async move {
        let count = parse_read_count(req.args.first().map(String::as_str))?;
        let entries = bot.fetch_entries().await?;
        for entry in entries.iter().take(count) {
            bot.send_entry(req.chat_id, entry).await;
        }
        Ok(())
    })
}

fn on_all<'a>(bot: &'a Bot, req: Request<'a>) -> BoxFuture<'a, Result<(), BotError>> {
    Box::pin(async move {
        let entries = bot.fetch_entries().await?;
        for entry in &entries {
            bot.send_entry(req.chat_id, entry).await;
        }
        Ok(())
    })
}

/// Number of entries `/read` sends. Absent means 1, and 0 is raised to 1.
/// A count too large to represent means "everything".
pub(crate) fn parse_read_count(arg: Option<&str>) -> Result<usize, BotError> {
    let Some(raw) = arg else {
        return Ok(1);
    };
    match raw.parse::<usize>() {
        Ok(count) => Ok(count.max(1)),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(usize::MAX),
        Err(_) => Err(BotError::InvalidCount(raw.to_string())),
    }
}

/// Uniform draw over the closed range `[0, len - 1]`; `None` for an empty feed.
pub(crate) fn pick_random_index<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Option<usize> {
    let last = len.checked_sub(1)?;
    Some(rng.random_range(0..=last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_router_registers_all_commands() {
        let router = Router::new();
        assert_eq!(
            router.commands(),
            vec!["all", "news", "random", "read", "start"]
        );
        assert!(router.handler("news").is_some());
        assert!(router.handler("help").is_none());
    }

    #[test]
    fn test_read_count_defaults_to_one() {
        assert_eq!(parse_read_count(None).unwrap(), 1);
    }

    #[test]
    fn test_read_count_zero_is_one() {
        assert_eq!(parse_read_count(Some("0")).unwrap(), 1);
        assert_eq!(parse_read_count(Some("00")).unwrap(), 1);
        assert_eq!(parse_read_count(Some("1")).unwrap(), 1);
    }

    #[test]
    fn test_read_count_numeric() {
        assert_eq!(parse_read_count(Some("3")).unwrap(), 3);
        assert_eq!(parse_read_count(Some("250")).unwrap(), 250);
    }

    #[test]
    fn test_read_count_overflow_means_everything() {
        assert_eq!(
            parse_read_count(Some("99999999999999999999")).unwrap(),
            usize::MAX
        );
        assert_eq!(
            parse_read_count(Some(&format!("{}0", usize::MAX))).unwrap(),
            usize::MAX
        );
    }

    #[test]
    fn test_read_count_rejects_non_numeric() {
        for raw in [
            "three",
            "-1",
            "2.5",
            "",
            "-99999999999999999999",
            "99999999999999999999x",
        ] {
            match parse_read_count(Some(raw)) {
                Err(BotError::InvalidCount(value)) => assert_eq!(value, raw),
                other => panic!("Expected InvalidCount for {:?}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn test_random_index_empty_feed() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(pick_random_index(0, &mut rng), None);
    }

    #[test]
    fn test_random_index_single_entry() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            assert_eq!(pick_random_index(1, &mut rng), Some(0));
        }
    }

    #[test]
    fn test_random_index_reaches_every_entry() {
        let mut rng = StdRng::seed_from_u64(42);
        let len = 5;
        let mut seen = [false; 5];
        for _ in 0..1_000 {
            let index = pick_random_index(len, &mut rng).unwrap();
            seen[index] = true;
        }
        assert!(
            seen.iter().all(|&s| s),
            "every index drawn, including the last: {:?}",
            seen
        );
    }

    proptest! {
        #[test]
        fn prop_random_index_in_range(len in 1usize..500, seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let index = pick_random_index(len, &mut rng).unwrap();
            prop_assert!(index < len);
        }
    }
}
