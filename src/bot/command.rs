/// A slash command addressed to the bot, e.g. `/read 3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Lowercased name without the leading `/` or `@username` suffix.
    pub name: String,
    pub args: Vec<String>,
}

impl Command {
    /// Parses a message text as a command.
    ///
    /// Returns `None` for plain text and for `/name@other_bot` when
    /// `bot_username` names a different bot. Names match case-insensitively.
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let head = parts.next()?.strip_prefix('/')?;

        let (name, target) = match head.split_once('@') {
            Some((name, target)) => (name, Some(target)),
            None => (head, None),
        };
        if name.is_empty() {
            return None;
        }

        if let (Some(target), Some(username)) = (target, bot_username) {
            if !target.eq_ignore_ascii_case(username) {
                return None;
            }
        }

        Some(Self {
            name: name.to_lowercase(),
            args: parts.map(str::to_string).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn command(name: &str, args: &[&str]) -> Command {
        Command {
            name: name.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn test_plain_command() {
        assert_eq!(Command::parse("/news", None), Some(command("news", &[])));
    }

    #[test]
    fn test_command_with_args() {
        assert_eq!(
            Command::parse("/read   3 extra", None),
            Some(command("read", &["3", "extra"]))
        );
    }

    #[test]
    fn test_leading_whitespace_and_case() {
        assert_eq!(Command::parse("  /ALL", None), Some(command("all", &[])));
    }

    #[test]
    fn test_mention_of_this_bot() {
        assert_eq!(
            Command::parse("/read@NewsPH_Bot 2", Some("newsph_bot")),
            Some(command("read", &["2"]))
        );
    }

    #[test]
    fn test_mention_of_other_bot_ignored() {
        assert_eq!(Command::parse("/news@OtherBot", Some("NewsPH_Bot")), None);
    }

    #[test]
    fn test_mention_without_known_username_accepted() {
        assert_eq!(
            Command::parse("/news@OtherBot", None),
            Some(command("news", &[]))
        );
    }

    #[test]
    fn test_not_a_command() {
        assert_eq!(Command::parse("hello /news", None), None);
        assert_eq!(Command::parse("", None), None);
        assert_eq!(Command::parse("/", None), None);
        assert_eq!(Command::parse("/@NewsPH_Bot", None), None);
    }
}
