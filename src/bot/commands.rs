//! Parses raw message text into bot commands.

/// Parses user input into [`Command`]s.
pub struct CommandParser;

impl CommandParser {
    /// Parse message content into a Command.
    ///
    /// Slash commands match on their first word, case-insensitively, with any
    /// `@botname` suffix and trailing arguments ignored. Anything else is text.
    pub fn parse(content: &str) -> Command {
        let trimmed = content.trim();
        let lower = trimmed.to_lowercase();

        // Bare console keyword
        if matches!(lower.as_str(), "exit" | "quit") {
            return Command::Quit;
        }

        let Some(rest) = lower.strip_prefix('/') else {
            return Command::Text(trimmed.to_string());
        };

        let word = rest.split_whitespace().next().unwrap_or("");
        let name = word.split('@').next().unwrap_or("");

        match name {
            "start" => Command::Start,
            "help" | "?" => Command::Help,
            "about" => Command::About,
            "add" => Command::Add,
            "cancel" => Command::Cancel,
            "quit" | "exit" | "shutdown" => Command::Quit,
            _ => Command::Unknown(name.to_string()),
        }
    }
}

/// A parsed user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Greeting with the dashboard button.
    Start,
    Help,
    About,
    /// Begin the registration dialog.
    Add,
    /// Abort the registration dialog.
    Cancel,
    /// Stop the service. Only honored on the console channel.
    Quit,
    /// A slash command the bot doesn't know.
    Unknown(String),
    /// Plain text, trimmed.
    Text(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands() {
        assert_eq!(CommandParser::parse("/start"), Command::Start);
        assert_eq!(CommandParser::parse("/help"), Command::Help);
        assert_eq!(CommandParser::parse("/about"), Command::About);
        assert_eq!(CommandParser::parse("/add"), Command::Add);
        assert_eq!(CommandParser::parse("/cancel"), Command::Cancel);
        assert_eq!(CommandParser::parse("/quit"), Command::Quit);
    }

    #[test]
    fn commands_are_case_insensitive_and_trimmed() {
        assert_eq!(CommandParser::parse("  /ADD  "), Command::Add);
        assert_eq!(CommandParser::parse("/Cancel"), Command::Cancel);
    }

    #[test]
    fn bot_suffix_and_args_are_ignored() {
        assert_eq!(CommandParser::parse("/add@FleetBot"), Command::Add);
        assert_eq!(CommandParser::parse("/start deeplink-payload"), Command::Start);
    }

    #[test]
    fn console_exit_keywords() {
        assert_eq!(CommandParser::parse("exit"), Command::Quit);
        assert_eq!(CommandParser::parse("EXIT"), Command::Quit);
        assert_eq!(CommandParser::parse("/exit"), Command::Quit);
    }

    #[test]
    fn unknown_command() {
        assert_eq!(
            CommandParser::parse("/fly"),
            Command::Unknown("fly".into())
        );
        assert_eq!(CommandParser::parse("/"), Command::Unknown(String::new()));
    }

    #[test]
    fn plain_text_keeps_case() {
        assert_eq!(
            CommandParser::parse("  a1 a1a1 "),
            Command::Text("a1 a1a1".into())
        );
        assert_eq!(
            CommandParser::parse("Ivanov I.I."),
            Command::Text("Ivanov I.I.".into())
        );
    }
}
