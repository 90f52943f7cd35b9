use std::str::FromStr;

use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Commands invoked by starting a message with a leading slash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Reset the conversation to a fresh greeting
    Clear,
    /// Close the assistant panel
    Close,
    /// Show available commands
    Help,
    /// Exit the application
    Quit,
}

impl SlashCommand {
    /// User-visible description shown in help.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::Clear => "reset the conversation",
            SlashCommand::Close => "close the assistant panel",
            SlashCommand::Help => "show available commands",
            SlashCommand::Quit => "exit the application",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }
}

/// Parse a slash command from user input
pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    let head = trimmed.strip_prefix('/')?.split_whitespace().next()?;

    SlashCommand::from_str(head)
        .ok()
        .or_else(|| match head.to_lowercase().as_str() {
            "q" | "exit" | "bye" => Some(SlashCommand::Quit),
            "h" => Some(SlashCommand::Help),
            "reset" => Some(SlashCommand::Clear),
            _ => None,
        })
}

/// Get help text for all available commands
pub fn help_text() -> String {
    let mut help = String::from("Commands: ");
    for (i, command) in SlashCommand::iter().enumerate() {
        if i > 0 {
            help.push_str("  ");
        }
        help.push_str(&format!("/{} {}", command.command(), command.description()));
    }
    help
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse_slash_command("/clear"), Some(SlashCommand::Clear));
        assert_eq!(parse_slash_command("/close"), Some(SlashCommand::Close));
        assert_eq!(parse_slash_command("/help"), Some(SlashCommand::Help));
        assert_eq!(parse_slash_command("/quit"), Some(SlashCommand::Quit));
    }

    #[test]
    fn parses_aliases() {
        assert_eq!(parse_slash_command("/q"), Some(SlashCommand::Quit));
        assert_eq!(parse_slash_command("/bye"), Some(SlashCommand::Quit));
        assert_eq!(parse_slash_command("/h"), Some(SlashCommand::Help));
        assert_eq!(parse_slash_command("/reset"), Some(SlashCommand::Clear));
    }

    #[test]
    fn ignores_plain_messages_and_unknown_commands() {
        assert_eq!(parse_slash_command("hello"), None);
        assert_eq!(parse_slash_command("/frobnicate"), None);
        assert_eq!(parse_slash_command(""), None);
    }

    #[test]
    fn tolerates_surrounding_whitespace_and_arguments() {
        assert_eq!(parse_slash_command("  /clear  "), Some(SlashCommand::Clear));
        assert_eq!(parse_slash_command("/quit now"), Some(SlashCommand::Quit));
    }
}
