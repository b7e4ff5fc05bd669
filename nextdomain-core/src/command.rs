use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Every command accepted on the scanned-URL prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    AnalyzeStream,
    CodeWebFront,
    CodeWebBack,
    Deldo,
    Pause,
    About,
    Update,
    Help,
    ChatPost,
    RunFile,
    LogConsole,
    ExitConsole,
    RetHack,
    CrashLog,
    ActivityLog,
    AddShortcut,
    RunBackground,
    Settings,
    Clear,
    ClearLog,
    FetchText,
    Exit,
    /// Password-gated request sweep. Not listed in the help text.
    Secret,
}

impl Command {
    pub const ALL: [Command; 23] = [
        Command::AnalyzeStream,
        Command::CodeWebFront,
        Command::CodeWebBack,
        Command::Deldo,
        Command::Pause,
        Command::About,
        Command::Update,
        Command::Help,
        Command::ChatPost,
        Command::RunFile,
        Command::LogConsole,
        Command::ExitConsole,
        Command::RetHack,
        Command::CrashLog,
        Command::ActivityLog,
        Command::AddShortcut,
        Command::RunBackground,
        Command::Settings,
        Command::Clear,
        Command::ClearLog,
        Command::FetchText,
        Command::Exit,
        Command::Secret,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            Command::AnalyzeStream => "analyze stream",
            Command::CodeWebFront => "codewebfront",
            Command::CodeWebBack => "codewebback",
            Command::Deldo => "deldo",
            Command::Pause => "pause",
            Command::About => "about",
            Command::Update => "update",
            Command::Help => "help",
            Command::ChatPost => "chatpost",
            Command::RunFile => "runfile",
            Command::LogConsole => "logconsole",
            Command::ExitConsole => "exitconsole",
            Command::RetHack => "rethack",
            Command::CrashLog => "crashlog",
            Command::ActivityLog => "activitylog",
            Command::AddShortcut => "addshortcut",
            Command::RunBackground => "runbackground",
            Command::Settings => "settings",
            Command::Clear => "clear",
            Command::ClearLog => "clearlog",
            Command::FetchText => "fetchtext",
            Command::Exit => "exit",
            Command::Secret => "secret1211",
        }
    }

    /// One-line description for the help text. `None` keeps a command out of it.
    pub fn summary(&self) -> Option<&'static str> {
        let text = match self {
            Command::AnalyzeStream => "Analyze website headers",
            Command::CodeWebFront => "Show frontend code",
            Command::CodeWebBack => "Attempt backend code view",
            Command::Deldo => "Clear and restart",
            Command::Pause => "Pause output",
            Command::About => "Show project details",
            Command::Update => "Update the program",
            Command::Help => "Show this menu",
            Command::ChatPost => "Open chat interface to POST messages",
            Command::RunFile => "Run a Python file by specifying path",
            Command::LogConsole => "Open realtime log console window",
            Command::ExitConsole => "Close log console window",
            Command::RetHack => "Show matrix animation text",
            Command::CrashLog => "View crash and bug log",
            Command::ActivityLog => "View all previously searched domains",
            Command::AddShortcut => "Create desktop shortcut (Windows only)",
            Command::RunBackground => "Run scans in background",
            Command::Settings => "Open settings window",
            Command::Clear => "Clear output",
            Command::ClearLog => "Clear all logs and start fresh",
            Command::FetchText => "Fetch and display text from URL",
            Command::Exit => "Exit the program",
            Command::Secret => return None,
        };
        Some(text)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown command: {0}")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        Command::ALL
            .iter()
            .copied()
            .find(|command| command.keyword() == input)
            .ok_or_else(|| UnknownCommand(input.to_string()))
    }
}

/// The `help` output.
pub fn help_text() -> String {
    let mut text = String::from("Commands:");
    for command in Command::ALL {
        if let Some(summary) = command.summary() {
            text.push_str(&format!("\n    {} - {}", command.keyword(), summary));
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_keyword_round_trips() {
        for command in Command::ALL {
            assert_eq!(command.keyword().parse::<Command>(), Ok(command));
        }
    }

    #[test]
    fn test_parse_is_exact_after_trim() {
        assert_eq!("  help ".parse::<Command>(), Ok(Command::Help));
        assert_eq!("analyze stream".parse::<Command>(), Ok(Command::AnalyzeStream));
        assert!("HELP".parse::<Command>().is_err());
        assert!("analyze  stream".parse::<Command>().is_err());
        assert!("help me".parse::<Command>().is_err());
        assert!("".parse::<Command>().is_err());
    }

    #[test]
    fn test_unknown_command_error_message() {
        let err = " nope ".parse::<Command>().unwrap_err();
        assert_eq!(err, UnknownCommand("nope".to_string()));
        assert_eq!(err.to_string(), "unknown command: nope");
    }

    #[test]
    fn test_help_hides_secret_command() {
        let help = help_text();
        assert!(help.starts_with("Commands:"));
        assert!(help.contains("analyze stream - Analyze website headers"));
        assert!(help.contains("exit - Exit the program"));
        assert!(!help.contains("secret"));
        assert_eq!(help.lines().count(), 23);
    }
}
