use crate::command::{Command, help_text};
use crate::logs::RECENT_CRASHES;
use crate::state::AppState;
use crate::tasks::{ActionTask, Job};
use std::collections::HashMap;

pub const INVALID_COMMAND: &str = "Error: Invalid command. Type 'help' for options.";
pub const MATRIX_TEXT: &str = "developers are the best";

/// What the presentation layer should do in response to input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Type a block of text into the output pane.
    Print(String),
    /// Append a block of text without the typing animation.
    Echo(String),
    /// Empty the output pane.
    Clear,
    /// Replace the input line contents.
    Prefill(String),
    /// Run a job in the background and feed its report to [`crate::Session::complete`].
    Spawn(Job),
    /// The next submitted line answers this prompt.
    Await(Prompt),
    /// Return to the URL entry screen.
    Reset,
    /// Clear the pane and type slowly.
    Matrix(String),
    OpenConsole,
    CloseConsole,
    Exit,
}

/// Follow-up questions that take a second line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Pause,
    Password,
    ChatTarget,
    ChatMessage { target: String },
    ScriptPath,
    UpdateLink,
    BackgroundChoice,
    Settings,
}

impl Prompt {
    pub fn question(&self) -> &'static str {
        match self {
            Prompt::Pause => "Output paused. Hit Enter to continue. ",
            Prompt::Password => "Enter password: ",
            Prompt::ChatTarget => "Enter URL to send POST requests to: ",
            Prompt::ChatMessage { .. } => "chat> ",
            Prompt::ScriptPath => "Enter full file path to run: ",
            Prompt::UpdateLink => "Enter update link: ",
            Prompt::BackgroundChoice => "Subcommand [1/2]: ",
            Prompt::Settings => "Setting [1/2/3]: ",
        }
    }

    pub fn masked(&self) -> bool {
        matches!(self, Prompt::Password)
    }
}

pub type Handler = fn(&mut AppState, &str) -> Vec<Effect>;

/// Lookup table from command to handler.
pub struct Dispatcher {
    handlers: HashMap<Command, Handler>,
}

impl Dispatcher {
    pub fn new() -> Self {
        let table: [(Command, Handler); 23] = [
            (Command::AnalyzeStream, analyze_stream),
            (Command::CodeWebFront, code_web_front),
            (Command::CodeWebBack, code_web_back),
            (Command::Deldo, deldo),
            (Command::Pause, pause),
            (Command::About, about),
            (Command::Update, update),
            (Command::Help, help),
            (Command::ChatPost, chat_post),
            (Command::RunFile, run_file),
            (Command::LogConsole, log_console),
            (Command::ExitConsole, exit_console),
            (Command::RetHack, ret_hack),
            (Command::CrashLog, crash_log),
            (Command::ActivityLog, activity_log),
            (Command::AddShortcut, add_shortcut),
            (Command::RunBackground, run_background),
            (Command::Settings, settings),
            (Command::Clear, clear),
            (Command::ClearLog, clear_log),
            (Command::FetchText, fetch_text),
            (Command::Exit, exit),
            (Command::Secret, secret),
        ];

        Self {
            handlers: table.into_iter().collect(),
        }
    }

    /// Parses `input` and runs the matching handler against `url`.
    pub fn dispatch(&self, input: &str, state: &mut AppState, url: &str) -> Vec<Effect> {
        match input.parse::<Command>() {
            Ok(command) => match self.handlers.get(&command) {
                Some(handler) => handler(state, url),
                None => vec![Effect::Print(INVALID_COMMAND.to_string())],
            },
            Err(_) => vec![Effect::Print(INVALID_COMMAND.to_string())],
        }
    }

    pub fn handles(&self, command: Command) -> bool {
        self.handlers.contains_key(&command)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn print(text: impl Into<String>) -> Effect {
    Effect::Print(text.into())
}

fn spawn(task: ActionTask) -> Effect {
    Effect::Spawn(Job::new(task))
}

fn analyze_stream(_: &mut AppState, url: &str) -> Vec<Effect> {
    vec![spawn(ActionTask::Headers { url: url.to_string() })]
}

fn code_web_front(_: &mut AppState, url: &str) -> Vec<Effect> {
    vec![spawn(ActionTask::Frontend { url: url.to_string() })]
}

fn code_web_back(state: &mut AppState, url: &str) -> Vec<Effect> {
    vec![spawn(ActionTask::Backend {
        url: url.to_string(),
        truncate: state.truncate_backend(),
    })]
}

fn deldo(_: &mut AppState, _: &str) -> Vec<Effect> {
    vec![Effect::Reset]
}

fn pause(_: &mut AppState, _: &str) -> Vec<Effect> {
    vec![
        print("Output paused. Hit Enter to continue."),
        Effect::Await(Prompt::Pause),
    ]
}

fn about(_: &mut AppState, _: &str) -> Vec<Effect> {
    vec![
        print(format!("nextdomain v{} - Created by Aryan Wankhede", crate::VERSION)),
        print("Website: web.nxtinstant.in"),
    ]
}

fn update(_: &mut AppState, _: &str) -> Vec<Effect> {
    vec![Effect::Await(Prompt::UpdateLink)]
}

fn help(_: &mut AppState, _: &str) -> Vec<Effect> {
    vec![print(help_text())]
}

fn chat_post(_: &mut AppState, _: &str) -> Vec<Effect> {
    vec![Effect::Await(Prompt::ChatTarget)]
}

fn run_file(_: &mut AppState, _: &str) -> Vec<Effect> {
    vec![Effect::Await(Prompt::ScriptPath)]
}

fn log_console(_: &mut AppState, _: &str) -> Vec<Effect> {
    vec![Effect::OpenConsole]
}

fn exit_console(_: &mut AppState, _: &str) -> Vec<Effect> {
    vec![Effect::CloseConsole]
}

fn ret_hack(_: &mut AppState, _: &str) -> Vec<Effect> {
    vec![Effect::Matrix(MATRIX_TEXT.to_string())]
}

fn crash_log(state: &mut AppState, _: &str) -> Vec<Effect> {
    let log = state.crash_log();
    if log.is_empty() {
        return vec![print("No crashes detected. System running smoothly!")];
    }

    let mut effects = vec![print("=== Crash & Bug Log ===")];
    effects.extend(log.recent(RECENT_CRASHES).iter().map(|entry| print(entry.display())));
    effects.push(print(format!("\nTotal crashes handled: {}", log.len())));
    effects
}

fn activity_log(state: &mut AppState, _: &str) -> Vec<Effect> {
    match state.activity_log().read() {
        Ok(domains) if domains.is_empty() => vec![print("No domains have been logged yet.")],
        Ok(domains) => vec![print("=== Activity Log ==="), print(domains.join("\n"))],
        Err(e) => {
            state.record_crash(format!("Activity log read error: {}", e));
            vec![print("Error reading activity log.")]
        }
    }
}

fn add_shortcut(_: &mut AppState, _: &str) -> Vec<Effect> {
    vec![print(
        "Desktop shortcuts are not supported in the terminal edition.",
    )]
}

fn run_background(_: &mut AppState, _: &str) -> Vec<Effect> {
    vec![
        print("Run background subcommand:\n1: codewebfront\n2: codewebback"),
        Effect::Await(Prompt::BackgroundChoice),
    ]
}

fn settings(state: &mut AppState, _: &str) -> Vec<Effect> {
    let truncation = if state.truncate_backend() { "On" } else { "Off" };
    vec![
        print(format!(
            "Settings (theme: {}, truncate backend: {}):\n1: Light Theme\n2: Dark Theme\n3: Toggle Truncate Backend Code",
            state.theme(),
            truncation
        )),
        Effect::Await(Prompt::Settings),
    ]
}

fn clear(_: &mut AppState, _: &str) -> Vec<Effect> {
    vec![Effect::Clear]
}

fn clear_log(state: &mut AppState, _: &str) -> Vec<Effect> {
    match state.clear_logs() {
        Ok(()) => vec![print("All logs cleared. Starting a fresh journey!")],
        Err(e) => {
            state.record_crash(format!("Clear logs error: {}", e));
            vec![print("Error: Unable to clear logs. Continuing safely.")]
        }
    }
}

fn fetch_text(_: &mut AppState, url: &str) -> Vec<Effect> {
    vec![
        print("Fetching text from URL..."),
        spawn(ActionTask::FetchText { url: url.to_string() }),
    ]
}

fn exit(_: &mut AppState, _: &str) -> Vec<Effect> {
    vec![print("exiting server nxtinstant closed..."), Effect::Exit]
}

fn secret(_: &mut AppState, _: &str) -> Vec<Effect> {
    vec![Effect::Await(Prompt::Password)]
}
