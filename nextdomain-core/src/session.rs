// The two-screen interaction model: enter a URL, then issue commands against it

use crate::config::expand_path;
use crate::dispatch::{Dispatcher, Effect, Prompt};
use crate::state::AppState;
use crate::tasks::{ActionTask, Job, TaskReport, scan_lines};
use crate::theme::Theme;
use nextdomain_scanner::is_valid_url;
use tracing::{debug, info};

pub const URL_PREFILL: &str = "https://";
pub const INVALID_URL: &str = "Error: Please enter a valid domain (e.g., https://nxtinstant.in)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Waiting for a URL to scan.
    Idle,
    /// A scan succeeded and commands run against `url`.
    Scanned { url: String },
}

/// Drives the interaction. Every method returns the effects the UI should apply, in order.
pub struct Session {
    state: AppState,
    screen: Screen,
    pending: Option<Prompt>,
    dispatcher: Dispatcher,
}

impl Session {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            screen: Screen::Idle,
            pending: None,
            dispatcher: Dispatcher::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn pending(&self) -> Option<&Prompt> {
        self.pending.as_ref()
    }

    pub fn theme(&self) -> Theme {
        self.state.theme()
    }

    /// The initial screen: banner, separator and a prefilled URL field.
    pub fn start(&mut self) -> Vec<Effect> {
        self.screen = Screen::Idle;
        self.pending = None;

        let mut banner = crate::BANNER.to_string();
        if let Some(note) = self.state.version_note() {
            banner.push('\n');
            banner.push_str(&note);
        }

        vec![
            Effect::Clear,
            Effect::Print(banner),
            Effect::Print(">".repeat(25)),
            Effect::Prefill(URL_PREFILL.to_string()),
        ]
    }

    /// Text shown before the input field.
    pub fn prompt_label(&self) -> String {
        match (&self.pending, &self.screen) {
            (Some(prompt), _) => prompt.question().to_string(),
            (None, Screen::Idle) => "url> ".to_string(),
            (None, Screen::Scanned { url }) => format!("{}> ", url),
        }
    }

    pub fn masks_input(&self) -> bool {
        self.pending.as_ref().is_some_and(Prompt::masked)
    }

    pub fn in_chat(&self) -> bool {
        matches!(self.pending, Some(Prompt::ChatMessage { .. }))
    }

    /// Handles one submitted line.
    pub fn submit(&mut self, input: &str) -> Vec<Effect> {
        let effects = if let Some(prompt) = self.pending.take() {
            self.answer(prompt, input)
        } else {
            match self.screen.clone() {
                Screen::Idle => self.submit_url(input),
                Screen::Scanned { url } => {
                    debug!("Command {:?} against {}", input.trim(), url);
                    let mut effects = vec![Effect::Clear];
                    effects.extend(self.dispatcher.dispatch(input, &mut self.state, &url));
                    effects
                }
            }
        };
        self.resolve(effects)
    }

    /// Abandons an open prompt. Leaving chat mode is the only case with output.
    pub fn cancel(&mut self) -> Vec<Effect> {
        match self.pending.take() {
            Some(Prompt::ChatMessage { .. }) => vec![Effect::Echo("Chat closed.".to_string())],
            _ => Vec::new(),
        }
    }

    /// Applies a finished background job.
    pub fn complete(&mut self, report: TaskReport) -> Vec<Effect> {
        for note in &report.crashes {
            if report.panicked {
                self.state.remember_crash(note.clone());
            } else {
                self.state.record_crash(note.clone());
            }
        }

        let mut effects = Vec::new();
        if let Some(scan) = report.scan {
            info!("Scan of {} found {} links", scan.url, scan.total());
            self.state.log_domain(&scan.url);
            effects.extend(scan_lines(&scan).into_iter().map(Effect::Print));
            effects.push(Effect::Prefill(String::new()));
            self.screen = Screen::Scanned { url: scan.url };
        }

        for line in report.lines {
            effects.push(if report.echo {
                Effect::Echo(line)
            } else {
                Effect::Print(line)
            });
        }

        if report.done_marker {
            effects.push(Effect::Print("done".to_string()));
        }
        effects
    }

    fn submit_url(&mut self, input: &str) -> Vec<Effect> {
        let url = input.trim();
        if !is_valid_url(url) {
            return vec![Effect::Print(INVALID_URL.to_string())];
        }
        vec![
            Effect::Clear,
            Effect::Spawn(Job::new(ActionTask::Scan {
                url: url.to_string(),
            })),
        ]
    }

    fn current_url(&self) -> Option<String> {
        match &self.screen {
            Screen::Scanned { url } => Some(url.clone()),
            Screen::Idle => None,
        }
    }

    fn answer(&mut self, prompt: Prompt, input: &str) -> Vec<Effect> {
        let input = input.trim();
        match prompt {
            Prompt::Pause => Vec::new(),
            Prompt::Password => {
                if input != self.state.settings().sweep_secret {
                    return vec![Effect::Print("Incorrect password!".to_string())];
                }
                match self.current_url() {
                    Some(url) => vec![
                        Effect::Print("Welcome! Sending all possible requests...".to_string()),
                        Effect::Spawn(Job::new(ActionTask::Sweep { url })),
                    ],
                    None => Vec::new(),
                }
            }
            Prompt::ChatTarget => {
                if input.is_empty() {
                    return Vec::new();
                }
                let target = input.to_string();
                vec![
                    Effect::Clear,
                    Effect::Echo(format!("=== Chat POST Interface: {} ===", target)),
                    Effect::Echo(
                        "Type a message and press Enter. Send an empty line or press Esc to leave."
                            .to_string(),
                    ),
                    Effect::Await(Prompt::ChatMessage { target }),
                ]
            }
            Prompt::ChatMessage { target } => {
                if input.is_empty() {
                    return vec![Effect::Echo("Chat closed.".to_string())];
                }
                vec![
                    Effect::Echo(format!("You: {}", input)),
                    Effect::Spawn(Job::new(ActionTask::Chat {
                        target: target.clone(),
                        message: input.to_string(),
                    })),
                    Effect::Await(Prompt::ChatMessage { target }),
                ]
            }
            Prompt::ScriptPath => {
                if input.is_empty() {
                    return vec![Effect::Print("No file path provided.".to_string())];
                }
                vec![Effect::Spawn(Job::new(ActionTask::RunScript {
                    path: expand_path(input),
                }))]
            }
            Prompt::UpdateLink => {
                if input.is_empty() {
                    return Vec::new();
                }
                let settings = self.state.settings();
                vec![
                    Effect::Print("Downloading Update...".to_string()),
                    Effect::Spawn(Job::new(ActionTask::Update {
                        link: input.to_string(),
                        dest: settings.update_path(),
                        version_file: settings.version_path(),
                    })),
                ]
            }
            Prompt::BackgroundChoice => {
                let Some(url) = self.current_url() else {
                    return Vec::new();
                };
                let task = match input {
                    "1" => ActionTask::Frontend { url },
                    "2" => ActionTask::Backend {
                        url,
                        truncate: self.state.truncate_backend(),
                    },
                    _ => return vec![Effect::Print("Invalid subcommand.".to_string())],
                };
                vec![Effect::Spawn(Job::in_background(task))]
            }
            Prompt::Settings => match input {
                "1" => {
                    self.state.set_theme(Theme::Light);
                    vec![Effect::Print("Theme: light".to_string())]
                }
                "2" => {
                    self.state.set_theme(Theme::Dark);
                    vec![Effect::Print("Theme: dark".to_string())]
                }
                "3" => {
                    let on = self.state.toggle_truncation();
                    vec![Effect::Print(format!(
                        "Truncate backend code: {}",
                        if on { "On" } else { "Off" }
                    ))]
                }
                _ => vec![Effect::Print("Invalid setting.".to_string())],
            },
        }
    }

    /// Tracks prompts and expands resets so the UI only sees concrete effects.
    fn resolve(&mut self, effects: Vec<Effect>) -> Vec<Effect> {
        let mut resolved = Vec::with_capacity(effects.len());
        for effect in effects {
            match effect {
                Effect::Reset => resolved.extend(self.start()),
                Effect::Await(prompt) => {
                    self.pending = Some(prompt.clone());
                    resolved.push(Effect::Await(prompt));
                }
                other => resolved.push(other),
            }
        }
        resolved
    }
}
