use crate::config::Settings;
use crate::logs::{ActivityLog, CrashLog};
use crate::theme::{Theme, ThemeStore};
use std::fs;
use std::io;
use tracing::warn;

/// Mutable application state owned by the UI thread.
#[derive(Debug)]
pub struct AppState {
    settings: Settings,
    theme: ThemeStore,
    truncate_backend: bool,
    crash_log: CrashLog,
    activity_log: ActivityLog,
}

impl AppState {
    pub fn load(settings: Settings) -> Self {
        Self {
            theme: ThemeStore::load(settings.theme_path()),
            truncate_backend: true,
            crash_log: CrashLog::new(settings.crash_log_path()),
            activity_log: ActivityLog::new(settings.activity_log.clone()),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn theme(&self) -> Theme {
        self.theme.current()
    }

    /// Applies `theme`, logging a crash note when it cannot be persisted.
    pub fn set_theme(&mut self, theme: Theme) {
        if let Err(e) = self.theme.set(theme) {
            self.crash_log.record(format!("Theme save error: {}", e));
        }
    }

    pub fn truncate_backend(&self) -> bool {
        self.truncate_backend
    }

    pub fn toggle_truncation(&mut self) -> bool {
        self.truncate_backend = !self.truncate_backend;
        self.truncate_backend
    }

    pub fn crash_log(&self) -> &CrashLog {
        &self.crash_log
    }

    pub fn record_crash(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.crash_log.record(message);
    }

    pub fn remember_crash(&mut self, message: impl Into<String>) {
        self.crash_log.remember(message);
    }

    pub fn activity_log(&self) -> &ActivityLog {
        &self.activity_log
    }

    pub fn log_domain(&mut self, url: &str) {
        if let Err(e) = self.activity_log.append(url) {
            self.record_crash(format!("Activity log write error: {}", e));
        }
    }

    /// Deletes both log files and forgets every crash entry.
    pub fn clear_logs(&mut self) -> io::Result<()> {
        let activity = self.activity_log.clear();
        let crashes = self.crash_log.clear();
        activity.and(crashes)
    }

    /// The line written by the last update, if any.
    pub fn version_note(&mut self) -> Option<String> {
        let path = self.settings.version_path();
        match fs::read_to_string(&path) {
            Ok(note) => Some(note.trim().to_string()).filter(|n| !n.is_empty()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                self.record_crash(format!("Version info read error: {}", e));
                None
            }
        }
    }
}
