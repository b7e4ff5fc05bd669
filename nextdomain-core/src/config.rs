use nextdomain_scanner::ProbeOptions;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CRASH_LOG_FILE: &str = "crash_log.txt";
pub const THEME_FILE: &str = "theme.txt";
pub const VERSION_FILE: &str = "version_info.txt";
pub const TRACE_FILE: &str = "nextdomain.log";
pub const UPDATE_FILE: &str = "Nextdomain_Scanner.update";
pub const DEFAULT_ACTIVITY_LOG: &str = "~/activity.log";
pub const DEFAULT_SECRET: &str = "1211";

/// Resolved runtime settings shared by the TUI and the one-shot commands.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub activity_log: PathBuf,
    pub probe: ProbeOptions,
    pub typing_delay: Duration,
    pub matrix_delay: Duration,
    pub sweep_secret: String,
}

impl Settings {
    /// Settings rooted at `data_dir`, everything else at its default.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            activity_log: expand_path(DEFAULT_ACTIVITY_LOG),
            probe: ProbeOptions::default(),
            typing_delay: Duration::from_millis(10),
            matrix_delay: Duration::from_millis(50),
            sweep_secret: DEFAULT_SECRET.to_string(),
        }
    }

    pub fn with_activity_log(mut self, path: impl AsRef<str>) -> Self {
        self.activity_log = expand_path(path.as_ref());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.probe.timeout = timeout;
        self.probe.tool_timeout = timeout;
        self
    }

    /// Disables the character-by-character rendering.
    pub fn without_typewriter(mut self) -> Self {
        self.typing_delay = Duration::ZERO;
        self.matrix_delay = Duration::ZERO;
        self
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.sweep_secret = secret.into();
        self
    }

    pub fn crash_log_path(&self) -> PathBuf {
        self.data_dir.join(CRASH_LOG_FILE)
    }

    pub fn theme_path(&self) -> PathBuf {
        self.data_dir.join(THEME_FILE)
    }

    pub fn version_path(&self) -> PathBuf {
        self.data_dir.join(VERSION_FILE)
    }

    pub fn trace_path(&self) -> PathBuf {
        self.data_dir.join(TRACE_FILE)
    }

    pub fn update_path(&self) -> PathBuf {
        self.data_dir.join(UPDATE_FILE)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Expands `~` and environment variables, leaving the path untouched when expansion fails.
pub fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => Path::new(raw).to_path_buf(),
    }
}
