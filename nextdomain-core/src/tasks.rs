// Background actions and the text they report back to the UI

use nextdomain_scanner::{
    ActionError, ErrorKind, HeaderSource, Probe, ScanResult, VerbOutcome,
};
use std::path::PathBuf;
use tracing::debug;

/// One blocking-style action to run off the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionTask {
    Scan { url: String },
    Headers { url: String },
    Frontend { url: String },
    Backend { url: String, truncate: bool },
    FetchText { url: String },
    Sweep { url: String },
    Chat { target: String, message: String },
    RunScript { path: PathBuf },
    Update { link: String, dest: PathBuf, version_file: PathBuf },
}

impl ActionTask {
    pub fn name(&self) -> &'static str {
        match self {
            ActionTask::Scan { .. } => "scan",
            ActionTask::Headers { .. } => "analyze stream",
            ActionTask::Frontend { .. } => "codewebfront",
            ActionTask::Backend { .. } => "codewebback",
            ActionTask::FetchText { .. } => "fetchtext",
            ActionTask::Sweep { .. } => "sweep",
            ActionTask::Chat { .. } => "chatpost",
            ActionTask::RunScript { .. } => "runfile",
            ActionTask::Update { .. } => "update",
        }
    }
}

/// A task plus how its result should be presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub task: ActionTask,
    /// Print `done` after the output (background runs).
    pub done_marker: bool,
}

impl Job {
    pub fn new(task: ActionTask) -> Self {
        Self {
            task,
            done_marker: false,
        }
    }

    pub fn in_background(task: ActionTask) -> Self {
        Self {
            task,
            done_marker: true,
        }
    }

    pub async fn run(self, probe: &Probe) -> TaskReport {
        debug!("Running task {}", self.task.name());
        let mut report = run_task(&self.task, probe).await;
        report.done_marker = self.done_marker;
        report
    }
}

/// Owned result of a task, applied by the UI thread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskReport {
    pub task: &'static str,
    /// Text blocks to render; each may span several lines.
    pub lines: Vec<String>,
    /// Crash-log notes for failures that were recovered.
    pub crashes: Vec<String>,
    /// Set for a successful scan.
    pub scan: Option<ScanResult>,
    /// Render instantly instead of typing.
    pub echo: bool,
    pub done_marker: bool,
    /// The crash notes were already written by the panic hook.
    pub panicked: bool,
}

impl TaskReport {
    fn new(task: &'static str) -> Self {
        Self {
            task,
            ..Self::default()
        }
    }

    fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    fn crash(mut self, note: impl Into<String>) -> Self {
        self.crashes.push(note.into());
        self
    }

    /// Report for a task that panicked before producing anything.
    pub fn panicked(task: &'static str, detail: impl std::fmt::Display) -> Self {
        let mut report = TaskReport::new(task)
            .line("[System] Error handled. Continuing safely...")
            .crash(format!("Uncaught exception: {}", detail));
        report.panicked = true;
        report
    }
}

async fn run_task(task: &ActionTask, probe: &Probe) -> TaskReport {
    let report = TaskReport::new(task.name());
    match task {
        ActionTask::Scan { url } => match probe.scan(url).await {
            Ok(result) => TaskReport {
                scan: Some(result),
                ..report
            },
            Err(e) => {
                let (message, note) = scan_failure(url, &e);
                report.line(message).crash(note)
            }
        },
        ActionTask::Headers { url } => match probe.analyze_stream(url).await {
            Ok(dump) => match dump.source {
                HeaderSource::Tool => report.line(format!("Headers:\n{}", dump.text.trim_end())),
                HeaderSource::Fallback => report
                    .line(format!("Headers (using alternative method):\n{}", dump.text))
                    .crash(format!("{} not found", probe.options().header_tool)),
            },
            Err(e) => {
                let message = match e.kind() {
                    ErrorKind::Timeout => "Error: Request timed out. Website not responding.",
                    ErrorKind::ToolMissing => "Error: Cannot analyze headers. Tool unavailable.",
                    _ => "Error: Unable to analyze stream. Continuing safely.",
                };
                report.line(message).crash(format!("Analyze stream error for {}: {}", url, e))
            }
        },
        ActionTask::Frontend { url } => match probe.frontend_source(url).await {
            Ok(body) => report.line(body),
            Err(e) => {
                let message = match e.kind() {
                    ErrorKind::Timeout => {
                        "Error: Connection timeout. Website taking too long to respond."
                    }
                    ErrorKind::Unreachable => {
                        "Error: Cannot connect to website. Check URL or internet connection."
                    }
                    _ => "Error: Unable to retrieve frontend code. Continuing safely.",
                };
                report.line(message).crash(format!("Frontend code error for {}: {}", url, e))
            }
        },
        ActionTask::Backend { url, truncate } => match probe.backend_source(url, *truncate).await {
            Ok(body) => report.line(body),
            Err(e) => {
                let message = match e.kind() {
                    ErrorKind::Timeout => "Error: Request timed out. Backend not responding.",
                    ErrorKind::ToolMissing => {
                        "Error: Cannot retrieve backend code. Tool unavailable."
                    }
                    _ => "Error: Unable to retrieve backend code. Continuing safely.",
                };
                report.line(message).crash(format!("Backend code error for {}: {}", url, e))
            }
        },
        ActionTask::FetchText { url } => match probe.fetch_text(url).await {
            Ok(text) => report.line(text),
            Err(e) => report
                .line("Error: Unable to fetch text from URL. Continuing safely.")
                .crash(format!("Fetch text error: {}", e)),
        },
        ActionTask::Sweep { url } => {
            let outcomes = probe.sweep(url).await;
            let mut report = report.line(sweep_lines(url, &outcomes).join("\n"));
            report.crashes.extend(sweep_notes(url, &outcomes));
            report
        }
        ActionTask::Chat { target, message } => {
            let mut report = match probe.post_message(target, message).await {
                Ok(reply) => report.line(format!("Server: {}", reply)),
                Err(e) => {
                    let (line, note) = match e.kind() {
                        ErrorKind::Timeout => (
                            "Error: Server timeout (continuing safely)",
                            format!("Chat POST timeout to {}", target),
                        ),
                        ErrorKind::Unreachable => (
                            "Error: Cannot connect to server",
                            format!("Chat POST connection error to {}", target),
                        ),
                        _ => (
                            "Error: Request failed (continuing safely)",
                            format!("Chat POST error: {}", e),
                        ),
                    };
                    report.line(line).crash(note)
                }
            };
            report.echo = true;
            report
        }
        ActionTask::RunScript { path } => match probe.run_script(path).await {
            Ok(output) => report.line(format!("Output from {}:\n{}", path.display(), output)),
            Err(ActionError::FileNotFound(missing)) => report
                .line(format!("Error: File not found at {}", missing.display()))
                .crash(format!("File not found: {}", missing.display())),
            Err(ActionError::ProcessFailed { output, .. }) => report
                .line(format!("Error running file:\n{}", output))
                .crash(format!("File execution error: {}", path.display())),
            Err(ActionError::Timeout) => report
                .line("Error: File execution timed out. File may have infinite loop.")
                .crash(format!("File execution timeout: {}", path.display())),
            Err(ActionError::ToolMissing(tool)) => report
                .line("Error: Python not available. Cannot run file.")
                .crash(format!("Python execution failed: {} not found", tool)),
            Err(e) => report
                .line("Error: Unable to run file. Continuing safely.")
                .crash(format!("Run file error: {}", e)),
        },
        ActionTask::Update {
            link,
            dest,
            version_file,
        } => match probe.download(link, dest).await {
            Ok(bytes) => {
                let report = report
                    .line("Update Completed.")
                    .line(format!("Saved {} bytes to {}", bytes, dest.display()))
                    .line("Restart nextdomain to use the new version.");
                match tokio::fs::write(version_file, format!("Update source: {}", link)).await {
                    Ok(()) => report,
                    Err(e) => report.crash(format!("Version save error: {}", e)),
                }
            }
            Err(e) => match e.kind() {
                ErrorKind::InvalidUrl | ErrorKind::Unreachable => report
                    .line("Error: Invalid URL or connection failed")
                    .crash(format!("Update URL error: {}", link)),
                _ => report
                    .line("Error: Update failed. Continuing safely.")
                    .crash(format!("Update error: {}", e)),
            },
        },
    }
}

fn scan_failure(url: &str, err: &ActionError) -> (&'static str, String) {
    match err.kind() {
        ErrorKind::Timeout => (
            "Error: Connection timeout. Website might be slow or unavailable.",
            format!("Timeout scanning {}", url),
        ),
        ErrorKind::Unreachable => (
            "Error: Cannot connect to website. Check internet connection.",
            format!("Connection error scanning {}", url),
        ),
        _ => (
            "Error: Unable to scan website. Continuing safely.",
            format!("Scan error: {}", err),
        ),
    }
}

/// One display line per verb, in sweep order.
pub fn sweep_lines(url: &str, outcomes: &[VerbOutcome]) -> Vec<String> {
    outcomes
        .iter()
        .map(|outcome| match outcome.result {
            Ok(status) => format!("{} {} - Status: {}", outcome.method, url, status),
            Err(ErrorKind::Timeout) => format!("{} {} - Timeout (skipped)", outcome.method, url),
            Err(ErrorKind::Unreachable) => {
                format!("{} {} - Connection failed (skipped)", outcome.method, url)
            }
            Err(_) => format!("{} {} - Error handled (continuing)", outcome.method, url),
        })
        .collect()
}

fn sweep_notes(url: &str, outcomes: &[VerbOutcome]) -> Vec<String> {
    outcomes
        .iter()
        .filter_map(|outcome| match outcome.result {
            Ok(_) => None,
            Err(ErrorKind::Timeout) => Some(format!("Request timeout: {} {}", outcome.method, url)),
            Err(ErrorKind::Unreachable) => {
                Some(format!("Connection error: {} {}", outcome.method, url))
            }
            Err(kind) => Some(format!("Request error {}: {:?}", outcome.method, kind)),
        })
        .collect()
}

/// The scan listing shown after a successful scan.
pub fn scan_lines(result: &ScanResult) -> Vec<String> {
    let mut lines = vec!["Pages Found:".to_string()];
    lines.extend(result.pages.iter().map(|p| format!(" - {}", p)));
    lines.push("\nHidden Pages:".to_string());
    lines.extend(result.hidden.iter().map(|h| format!(" - {}", h)));
    lines
}
