use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use nextdomain_core::logs::{CrashEntry, RECENT_CRASHES, read_crash_file};
use nextdomain_core::{ActionTask, AppState, Job, Session, Settings, TaskReport};
use nextdomain_scanner::{Probe, ScanResult, is_valid_url};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Where tracing output goes.
pub enum LogTarget {
    Stderr,
    /// The TUI owns the terminal, so logs go to a file.
    File(PathBuf),
}

pub fn init_tracing(target: LogTarget, default_directive: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    match target {
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
        }
    }
    .map_err(|e| anyhow!("Failed to initialise logging: {}", e))
}

/// Appends every panic to the crash log. `echo` keeps the default stderr report.
pub fn install_panic_hook(crash_log: PathBuf, echo: bool) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        let detail = match info.location() {
            Some(location) => format!("{} at {}:{}", payload, location.file(), location.line()),
            None => payload,
        };

        error!("Uncaught exception: {}", detail);
        if let Err(e) =
            nextdomain_core::logs::append_crash(&crash_log, &format!("Uncaught exception: {}", detail))
        {
            error!("Could not write crash log {}: {}", crash_log.display(), e);
        }
        if echo {
            default_hook(info);
        }
    }));
}

/// Builds runtime settings from the global flags.
pub fn settings_from_matches(matches: &ArgMatches) -> Result<Settings> {
    let data_dir = matches
        .get_one::<String>("data-dir")
        .map(|raw| nextdomain_core::config::expand_path(raw))
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    let mut settings = Settings::new(data_dir);
    if let Some(activity_log) = matches.get_one::<String>("activity-log") {
        settings = settings.with_activity_log(activity_log);
    }
    if let Some(seconds) = matches.get_one::<u64>("timeout") {
        settings = settings.with_timeout(Duration::from_secs(*seconds));
    }
    if let Some(secret) = matches.get_one::<String>("secret") {
        settings = settings.with_secret(secret.clone());
    }
    if matches.get_flag("no-typewriter") {
        settings = settings.without_typewriter();
    }
    Ok(settings)
}

/// Accepts a URL with or without scheme, assuming https.
pub fn parse_url_arg(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if is_valid_url(raw) {
        return Some(raw.to_string());
    }

    let with_scheme = format!("https://{}", raw);
    if !raw.contains("://") && is_valid_url(&with_scheme) {
        return Some(with_scheme);
    }

    None
}

fn url_from(args: &ArgMatches) -> Result<String> {
    let raw = args
        .get_one::<String>("URL")
        .ok_or_else(|| anyhow!("A URL is required"))?;
    parse_url_arg(raw)
        .ok_or_else(|| anyhow!("Please enter a valid domain (e.g., https://nxtinstant.in)"))
}

pub fn scan_json(result: &ScanResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

fn spinner(message: String, quiet: bool) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message);
    Ok(spinner)
}

/// Runs one job with a spinner, recording its crash notes like the UI does.
async fn run_job(state: &mut AppState, job: Job, quiet: bool) -> Result<TaskReport> {
    let probe = Probe::new(state.settings().probe.clone())?;
    let spinner = spinner(format!("Running {}...", job.task.name()), quiet)?;
    let report = job.run(&probe).await;
    spinner.finish_and_clear();

    for note in &report.crashes {
        state.record_crash(note.clone());
    }
    Ok(report)
}

fn print_report(report: &TaskReport) {
    for line in &report.lines {
        if line.starts_with("Error") {
            println!("{}", line.red());
        } else {
            println!("{}", line);
        }
    }
}

/// Prints the report and fails when the action produced nothing but errors.
fn finish(report: &TaskReport) -> Result<()> {
    print_report(report);
    if report.lines.iter().all(|line| line.starts_with("Error")) && !report.lines.is_empty() {
        return Err(anyhow!("{} failed", report.task));
    }
    Ok(())
}

pub async fn handle_scan(args: &ArgMatches, settings: &Settings, quiet: bool) -> Result<()> {
    let url = url_from(args)?;
    let mut state = AppState::load(settings.clone());
    let report = run_job(&mut state, Job::new(ActionTask::Scan { url }), quiet).await?;

    let Some(result) = report.scan.as_ref() else {
        return finish(&report);
    };

    state.log_domain(&result.url);
    info!("Scanned {}", result.url);
    if args.get_flag("json") {
        println!("{}", scan_json(result)?);
    } else {
        println!("{}", "Pages Found:".green().bold());
        for page in &result.pages {
            println!(" - {}", page);
        }
        println!("\n{}", "Hidden Pages:".green().bold());
        for hidden in &result.hidden {
            println!(" - {}", hidden);
        }
    }
    Ok(())
}

pub async fn handle_headers(args: &ArgMatches, settings: &Settings, quiet: bool) -> Result<()> {
    let url = url_from(args)?;
    let mut state = AppState::load(settings.clone());
    let report = run_job(&mut state, Job::new(ActionTask::Headers { url }), quiet).await?;
    finish(&report)
}

pub async fn handle_front(args: &ArgMatches, settings: &Settings, quiet: bool) -> Result<()> {
    let url = url_from(args)?;
    let mut state = AppState::load(settings.clone());
    let report = run_job(&mut state, Job::new(ActionTask::Frontend { url }), quiet).await?;
    finish(&report)
}

pub async fn handle_back(args: &ArgMatches, settings: &Settings, quiet: bool) -> Result<()> {
    let url = url_from(args)?;
    let truncate = !args.get_flag("full");
    let mut state = AppState::load(settings.clone());
    let report = run_job(
        &mut state,
        Job::new(ActionTask::Backend { url, truncate }),
        quiet,
    )
    .await?;
    finish(&report)
}

pub async fn handle_text(args: &ArgMatches, settings: &Settings, quiet: bool) -> Result<()> {
    let url = url_from(args)?;
    let mut state = AppState::load(settings.clone());
    let report = run_job(&mut state, Job::new(ActionTask::FetchText { url }), quiet).await?;
    finish(&report)
}

pub async fn handle_sweep(args: &ArgMatches, settings: &Settings, quiet: bool) -> Result<()> {
    let url = url_from(args)?;
    let mut state = AppState::load(settings.clone());
    let report = run_job(&mut state, Job::new(ActionTask::Sweep { url }), quiet).await?;
    print_report(&report);
    Ok(())
}

pub async fn handle_post(args: &ArgMatches, settings: &Settings, quiet: bool) -> Result<()> {
    let target = url_from(args)?;
    let message = args
        .get_one::<String>("MESSAGE")
        .ok_or_else(|| anyhow!("A message is required"))?
        .clone();
    let mut state = AppState::load(settings.clone());
    let report = run_job(&mut state, Job::new(ActionTask::Chat { target, message }), quiet).await?;
    finish(&report)
}

pub async fn handle_run(args: &ArgMatches, settings: &Settings, quiet: bool) -> Result<()> {
    let path = args
        .get_one::<PathBuf>("PATH")
        .ok_or_else(|| anyhow!("No file path provided."))?;
    let path = nextdomain_core::config::expand_path(&path.to_string_lossy());
    let mut state = AppState::load(settings.clone());
    let report = run_job(&mut state, Job::new(ActionTask::RunScript { path }), quiet).await?;
    finish(&report)
}

const CRASH_LOG_HEADER: &str = "=== Crash & Bug Log ===";

/// The crash log view: the most recent entries and the total count.
pub fn crash_log_lines(entries: &[CrashEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec!["No crashes detected. System running smoothly!".to_string()];
    }

    let start = entries.len().saturating_sub(RECENT_CRASHES);
    let mut lines = vec![CRASH_LOG_HEADER.to_string()];
    lines.extend(entries[start..].iter().map(CrashEntry::display));
    lines.push(format!("\nTotal crashes handled: {}", entries.len()));
    lines
}

pub fn handle_logs(args: &ArgMatches, settings: &Settings) -> Result<()> {
    let mut state = AppState::load(settings.clone());
    match args.subcommand() {
        Some(("crash", _)) => {
            let entries = read_crash_file(&settings.crash_log_path())?;
            for line in crash_log_lines(&entries) {
                if line == CRASH_LOG_HEADER {
                    println!("{}", line.green().bold());
                } else {
                    println!("{}", line);
                }
            }
        }
        Some(("activity", _)) => {
            let domains = state.activity_log().read()?;
            if domains.is_empty() {
                println!("No domains have been logged yet.");
            } else {
                println!("{}", "=== Activity Log ===".green().bold());
                for domain in &domains {
                    println!("{}", domain);
                }
            }
        }
        Some(("clear", _)) => {
            state.clear_logs().context("Unable to clear logs")?;
            println!("All logs cleared. Starting a fresh journey!");
        }
        _ => unreachable!("clap should ensure we don't get here"),
    }
    Ok(())
}

/// Runs the interactive UI on the current runtime until the user exits.
pub fn handle_ui(settings: Settings) -> Result<()> {
    let probe = Probe::new(settings.probe.clone())?;
    let session = Session::new(AppState::load(settings));
    info!("Starting terminal UI");
    tokio::task::block_in_place(|| nextdomain_tui::run(session, probe, Handle::current()))
}
