// Crash and activity logs, kept in memory and mirrored to flat files

use chrono::{Local, NaiveDateTime};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How many entries the crash log views show.
pub const RECENT_CRASHES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrashEntry {
    pub time: String,
    pub message: String,
}

impl CrashEntry {
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            time: Local::now().format(TIME_FORMAT).to_string(),
            message: message.into(),
        }
    }

    /// Parses one `[YYYY-MM-DD HH:MM:SS] message` line as written by [`CrashLog::record`].
    pub fn parse(line: &str) -> Option<Self> {
        let (time, message) = line.strip_prefix('[')?.split_once("] ")?;
        NaiveDateTime::parse_from_str(time, TIME_FORMAT).ok()?;
        Some(Self {
            time: time.to_string(),
            message: message.to_string(),
        })
    }

    pub fn display(&self) -> String {
        format!("[{}] {}", self.time, self.message)
    }
}

/// Append-only record of recovered failures.
#[derive(Debug)]
pub struct CrashLog {
    path: PathBuf,
    entries: Vec<CrashEntry>,
}

impl CrashLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
        }
    }

    /// Records `message` in memory and appends it to the crash file.
    pub fn record(&mut self, message: impl Into<String>) {
        let entry = CrashEntry::now(message);
        if let Err(e) = append_entry(&self.path, &entry) {
            warn!("Could not write crash log {}: {}", self.path.display(), e);
        }
        self.entries.push(entry);
    }

    /// Records `message` in memory only, for entries already written to disk elsewhere.
    pub fn remember(&mut self, message: impl Into<String>) {
        self.entries.push(CrashEntry::now(message));
    }

    pub fn recent(&self, count: usize) -> &[CrashEntry] {
        let start = self.entries.len().saturating_sub(count);
        &self.entries[start..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry and deletes the crash file.
    pub fn clear(&mut self) -> io::Result<()> {
        self.entries.clear();
        remove_if_exists(&self.path)
    }
}

/// Writes one crash entry straight to `path`. Used where no [`CrashLog`] is reachable.
pub fn append_crash(path: &Path, message: &str) -> io::Result<()> {
    append_entry(path, &CrashEntry::now(message))
}

/// Entries persisted by earlier runs, oldest first. A missing file reads as empty.
///
/// Lines without a timestamp continue the previous entry's message.
pub fn read_crash_file(path: &Path) -> io::Result<Vec<CrashEntry>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut entries: Vec<CrashEntry> = Vec::new();
    for line in content.lines() {
        if let Some(entry) = CrashEntry::parse(line) {
            entries.push(entry);
        } else if !line.trim().is_empty() {
            match entries.last_mut() {
                Some(entry) => {
                    entry.message.push('\n');
                    entry.message.push_str(line);
                }
                None => debug!("Skipping stray crash log line: {}", line),
            }
        }
    }
    Ok(entries)
}

fn append_entry(path: &Path, entry: &CrashEntry) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    write!(file, "\n{}\n", entry.display())
}

/// Newline-delimited list of every URL the user scanned.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    path: PathBuf,
}

impl ActivityLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn append(&self, url: &str) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", url)
    }

    /// Logged URLs, oldest first. A missing file reads as empty.
    pub fn read(&self) -> io::Result<Vec<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    pub fn clear(&self) -> io::Result<()> {
        remove_if_exists(&self.path)
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
