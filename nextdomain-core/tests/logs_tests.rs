// Tests for crash and activity logs

use nextdomain_core::logs::{ActivityLog, CrashEntry, CrashLog, append_crash, read_crash_file};
use std::fs;
use tempfile::TempDir;

// ============================================================================
// Crash Log Tests
// ============================================================================

#[test]
fn test_crash_log_records_to_memory_and_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("crash_log.txt");
    let mut log = CrashLog::new(&path);

    log.record("Timeout scanning https://example.com");
    log.record("curl not found");

    assert_eq!(log.len(), 2);
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("\n["));
    assert!(content.contains("] Timeout scanning https://example.com\n"));
    assert!(content.contains("] curl not found\n"));
}

#[test]
fn test_crash_entry_timestamp_format() {
    let temp_dir = TempDir::new().unwrap();
    let mut log = CrashLog::new(temp_dir.path().join("crash_log.txt"));
    log.record("boom");

    let entry = &log.recent(1)[0];
    // YYYY-MM-DD HH:MM:SS
    assert_eq!(entry.time.len(), 19);
    assert_eq!(&entry.time[4..5], "-");
    assert_eq!(&entry.time[10..11], " ");
    assert_eq!(entry.display(), format!("[{}] boom", entry.time));
}

#[test]
fn test_crash_log_remember_skips_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("crash_log.txt");
    let mut log = CrashLog::new(&path);

    log.remember("Uncaught exception: worker panicked");

    assert_eq!(log.len(), 1);
    assert!(!path.exists());
}

#[test]
fn test_crash_log_recent_returns_tail() {
    let temp_dir = TempDir::new().unwrap();
    let mut log = CrashLog::new(temp_dir.path().join("crash_log.txt"));
    for i in 0..15 {
        log.remember(format!("crash {}", i));
    }

    let recent = log.recent(10);
    assert_eq!(recent.len(), 10);
    assert_eq!(recent[0].message, "crash 5");
    assert_eq!(recent[9].message, "crash 14");
    assert_eq!(log.recent(100).len(), 15);
}

#[test]
fn test_crash_log_clear_removes_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("crash_log.txt");
    let mut log = CrashLog::new(&path);
    log.record("first");

    log.clear().unwrap();

    assert!(log.is_empty());
    assert!(!path.exists());
    // clearing twice is fine
    log.clear().unwrap();
}

#[test]
fn test_append_crash_without_log() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("crash_log.txt");

    append_crash(&path, "Uncaught exception: oops").unwrap();
    append_crash(&path, "second").unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.matches("\n[").count(), 2);
    assert!(content.contains("] Uncaught exception: oops\n"));
}

#[test]
fn test_read_crash_file_lists_entries() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("crash_log.txt");
    assert!(read_crash_file(&path).unwrap().is_empty());

    let mut log = CrashLog::new(&path);
    log.record("first");
    log.record("second");

    let entries = read_crash_file(&path).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].message, "first");
    assert_eq!(entries[1].message, "second");
}

#[test]
fn test_read_crash_file_joins_multiline_messages() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("crash_log.txt");

    append_crash(&path, "Uncaught exception: line one\nline two\nline three").unwrap();
    append_crash(&path, "curl not found").unwrap();

    let entries = read_crash_file(&path).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(
        entries[0].message,
        "Uncaught exception: line one\nline two\nline three"
    );
    assert_eq!(entries[1].message, "curl not found");
}

#[test]
fn test_crash_entry_parse_requires_timestamp() {
    let entry = CrashEntry::parse("[2024-01-01 12:30:00] boom").unwrap();
    assert_eq!(entry.time, "2024-01-01 12:30:00");
    assert_eq!(entry.message, "boom");

    assert!(CrashEntry::parse("[not a time] boom").is_none());
    assert!(CrashEntry::parse("plain line").is_none());
}

// ============================================================================
// Activity Log Tests
// ============================================================================

#[test]
fn test_activity_log_missing_file_reads_empty() {
    let temp_dir = TempDir::new().unwrap();
    let log = ActivityLog::new(temp_dir.path().join("activity.log"));

    assert!(log.read().unwrap().is_empty());
}

#[test]
fn test_activity_log_appends_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("activity.log");
    let log = ActivityLog::new(&path);

    log.append("https://a.example").unwrap();
    log.append("https://b.example").unwrap();

    assert_eq!(
        log.read().unwrap(),
        vec!["https://a.example", "https://b.example"]
    );
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "https://a.example\nhttps://b.example\n"
    );
}

#[test]
fn test_activity_log_clear() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("activity.log");
    let log = ActivityLog::new(&path);
    log.append("https://a.example").unwrap();

    log.clear().unwrap();

    assert!(!path.exists());
    assert!(log.read().unwrap().is_empty());
}
