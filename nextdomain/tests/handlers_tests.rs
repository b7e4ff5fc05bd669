use nextdomain::handlers::{crash_log_lines, handle_logs};
use nextdomain_core::logs::{CrashEntry, append_crash, read_crash_file};
use nextdomain::*;
use nextdomain_scanner::ScanResult;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn matches_for(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["nextdomain"];
    argv.extend_from_slice(args);
    command_argument_builder()
        .try_get_matches_from(argv)
        .unwrap()
}

#[test]
fn test_parse_url_arg_with_scheme() {
    assert_eq!(
        parse_url_arg("https://example.com"),
        Some("https://example.com".to_string())
    );
    assert_eq!(
        parse_url_arg("http://127.0.0.1:8080/a"),
        Some("http://127.0.0.1:8080/a".to_string())
    );
}

#[test]
fn test_parse_url_arg_without_scheme() {
    assert_eq!(
        parse_url_arg(" example.com "),
        Some("https://example.com".to_string())
    );
}

#[test]
fn test_parse_url_arg_invalid() {
    assert_eq!(parse_url_arg(""), None);
    assert_eq!(parse_url_arg("https://"), None);
    assert_eq!(parse_url_arg("not a valid url!!!"), None);
}

#[test]
fn test_settings_from_flags() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("state");
    let activity = temp_dir.path().join("domains.log");

    let matches = matches_for(&[
        "--data-dir",
        data_dir.to_str().unwrap(),
        "--activity-log",
        activity.to_str().unwrap(),
        "--timeout",
        "3",
        "--secret",
        "hunter2",
        "--no-typewriter",
        "ui",
    ]);
    let settings = settings_from_matches(&matches).unwrap();

    assert!(data_dir.is_dir());
    assert_eq!(settings.crash_log_path(), data_dir.join("crash_log.txt"));
    assert_eq!(settings.activity_log, activity);
    assert_eq!(settings.probe.timeout, Duration::from_secs(3));
    assert_eq!(settings.sweep_secret, "hunter2");
    assert_eq!(settings.typing_delay, Duration::ZERO);
}

#[test]
fn test_settings_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let matches = matches_for(&["--data-dir", temp_dir.path().to_str().unwrap()]);
    let settings = settings_from_matches(&matches).unwrap();

    assert_eq!(settings.sweep_secret, "1211");
    assert_eq!(settings.probe.timeout, Duration::from_secs(5));
    assert_eq!(settings.typing_delay, Duration::from_millis(10));
}

#[test]
fn test_scan_json_shape() -> Result<(), Box<dyn std::error::Error>> {
    let mut result = ScanResult::new("https://example.com".to_string());
    result.pages.insert("https://example.com/about".to_string());
    result.hidden.insert("https://example.com/admin".to_string());

    let json: serde_json::Value = serde_json::from_str(&scan_json(&result)?)?;

    assert_eq!(json["url"], "https://example.com");
    assert_eq!(json["pages"][0], "https://example.com/about");
    assert_eq!(json["hidden"][0], "https://example.com/admin");
    Ok(())
}

#[test]
fn test_logs_clear_removes_files() {
    let temp_dir = TempDir::new().unwrap();
    let activity = temp_dir.path().join("activity.log");
    fs::write(&activity, "https://example.com\n").unwrap();
    fs::write(temp_dir.path().join("crash_log.txt"), "\n[2024-01-01 00:00:00] boom\n").unwrap();

    let matches = matches_for(&[
        "--data-dir",
        temp_dir.path().to_str().unwrap(),
        "--activity-log",
        activity.to_str().unwrap(),
        "logs",
        "clear",
    ]);
    let settings = settings_from_matches(&matches).unwrap();
    let (_, logs) = matches.subcommand().unwrap();

    handle_logs(logs, &settings).unwrap();

    assert!(!activity.exists());
    assert!(!temp_dir.path().join("crash_log.txt").exists());
}

#[test]
fn test_logs_views_handle_missing_files() {
    let temp_dir = TempDir::new().unwrap();
    let activity = temp_dir.path().join("activity.log");

    for view in ["crash", "activity"] {
        let matches = matches_for(&[
            "--data-dir",
            temp_dir.path().to_str().unwrap(),
            "--activity-log",
            activity.to_str().unwrap(),
            "logs",
            view,
        ]);
        let settings = settings_from_matches(&matches).unwrap();
        let (_, logs) = matches.subcommand().unwrap();

        assert!(handle_logs(logs, &settings).is_ok());
    }
}

#[test]
fn test_crash_view_counts_entries_not_lines() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("crash_log.txt");
    for i in 0..12 {
        append_crash(&path, &format!("panic {}\n  at src/main.rs:{}", i, i)).unwrap();
    }

    let lines = crash_log_lines(&read_crash_file(&path).unwrap());

    assert_eq!(lines[0], "=== Crash & Bug Log ===");
    assert_eq!(lines.len(), 12);
    assert!(lines[1].ends_with("] panic 2\n  at src/main.rs:2"));
    assert!(lines[10].ends_with("] panic 11\n  at src/main.rs:11"));
    assert_eq!(lines[11], "\nTotal crashes handled: 12");
}

#[test]
fn test_crash_view_empty() {
    let entries: Vec<CrashEntry> = Vec::new();
    assert_eq!(
        crash_log_lines(&entries),
        vec!["No crashes detected. System running smoothly!"]
    );
}
