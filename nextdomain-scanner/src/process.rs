use crate::error::{ActionError, Result};
use std::io;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Runs `program` with `args`, killing it once `limit` elapses.
///
/// A program that cannot be found on `PATH` is reported as
/// [`ActionError::ToolMissing`]; a non-zero exit as [`ActionError::ProcessFailed`].
pub async fn run_tool<S: AsRef<std::ffi::OsStr>>(
    program: &str,
    args: &[S],
    limit: Duration,
) -> Result<Output> {
    let resolved = which::which(program).map_err(|_| ActionError::ToolMissing(program.to_string()))?;
    debug!("Running {} ({})", program, resolved.display());

    let mut command = Command::new(resolved);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(limit, command.output()).await {
        Err(_) => {
            warn!("{} exceeded {:?}", program, limit);
            return Err(ActionError::Timeout);
        }
        Ok(Err(e)) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ActionError::ToolMissing(program.to_string()));
        }
        Ok(result) => result?,
    };

    if !output.status.success() {
        return Err(ActionError::ProcessFailed {
            status: output.status.code().unwrap_or(-1),
            output: combined(&output),
        });
    }

    Ok(output)
}

/// Runs a script file with the first interpreter that exists.
pub async fn run_script(path: &Path, interpreters: &[String], limit: Duration) -> Result<String> {
    if !path.exists() {
        return Err(ActionError::FileNotFound(path.to_path_buf()));
    }

    for interpreter in interpreters {
        match run_tool(interpreter, &[path.as_os_str()], limit).await {
            Err(ActionError::ToolMissing(_)) => {
                debug!("Interpreter {} not available", interpreter);
                continue;
            }
            other => return other.map(|output| combined(&output)),
        }
    }

    Err(ActionError::ToolMissing(interpreters.join("/")))
}

/// Stdout followed by stderr, decoded lossily.
pub fn combined(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_missing_tool_reported() {
        let err = run_tool("definitely-not-a-real-tool-4f1c", &["-h"], Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::ToolMissing(ref t) if t == "definitely-not-a-real-tool-4f1c"));
    }

    #[tokio::test]
    async fn test_missing_script_is_not_spawned() {
        let interpreters = vec!["definitely-not-a-real-tool-4f1c".to_string()];
        let err = run_script(Path::new("/no/such/script.py"), &interpreters, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_no_interpreter_available() {
        let mut script = NamedTempFile::new().unwrap();
        writeln!(script, "print('hi')").unwrap();
        let interpreters = vec!["no-such-python-a".to_string(), "no-such-python-b".to_string()];

        let err = run_script(script.path(), &interpreters, Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, ActionError::ToolMissing(ref t) if t == "no-such-python-a/no-such-python-b"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_script_output_and_failure() {
        let mut ok = NamedTempFile::new().unwrap();
        writeln!(ok, "echo out; echo err >&2").unwrap();
        let shells = vec!["sh".to_string()];

        let text = run_script(ok.path(), &shells, Duration::from_secs(5)).await.unwrap();
        assert_eq!(text, "out\nerr\n");

        let mut failing = NamedTempFile::new().unwrap();
        writeln!(failing, "echo broken; exit 3").unwrap();
        let err = run_script(failing.path(), &shells, Duration::from_secs(5))
            .await
            .unwrap_err();
        match err {
            ActionError::ProcessFailed { status, output } => {
                assert_eq!(status, 3);
                assert_eq!(output, "broken\n");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_script_timeout_kills_child() {
        let mut slow = NamedTempFile::new().unwrap();
        writeln!(slow, "sleep 5").unwrap();
        let shells = vec!["sh".to_string()];

        let err = run_script(slow.path(), &shells, Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Timeout));
    }
}
