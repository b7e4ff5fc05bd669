use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ActionError {
    #[error("request timed out")]
    Timeout,

    #[error("host unreachable: {0}")]
    Unreachable(String),

    #[error("external tool not found: {0}")]
    ToolMissing(String),

    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("process exited with status {status}")]
    ProcessFailed { status: i32, output: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fieldless view of [`ActionError`] so callers can branch without string inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Timeout,
    Unreachable,
    ToolMissing,
    FileNotFound,
    ProcessFailed,
    InvalidUrl,
    Other,
}

impl ActionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ActionError::Timeout => ErrorKind::Timeout,
            ActionError::Unreachable(_) => ErrorKind::Unreachable,
            ActionError::ToolMissing(_) => ErrorKind::ToolMissing,
            ActionError::FileNotFound(_) => ErrorKind::FileNotFound,
            ActionError::ProcessFailed { .. } => ErrorKind::ProcessFailed,
            ActionError::InvalidUrl(_) => ErrorKind::InvalidUrl,
            ActionError::Http(_) | ActionError::Io(_) => ErrorKind::Other,
        }
    }
}

impl From<reqwest::Error> for ActionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ActionError::Timeout
        } else if err.is_connect() {
            let target = err
                .url()
                .and_then(|u| u.host_str())
                .unwrap_or("unknown")
                .to_string();
            ActionError::Unreachable(target)
        } else if err.is_builder() {
            ActionError::InvalidUrl(err.to_string())
        } else {
            ActionError::Http(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, ActionError>;
