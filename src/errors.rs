//! Error mapping guide:
//! - Map io::ErrorKind::NotFound to exit code 127; everything else to 1.
//! - Precondition failures carry an optional remediation hint printed on its own line.
//! - Keep user-visible strings stable; tests match on them.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LaraboxError>;

#[derive(Debug, Error)]
pub enum LaraboxError {
    #[error("{0}")]
    Usage(String),

    #[error("{}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("{message}")]
    Precondition {
        message: String,
        hint: Option<String>,
    },

    #[error("command failed ({}): {command}", describe_code(*code))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("timed out waiting for {what} after {attempts} attempts")]
    ReadinessTimeout { what: String, attempts: u32 },

    #[error("cannot merge routes: {0}")]
    RouteMerge(String),

    #[error("aborted by user")]
    Aborted,

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Exec(#[from] anyhow::Error),
}

impl LaraboxError {
    pub fn precondition(message: impl Into<String>, hint: impl Into<String>) -> Self {
        LaraboxError::Precondition {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(c) => format!("exit {c}"),
        None => "terminated by signal".to_string(),
    }
}

/// Map an io::Error to a process exit code:
/// - 127 for NotFound (command not found)
/// - 1 for all other errors
pub fn exit_code_for_io_error(e: &io::Error) -> u8 {
    if e.kind() == io::ErrorKind::NotFound {
        127
    } else {
        1
    }
}

pub fn exit_code_for_error(e: &LaraboxError) -> u8 {
    match e {
        LaraboxError::Io(ioe) => exit_code_for_io_error(ioe),
        LaraboxError::Exec(err) => err
            .downcast_ref::<io::Error>()
            .map(exit_code_for_io_error)
            .unwrap_or(1),
        _ => 1,
    }
}

/// Render the user-facing lines for an error: the message, then the hint when present.
pub fn display_for_error(e: &LaraboxError) -> Vec<String> {
    let mut lines = vec![format!("larabox: {e}")];
    if let LaraboxError::Precondition {
        hint: Some(hint), ..
    } = e
    {
        lines.push(format!("  hint: {hint}"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_127() {
        let e = LaraboxError::Io(io::Error::new(io::ErrorKind::NotFound, "docker"));
        assert_eq!(exit_code_for_error(&e), 127);
    }

    #[test]
    fn other_errors_map_to_1() {
        assert_eq!(exit_code_for_error(&LaraboxError::Aborted), 1);
        let e = LaraboxError::CommandFailed {
            command: "php artisan migrate".into(),
            code: Some(2),
        };
        assert_eq!(exit_code_for_error(&e), 1);
        assert_eq!(e.to_string(), "command failed (exit 2): php artisan migrate");
    }

    #[test]
    fn precondition_renders_hint_line() {
        let e = LaraboxError::precondition("container 'app' is not running", "run larabox --init");
        let lines = display_for_error(&e);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "  hint: run larabox --init");
    }
}
