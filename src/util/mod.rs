//! Small utilities: shell quoting for previews, input sanity checks, subprocess execution.

pub mod exec;
pub mod fs;

pub use exec::{DryRunService, ExecOutput, ExecService, Invocation, RecordingRunner, Runner};

/// Refuse values with line breaks or NUL; they would corrupt line-oriented files.
pub fn reject_newlines(value: &str, what: &str) -> Result<(), String> {
    match value.find(['\n', '\r', '\0']) {
        Some(_) => Err(format!("refusing to use {what}: contains newline")),
        None => Ok(()),
    }
}

/// Join an argument vector for display, quoting only where a shell would need it.
pub fn shell_join(args: &[String]) -> String {
    args.iter()
        .map(|a| shell_escape(a))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '=' | '.' | '/' | ':' | '@' | ',' | '+')
}

/// POSIX single-quote `arg` unless every character is shell-safe.
pub fn shell_escape(arg: &str) -> String {
    if !arg.is_empty() && arg.chars().all(is_shell_safe) {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// Drop one matching pair of surrounding `'` or `"` quotes.
pub fn strip_outer_quotes(s: &str) -> String {
    for q in ['\'', '"'] {
        if let Some(inner) = s.strip_prefix(q).and_then(|r| r.strip_suffix(q)) {
            return inner.to_string();
        }
    }
    s.to_string()
}
