//! `KEY=VALUE` environment file: loading through dotenvy and in-place value updates.
//!
//! Loading never touches the process environment; values are returned to the caller and
//! folded into [`crate::config::Config`].

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::errors::{LaraboxError, Result};
use crate::util::fs::{ensure_file_exists, FileLock};

pub const DEFAULT_ENV_FILE: &str = ".env";

/// Resolve the environment file path: explicit flag, then `LARABOX_ENV_FILE`, then `./.env`.
pub fn resolve_env_path(cli: Option<&Path>) -> PathBuf {
    if let Some(p) = cli {
        return p.to_path_buf();
    }
    env::var("LARABOX_ENV_FILE")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ENV_FILE))
}

/// Parsed environment file, entries in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    path: PathBuf,
    entries: Vec<(String, String)>,
}

impl EnvFile {
    /// Load `path`; `Ok(None)` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Self::parse(path, &contents).map(Some)
    }

    /// Parse file contents; blank lines and `#` comments are skipped.
    pub fn parse(path: &Path, contents: &str) -> Result<Self> {
        let mut entries: Vec<(String, String)> = Vec::new();
        for item in dotenvy::from_read_iter(contents.as_bytes()) {
            let (key, value) = item.map_err(|e| LaraboxError::Config {
                path: path.to_path_buf(),
                message: describe_dotenv_error(&e),
            })?;
            // Later assignments win, like a shell sourcing the file.
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => entries.push((key, value)),
            }
        }
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value for `key` unless missing or blank.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }
}

fn describe_dotenv_error(e: &dotenvy::Error) -> String {
    match e {
        dotenvy::Error::LineParse(line, idx) => {
            format!("malformed line (offset {idx}): {line}")
        }
        other => other.to_string(),
    }
}

/// Set `key` to `value` in the file at `path`, creating the file when needed.
///
/// The write holds an exclusive lock and replaces the file atomically.
pub fn set_value(path: &Path, key: &str, value: &str) -> Result<()> {
    validate_key(key).map_err(|message| LaraboxError::Config {
        path: path.to_path_buf(),
        message,
    })?;
    crate::util::reject_newlines(value, "value").map_err(|message| LaraboxError::Config {
        path: path.to_path_buf(),
        message,
    })?;

    ensure_file_exists(path)?;
    let _lock = FileLock::acquire(path)?;
    let current = fs::read_to_string(path)?;
    let updated = replace_or_append(&current, key, value);

    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
    tmp.write_all(updated.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| LaraboxError::Io(e.error))?;
    tracing::debug!(file = %path.display(), key, "updated environment file");
    Ok(())
}

fn validate_key(key: &str) -> std::result::Result<(), String> {
    let mut chars = key.chars();
    let ok_first = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    if ok_first && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(format!("invalid key name: {key:?}"))
    }
}

/// Replace every assignment of `key` in `text`, or append one when absent.
/// Comments, blank lines and unrelated keys are kept byte for byte.
pub fn replace_or_append(text: &str, key: &str, value: &str) -> String {
    let rendered = format!("{key}={}", quote_value(value));
    let mut found = false;
    let mut out = String::with_capacity(text.len() + rendered.len() + 1);
    for line in text.split_inclusive('\n') {
        if assigns_key(line, key) {
            found = true;
            out.push_str(&rendered);
            if line.ends_with('\n') {
                out.push('\n');
            }
        } else {
            out.push_str(line);
        }
    }
    if !found {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&rendered);
        out.push('\n');
    }
    out
}

fn assigns_key(line: &str, key: &str) -> bool {
    let t = line.trim_start();
    let t = t.strip_prefix("export ").map(str::trim_start).unwrap_or(t);
    t.strip_prefix(key)
        .map(|rest| rest.trim_start().starts_with('='))
        .unwrap_or(false)
}

fn quote_value(value: &str) -> String {
    let needs_quotes = value
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '#' | '"' | '\'' | '$' | '\\'));
    if !needs_quotes {
        return value.to_string();
    }
    // Single quotes keep `$` literal; dotenvy expands it inside double quotes.
    if !value.contains('\'') {
        format!("'{value}'")
    } else {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> EnvFile {
        EnvFile::parse(Path::new(".env"), s).expect("parse")
    }

    #[test]
    fn parses_pairs_and_skips_comments_and_blanks() {
        let f = parse("# project\n\nPROJECT_NAME=shop\nCONTAINER_NAME=shop_app\n");
        assert_eq!(f.get("PROJECT_NAME"), Some("shop"));
        assert_eq!(f.get("CONTAINER_NAME"), Some("shop_app"));
        assert_eq!(f.entries().len(), 2);
    }

    #[test]
    fn quoted_and_exported_values() {
        let f = parse("export APP_NAME=\"My App\"\nSERVER_PORT='8080'\n");
        assert_eq!(f.get("APP_NAME"), Some("My App"));
        assert_eq!(f.get("SERVER_PORT"), Some("8080"));
    }

    #[test]
    fn later_assignment_wins() {
        let f = parse("PROJECT_NAME=a\nPROJECT_NAME=b\n");
        assert_eq!(f.get("PROJECT_NAME"), Some("b"));
        assert_eq!(f.entries().len(), 1);
    }

    #[test]
    fn blank_value_is_not_non_empty() {
        let f = parse("PROJECT_NAME=\n");
        assert_eq!(f.get("PROJECT_NAME"), Some(""));
        assert_eq!(f.get_non_empty("PROJECT_NAME"), None);
    }

    #[test]
    fn malformed_line_is_config_error() {
        let err = EnvFile::parse(Path::new("x.env"), "NOT A PAIR\n").unwrap_err();
        match err {
            LaraboxError::Config { path, .. } => assert_eq!(path, PathBuf::from("x.env")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_file_loads_as_none() {
        let td = tempfile::tempdir().expect("tmpdir");
        assert!(EnvFile::load(&td.path().join(".env")).unwrap().is_none());
    }

    #[test]
    fn replace_keeps_comments_and_order() {
        let src = "# top\nPROJECT_NAME=old\nDB_HOST=mysql\n";
        let out = replace_or_append(src, "PROJECT_NAME", "new");
        assert_eq!(out, "# top\nPROJECT_NAME=new\nDB_HOST=mysql\n");
    }

    #[test]
    fn replace_does_not_touch_prefixed_keys() {
        let src = "PROJECT_NAME_OLD=x\n";
        let out = replace_or_append(src, "PROJECT_NAME", "y");
        assert_eq!(out, "PROJECT_NAME_OLD=x\nPROJECT_NAME=y\n");
    }

    #[test]
    fn append_adds_missing_trailing_newline() {
        assert_eq!(replace_or_append("A=1", "B", "2"), "A=1\nB=2\n");
        assert_eq!(replace_or_append("", "B", "2"), "B=2\n");
    }

    #[test]
    fn values_with_spaces_are_quoted() {
        assert_eq!(replace_or_append("", "APP_NAME", "My App"), "APP_NAME='My App'\n");
        assert_eq!(
            replace_or_append("", "APP_NAME", "Bob's App"),
            "APP_NAME=\"Bob's App\"\n"
        );
    }

    #[test]
    fn set_value_round_trips_through_load() {
        let td = tempfile::tempdir().expect("tmpdir");
        let p = td.path().join(".env");
        fs::write(&p, "# keep me\nPROJECT_NAME=one\n").unwrap();
        set_value(&p, "PROJECT_NAME", "two").unwrap();
        set_value(&p, "SERVER_PORT", "8080").unwrap();
        let raw = fs::read_to_string(&p).unwrap();
        assert!(raw.starts_with("# keep me\n"));
        let f = EnvFile::load(&p).unwrap().unwrap();
        assert_eq!(f.get("PROJECT_NAME"), Some("two"));
        assert_eq!(f.get("SERVER_PORT"), Some("8080"));
        assert!(!td.path().join(".env.lock").exists());
    }

    #[test]
    fn set_value_rejects_bad_keys_and_newlines() {
        let td = tempfile::tempdir().expect("tmpdir");
        let p = td.path().join(".env");
        assert!(set_value(&p, "1BAD", "x").is_err());
        assert!(set_value(&p, "GOOD", "a\nb").is_err());
    }
}
