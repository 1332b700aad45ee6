//! Color mode resolution and ANSI painting for stderr status lines.
//!
//! Precedence: `NO_COLOR` > `--color` > `LARABOX_COLOR` > TTY detection.
//! Compute `color_enabled_stderr()` once per function and pass the flag to the log_* helpers;
//! they only add escapes, never change the text.

use clap::ValueEnum;
use once_cell::sync::OnceCell;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

static COLOR_MODE: OnceCell<ColorMode> = OnceCell::new();

pub const CYAN_BOLD: &str = "\x1b[36;1m";
pub const YELLOW: &str = "\x1b[33m";
pub const YELLOW_BOLD: &str = "\x1b[33;1m";
pub const RED_BOLD: &str = "\x1b[31;1m";
pub const GREEN_BOLD: &str = "\x1b[32;1m";
pub const BLUE_BOLD: &str = "\x1b[34;1m";
pub const GREY: &str = "\x1b[90m";

/// Record the `--color` choice. Only the first call has any effect.
pub fn set_color_mode(mode: ColorMode) {
    let _ = COLOR_MODE.set(mode);
}

impl ColorMode {
    /// Lenient parse for `LARABOX_COLOR`; accepts the usual on/off spellings.
    fn from_env_value(raw: &str) -> Option<Self> {
        let v = raw.trim().to_ascii_lowercase();
        if v == "auto" {
            Some(Self::Auto)
        } else if ["always", "on", "true", "yes", "1"].contains(&v.as_str()) {
            Some(Self::Always)
        } else if ["never", "off", "false", "no", "0"].contains(&v.as_str()) {
            Some(Self::Never)
        } else {
            None
        }
    }

    fn wants_color(self, is_tty: bool) -> bool {
        self == Self::Always || (self == Self::Auto && is_tty)
    }
}

/// Whether status lines on stderr should carry ANSI escapes.
pub fn color_enabled_stderr() -> bool {
    // https://no-color.org/
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    let is_tty = atty::is(atty::Stream::Stderr);
    COLOR_MODE
        .get()
        .copied()
        .or_else(|| {
            std::env::var("LARABOX_COLOR")
                .ok()
                .and_then(|v| ColorMode::from_env_value(&v))
        })
        .map_or(is_tty, |mode| mode.wants_color(is_tty))
}

/// `text` wrapped in `code` and a reset, or unchanged when `enabled` is false.
pub fn paint(enabled: bool, code: &str, text: &str) -> String {
    if !enabled {
        return text.to_string();
    }
    format!("{code}{text}\x1b[0m")
}

pub fn log_info_stderr(use_color: bool, msg: &str) {
    eprintln!("{}", paint(use_color, CYAN_BOLD, msg));
}

pub fn log_success_stderr(use_color: bool, msg: &str) {
    eprintln!("{}", paint(use_color, GREEN_BOLD, msg));
}

pub fn log_warn_stderr(use_color: bool, msg: &str) {
    eprintln!("{}", paint(use_color, YELLOW, msg));
}

pub fn log_error_stderr(use_color: bool, msg: &str) {
    eprintln!("{}", paint(use_color, RED_BOLD, msg));
}
