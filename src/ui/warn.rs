use std::io::{BufRead, Write};

use crate::color::{paint, GREY, YELLOW_BOLD};

/// Print a standardized warning line to stderr (color-aware).
pub fn warn_print(msg: &str) {
    let use_err = crate::color_enabled_stderr();
    eprintln!("{}", paint(use_err, YELLOW_BOLD, &format!("warning: {}", msg)));
    tracing::debug!(warning = msg, "warned");
}

fn stdin_is_interactive() -> bool {
    atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stderr)
}

/// Interpret a y/N answer; anything but an explicit yes declines.
pub fn parse_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Ask a yes/no question on stderr and read the answer from `input`.
pub fn confirm_with(question: &str, input: &mut dyn BufRead) -> bool {
    let use_err = crate::color_enabled_stderr();
    eprint!("{} ", paint(use_err, YELLOW_BOLD, &format!("{question} [y/N]")));
    let _ = std::io::stderr().flush();
    let mut line = String::new();
    if input.read_line(&mut line).is_err() {
        return false;
    }
    parse_yes(&line)
}

/// Confirmation gate for destructive steps.
///
/// `assume_yes` (from `--yes`) skips the prompt. Without a terminal there is nobody to ask,
/// so the answer is no.
pub fn confirm(question: &str, assume_yes: bool) -> bool {
    if assume_yes {
        return true;
    }
    if !stdin_is_interactive() {
        warn_print("stdin is not a terminal; re-run with --yes to confirm");
        return false;
    }
    let stdin = std::io::stdin();
    let mut lock = stdin.lock();
    confirm_with(question, &mut lock)
}

/// Prompt for a value showing `current` as the default; empty input keeps it.
pub fn prompt_value_with(label: &str, current: &str, input: &mut dyn BufRead) -> Option<String> {
    let use_err = crate::color_enabled_stderr();
    eprint!(
        "{} {} ",
        label,
        paint(use_err, GREY, &format!("[{current}]:"))
    );
    let _ = std::io::stderr().flush();
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => {
            let t = line.trim();
            if t.is_empty() {
                Some(current.to_string())
            } else {
                Some(crate::util::strip_outer_quotes(t))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn yes_answers() {
        assert!(parse_yes("y\n"));
        assert!(parse_yes(" YES "));
        assert!(!parse_yes(""));
        assert!(!parse_yes("n"));
        assert!(!parse_yes("yep"));
    }

    #[test]
    fn confirm_reads_answer() {
        assert!(confirm_with("go?", &mut Cursor::new("y\n")));
        assert!(!confirm_with("go?", &mut Cursor::new("\n")));
        assert!(!confirm_with("go?", &mut Cursor::new("")));
    }

    #[test]
    fn assume_yes_skips_prompt() {
        assert!(confirm("go?", true));
    }

    #[test]
    fn prompt_value_keeps_default_on_empty() {
        assert_eq!(
            prompt_value_with("PROJECT_NAME", "default", &mut Cursor::new("\n")),
            Some("default".to_string())
        );
        assert_eq!(
            prompt_value_with("PROJECT_NAME", "default", &mut Cursor::new("'shop'\n")),
            Some("shop".to_string())
        );
        assert_eq!(
            prompt_value_with("PROJECT_NAME", "default", &mut Cursor::new("")),
            None
        );
    }
}
