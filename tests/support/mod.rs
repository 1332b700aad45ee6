/*!
Test support helpers shared across integration tests.

- larabox(dir): a Command for the built binary, run in `dir` with docker hidden
- run(cmd): execute and collect (exit code, stdout, stderr)
- have_git(): check git availability on PATH

These helpers do not print skip messages themselves so tests can keep their own
"skipping: ..." outputs.
*/

use std::path::Path;
use std::process::Command;

/// The built binary, isolated from the host: docker hidden, no banner, no color, no
/// inherited env-file override.
#[allow(dead_code)]
pub fn larabox(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_larabox"));
    cmd.current_dir(dir)
        .env("LARABOX_SKIP_DOCKER", "1")
        .env("LARABOX_NO_BANNER", "1")
        .env("NO_COLOR", "1")
        .env_remove("LARABOX_ENV_FILE")
        .env_remove("LARABOX_LOG");
    cmd
}

/// Run to completion and return (exit code, stdout, stderr).
#[allow(dead_code)]
pub fn run(cmd: &mut Command) -> (i32, String, String) {
    let out = cmd.output().expect("failed to run larabox");
    (
        out.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&out.stdout).into_owned(),
        String::from_utf8_lossy(&out.stderr).into_owned(),
    )
}

/// Lines of stderr announcing a command, with the dry-run prefix removed.
#[allow(dead_code)]
pub fn would_run(stderr: &str) -> Vec<String> {
    stderr
        .lines()
        .filter_map(|l| l.strip_prefix("larabox: would run: "))
        .map(str::to_string)
        .collect()
}

/// Return true if `git` is available on PATH.
#[allow(dead_code)]
pub fn have_git() -> bool {
    Command::new("git")
        .arg("--version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
