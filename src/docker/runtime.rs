//! Locating the docker client.

use std::env;
use std::io;
use std::path::PathBuf;

/// Set to `1` to behave as if docker were not installed.
pub const SKIP_DOCKER_ENV: &str = "LARABOX_SKIP_DOCKER";

fn docker_hidden() -> bool {
    env::var(SKIP_DOCKER_ENV).map(|v| v.trim() == "1").unwrap_or(false)
}

/// Absolute path of the `docker` client on PATH.
pub fn container_runtime_path() -> io::Result<PathBuf> {
    if docker_hidden() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("docker hidden by {SKIP_DOCKER_ENV}=1"),
        ));
    }
    which::which("docker").map_err(|e| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("docker not found in PATH ({e})"),
        )
    })
}

/// Program name to use for docker invocations.
///
/// Dry runs never execute anything, so a missing client falls back to plain `docker`.
pub fn docker_program(dry_run: bool) -> io::Result<String> {
    match container_runtime_path() {
        Ok(p) => Ok(p.to_string_lossy().into_owned()),
        Err(_) if dry_run => Ok("docker".to_string()),
        Err(e) => Err(e),
    }
}
