//! Clone-and-sync: point a working directory at a hosted repository and hard-reset it to
//! the remote default branch.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use url::Url;

use crate::errors::{LaraboxError, Result};
use crate::util::{ExecOutput, Invocation, Runner};

/// Branch names tried, in order, when fetching.
pub const DEFAULT_BRANCHES: [&str; 2] = ["main", "master"];

/// `user/repo` reference to a hosted repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    owner: String,
    repo: String,
}

impl RepoSlug {
    /// `https://<host>/<owner>/<repo>.git`
    pub fn clone_url(&self, host: &str) -> Result<Url> {
        let base = Url::parse(&format!("https://{host}/"))
            .map_err(|e| LaraboxError::Usage(format!("invalid git host {host:?}: {e}")))?;
        base.join(&format!("{}/{}.git", self.owner, self.repo))
            .map_err(|e| LaraboxError::Usage(format!("invalid repository {self}: {e}")))
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoSlug {
    type Err = LaraboxError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let s = s.strip_suffix(".git").unwrap_or(s);
        let parts: Vec<&str> = s.split('/').collect();
        let valid_segment = |p: &str| {
            !p.is_empty()
                && p != "."
                && p != ".."
                && !p.starts_with('-')
                && p.chars()
                    .all(|c| c.is_ascii_alphanumeric() || "._-".contains(c))
        };
        match parts.as_slice() {
            [owner, repo] if valid_segment(owner) && valid_segment(repo) => Ok(Self {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(LaraboxError::Usage(format!(
                "expected <user>/<repo>, got {s:?}"
            ))),
        }
    }
}

/// Run git with `-C <repo>`.
pub fn git(runner: &dyn Runner, repo: &Path, args: &[&str]) -> Result<ExecOutput> {
    let inv = Invocation::new("git")
        .arg("-C")
        .arg(repo.to_string_lossy())
        .args(args.iter().copied())
        .capture_output(true);
    Ok(runner.run(&inv)?)
}

fn git_ok(runner: &dyn Runner, repo: &Path, args: &[&str]) -> Result<()> {
    let out = git(runner, repo, args)?;
    if out.success() {
        Ok(())
    } else {
        Err(LaraboxError::CommandFailed {
            command: format!("git {}", args.join(" ")),
            code: out.code,
        })
    }
}

/// Inputs of the clone-and-sync flow. Confirmation and the final dependency install are
/// the caller's steps; this covers everything git touches.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub dir: PathBuf,
    pub url: Url,
    /// `uid:gid` to chown the tree to; None skips the step.
    pub owner: Option<(u32, u32)>,
}

/// Result of a sync: which branch was fetched and whether the reset succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub branch: String,
    pub reset_ok: bool,
}

pub fn sync_from_remote(runner: &dyn Runner, plan: &SyncPlan) -> Result<SyncOutcome> {
    let dir = plan.dir.as_path();
    let dir_str = dir.to_string_lossy().into_owned();

    if let Some((uid, gid)) = plan.owner {
        let chown = Invocation::new("chown")
            .args(["-R".to_string(), format!("{uid}:{gid}"), dir_str.clone()])
            .capture_output(true);
        match runner.run(&chown) {
            Ok(out) if out.success() => {}
            Ok(out) => crate::warn_print(&format!(
                "could not fix ownership of {dir_str} (exit {:?}); continuing",
                out.code
            )),
            Err(e) => crate::warn_print(&format!(
                "could not fix ownership of {dir_str}: {e}; continuing"
            )),
        }
    }

    let git_dir = dir.join(".git");
    if git_dir.exists() {
        let healthy = git(runner, dir, &["rev-parse", "--git-dir"])?.success();
        if !healthy {
            crate::warn_print(&format!(
                "{} is corrupted; removing it and re-initializing",
                git_dir.display()
            ));
            remove_git_dir(&git_dir)?;
        }
    }
    if !git_dir.exists() {
        git_ok(runner, dir, &["init"])?;
    }

    let url = plan.url.as_str();
    if git(runner, dir, &["remote", "get-url", "origin"])?.success() {
        git_ok(runner, dir, &["remote", "set-url", "origin", url])?;
    } else {
        git_ok(runner, dir, &["remote", "add", "origin", url])?;
    }
    tracing::info!(remote = url, "origin configured");

    let abs = std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
    let abs = abs.to_string_lossy().into_owned();
    if !is_safe_directory(runner, dir, &abs)? {
        git_ok(
            runner,
            dir,
            &["config", "--global", "--add", "safe.directory", &abs],
        )?;
    }

    let mut fetched: Option<&str> = None;
    for branch in DEFAULT_BRANCHES {
        if git(runner, dir, &["fetch", "origin", branch])?.success() {
            fetched = Some(branch);
            break;
        }
        tracing::info!(branch, "fetch failed; trying next default branch");
    }
    let branch = fetched.ok_or_else(|| LaraboxError::CommandFailed {
        command: format!(
            "git fetch origin ({})",
            DEFAULT_BRANCHES.join(" | ")
        ),
        code: Some(1),
    })?;

    let target = format!("origin/{branch}");
    let reset = git(runner, dir, &["reset", "--hard", &target])?;
    if !reset.success() {
        crate::warn_print(&format!(
            "git reset --hard {target} exited with {:?}; the working tree may not match the remote",
            reset.code
        ));
    }

    Ok(SyncOutcome {
        branch: branch.to_string(),
        reset_ok: reset.success(),
    })
}

/// True when the global config already trusts `abs` (or everything, via `*`).
fn is_safe_directory(runner: &dyn Runner, dir: &Path, abs: &str) -> Result<bool> {
    let out = git(runner, dir, &["config", "--global", "--get-all", "safe.directory"])?;
    Ok(out.success()
        && out
            .stdout
            .lines()
            .map(str::trim)
            .any(|entry| entry == abs || entry == "*"))
}

fn remove_git_dir(git_dir: &Path) -> Result<()> {
    if git_dir.is_dir() {
        std::fs::remove_dir_all(git_dir)?;
    } else {
        std::fs::remove_file(git_dir)?;
    }
    Ok(())
}

/// uid/gid of the invoking user.
#[cfg(unix)]
pub fn current_owner() -> Option<(u32, u32)> {
    Some((
        nix::unistd::getuid().as_raw(),
        nix::unistd::getgid().as_raw(),
    ))
}

#[cfg(not(unix))]
pub fn current_owner() -> Option<(u32, u32)> {
    None
}
