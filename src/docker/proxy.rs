//! Container command proxy: run commands inside an already-running container and
//! check the project preconditions first.

use crate::docker::{parse_container_state, Docker, ExecMode};
use crate::errors::{LaraboxError, Result};
use crate::util::{ExecOutput, Invocation, Runner};

pub struct ContainerProxy<'a> {
    runner: &'a dyn Runner,
    docker: &'a Docker,
    container: String,
}

impl<'a> ContainerProxy<'a> {
    pub fn new(runner: &'a dyn Runner, docker: &'a Docker, container: impl Into<String>) -> Self {
        Self {
            runner,
            docker,
            container: container.into(),
        }
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    /// True when `docker inspect` reports the container running. A missing container is
    /// "not running", not an error. Dry runs assume it is.
    pub fn is_running(&self) -> Result<bool> {
        let out = self
            .runner
            .run(&self.docker.inspect_state(&self.container))?;
        if self.runner.is_dry_run() {
            return Ok(true);
        }
        if !out.success() {
            return Ok(false);
        }
        Ok(parse_container_state(&out.stdout)
            .map(|s| s.running)
            .unwrap_or(false))
    }

    pub fn ensure_running(&self) -> Result<()> {
        if self.is_running()? {
            tracing::info!(container = %self.container, "container is running");
            return Ok(());
        }
        Err(LaraboxError::precondition(
            format!("container '{}' is not running", self.container),
            "start it with `docker compose up -d` or run `larabox --init`",
        ))
    }

    /// `test -d`/`test -f` inside the container.
    fn test_path(&self, flag: &str, path: &str) -> Result<bool> {
        let inv = self
            .docker
            .exec(ExecMode::Attached, &self.container, None, ["test", flag, path]);
        let out = self.runner.run(&inv)?;
        Ok(out.success())
    }

    pub fn dir_exists(&self, path: &str) -> Result<bool> {
        self.test_path("-d", path)
    }

    pub fn file_exists(&self, path: &str) -> Result<bool> {
        self.test_path("-f", path)
    }

    /// Container running, project directory present, `artisan` present (warning only).
    pub fn validate_project(&self, project_dir: &str, project_name: &str) -> Result<()> {
        self.ensure_running()?;
        if !self.dir_exists(project_dir)? {
            return Err(LaraboxError::precondition(
                format!(
                    "project directory {project_dir} does not exist in container '{}'",
                    self.container
                ),
                format!(
                    "create it with `larabox --new {project_name}` or fetch it with `larabox --clone <user/repo>`"
                ),
            ));
        }
        let artisan = format!("{project_dir}/artisan");
        if !self.file_exists(&artisan)? {
            crate::warn_print(&format!(
                "{artisan} not found; {project_dir} may not be a Laravel project"
            ));
        }
        tracing::info!(project_dir, "project validated");
        Ok(())
    }

    /// Run `cmd` in `workdir`; a non-zero exit becomes [`LaraboxError::CommandFailed`].
    pub fn run_in<I, S>(&self, workdir: &str, cmd: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let inv = self
            .docker
            .exec(ExecMode::Attached, &self.container, Some(workdir), cmd);
        self.checked(&inv).map(|_| ())
    }

    /// Interactive terminal session in `workdir`; returns the session's exit status.
    pub fn interactive<I, S>(&self, workdir: &str, cmd: I) -> Result<ExecOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let inv = self
            .docker
            .exec(ExecMode::Interactive, &self.container, Some(workdir), cmd);
        Ok(self.runner.run(&inv)?)
    }

    /// Start `cmd` in the background (`docker exec -d`).
    pub fn spawn_detached<I, S>(&self, workdir: &str, cmd: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let inv = self
            .docker
            .exec(ExecMode::Detached, &self.container, Some(workdir), cmd);
        self.checked(&inv).map(|_| ())
    }

    /// Run `cmd` and return its raw output without judging the exit code.
    pub fn capture<I, S>(&self, workdir: Option<&str>, cmd: I) -> Result<ExecOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let inv = self
            .docker
            .exec(ExecMode::Attached, &self.container, workdir, cmd)
            .capture_output(true);
        Ok(self.runner.run(&inv)?)
    }

    pub fn read_file(&self, path: &str) -> Result<String> {
        let inv = self
            .docker
            .exec(ExecMode::Attached, &self.container, None, ["cat", path])
            .capture_output(true);
        Ok(self.checked(&inv)?.stdout)
    }

    /// Replace `path` with `contents` via `tee`, fed on stdin.
    pub fn write_file(&self, path: &str, contents: &str) -> Result<()> {
        let inv = self
            .docker
            .exec(ExecMode::Stdin, &self.container, None, ["tee", path])
            .stdin(contents)
            .capture_output(true);
        self.checked(&inv).map(|_| ())
    }

    fn checked(&self, inv: &Invocation) -> Result<ExecOutput> {
        checked_run(self.runner, inv)
    }
}

/// Run `inv` and turn a non-zero exit into [`LaraboxError::CommandFailed`].
pub fn checked_run(runner: &dyn Runner, inv: &Invocation) -> Result<ExecOutput> {
    let out = runner.run(inv)?;
    if out.success() {
        Ok(out)
    } else {
        Err(LaraboxError::CommandFailed {
            command: inv.preview(),
            code: out.code,
        })
    }
}
