#![allow(clippy::module_name_repetitions)]
//! Docker invocation builders: `docker exec`, `docker inspect`, `docker compose`.
//!
//! Builders only assemble argument lists; running them is the caller's business
//! (see [`proxy::ContainerProxy`]).

pub mod proxy;
pub mod runtime;

use serde::Deserialize;

use crate::util::Invocation;

pub use proxy::ContainerProxy;
pub use runtime::{container_runtime_path, docker_program};

/// How `docker exec` attaches to the command.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExecMode {
    /// Inherit stdio, wait for completion.
    Attached,
    /// `-i -t`: interactive terminal session.
    Interactive,
    /// `-i`: stdin is piped in.
    Stdin,
    /// `-d`: start in the background and return.
    Detached,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Docker {
    program: String,
}

impl Docker {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// `docker exec [flags] [-w <workdir>] <container> <cmd...>`
    pub fn exec<I, S>(
        &self,
        mode: ExecMode,
        container: &str,
        workdir: Option<&str>,
        cmd: I,
    ) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut inv = Invocation::new(&self.program).arg("exec");
        inv = match mode {
            ExecMode::Attached => inv,
            ExecMode::Interactive => inv.args(["-i", "-t"]),
            ExecMode::Stdin => inv.arg("-i"),
            ExecMode::Detached => inv.arg("-d"),
        };
        if let Some(dir) = workdir {
            inv = inv.args(["-w", dir]);
        }
        inv.arg(container).args(cmd)
    }

    /// `docker inspect --format {{json .State}} <container>`, captured.
    pub fn inspect_state(&self, container: &str) -> Invocation {
        Invocation::new(&self.program)
            .args(["inspect", "--format", "{{json .State}}", container])
            .capture_output(true)
    }

    /// `docker compose up -d`
    pub fn compose_up(&self) -> Invocation {
        Invocation::new(&self.program).args(["compose", "up", "-d"])
    }

    /// `docker --version`, captured.
    pub fn version(&self) -> Invocation {
        Invocation::new(&self.program)
            .arg("--version")
            .capture_output(true)
    }
}

/// Subset of `docker inspect` `.State` that the tool looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContainerState {
    #[serde(rename = "Running", default)]
    pub running: bool,
    #[serde(rename = "Status", default)]
    pub status: String,
}

/// Parse the JSON emitted by [`Docker::inspect_state`]. Multiple containers produce one
/// object per line; the first parseable one wins.
pub fn parse_container_state(raw: &str) -> Option<ContainerState> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .find_map(|l| serde_json::from_str::<ContainerState>(l).ok())
}
