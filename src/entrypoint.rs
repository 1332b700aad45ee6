//! Container entrypoint mode (`--entrypoint`). Runs inside the app container, so every
//! command executes locally instead of through `docker exec`.

use std::path::Path;

use crate::docker::proxy::checked_run;
use crate::errors::{LaraboxError, Result};
use crate::util::{Invocation, Runner};

/// Command handed the process when none is given.
pub const DEFAULT_SERVICE: &str = "php-fpm";

const WRITABLE_DIRS: [&str; 2] = ["storage", "bootstrap/cache"];

/// Bring the project into a runnable state: scaffold or install dependencies, fix
/// permissions on the writable directories, then drop stale cached config.
pub fn prepare_project(runner: &dyn Runner, project_dir: &Path) -> Result<()> {
    let dir = project_dir.to_string_lossy().into_owned();

    if !project_dir.join("artisan").is_file() {
        tracing::info!(dir = %dir, "no artisan found; creating project");
        let parent = project_dir.parent().unwrap_or_else(|| Path::new("/"));
        checked_run(
            runner,
            &Invocation::new("composer")
                .args(["create-project", "laravel/laravel", dir.as_str()])
                .cwd(parent),
        )?;
    } else if !project_dir.join("vendor").is_dir() {
        tracing::info!(dir = %dir, "vendor missing; installing dependencies");
        checked_run(
            runner,
            &Invocation::new("composer").arg("install").cwd(project_dir),
        )?;
    }

    let fixes = [
        Invocation::new("chown")
            .args(["-R", "www-data:www-data"])
            .args(WRITABLE_DIRS)
            .cwd(project_dir),
        Invocation::new("chmod")
            .args(["-R", "775"])
            .args(WRITABLE_DIRS)
            .cwd(project_dir),
    ];
    for fix in &fixes {
        match runner.run(fix) {
            Ok(out) if out.success() => {}
            Ok(out) => crate::warn_print(&format!(
                "`{}` failed (exit {:?}); continuing",
                fix.preview(),
                out.code
            )),
            Err(e) => crate::warn_print(&format!("`{}` failed: {e}; continuing", fix.preview())),
        }
    }

    checked_run(
        runner,
        &Invocation::new("php")
            .args(["artisan", "config:clear"])
            .cwd(project_dir),
    )?;
    Ok(())
}

/// Command to hand the process to; an empty list means the default service.
pub fn service_command(cmd: &[String]) -> Vec<String> {
    if cmd.is_empty() {
        vec![DEFAULT_SERVICE.to_string()]
    } else {
        cmd.to_vec()
    }
}

/// Replace the current process with `cmd`. Only returns on failure.
#[cfg(unix)]
pub fn exec_service(cmd: &[String], project_dir: &Path) -> LaraboxError {
    use std::os::unix::process::CommandExt;

    let argv = service_command(cmd);
    let mut command = std::process::Command::new(&argv[0]);
    command.args(&argv[1..]);
    if project_dir.is_dir() {
        command.current_dir(project_dir);
    }
    tracing::info!(command = %crate::util::shell_join(&argv), "handing over");
    LaraboxError::Io(command.exec())
}

#[cfg(not(unix))]
pub fn exec_service(_cmd: &[String], _project_dir: &Path) -> LaraboxError {
    LaraboxError::Usage("--entrypoint is only supported on unix".into())
}
