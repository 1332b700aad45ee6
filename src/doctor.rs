//! `--doctor`: environment report on stderr. Never fails the invocation.

use crate::actions::Context;
use crate::color::{paint, BLUE_BOLD, GREEN_BOLD, RED_BOLD};
use crate::ready::{HostPortProbe, Probe};

fn yes_no(use_err: bool, ok: bool) -> String {
    if ok {
        paint(use_err, GREEN_BOLD, "yes")
    } else {
        paint(use_err, RED_BOLD, "no")
    }
}

pub fn run_doctor(ctx: &Context<'_>) {
    let use_err = crate::color_enabled_stderr();
    let config = ctx.config;

    eprintln!("larabox doctor");
    eprintln!();
    eprintln!("  version: v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "  host:    {} / {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    eprintln!();

    match crate::docker::container_runtime_path() {
        Ok(p) => eprintln!("  docker:  {}", paint(use_err, BLUE_BOLD, &p.display().to_string())),
        Err(_) => eprintln!("  docker:  {}", paint(use_err, RED_BOLD, "(not found)")),
    }
    let version = ctx
        .runner
        .run(&ctx.docker.version())
        .ok()
        .filter(|o| o.success())
        .map(|o| o.stdout.trim().to_string())
        .filter(|s| !s.is_empty());
    eprintln!(
        "  docker version: {}",
        version.as_deref().unwrap_or("(unavailable)")
    );
    eprintln!();

    let env_path = &ctx.options.env_path;
    eprintln!(
        "  env file: {} (present: {})",
        env_path.display(),
        yes_no(use_err, crate::config::env_file_present(env_path))
    );
    eprintln!("  project:     {}", config.project_name());
    eprintln!("  project dir: {}", config.project_dir());
    eprintln!("  container:   {}", config.container());
    eprintln!("  server port: {}", config.server_port());
    eprintln!("  db:          {}:{}", config.db_container(), config.db_port());
    eprintln!("  git host:    {}", config.git_host());
    eprintln!();

    let running = ctx.proxy().is_running().unwrap_or(false);
    eprintln!(
        "  container '{}' running: {}",
        config.container(),
        yes_no(use_err, running)
    );
    let mut probe = HostPortProbe::new("127.0.0.1", config.server_port().number());
    let reachable = probe.is_listening().unwrap_or(false);
    eprintln!(
        "  dev server on {}: {}",
        probe.describe(),
        yes_no(use_err, reachable)
    );
    eprintln!();
}
