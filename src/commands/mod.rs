use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use clap::ArgMatches;
use larabox::docker::{docker_program, Docker};
use larabox::envfile::{resolve_env_path, EnvFile};
use larabox::{
    display_for_error, exit_code_for_error, exit_code_for_io_error, run_actions, Action, Config,
    Context, DryRunService, ExecService, LaraboxError, Options, Runner,
};

use crate::banner::{banner_suppressed, print_startup_banner};
use crate::cli::{render_usage, Cli};

/// Timeout applied to captured helper commands (inspect, test, probes).
const HELPER_TIMEOUT: Duration = Duration::from_secs(30);

fn report(e: &LaraboxError) -> ExitCode {
    let use_err = larabox::color_enabled_stderr();
    for line in display_for_error(e) {
        larabox::log_error_stderr(use_err, &line);
    }
    ExitCode::from(exit_code_for_error(e))
}

fn usage_error(message: &str) -> ExitCode {
    let use_err = larabox::color_enabled_stderr();
    larabox::log_error_stderr(use_err, &format!("larabox: {message}"));
    eprintln!();
    eprintln!("{}", render_usage());
    eprintln!("For more information, try '--help'.");
    ExitCode::from(1)
}

/// With `lenient`, bad values are printed as warnings and their defaults used instead.
fn load_config(cli: &Cli, env_path: &Path, lenient: bool) -> larabox::Result<Config> {
    let env = match EnvFile::load(env_path) {
        Ok(env) => env,
        Err(e) if lenient => {
            larabox::warn_print(&format!("{e}; ignoring it"));
            return Ok(Config::resolve_lenient(None, &cli.overrides()).0);
        }
        Err(e) => return Err(e),
    };
    if env.is_none() {
        larabox::warn_print(&format!(
            "{} not found; using defaults",
            env_path.display()
        ));
    }
    if !lenient {
        return Config::resolve(env.as_ref(), &cli.overrides());
    }
    let (config, problems) = Config::resolve_lenient(env.as_ref(), &cli.overrides());
    for problem in &problems {
        larabox::warn_print(&format!("{problem}; using the default"));
    }
    Ok(config)
}

fn make_runner(cli: &Cli) -> Box<dyn Runner> {
    if cli.dry_run {
        Box::new(DryRunService)
    } else {
        Box::new(ExecService::new(HELPER_TIMEOUT).verbose(cli.verbose))
    }
}

/// Actions that can do their job without a docker client on PATH.
fn needs_docker(action: &Action) -> bool {
    !matches!(action, Action::Setup | Action::Doctor)
}

pub(crate) fn run(cli: &Cli, matches: &ArgMatches) -> ExitCode {
    if let Some(mode) = cli.color {
        larabox::set_color_mode(mode);
    }
    larabox::logging::init(cli.verbose);

    let actions = cli.planned_actions(matches);
    if cli.entrypoint.is_some() && !actions.is_empty() {
        return usage_error("--entrypoint cannot be combined with other actions");
    }
    if cli.entrypoint.is_none() && actions.is_empty() {
        return usage_error("no action given");
    }

    let env_path = resolve_env_path(cli.env_file.as_deref());
    let lenient = !actions.is_empty() && !actions.iter().any(needs_docker);
    let config = match load_config(cli, &env_path, lenient) {
        Ok(c) => c,
        Err(e) => return report(&e),
    };
    tracing::info!(
        project = config.project_name(),
        container = %config.container(),
        port = %config.server_port(),
        env_file = %env_path.display(),
        "configuration resolved"
    );

    if let Some(cmd) = &cli.entrypoint {
        return run_entrypoint(cli, &config, cmd);
    }

    if !banner_suppressed(cli.quiet) {
        print_startup_banner(&config);
    }

    let program = match docker_program(cli.dry_run) {
        Ok(p) => p,
        Err(_) if !actions.iter().any(needs_docker) => "docker".to_string(),
        Err(e) => {
            let use_err = larabox::color_enabled_stderr();
            larabox::log_error_stderr(use_err, &format!("larabox: docker: {e}"));
            larabox::log_error_stderr(use_err, "  hint: install docker or add it to PATH");
            return ExitCode::from(exit_code_for_io_error(&e));
        }
    };

    let runner = make_runner(cli);
    let docker = Docker::new(program);
    let options = Options {
        assume_yes: cli.yes,
        ready_timeout: cli.timeout,
        env_path,
        workdir: std::env::current_dir().unwrap_or_else(|_| ".".into()),
        ..Options::default()
    };
    let ctx = Context {
        config: &config,
        runner: runner.as_ref(),
        docker: &docker,
        options: &options,
    };

    match run_actions(&ctx, &actions) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

fn run_entrypoint(cli: &Cli, config: &Config, cmd: &[String]) -> ExitCode {
    let runner = make_runner(cli);
    let project_dir = config.project_dir();
    let dir = Path::new(&project_dir);

    if let Err(e) = larabox::entrypoint::prepare_project(runner.as_ref(), dir) {
        return report(&e);
    }
    let argv = larabox::entrypoint::service_command(cmd);
    if cli.dry_run {
        eprintln!(
            "larabox: would exec: {}",
            larabox::util::shell_join(&argv)
        );
        return ExitCode::SUCCESS;
    }
    report(&larabox::entrypoint::exec_service(&argv, dir))
}
