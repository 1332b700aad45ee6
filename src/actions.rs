//! Action handlers: one per command-line flag, run in command-line order.
//!
//! Every handler receives the same [`Context`]; nothing here reads ambient state.
//! A failing action stops the sequence; earlier actions are not undone.

use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{
    validate_container_name, validate_project_name, Config, ServerPort, KEY_CONTAINER_NAME,
    KEY_PROJECT_NAME, KEY_SERVER_PORT,
};
use crate::docker::{proxy::checked_run, ContainerProxy, Docker};
use crate::errors::{LaraboxError, Result};
use crate::git::{current_owner, sync_from_remote, RepoSlug, SyncPlan};
use crate::ready::{wait_until_listening, ContainerPortProbe, PollPolicy};
use crate::routes::merge_web_routes;
use crate::util::Runner;

/// Artisan cache commands run by `--clear`, in order.
pub const CLEAR_COMMANDS: [&str; 4] = ["cache:clear", "config:clear", "view:clear", "route:clear"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Run,
    Kill,
    New(String),
    Clone(String),
    Init,
    Migrate,
    MakeModels(Vec<String>),
    Clear,
    Composer,
    Breeze,
    Npm(Vec<String>),
    Shell,
    Setup,
    Doctor,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::Run => "run",
            Action::Kill => "kill",
            Action::New(_) => "new",
            Action::Clone(_) => "clone",
            Action::Init => "init",
            Action::Migrate => "migrate",
            Action::MakeModels(_) => "make-MMC",
            Action::Clear => "clear",
            Action::Composer => "composer",
            Action::Breeze => "breeze",
            Action::Npm(_) => "npm",
            Action::Shell => "shell",
            Action::Setup => "setup",
            Action::Doctor => "doctor",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Options {
    pub assume_yes: bool,
    pub ready_timeout: Duration,
    pub poll_interval: Duration,
    /// Environment file written by `--setup`.
    pub env_path: PathBuf,
    /// Host directory synchronized by `--clone`.
    pub workdir: PathBuf,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            assume_yes: false,
            ready_timeout: crate::ready::DEFAULT_READY_TIMEOUT,
            poll_interval: crate::ready::DEFAULT_POLL_INTERVAL,
            env_path: PathBuf::from(crate::envfile::DEFAULT_ENV_FILE),
            workdir: PathBuf::from("."),
        }
    }
}

impl Options {
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::from_timeout(self.ready_timeout, self.poll_interval)
    }
}

pub struct Context<'a> {
    pub config: &'a Config,
    pub runner: &'a dyn Runner,
    pub docker: &'a Docker,
    pub options: &'a Options,
}

impl<'a> Context<'a> {
    pub fn proxy(&self) -> ContainerProxy<'a> {
        ContainerProxy::new(self.runner, self.docker, self.config.container())
    }

    /// Proxy for the app container after the project checks passed.
    fn validated(&self) -> Result<ContainerProxy<'a>> {
        let proxy = self.proxy();
        proxy.validate_project(&self.config.project_dir(), self.config.project_name())?;
        Ok(proxy)
    }

    fn artisan(&self, proxy: &ContainerProxy<'_>, args: &[&str]) -> Result<()> {
        let mut cmd = vec!["php", "artisan"];
        cmd.extend_from_slice(args);
        proxy.run_in(&self.config.project_dir(), cmd)
    }

    fn wait_for_port(&self, proxy: &ContainerProxy<'_>, port: u16) -> Result<()> {
        if self.runner.is_dry_run() {
            return Ok(());
        }
        let mut probe = ContainerPortProbe::new(proxy, port);
        let use_err = crate::color_enabled_stderr();
        crate::log_info_stderr(
            use_err,
            &format!("larabox: waiting for port {port} in '{}'", proxy.container()),
        );
        wait_until_listening(&mut probe, &self.options.poll_policy(), &mut std::io::stderr())?;
        Ok(())
    }
}

pub fn run_actions(ctx: &Context<'_>, actions: &[Action]) -> Result<()> {
    for action in actions {
        tracing::info!(action = action.label(), "running action");
        run_action(ctx, action)?;
    }
    Ok(())
}

pub fn run_action(ctx: &Context<'_>, action: &Action) -> Result<()> {
    match action {
        Action::Run => run_server(ctx),
        Action::Kill => kill_server(ctx),
        Action::New(name) => new_project(ctx, name),
        Action::Clone(slug) => clone_project(ctx, slug),
        Action::Init => init_stack(ctx),
        Action::Migrate => {
            let proxy = ctx.validated()?;
            ctx.artisan(&proxy, &["migrate", "--seed"])
        }
        Action::MakeModels(names) => make_models(ctx, names),
        Action::Clear => clear_caches(ctx),
        Action::Composer => {
            let proxy = ctx.validated()?;
            proxy.run_in(&ctx.config.project_dir(), ["composer", "install"])
        }
        Action::Breeze => install_breeze(ctx),
        Action::Npm(args) => npm(ctx, args),
        Action::Shell => shell(ctx),
        Action::Setup => {
            let stdin = std::io::stdin();
            let mut lock = stdin.lock();
            setup_with(ctx, &mut lock)
        }
        Action::Doctor => {
            crate::doctor::run_doctor(ctx);
            Ok(())
        }
    }
}

/// Command-line pattern that identifies the dev server for `port`.
pub fn serve_pattern(port: ServerPort) -> String {
    format!("artisan serve --host=0.0.0.0 --port={port}")
}

fn run_server(ctx: &Context<'_>) -> Result<()> {
    let proxy = ctx.validated()?;
    let port = ctx.config.server_port();
    proxy.spawn_detached(
        &ctx.config.project_dir(),
        [
            "php".to_string(),
            "artisan".to_string(),
            "serve".to_string(),
            "--host=0.0.0.0".to_string(),
            format!("--port={port}"),
        ],
    )?;
    ctx.wait_for_port(&proxy, port.number())?;
    let use_err = crate::color_enabled_stderr();
    crate::log_success_stderr(
        use_err,
        &format!("larabox: dev server running at {}", ctx.config.server_url()),
    );
    Ok(())
}

fn kill_server(ctx: &Context<'_>) -> Result<()> {
    let proxy = ctx.validated()?;
    let port = ctx.config.server_port();
    let out = proxy.capture(None, ["pkill".to_string(), "-f".to_string(), serve_pattern(port)])?;
    let use_err = crate::color_enabled_stderr();
    match out.code {
        Some(0) => {
            crate::log_success_stderr(use_err, &format!("larabox: stopped dev server on port {port}"));
            Ok(())
        }
        // pkill: 1 means nothing matched
        Some(1) => {
            crate::log_warn_stderr(use_err, &format!("larabox: no dev server running on port {port}"));
            Ok(())
        }
        code => Err(LaraboxError::CommandFailed {
            command: format!("pkill -f {:?}", serve_pattern(port)),
            code,
        }),
    }
}

fn new_project(ctx: &Context<'_>, name: &str) -> Result<()> {
    validate_project_name(name).map_err(LaraboxError::Usage)?;
    let proxy = ctx.proxy();
    proxy.ensure_running()?;

    let web_root = ctx.config.web_root();
    let dir = ctx.config.project_dir_for(name);
    if !ctx.runner.is_dry_run() && proxy.dir_exists(&dir)? {
        return Err(LaraboxError::precondition(
            format!("{dir} already exists in container '{}'", proxy.container()),
            format!("pick another name or use `larabox -p {name}`"),
        ));
    }

    proxy.run_in(
        web_root,
        ["composer", "create-project", "laravel/laravel", name],
    )?;
    let writable = [format!("{dir}/storage"), format!("{dir}/bootstrap/cache")];
    let mut chown = vec!["chown".to_string(), "-R".to_string(), "www-data:www-data".to_string()];
    chown.extend(writable.iter().cloned());
    proxy.run_in(web_root, chown)?;
    let mut chmod = vec!["chmod".to_string(), "-R".to_string(), "775".to_string()];
    chmod.extend(writable.iter().cloned());
    proxy.run_in(web_root, chmod)?;

    let use_err = crate::color_enabled_stderr();
    crate::log_success_stderr(use_err, &format!("larabox: created project {name} in {dir}"));
    if name != ctx.config.project_name() {
        crate::log_info_stderr(
            use_err,
            &format!("larabox: set {KEY_PROJECT_NAME}={name} (or pass -p {name}) to work on it"),
        );
    }
    Ok(())
}

fn clone_project(ctx: &Context<'_>, slug: &str) -> Result<()> {
    let slug: RepoSlug = slug.parse()?;
    let url = slug.clone_url(ctx.config.git_host())?;
    let dir = &ctx.options.workdir;
    let question = format!(
        "This resets {} to {url} and discards local changes. Continue?",
        dir.display()
    );
    if !crate::ui::confirm(&question, ctx.options.assume_yes || ctx.runner.is_dry_run()) {
        return Err(LaraboxError::Aborted);
    }

    let plan = SyncPlan {
        dir: dir.clone(),
        url,
        owner: current_owner(),
    };
    let outcome = sync_from_remote(ctx.runner, &plan)?;
    let use_err = crate::color_enabled_stderr();
    crate::log_info_stderr(
        use_err,
        &format!("larabox: synchronized {slug} ({})", outcome.branch),
    );

    let proxy = ctx.validated()?;
    proxy.run_in(&ctx.config.project_dir(), ["composer", "install"])
}

fn init_stack(ctx: &Context<'_>) -> Result<()> {
    checked_run(ctx.runner, &ctx.docker.compose_up())?;

    let db = ContainerProxy::new(ctx.runner, ctx.docker, ctx.config.db_container());
    ctx.wait_for_port(&db, ctx.config.db_port())?;

    let proxy = ctx.validated()?;
    ctx.artisan(&proxy, &["migrate:fresh", "--seed"])
}

/// Model names as accepted by `make:model`, nested namespaces included.
pub fn validate_model_name(name: &str) -> std::result::Result<(), String> {
    let first_ok = name
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic())
        .unwrap_or(false);
    let rest_ok = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '/' || c == '\\');
    if first_ok && rest_ok && !name.ends_with('/') && !name.ends_with('\\') {
        Ok(())
    } else {
        Err(format!("invalid model name: {name:?}"))
    }
}

fn make_models(ctx: &Context<'_>, names: &[String]) -> Result<()> {
    if names.is_empty() {
        return Err(LaraboxError::Usage("--make-MMC needs at least one model name".into()));
    }
    for name in names {
        validate_model_name(name).map_err(LaraboxError::Usage)?;
    }
    let proxy = ctx.validated()?;
    for name in names {
        ctx.artisan(&proxy, &["make:model", name.as_str(), "-mc"])?;
    }
    Ok(())
}

fn clear_caches(ctx: &Context<'_>) -> Result<()> {
    let proxy = ctx.validated()?;
    for sub in CLEAR_COMMANDS {
        ctx.artisan(&proxy, &[sub])?;
    }
    Ok(())
}

fn install_breeze(ctx: &Context<'_>) -> Result<()> {
    let proxy = ctx.validated()?;
    let dir = ctx.config.project_dir();
    let routes = format!("{dir}/routes/web.php");

    let original = proxy.read_file(&routes)?;
    proxy.run_in(&dir, ["composer", "require", "laravel/breeze", "--dev"])?;
    ctx.artisan(&proxy, &["breeze:install", "blade"])?;

    if ctx.runner.is_dry_run() {
        eprintln!("larabox: would merge {routes}");
        return Ok(());
    }
    let generated = proxy.read_file(&routes)?;
    let merged = merge_web_routes(&original, &generated)?;
    if merged != generated {
        proxy.write_file(&routes, &merged)?;
    }
    let use_err = crate::color_enabled_stderr();
    crate::log_success_stderr(use_err, "larabox: breeze installed; routes merged");
    Ok(())
}

fn npm(ctx: &Context<'_>, args: &[String]) -> Result<()> {
    let node = ContainerProxy::new(ctx.runner, ctx.docker, ctx.config.node_container());
    node.ensure_running()?;
    let mut cmd = vec!["npm".to_string()];
    cmd.extend(args.iter().cloned());
    node.run_in(&ctx.config.project_dir(), cmd)
}

fn shell(ctx: &Context<'_>) -> Result<()> {
    let proxy = ctx.validated()?;
    let out = proxy.interactive(&ctx.config.project_dir(), ["bash"])?;
    match out.code {
        Some(0) => Ok(()),
        code => Err(LaraboxError::CommandFailed {
            command: format!("shell in '{}'", proxy.container()),
            code,
        }),
    }
}

/// Prompt for the core keys and write the answers to the environment file.
pub fn setup_with(ctx: &Context<'_>, input: &mut dyn BufRead) -> Result<()> {
    let env_path = &ctx.options.env_path;
    let port = ctx.config.server_port().to_string();
    let fields: [(&str, &str); 3] = [
        (KEY_PROJECT_NAME, ctx.config.project_name()),
        (KEY_CONTAINER_NAME, ctx.config.base_container()),
        (KEY_SERVER_PORT, port.as_str()),
    ];

    for (key, current) in fields {
        let Some(value) = crate::ui::prompt_value_with(key, current, input) else {
            break;
        };
        let checked = match key {
            KEY_PROJECT_NAME => validate_project_name(&value),
            KEY_CONTAINER_NAME => validate_container_name(&value),
            _ => value.parse::<ServerPort>().map(|_| ()),
        };
        checked.map_err(|message| LaraboxError::Config {
            path: env_path.clone(),
            message,
        })?;
        if ctx.runner.is_dry_run() {
            eprintln!("larabox: would set {key}={value} in {}", env_path.display());
            continue;
        }
        crate::envfile::set_value(env_path, key, &value)?;
    }
    let use_err = crate::color_enabled_stderr();
    crate::log_success_stderr(use_err, &format!("larabox: saved {}", env_path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Overrides;
    use crate::util::RecordingRunner;

    #[test]
    fn labels_match_flags() {
        assert_eq!(Action::MakeModels(vec![]).label(), "make-MMC");
        assert_eq!(Action::New("x".into()).label(), "new");
    }

    #[test]
    fn model_names() {
        for ok in ["Post", "Admin/User", "Blog\\Post", "Order_Item"] {
            assert!(validate_model_name(ok).is_ok(), "{ok}");
        }
        for bad in ["", "-m", "1Post", "Post/", "Po st"] {
            assert!(validate_model_name(bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn serve_pattern_names_port() {
        assert_eq!(
            serve_pattern(ServerPort::P8008),
            "artisan serve --host=0.0.0.0 --port=8008"
        );
    }

    fn with_ctx<R>(overrides: Overrides, runner: &RecordingRunner, f: impl FnOnce(&Context<'_>) -> R) -> R {
        with_options(overrides, Options::default(), runner, f)
    }

    fn with_options<R>(
        overrides: Overrides,
        options: Options,
        runner: &RecordingRunner,
        f: impl FnOnce(&Context<'_>) -> R,
    ) -> R {
        let config = Config::resolve(None, &overrides).unwrap();
        let docker = Docker::new("docker");
        let ctx = Context {
            config: &config,
            runner,
            docker: &docker,
            options: &options,
        };
        f(&ctx)
    }

    /// Previews of container commands, without the inspect/test precondition probes.
    fn work(runner: &RecordingRunner) -> Vec<String> {
        runner
            .previews()
            .into_iter()
            .filter(|p| !p.contains(" inspect ") && !p.contains(" test -"))
            .collect()
    }

    /// Polls every millisecond, five times at most.
    fn quick_polls() -> Options {
        Options {
            ready_timeout: Duration::from_millis(5),
            poll_interval: Duration::from_millis(1),
            ..Options::default()
        }
    }

    const SS_HEADER: &str = "State  Recv-Q Send-Q Local Address:Port Peer Address:Port\n";

    #[test]
    fn run_starts_detached_server_and_waits_for_its_port() {
        let runner = RecordingRunner::new().with_running_container();
        runner.reply_times("ss -ltn", 0, SS_HEADER, 2);
        runner.reply(
            "ss -ltn",
            0,
            &format!("{SS_HEADER}LISTEN 0 511 0.0.0.0:8000 0.0.0.0:*\n"),
        );
        with_options(Overrides::default(), quick_polls(), &runner, |ctx| {
            run_action(ctx, &Action::Run)
        })
        .unwrap();
        let work = work(&runner);
        assert_eq!(
            work[0],
            "docker exec -d -w /var/www/html/default default_app php artisan serve --host=0.0.0.0 --port=8000"
        );
        assert_eq!(work.len(), 4, "{work:?}");
        assert!(work[1..]
            .iter()
            .all(|p| p.starts_with("docker exec default_app sh -c ")));
    }

    #[test]
    fn run_reports_timeout_when_port_never_opens() {
        let runner = RecordingRunner::new().with_running_container();
        let overrides = Overrides {
            port: Some(ServerPort::P8080),
            ..Overrides::default()
        };
        let err = with_options(overrides, quick_polls(), &runner, |ctx| {
            run_action(ctx, &Action::Run)
        })
        .unwrap_err();
        match err {
            LaraboxError::ReadinessTimeout { what, attempts } => {
                assert_eq!(attempts, 5);
                assert!(what.contains("8080"), "{what}");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(work(&runner)[0].ends_with("--port=8080"));
    }

    #[test]
    fn init_brings_stack_up_waits_for_db_then_migrates() {
        let runner = RecordingRunner::new().with_running_container();
        runner.reply_times("default_app_db sh -c", 0, SS_HEADER, 1);
        runner.reply(
            "default_app_db sh -c",
            0,
            &format!("{SS_HEADER}LISTEN 0 80 [::]:3306 [::]:*\n"),
        );
        with_options(Overrides::default(), quick_polls(), &runner, |ctx| {
            run_action(ctx, &Action::Init)
        })
        .unwrap();
        let work = work(&runner);
        assert_eq!(work.len(), 4, "{work:?}");
        assert_eq!(work[0], "docker compose up -d");
        assert!(work[1].starts_with("docker exec default_app_db sh -c "));
        assert!(work[2].starts_with("docker exec default_app_db sh -c "));
        assert_eq!(
            work[3],
            "docker exec -w /var/www/html/default default_app php artisan migrate:fresh --seed"
        );
    }

    #[test]
    fn init_does_not_migrate_when_db_never_listens() {
        let runner = RecordingRunner::new().with_running_container();
        let err = with_options(Overrides::default(), quick_polls(), &runner, |ctx| {
            run_action(ctx, &Action::Init)
        })
        .unwrap_err();
        assert!(matches!(err, LaraboxError::ReadinessTimeout { .. }), "{err:?}");
        assert!(!work(&runner).iter().any(|p| p.contains("migrate")));
    }

    #[test]
    fn kill_with_no_server_is_not_an_error() {
        let runner = RecordingRunner::new().with_running_container();
        runner.reply("pkill", 1, "");
        with_ctx(Overrides::default(), &runner, |ctx| run_action(ctx, &Action::Kill)).unwrap();
    }

    #[test]
    fn kill_other_failure_is_reported() {
        let runner = RecordingRunner::new().with_running_container();
        runner.reply("pkill", 2, "");
        let err = with_ctx(Overrides::default(), &runner, |ctx| run_action(ctx, &Action::Kill))
            .unwrap_err();
        assert!(matches!(err, LaraboxError::CommandFailed { code: Some(2), .. }), "{err:?}");
    }

    #[test]
    fn new_project_substitutes_name_everywhere() {
        let runner = RecordingRunner::new().with_running_container();
        runner.reply("test -d", 1, "");
        with_ctx(Overrides::default(), &runner, |ctx| {
            run_action(ctx, &Action::New("myapp".into()))
        })
        .unwrap();
        assert_eq!(
            work(&runner),
            [
                "docker exec -w /var/www/html default_app composer create-project laravel/laravel myapp",
                "docker exec -w /var/www/html default_app chown -R www-data:www-data /var/www/html/myapp/storage /var/www/html/myapp/bootstrap/cache",
                "docker exec -w /var/www/html default_app chmod -R 775 /var/www/html/myapp/storage /var/www/html/myapp/bootstrap/cache",
            ]
        );
    }

    #[test]
    fn new_project_refuses_existing_directory() {
        let runner = RecordingRunner::new().with_running_container();
        let err = with_ctx(Overrides::default(), &runner, |ctx| {
            run_action(ctx, &Action::New("myapp".into()))
        })
        .unwrap_err();
        assert!(matches!(err, LaraboxError::Precondition { .. }), "{err:?}");
        assert!(work(&runner).is_empty());
    }

    #[test]
    fn clear_runs_in_order_and_stops_at_first_failure() {
        let runner = RecordingRunner::new().with_running_container();
        with_ctx(Overrides::default(), &runner, |ctx| run_action(ctx, &Action::Clear)).unwrap();
        let subs: Vec<String> = work(&runner)
            .iter()
            .map(|p| p.rsplit(' ').next().unwrap_or_default().to_string())
            .collect();
        assert_eq!(subs, CLEAR_COMMANDS);

        let runner = RecordingRunner::new().with_running_container();
        runner.reply("config:clear", 1, "");
        let err = with_ctx(Overrides::default(), &runner, |ctx| run_action(ctx, &Action::Clear))
            .unwrap_err();
        assert!(matches!(err, LaraboxError::CommandFailed { .. }));
        assert_eq!(work(&runner).len(), 2);
    }

    #[test]
    fn project_override_changes_every_path() {
        let runner = RecordingRunner::new().with_running_container();
        let overrides = Overrides {
            project: Some("shop".into()),
            ..Overrides::default()
        };
        with_ctx(overrides, &runner, |ctx| run_action(ctx, &Action::Migrate)).unwrap();
        let previews = runner.previews();
        assert!(previews.iter().any(|p| p.ends_with("test -d /var/www/html/shop")));
        assert_eq!(
            work(&runner),
            ["docker exec -w /var/www/html/shop default_app php artisan migrate --seed"]
        );
    }

    #[test]
    fn make_models_stops_at_first_failure() {
        let runner = RecordingRunner::new().with_running_container();
        runner.reply("make:model Comment", 1, "");
        let names = vec!["Post".to_string(), "Comment".to_string(), "Tag".to_string()];
        let err = with_ctx(Overrides::default(), &runner, |ctx| {
            run_action(ctx, &Action::MakeModels(names))
        })
        .unwrap_err();
        assert!(matches!(err, LaraboxError::CommandFailed { .. }));
        assert_eq!(work(&runner).len(), 2);
    }

    #[test]
    fn npm_targets_node_container() {
        let runner = RecordingRunner::new().with_running_container();
        with_ctx(Overrides::default(), &runner, |ctx| {
            run_action(ctx, &Action::Npm(vec!["run".into(), "dev".into()]))
        })
        .unwrap();
        assert_eq!(
            work(&runner),
            ["docker exec -w /var/www/html/default default_app_node npm run dev"]
        );
    }

    #[test]
    fn breeze_merges_captured_routes() {
        let runner = RecordingRunner::new().with_running_container();
        runner.reply_times("cat ", 0, "<?php\n\nRoute::get('/shop', fn () => 'ok');\n", 1);
        runner.reply_times(
            "cat ",
            0,
            "<?php\n\nuse Illuminate\\Support\\Facades\\Route;\n\nRoute::get('/dashboard', fn () => 'd');\n",
            1,
        );
        with_ctx(Overrides::default(), &runner, |ctx| run_action(ctx, &Action::Breeze)).unwrap();
        let calls = runner.calls();
        let write = calls
            .iter()
            .find(|c| c.get_args().iter().any(|a| a == "tee"))
            .expect("routes written back");
        assert_eq!(
            write.get_args().last().map(String::as_str),
            Some("/var/www/html/default/routes/web.php")
        );
        let merged = write.stdin_data().expect("merged routes on stdin");
        let shop = merged.find("Route::get('/shop'").expect("pre-install route kept");
        let marker = merged.find(crate::routes::BREEZE_MARKER).expect("marker");
        let dashboard = merged.find("Route::get('/dashboard'").expect("breeze route");
        assert!(shop < marker && marker < dashboard, "{merged}");
        assert!(merged.contains("use Illuminate\\Support\\Facades\\Route;"), "{merged}");
        assert_eq!(merged.matches("<?php").count(), 1, "{merged}");
    }

    #[test]
    fn setup_writes_answers() {
        let dir = tempfile::tempdir().unwrap();
        let env_path = dir.path().join(".env");
        let config = Config::default();
        let runner = RecordingRunner::new();
        let docker = Docker::new("docker");
        let options = Options {
            env_path: env_path.clone(),
            ..Options::default()
        };
        let ctx = Context {
            config: &config,
            runner: &runner,
            docker: &docker,
            options: &options,
        };
        let mut input = std::io::Cursor::new("shop\n\n8080\n");
        setup_with(&ctx, &mut input).unwrap();
        let text = std::fs::read_to_string(&env_path).unwrap();
        assert!(text.contains("PROJECT_NAME=shop"), "{text}");
        assert!(text.contains("CONTAINER_NAME=default_app"), "{text}");
        assert!(text.contains("SERVER_PORT=8080"), "{text}");
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn setup_rejects_bad_port() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let runner = RecordingRunner::new();
        let docker = Docker::new("docker");
        let options = Options {
            env_path: dir.path().join(".env"),
            ..Options::default()
        };
        let ctx = Context {
            config: &config,
            runner: &runner,
            docker: &docker,
            options: &options,
        };
        let mut input = std::io::Cursor::new("\n\n9000\n");
        let err = setup_with(&ctx, &mut input).unwrap_err();
        assert!(err.to_string().contains("unsupported server port"), "{err}");
    }
}
