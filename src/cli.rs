use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgGroup, ArgMatches, CommandFactory, FromArgMatches, Parser};
use larabox::{Action, ColorMode, Overrides, ServerPort};

const EXAMPLES: &str = "\
Examples:
  larabox --new shop                  scaffold /var/www/html/shop
  larabox -p shop -r                  serve project 'shop' and wait until it listens
  larabox -p shop --port8080 -k       stop the server on port 8080
  larabox -i -M Post Comment -c       start the stack, migrate, make models, clear caches
  larabox --clone acme/shop --yes     sync the project from github.com/acme/shop
  larabox --node --npm run dev        run npm in the <container>_node container
  larabox --dry-run --breeze          show every command without running it

Actions run in the order given; the first failure stops the rest.";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "larabox",
    version,
    about = "Drive a containerized Laravel development environment from the host",
    after_long_help = EXAMPLES
)]
#[command(group(
    ArgGroup::new("server_port")
        .args(["port8000", "port8008", "port8080"])
        .multiple(false)
))]
pub(crate) struct Cli {
    /// Override PROJECT_NAME for this invocation
    #[arg(short = 'p', long = "project", value_name = "NAME")]
    pub project: Option<String>,

    /// Override CONTAINER_NAME for this invocation
    #[arg(long = "container", value_name = "NAME")]
    pub container: Option<String>,

    /// Environment file to load (default: LARABOX_ENV_FILE or ./.env)
    #[arg(long = "env-file", value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Serve on port 8000
    #[arg(long = "port8000")]
    pub port8000: bool,

    /// Serve on port 8008
    #[arg(long = "port8008")]
    pub port8008: bool,

    /// Serve on port 8080
    #[arg(long = "port8080")]
    pub port8080: bool,

    /// Target the Node container (<container>_node)
    #[arg(long)]
    pub node: bool,

    /// Start `php artisan serve` in the background and wait until it listens
    #[arg(short = 'r', long)]
    pub run: bool,

    /// Stop the dev server on the configured port
    #[arg(short = 'k', long)]
    pub kill: bool,

    /// Scaffold a new Laravel project
    #[arg(long, value_name = "NAME")]
    pub new: Option<String>,

    /// Clone or sync the project from <host>/<user>/<repo>
    #[arg(long, value_name = "USER/REPO")]
    pub clone: Option<String>,

    /// Start the compose stack, wait for the database, run fresh migrations with seeders
    #[arg(short = 'i', long)]
    pub init: bool,

    /// Run migrations with seeders
    #[arg(short = 'm', long)]
    pub migrate: bool,

    /// Generate model, migration and controller for each name
    #[arg(short = 'M', long = "make-MMC", value_name = "NAME", num_args = 1..)]
    pub make_mmc: Option<Vec<String>>,

    /// Clear cache, config, view and route caches (in that order)
    #[arg(short = 'c', long)]
    pub clear: bool,

    /// Run `composer install`
    #[arg(long)]
    pub composer: bool,

    /// Install Laravel Breeze and merge the generated routes
    #[arg(long)]
    pub breeze: bool,

    /// Run `npm <args...>` in the Node container; consumes the rest of the line
    #[arg(long, value_name = "ARGS", num_args = 1.., allow_hyphen_values = true)]
    pub npm: Option<Vec<String>>,

    /// Open an interactive shell in the container
    #[arg(short = 's', long)]
    pub shell: bool,

    /// Edit PROJECT_NAME, CONTAINER_NAME and SERVER_PORT in the environment file
    #[arg(long)]
    pub setup: bool,

    /// Print diagnostics about docker and the effective configuration
    #[arg(long)]
    pub doctor: bool,

    /// Container start script: prepare the project, then exec CMD (default php-fpm)
    #[arg(long, value_name = "CMD", num_args = 0.., allow_hyphen_values = true)]
    pub entrypoint: Option<Vec<String>>,

    /// Answer yes to confirmation prompts
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Readiness bound for --run and --init (e.g. 90s, 2m)
    #[arg(long, value_name = "DURATION", default_value = "120s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,

    /// Print every command instead of executing it
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Print every command before executing it
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Suppress the startup banner
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Colorize output: auto|always|never
    #[arg(long, value_enum, value_name = "WHEN")]
    pub color: Option<ColorMode>,
}

/// Parse the argument vector, keeping the raw matches for flag positions.
pub(crate) fn parse_args<I, T>(args: I) -> Result<(Cli, ArgMatches), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = Cli::command().try_get_matches_from(args)?;
    let cli = Cli::from_arg_matches(&matches)?;
    Ok((cli, matches))
}

pub(crate) fn render_usage() -> String {
    Cli::command().render_usage().to_string()
}

/// Some clap errors (a flag missing its value, for one) are rendered without a usage line.
pub(crate) fn error_lacks_usage(e: &clap::Error) -> bool {
    e.use_stderr() && !e.render().to_string().contains("Usage:")
}

impl Cli {
    pub(crate) fn overrides(&self) -> Overrides {
        let port = if self.port8000 {
            Some(ServerPort::P8000)
        } else if self.port8008 {
            Some(ServerPort::P8008)
        } else if self.port8080 {
            Some(ServerPort::P8080)
        } else {
            None
        };
        Overrides {
            project: self.project.clone(),
            container: self.container.clone(),
            port,
            node: self.node,
        }
    }

    /// Actions in the order their flags appeared on the command line.
    pub(crate) fn planned_actions(&self, matches: &ArgMatches) -> Vec<Action> {
        let at = |id: &str| matches.index_of(id).unwrap_or(usize::MAX);
        let mut planned: Vec<(usize, Action)> = Vec::new();

        if self.run {
            planned.push((at("run"), Action::Run));
        }
        if self.kill {
            planned.push((at("kill"), Action::Kill));
        }
        if let Some(name) = &self.new {
            planned.push((at("new"), Action::New(name.clone())));
        }
        if let Some(slug) = &self.clone {
            planned.push((at("clone"), Action::Clone(slug.clone())));
        }
        if self.init {
            planned.push((at("init"), Action::Init));
        }
        if self.migrate {
            planned.push((at("migrate"), Action::Migrate));
        }
        if let Some(names) = &self.make_mmc {
            planned.push((at("make_mmc"), Action::MakeModels(names.clone())));
        }
        if self.clear {
            planned.push((at("clear"), Action::Clear));
        }
        if self.composer {
            planned.push((at("composer"), Action::Composer));
        }
        if self.breeze {
            planned.push((at("breeze"), Action::Breeze));
        }
        if let Some(args) = &self.npm {
            planned.push((at("npm"), Action::Npm(args.clone())));
        }
        if self.shell {
            planned.push((at("shell"), Action::Shell));
        }
        if self.setup {
            planned.push((at("setup"), Action::Setup));
        }
        if self.doctor {
            planned.push((at("doctor"), Action::Doctor));
        }

        planned.sort_by_key(|(idx, _)| *idx);
        planned.into_iter().map(|(_, a)| a).collect()
    }
}
