//! Effective configuration, built once per invocation: defaults, then the environment
//! file, then command-line overrides. Handlers receive it by reference and never mutate it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::envfile::EnvFile;
use crate::errors::{LaraboxError, Result};

pub const DEFAULT_PROJECT_NAME: &str = "default";
pub const DEFAULT_CONTAINER_NAME: &str = "default_app";
pub const DEFAULT_WEB_ROOT: &str = "/var/www/html";
pub const DEFAULT_DB_PORT: u16 = 3306;
pub const DEFAULT_GIT_HOST: &str = "github.com";
pub const NODE_SUFFIX: &str = "_node";

pub const KEY_PROJECT_NAME: &str = "PROJECT_NAME";
pub const KEY_CONTAINER_NAME: &str = "CONTAINER_NAME";
pub const KEY_SERVER_PORT: &str = "SERVER_PORT";
pub const KEY_WEB_ROOT: &str = "WEB_ROOT";
pub const KEY_DB_CONTAINER_NAME: &str = "DB_CONTAINER_NAME";
pub const KEY_DB_PORT: &str = "DB_PORT";
pub const KEY_GIT_HOST: &str = "GIT_HOST";

/// Ports `php artisan serve` may bind.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServerPort {
    #[default]
    P8000,
    P8008,
    P8080,
}

impl ServerPort {
    pub const ALL: [ServerPort; 3] = [ServerPort::P8000, ServerPort::P8008, ServerPort::P8080];

    pub fn number(self) -> u16 {
        match self {
            ServerPort::P8000 => 8000,
            ServerPort::P8008 => 8008,
            ServerPort::P8080 => 8080,
        }
    }

    pub fn from_number(n: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.number() == n)
    }
}

impl fmt::Display for ServerPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl FromStr for ServerPort {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim()
            .parse::<u16>()
            .ok()
            .and_then(ServerPort::from_number)
            .ok_or_else(|| format!("unsupported server port {s:?} (expected 8000, 8008 or 8080)"))
    }
}

/// Values given on the command line; each one beats the environment file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub project: Option<String>,
    pub container: Option<String>,
    pub port: Option<ServerPort>,
    pub node: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    project_name: String,
    container_name: String,
    server_port: ServerPort,
    web_root: String,
    db_container: String,
    db_port: u16,
    git_host: String,
    node: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            container_name: DEFAULT_CONTAINER_NAME.to_string(),
            server_port: ServerPort::default(),
            web_root: DEFAULT_WEB_ROOT.to_string(),
            db_container: format!("{DEFAULT_CONTAINER_NAME}_db"),
            db_port: DEFAULT_DB_PORT,
            git_host: DEFAULT_GIT_HOST.to_string(),
            node: false,
        }
    }
}

impl Config {
    /// Fold defaults, the (optional) environment file and CLI overrides into one config.
    ///
    /// The first invalid value is returned as an error.
    pub fn resolve(env: Option<&EnvFile>, overrides: &Overrides) -> Result<Self> {
        let (config, problems) = Self::resolve_lenient(env, overrides);
        match problems.into_iter().next() {
            Some(first) => Err(first),
            None => Ok(config),
        }
    }

    /// Like [`Config::resolve`], but an invalid value falls back to its default and is
    /// reported alongside the config instead of aborting.
    pub fn resolve_lenient(
        env: Option<&EnvFile>,
        overrides: &Overrides,
    ) -> (Self, Vec<LaraboxError>) {
        let origin: PathBuf = env
            .map(|f| f.path().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("<defaults>"));
        let file = |key: &str| env.and_then(|f| f.get_non_empty(key)).map(str::to_string);
        let mut problems = Vec::new();

        let project_name = overrides
            .project
            .clone()
            .or_else(|| file(KEY_PROJECT_NAME))
            .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string());
        let project_name = or_default(
            validate_project_name(&project_name).map(|()| project_name),
            DEFAULT_PROJECT_NAME.to_string(),
            &origin,
            &mut problems,
        );

        let container_name = overrides
            .container
            .clone()
            .or_else(|| file(KEY_CONTAINER_NAME))
            .unwrap_or_else(|| DEFAULT_CONTAINER_NAME.to_string());
        let container_name = or_default(
            validate_container_name(&container_name).map(|()| container_name),
            DEFAULT_CONTAINER_NAME.to_string(),
            &origin,
            &mut problems,
        );

        let server_port = match (overrides.port, file(KEY_SERVER_PORT)) {
            (Some(p), _) => p,
            (None, Some(raw)) => {
                or_default(raw.parse(), ServerPort::default(), &origin, &mut problems)
            }
            (None, None) => ServerPort::default(),
        };

        let web_root = file(KEY_WEB_ROOT)
            .map(|s| normalize_web_root(&s))
            .unwrap_or_else(|| DEFAULT_WEB_ROOT.to_string());
        let db_container = file(KEY_DB_CONTAINER_NAME).unwrap_or_else(|| {
            format!("{}_db", container_name.trim_end_matches(NODE_SUFFIX))
        });
        let db_port = match file(KEY_DB_PORT) {
            Some(raw) => or_default(
                raw.parse::<u16>()
                    .map_err(|_| format!("invalid {KEY_DB_PORT}: {raw:?}")),
                DEFAULT_DB_PORT,
                &origin,
                &mut problems,
            ),
            None => DEFAULT_DB_PORT,
        };
        let git_host = file(KEY_GIT_HOST).unwrap_or_else(|| DEFAULT_GIT_HOST.to_string());

        let config = Self {
            project_name,
            container_name,
            server_port,
            web_root,
            db_container,
            db_port,
            git_host,
            node: overrides.node,
        };
        (config, problems)
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn server_port(&self) -> ServerPort {
        self.server_port
    }

    pub fn web_root(&self) -> &str {
        &self.web_root
    }

    pub fn db_container(&self) -> &str {
        &self.db_container
    }

    pub fn db_port(&self) -> u16 {
        self.db_port
    }

    pub fn git_host(&self) -> &str {
        &self.git_host
    }

    /// Container targeted by exec calls; the Node variant always ends in `_node`.
    pub fn container(&self) -> String {
        if self.node {
            self.node_container()
        } else {
            self.container_name.clone()
        }
    }

    /// Container name as configured, without the Node suffix applied.
    pub fn base_container(&self) -> &str {
        &self.container_name
    }

    pub fn node_container(&self) -> String {
        with_node_suffix(&self.container_name)
    }

    /// `<WEB_ROOT>/<PROJECT_NAME>` inside the container.
    pub fn project_dir(&self) -> String {
        self.project_dir_for(&self.project_name)
    }

    pub fn project_dir_for(&self, name: &str) -> String {
        format!("{}/{}", self.web_root, name)
    }

    pub fn server_url(&self) -> String {
        format!("http://localhost:{}", self.server_port)
    }
}

fn or_default<T>(
    value: std::result::Result<T, String>,
    default: T,
    origin: &Path,
    problems: &mut Vec<LaraboxError>,
) -> T {
    value.unwrap_or_else(|message| {
        problems.push(LaraboxError::Config {
            path: origin.to_path_buf(),
            message,
        });
        default
    })
}

fn with_node_suffix(name: &str) -> String {
    if name.ends_with(NODE_SUFFIX) {
        name.to_string()
    } else {
        format!("{name}{NODE_SUFFIX}")
    }
}

fn normalize_web_root(s: &str) -> String {
    let t = s.trim_end_matches('/');
    if t.is_empty() {
        "/".to_string()
    } else {
        t.to_string()
    }
}

/// Project names become a single path component inside the web root.
pub fn validate_project_name(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("project name must not be empty".to_string());
    }
    if name == "." || name == ".." {
        return Err(format!("invalid project name: {name:?}"));
    }
    if name.starts_with('-') {
        return Err(format!("project name must not start with '-': {name:?}"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(format!(
            "project name must not contain path separators: {name:?}"
        ));
    }
    if name.chars().any(char::is_control) {
        return Err(format!(
            "project name must not contain control characters: {name:?}"
        ));
    }
    Ok(())
}

/// Docker container names: `[a-zA-Z0-9][a-zA-Z0-9_.-]*`.
pub fn validate_container_name(name: &str) -> std::result::Result<(), String> {
    let mut chars = name.chars();
    let first_ok = chars
        .next()
        .map(|c| c.is_ascii_alphanumeric())
        .unwrap_or(false);
    if first_ok && chars.all(|c| c.is_ascii_alphanumeric() || "_.-".contains(c)) {
        Ok(())
    } else {
        Err(format!("invalid container name: {name:?}"))
    }
}

/// True when `path` names an existing environment file.
pub fn env_file_present(path: &Path) -> bool {
    path.is_file()
}
