// ABOUTME: Deployment configuration and its resolution from flags, env file and defaults.
// ABOUTME: Resolution is pure; file-system validation happens in DeployConfig::load.

mod env_file;
mod heuristics;
mod mode;
mod settings;

pub use env_file::{EnvFile, EnvFileError};
pub use heuristics::{EnvironmentKind, identifier_from_path};
pub use mode::{BuildStrategy, PruneScope, RebuildMode};
pub use settings::{
    ProbeBackend, SETTINGS_FILENAME, SETTINGS_FILENAME_ALT, SETTINGS_FILENAME_DIR, Settings,
};

use crate::diagnostics::Warning;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_COMPOSE_FILE: &str = "docker-compose.yml";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_HEALTH_URL: &str = "http://localhost/health";
pub const DEFAULT_PROXY_CONTAINER: &str = "nginx-proxy";
pub const DEFAULT_PORTS: [u16; 2] = [80, 443];

/// Characters of the connection string ever shown to the user.
pub const CONNECTION_STRING_PREVIEW: usize = 50;

/// Values taken from the command line, before resolution.
#[derive(Debug, Clone, Default)]
pub struct DeployFlags {
    pub environment: Option<String>,
    pub env_file: Option<PathBuf>,
    pub compose_file: Option<PathBuf>,
    pub branch: Option<String>,
    pub health_url: Option<String>,
    pub name: Option<String>,
    pub mode: RebuildMode,
}

impl DeployFlags {
    /// Path of the env file relative to the project directory.
    ///
    /// An explicit `--env-file` wins over the `.env.<NAME>` convention.
    pub fn env_file_path(&self) -> Result<PathBuf> {
        match (&self.env_file, &self.environment) {
            (Some(path), _) => Ok(path.clone()),
            (None, Some(env)) if !env.trim().is_empty() => {
                Ok(PathBuf::from(format!(".env.{}", env.trim())))
            }
            _ => Err(Error::MissingEnvironment),
        }
    }
}

/// Fully resolved deployment configuration. Built once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
    pub environment: String,
    pub display_name: String,
    pub branch: String,
    pub env_file: PathBuf,
    pub compose_file: PathBuf,
    pub health_url: String,
    pub mode: RebuildMode,
    pub containers: Vec<String>,
    pub ports: Vec<u16>,
    pub proxy_container: String,
    pub database_url: Option<String>,
}

/// A resolved configuration and the fallbacks applied on the way.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub config: DeployConfig,
    pub warnings: Vec<Warning>,
}

impl DeployConfig {
    /// Validate inputs against the file system, read the env file, and resolve.
    ///
    /// Relative paths are interpreted against `project_dir`.
    pub fn load(project_dir: &Path, flags: &DeployFlags) -> Result<Resolution> {
        let env_file = flags.env_file_path()?;
        let env_path = project_dir.join(&env_file);
        if !env_path.is_file() {
            return Err(Error::EnvFileNotFound(env_path));
        }

        let vars = EnvFile::load(&env_path)?;
        tracing::debug!(
            "Read {} variable(s) from {}",
            vars.len(),
            env_path.display()
        );

        let resolution = resolve(flags, &env_file, &vars)?;

        let compose_path = project_dir.join(&resolution.config.compose_file);
        if !compose_path.is_file() {
            return Err(Error::ComposeFileNotFound(compose_path));
        }

        Ok(resolution)
    }

    /// The connection string cut down for display, if one is configured.
    pub fn database_preview(&self) -> Option<String> {
        self.database_url.as_deref().map(redact_connection_string)
    }
}

/// Merge flags, env-file variables, name heuristics and hard-coded fallbacks.
///
/// Pure: reads neither the process environment nor the file system.
pub fn resolve(flags: &DeployFlags, env_file: &Path, vars: &EnvFile) -> Result<Resolution> {
    let mut warnings = Vec::new();

    let environment = flags
        .environment
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| identifier_from_path(env_file));
    let kind = EnvironmentKind::infer(&environment);

    let branch = match non_empty(flags.branch.as_deref())
        .or_else(|| non_empty(vars.first_of(&["BRANCH", "GIT_BRANCH"])))
    {
        Some(b) => b.to_string(),
        None => match kind {
            Some(kind) => kind.default_branch().to_string(),
            None => {
                warnings.push(Warning::fallback(format!(
                    "no branch configured for '{environment}', using '{DEFAULT_BRANCH}'"
                )));
                DEFAULT_BRANCH.to_string()
            }
        },
    };

    let display_name = non_empty(flags.name.as_deref())
        .or_else(|| non_empty(vars.first_of(&["ENVIRONMENT_NAME", "ENV_NAME"])))
        .map(str::to_string)
        .or_else(|| kind.map(|k| k.display_name().to_string()))
        .unwrap_or_else(|| environment.clone());

    let health_url = match non_empty(flags.health_url.as_deref())
        .or_else(|| non_empty(vars.get("HEALTH_CHECK_URL")))
    {
        Some(url) => url.to_string(),
        None => match non_empty(vars.get("BASE_URL")) {
            Some(base) => format!("{}/health", base.trim_end_matches('/')),
            None => {
                warnings.push(Warning::fallback(format!(
                    "no health URL configured, using {DEFAULT_HEALTH_URL}"
                )));
                DEFAULT_HEALTH_URL.to_string()
            }
        },
    };

    let compose_file = flags
        .compose_file
        .clone()
        .or_else(|| vars.get("COMPOSE_FILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_COMPOSE_FILE));

    let proxy_container = vars
        .get("PROXY_CONTAINER")
        .unwrap_or(DEFAULT_PROXY_CONTAINER)
        .to_string();

    let containers = match vars.first_of(&["CONTAINERS", "CONTAINER_NAMES"]) {
        Some(list) => split_list(list).map(str::to_string).collect(),
        None => vec![proxy_container.clone()],
    };

    let ports = match vars.get("PORTS") {
        Some(list) => split_list(list)
            .map(|p| {
                p.parse::<u16>().map_err(|_| Error::InvalidValue {
                    key: "PORTS".to_string(),
                    value: p.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?,
        None => DEFAULT_PORTS.to_vec(),
    };

    let config = DeployConfig {
        environment,
        display_name,
        branch,
        env_file: env_file.to_path_buf(),
        compose_file,
        health_url,
        mode: flags.mode,
        containers,
        ports,
        proxy_container,
        database_url: vars.get("DATABASE_URL").map(str::to_string),
    };

    Ok(Resolution { config, warnings })
}

/// Keep only the first characters of a connection string.
pub fn redact_connection_string(value: &str) -> String {
    let mut chars = value.chars();
    let preview: String = chars.by_ref().take(CONNECTION_STRING_PREVIEW).collect();
    if chars.next().is_some() {
        format!("{preview}...")
    } else {
        preview
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
}
