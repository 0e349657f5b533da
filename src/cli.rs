// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines the environment selector, overrides, and rebuild mode switches.

use clap::{ArgGroup, Parser};
use redeploy::config::{DeployFlags, RebuildMode};
use redeploy::error::Result;
use redeploy::output::OutputMode;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "redeploy")]
#[command(about = "Pull, rebuild and health-check a docker-compose deployment")]
#[command(version)]
#[command(group(ArgGroup::new("environment").required(true).args(["env", "env_file"])))]
pub struct Cli {
    /// Environment name; reads .env.<NAME> from the project directory
    #[arg(short, long, value_name = "NAME")]
    pub env: Option<String>,

    /// Environment file to read instead of .env.<NAME>
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Compose file (default: COMPOSE_FILE from the env file, then docker-compose.yml)
    #[arg(short = 'f', long, value_name = "PATH")]
    pub compose_file: Option<PathBuf>,

    /// Git branch to pull
    #[arg(short, long)]
    pub branch: Option<String>,

    /// URL probed after the containers are up
    #[arg(short = 'u', long, value_name = "URL")]
    pub health_url: Option<String>,

    /// Display name for the environment
    #[arg(short, long)]
    pub name: Option<String>,

    /// Rebuild images without cache after pruning dangling resources
    #[arg(long)]
    pub rebuild: bool,

    /// Restart containers without pulling or building
    #[arg(short, long, conflicts_with_all = ["rebuild", "clear_cache"])]
    pub restart_only: bool,

    /// Prune all build cache and images, then rebuild without cache
    #[arg(long)]
    pub clear_cache: bool,

    /// Directory to run all commands in (default: current directory)
    #[arg(short = 'C', long, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Tool settings file (default: .redeploy.yml in the project directory)
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Print the commands that would run without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print warnings, failures and the final result
    #[arg(short, long, conflicts_with = "json")]
    pub quiet: bool,

    /// Emit JSON lines instead of text
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }

    pub fn deploy_flags(&self) -> Result<DeployFlags> {
        Ok(DeployFlags {
            environment: self.env.clone(),
            env_file: self.env_file.clone(),
            compose_file: self.compose_file.clone(),
            branch: self.branch.clone(),
            health_url: self.health_url.clone(),
            name: self.name.clone(),
            mode: RebuildMode::from_flags(self.rebuild, self.restart_only, self.clear_cache)?,
        })
    }
}
