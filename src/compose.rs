// ABOUTME: Builders for the external commands a deployment run issues.
// ABOUTME: Covers docker-compose, docker engine, git and host inspection tools.

use crate::config::{BuildStrategy, DeployConfig, PruneScope, Settings};
use crate::exec::Invocation;
use std::path::PathBuf;

/// `docker-compose` bound to one compose file and env file.
#[derive(Debug, Clone)]
pub struct Compose {
    program: String,
    leading_args: Vec<String>,
    compose_file: PathBuf,
    env_file: PathBuf,
}

impl Compose {
    pub fn new(settings: &Settings, config: &DeployConfig) -> Self {
        let mut words = settings.compose_program().into_iter();
        let program = words.next().unwrap_or_else(|| "docker-compose".to_string());
        Self {
            program,
            leading_args: words.collect(),
            compose_file: config.compose_file.clone(),
            env_file: config.env_file.clone(),
        }
    }

    fn base(&self) -> Invocation {
        Invocation::new(&self.program)
            .args(self.leading_args.iter().cloned())
            .arg("-f")
            .arg(self.compose_file.display().to_string())
            .arg("--env-file")
            .arg(self.env_file.display().to_string())
    }

    pub fn down(&self) -> Invocation {
        self.base().arg("down").streamed()
    }

    /// Render the configuration without printing it; fails on invalid files.
    pub fn validate(&self) -> Invocation {
        self.base().args(["config", "--quiet"])
    }

    pub fn build(&self, strategy: BuildStrategy) -> Invocation {
        let inv = self.base().arg("build").streamed();
        match strategy {
            BuildStrategy::Cached => inv,
            BuildStrategy::NoCache => inv.arg("--no-cache"),
        }
    }

    pub fn up(&self) -> Invocation {
        self.base().args(["up", "-d"]).streamed()
    }

    pub fn ps(&self) -> Invocation {
        self.base().arg("ps")
    }
}

/// Docker engine commands.
pub mod docker {
    use super::*;

    /// Prune commands for the requested scope, build cache first.
    pub fn prune(scope: PruneScope) -> Vec<Invocation> {
        let flags = match scope {
            PruneScope::All => "-af",
            PruneScope::Dangling => "-f",
        };
        vec![
            Invocation::new("docker").args(["builder", "prune", flags]),
            Invocation::new("docker").args(["image", "prune", flags]),
        ]
    }

    pub fn inspect(container: &str) -> Invocation {
        Invocation::new("docker")
            .args(["inspect", "--type", "container", container])
    }

    pub fn logs(container: &str, tail: u32) -> Invocation {
        Invocation::new("docker")
            .args(["logs", "--tail"])
            .arg(tail.to_string())
            .arg(container)
    }
}

/// Version control commands.
pub mod git {
    use super::*;

    pub fn pull(branch: &str) -> Invocation {
        Invocation::new("git")
            .args(["pull", "origin", branch])
            .streamed()
    }
}

/// Host inspection commands for pre-flight and port diagnostics.
pub mod host {
    use super::*;

    pub fn disk_usage() -> Invocation {
        Invocation::new("df").args(["-h", "."])
    }

    pub fn memory_usage() -> Invocation {
        Invocation::new("free").arg("-h")
    }

    /// Listening TCP sockets, preferred tool first.
    pub fn listening_sockets() -> [Invocation; 2] {
        [
            Invocation::new("ss").arg("-tln"),
            Invocation::new("netstat").arg("-tln"),
        ]
    }
}
