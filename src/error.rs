// ABOUTME: Application-wide error types for redeploy.
// ABOUTME: Uses thiserror and maps every failure to the process exit code.

use crate::config::EnvFileError;
use crate::deploy::Step;
use crate::exec::ExecError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no environment given: pass --env NAME or --env-file PATH")]
    MissingEnvironment,

    #[error("environment file not found: {0}")]
    EnvFileNotFound(PathBuf),

    #[error("compose file not found: {0}")]
    ComposeFileNotFound(PathBuf),

    #[error("conflicting rebuild modes: {0}")]
    ConflictingModes(String),

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    EnvFile(#[from] EnvFileError),

    #[error("{step} failed: `{command}` exited with code {code}")]
    CommandFailed {
        step: Step,
        command: String,
        code: i32,
    },

    #[error("compose configuration is invalid: {0}")]
    ComposeInvalid(String),

    #[error("{step} failed: {source}")]
    Exec { step: Step, source: ExecError },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Exit status the process reports for this error.
    ///
    /// Configuration problems and compose validation exit with 1; failed
    /// commands surface their own exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::CommandFailed { code, .. } => *code,
            Error::Exec { source, .. } => source.exit_code(),
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_exit_with_one() {
        assert_eq!(Error::MissingEnvironment.exit_code(), 1);
        assert_eq!(
            Error::ComposeFileNotFound(PathBuf::from("docker-compose.yml")).exit_code(),
            1
        );
    }

    #[test]
    fn command_failure_surfaces_its_code() {
        let err = Error::CommandFailed {
            step: Step::SourceUpdate,
            command: "git pull origin main".to_string(),
            code: 128,
        };
        assert_eq!(err.exit_code(), 128);
        assert!(err.to_string().contains("git pull origin main"));
    }

    #[test]
    fn compose_validation_exits_with_one() {
        let err = Error::ComposeInvalid("services.web.image must be a string".to_string());
        assert_eq!(err.exit_code(), 1);
    }
}
