// ABOUTME: Process execution error types with SNAFU pattern.
// ABOUTME: Maps spawn failures to the exit codes a shell would report.

use snafu::Snafu;
use std::io::ErrorKind;

/// Failure to run an external program at all.
///
/// A program that runs and exits non-zero is not an `ExecError`; the caller
/// inspects the `CommandOutput` instead.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ExecError {
    #[snafu(display("failed to start `{program}`: {source}"))]
    Spawn {
        program: String,
        source: std::io::Error,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecErrorKind {
    /// The program is not installed or not on PATH.
    NotFound,
    /// The program exists but may not be executed.
    PermissionDenied,
    /// Any other spawn failure.
    Other,
}

impl ExecError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ExecErrorKind {
        match self {
            ExecError::Spawn { source, .. } => match source.kind() {
                ErrorKind::NotFound => ExecErrorKind::NotFound,
                ErrorKind::PermissionDenied => ExecErrorKind::PermissionDenied,
                _ => ExecErrorKind::Other,
            },
        }
    }

    /// Exit code a shell reports for the same failure.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ExecErrorKind::NotFound => 127,
            ExecErrorKind::PermissionDenied => 126,
            ExecErrorKind::Other => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_error(kind: ErrorKind) -> ExecError {
        ExecError::Spawn {
            program: "docker-compose".to_string(),
            source: std::io::Error::from(kind),
        }
    }

    #[test]
    fn missing_program_exits_127() {
        let err = spawn_error(ErrorKind::NotFound);
        assert_eq!(err.kind(), ExecErrorKind::NotFound);
        assert_eq!(err.exit_code(), 127);
        assert!(err.to_string().contains("docker-compose"));
    }

    #[test]
    fn permission_denied_exits_126() {
        assert_eq!(spawn_error(ErrorKind::PermissionDenied).exit_code(), 126);
    }

    #[test]
    fn other_failures_exit_1() {
        assert_eq!(spawn_error(ErrorKind::Interrupted).exit_code(), 1);
    }
}
