// ABOUTME: CommandRunner backed by real processes via tokio::process.
// ABOUTME: Captures output, or streams it to the terminal for long-running steps.

use super::error::{ExecError, SpawnSnafu};
use super::{CommandOutput, CommandRunner, Invocation};
use async_trait::async_trait;
use snafu::ResultExt;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Runs commands on the local host from a fixed working directory.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    working_dir: PathBuf,
    stream: bool,
}

impl SystemRunner {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            stream: false,
        }
    }

    /// Let streamed invocations write straight to the terminal.
    pub fn stream_output(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, ExecError> {
        let mut cmd = Command::new(invocation.program());
        cmd.args(invocation.argv())
            .current_dir(&self.working_dir)
            .stdin(Stdio::null());

        if self.stream && invocation.is_streamed() {
            let status = cmd
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .await
                .context(SpawnSnafu {
                    program: invocation.program(),
                })?;

            return Ok(CommandOutput {
                exit_code: status.code(),
                ..Default::default()
            });
        }

        let output = cmd
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .context(SpawnSnafu {
                program: invocation.program(),
            })?;

        let result = CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        tracing::debug!(
            command = %invocation,
            exit_code = ?result.exit_code,
            "command finished"
        );

        Ok(result)
    }
}
