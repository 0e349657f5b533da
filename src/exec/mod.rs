// ABOUTME: The seam between the sequencer and external programs.
// ABOUTME: Defines invocations, their output, and the CommandRunner trait.

mod dry_run;
mod error;
mod system;

pub use dry_run::DryRunRunner;
pub use error::{ExecError, ExecErrorKind, SpawnSnafu};
pub use system::SystemRunner;

use async_trait::async_trait;
use std::fmt;

/// A program and its arguments, ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    streamed: bool,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            streamed: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Mark a long-running command whose output should reach the terminal live.
    pub fn streamed(mut self) -> Self {
        self.streamed = true;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn argv(&self) -> &[String] {
        &self.args
    }

    pub fn is_streamed(&self) -> bool {
        self.streamed
    }

    /// Whether `needle` appears as a contiguous run of arguments.
    pub fn has_args(&self, needle: &[&str]) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.args
            .windows(needle.len())
            .any(|w| w.iter().zip(needle).all(|(a, b)| a == b))
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Output from a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, or `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    /// Standard output. Empty when the command was streamed.
    pub stdout: String,
    /// Standard error. Empty when the command was streamed.
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Exit code to propagate; signal terminations count as 1.
    pub fn code(&self) -> i32 {
        self.exit_code.unwrap_or(1)
    }
}

/// Runs external programs on behalf of the sequencer.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `invocation` to completion.
    ///
    /// Returns `Err` only if the program could not be started; a non-zero exit
    /// is reported through `CommandOutput`.
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, ExecError>;

    /// True when commands are only recorded, so their output says nothing
    /// about the host.
    fn is_dry_run(&self) -> bool {
        false
    }
}
