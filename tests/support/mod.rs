// ABOUTME: Shared test helpers for integration tests.
// ABOUTME: Scripted command runner, fake health probe, and config builders.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use redeploy::config::{DeployConfig, DeployFlags, EnvFile, RebuildMode, Settings, resolve};
use redeploy::exec::{CommandOutput, CommandRunner, ExecError, Invocation};
use redeploy::probe::{HealthProbe, ProbeError, ProbeOutcome};
use std::path::Path;
use std::time::Duration;

enum Reply {
    Output(CommandOutput),
    Missing,
}

struct Rule {
    program: String,
    args: Vec<String>,
    reply: Reply,
}

impl Rule {
    fn matches(&self, invocation: &Invocation) -> bool {
        let needle: Vec<&str> = self.args.iter().map(String::as_str).collect();
        self.program == invocation.program() && invocation.has_args(&needle)
    }
}

/// Answers commands from canned rules and records every call.
///
/// Commands without a matching rule succeed with empty output.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Vec<Rule>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `output` to `program` invoked with `args` somewhere in its argv.
    pub fn on(mut self, program: &str, args: &[&str], output: CommandOutput) -> Self {
        self.rules.push(Rule {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            reply: Reply::Output(output),
        });
        self
    }

    /// Pretend `program` is not installed.
    pub fn missing(mut self, program: &str) -> Self {
        self.rules.push(Rule {
            program: program.to_string(),
            args: Vec::new(),
            reply: Reply::Missing,
        });
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().clone()
    }

    /// Index of the first call matching `program` and `args`.
    pub fn position(&self, program: &str, args: &[&str]) -> Option<usize> {
        self.calls
            .lock()
            .iter()
            .position(|c| c.program() == program && c.has_args(args))
    }

    pub fn called(&self, program: &str, args: &[&str]) -> bool {
        self.position(program, args).is_some()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, ExecError> {
        self.calls.lock().push(invocation.clone());

        match self.rules.iter().find(|r| r.matches(invocation)).map(|r| &r.reply) {
            Some(Reply::Output(output)) => Ok(output.clone()),
            Some(Reply::Missing) => Err(ExecError::Spawn {
                program: invocation.program().to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
            None => Ok(CommandOutput::ok("")),
        }
    }
}

/// Health probe with a fixed answer: a status code, or a timeout when `None`.
pub struct FakeProbe {
    status: Option<u16>,
    urls: Mutex<Vec<String>>,
}

impl FakeProbe {
    pub fn status(status: u16) -> Self {
        Self {
            status: Some(status),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn timing_out() -> Self {
        Self {
            status: None,
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }
}

#[async_trait]
impl HealthProbe for FakeProbe {
    async fn probe(&self, url: &str, timeout: Duration) -> Result<ProbeOutcome, ProbeError> {
        self.urls.lock().push(url.to_string());
        match self.status {
            Some(status) => Ok(ProbeOutcome {
                status,
                elapsed: Duration::from_millis(3),
            }),
            None => Err(ProbeError::Timeout(timeout)),
        }
    }
}

/// `docker inspect` output for one container.
pub fn inspect_json(status: &str, running: bool, health: Option<&str>, restarts: u64) -> String {
    let health = match health {
        Some(h) => format!(r#","Health":{{"Status":"{h}"}}"#),
        None => String::new(),
    };
    format!(
        r#"[{{"RestartCount":{restarts},"State":{{"Status":"{status}","Running":{running}{health}}}}}]"#
    )
}

pub fn running_json() -> String {
    inspect_json("running", true, None, 0)
}

/// Config for environment `staging` with the given env-file variables.
pub fn config_with(mode: RebuildMode, vars: &[(&str, &str)]) -> DeployConfig {
    let flags = DeployFlags {
        environment: Some("staging".to_string()),
        mode,
        ..Default::default()
    };
    let env: EnvFile = vars.iter().copied().collect();
    resolve(&flags, Path::new(".env.staging"), &env)
        .expect("config resolves")
        .config
}

/// Default settings with every delay removed.
pub fn fast_settings() -> Settings {
    Settings {
        probe_timeout: Duration::from_secs(2),
        ..Settings::default()
    }
    .without_delays()
}
