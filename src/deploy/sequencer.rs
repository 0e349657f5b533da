// ABOUTME: Runs the deployment pipeline step by step against a CommandRunner.
// ABOUTME: Decides per step whether a failure aborts the run, is tolerated, or is only reported.

use super::report::{
    ContainerFinding, ContainerReport, HealthReport, PortReport, PortStatus, RunReport,
};
use super::step::Step;
use crate::compose::{Compose, docker, git, host};
use crate::config::{BuildStrategy, DeployConfig, Settings};
use crate::diagnostics::Warning;
use crate::error::{Error, Result};
use crate::exec::{CommandOutput, CommandRunner, ExecError, Invocation};
use crate::inspect::{listening_ports, parse_inspect};
use crate::output::Output;
use crate::probe::HealthProbe;
use std::sync::Arc;
use std::time::Duration;

/// Executes one deployment run for a resolved configuration.
pub struct Sequencer<'a> {
    config: &'a DeployConfig,
    settings: &'a Settings,
    runner: Arc<dyn CommandRunner>,
    probe: Arc<dyn HealthProbe>,
    output: &'a Output,
    compose: Compose,
    carried: Vec<Warning>,
}

impl<'a> Sequencer<'a> {
    pub fn new(
        config: &'a DeployConfig,
        settings: &'a Settings,
        runner: Arc<dyn CommandRunner>,
        probe: Arc<dyn HealthProbe>,
        output: &'a Output,
    ) -> Self {
        Self {
            config,
            settings,
            runner,
            probe,
            output,
            compose: Compose::new(settings, config),
            carried: Vec::new(),
        }
    }

    /// Findings raised before the run, such as configuration fallbacks.
    /// They are printed with the announcement and counted in the report.
    pub fn with_warnings(mut self, warnings: Vec<Warning>) -> Self {
        self.carried = warnings;
        self
    }

    /// Run the whole pipeline.
    ///
    /// Returns `Err` for fatal failures only. Tolerated and diagnostic
    /// failures end up in the returned report.
    pub async fn run(&self) -> Result<RunReport> {
        let mut report = RunReport::default();

        self.announce();
        for warning in &self.carried {
            self.warn(&mut report, warning.clone());
        }
        self.update_source().await?;
        self.preflight(&mut report).await;
        self.teardown(&mut report).await;
        self.maintain_cache().await?;
        self.validate_compose().await?;
        self.bring_up().await?;
        self.settle().await;
        self.show_status(&mut report).await;

        // Recorded commands return nothing, so there is nothing to diagnose
        if self.runner.is_dry_run() {
            self.output
                .progress("Dry run, skipping container, port and health diagnostics");
            return Ok(report);
        }

        self.diagnose_containers(&mut report).await;
        self.diagnose_ports(&mut report).await;
        self.probe_health(&mut report).await;

        Ok(report)
    }

    fn announce(&self) {
        let config = self.config;
        self.output.section(&format!(
            "Deploying {} ({})",
            config.display_name, config.environment
        ));
        self.output.progress(&format!(
            "Started: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S %Z")
        ));
        self.output.progress(&format!("Branch: {}", config.branch));
        self.output.progress(&format!("Mode: {}", config.mode));
        self.output
            .progress(&format!("Env file: {}", config.env_file.display()));
        self.output
            .progress(&format!("Compose file: {}", config.compose_file.display()));
        self.output
            .progress(&format!("Health URL: {}", config.health_url));
        self.output
            .progress(&format!("Containers: {}", config.containers.join(", ")));
        if let Some(preview) = config.database_preview() {
            self.output.progress(&format!("Database: {preview}"));
        }
    }

    async fn update_source(&self) -> Result<()> {
        self.output.section("Updating source");
        if !self.config.mode.pulls_source() {
            self.output.progress("Restart only, skipping git pull");
            return Ok(());
        }

        self.run_checked(Step::SourceUpdate, git::pull(&self.config.branch))
            .await?;
        self.output
            .ok(&format!("Pulled origin/{}", self.config.branch));
        Ok(())
    }

    async fn preflight(&self, report: &mut RunReport) {
        self.output.section("Pre-flight checks");
        self.output.progress(&format!(
            "Host: {}",
            gethostname::gethostname().to_string_lossy()
        ));

        for inv in [host::disk_usage(), host::memory_usage()] {
            match self.exec(&inv, false).await {
                Ok(out) if out.success() => self.output.block(&inv.to_string(), &out.stdout),
                Ok(out) => self.warn(
                    report,
                    Warning::unavailable(format!("`{inv}` exited with code {}", out.code())),
                ),
                Err(e) => self.warn(report, Warning::unavailable(e.to_string())),
            }
        }
    }

    async fn teardown(&self, report: &mut RunReport) {
        self.output.section("Stopping containers");
        match self.exec(&self.compose.down(), true).await {
            Ok(out) if out.success() => self.output.ok("Containers stopped"),
            Ok(out) => self.warn(
                report,
                Warning::teardown(format!(
                    "stopping containers exited with code {}, continuing",
                    out.code()
                )),
            ),
            Err(e) => self.warn(
                report,
                Warning::teardown(format!("could not stop containers: {e}, continuing")),
            ),
        }
    }

    async fn maintain_cache(&self) -> Result<()> {
        let Some(scope) = self.config.mode.prune_scope() else {
            return Ok(());
        };

        self.output.section("Cleaning Docker cache");
        for inv in docker::prune(scope) {
            self.run_checked(Step::CacheMaintenance, inv).await?;
        }
        self.output.ok("Docker cache cleaned");
        Ok(())
    }

    async fn validate_compose(&self) -> Result<()> {
        self.output.section("Validating compose configuration");
        let inv = self.compose.validate();
        let out = self
            .exec(&inv, true)
            .await
            .map_err(|source| Error::Exec {
                step: Step::ConfigValidation,
                source,
            })?;

        if !out.success() {
            let detail = out.stderr.trim();
            return Err(Error::ComposeInvalid(if detail.is_empty() {
                format!("`{inv}` exited with code {}", out.code())
            } else {
                detail.to_string()
            }));
        }

        self.output.ok("Compose configuration is valid");
        Ok(())
    }

    async fn bring_up(&self) -> Result<()> {
        match self.config.mode.build_strategy() {
            Some(strategy) => {
                self.output.section(match strategy {
                    BuildStrategy::Cached => "Building images",
                    BuildStrategy::NoCache => "Building images without cache",
                });
                self.run_checked(Step::Build, self.compose.build(strategy))
                    .await?;
                self.output.ok("Images built");
            }
            None => self
                .output
                .progress("Restart only, starting containers without building"),
        }

        self.output.section("Starting containers");
        self.run_checked(Step::Start, self.compose.up()).await?;
        self.output.ok("Containers started");
        Ok(())
    }

    async fn settle(&self) {
        self.pause(self.settings.settle_delay, "for containers to start")
            .await;
    }

    async fn show_status(&self, report: &mut RunReport) {
        self.output.section("Container status");
        let inv = self.compose.ps();
        match self.exec(&inv, false).await {
            Ok(out) if out.success() => self.output.block(&inv.to_string(), &out.stdout),
            Ok(out) => self.warn(
                report,
                Warning::unavailable(format!("`{inv}` exited with code {}", out.code())),
            ),
            Err(e) => self.warn(report, Warning::unavailable(e.to_string())),
        }
    }

    async fn diagnose_containers(&self, report: &mut RunReport) {
        self.output.section("Container diagnostics");
        for name in &self.config.containers {
            let entry = ContainerReport {
                name: name.clone(),
                finding: self.inspect_container(name).await,
            };
            self.report_container(&entry, report);
            report.containers.push(entry);
        }
    }

    async fn inspect_container(&self, name: &str) -> ContainerFinding {
        let out = match self.exec(&docker::inspect(name), false).await {
            Ok(out) => out,
            Err(e) => return ContainerFinding::Unreadable(e.to_string()),
        };
        if !out.success() {
            return ContainerFinding::Missing;
        }

        match parse_inspect(&out.stdout) {
            Ok(state) => {
                let logs = if state.running {
                    None
                } else {
                    self.capture_logs(name, self.settings.log_tail).await
                };
                ContainerFinding::Present { state, logs }
            }
            Err(e) => ContainerFinding::Unreadable(e.to_string()),
        }
    }

    fn report_container(&self, entry: &ContainerReport, report: &mut RunReport) {
        let name = &entry.name;
        match &entry.finding {
            ContainerFinding::Missing => {
                self.output.fail(&format!("{name}: does not exist"));
                self.warn(
                    report,
                    Warning::container(format!("container {name} does not exist")),
                );
            }
            ContainerFinding::Unreadable(reason) => {
                self.output.fail(&format!("{name}: could not inspect"));
                self.warn(
                    report,
                    Warning::unavailable(format!("inspecting {name} failed: {reason}")),
                );
            }
            ContainerFinding::Present { state, logs } => {
                let line = format!(
                    "{name}: {}, health: {}, restarts: {}",
                    state.status, state.health, state.restart_count
                );
                if !state.running {
                    self.output.fail(&line);
                    if let Some(logs) = logs {
                        self.output.block(
                            &format!("{name} logs (last {} lines)", self.settings.log_tail),
                            logs,
                        );
                    }
                    self.warn(
                        report,
                        Warning::container(format!("container {name} is {}", state.status)),
                    );
                } else if state.health.is_unhealthy() {
                    self.output.fail(&line);
                    self.warn(
                        report,
                        Warning::container(format!("container {name} is unhealthy")),
                    );
                } else {
                    self.output.ok(&line);
                }
            }
        }
    }

    async fn diagnose_ports(&self, report: &mut RunReport) {
        if self.config.ports.is_empty() {
            return;
        }
        self.output.section("Port diagnostics");

        let mut listing = None;
        for inv in host::listening_sockets() {
            if let Ok(out) = self.exec(&inv, false).await
                && out.success()
            {
                listing = Some(listening_ports(&out.stdout));
                break;
            }
        }

        let Some(listening) = listing else {
            self.warn(
                report,
                Warning::unavailable("neither ss nor netstat could list sockets"),
            );
            for &port in &self.config.ports {
                report.ports.push(PortReport {
                    port,
                    status: PortStatus::Unknown,
                });
            }
            return;
        };

        for &port in &self.config.ports {
            let status = if listening.contains(&port) {
                self.output.ok(&format!("Port {port}: listening"));
                PortStatus::Listening
            } else {
                self.output.fail(&format!("Port {port}: not listening"));
                self.warn(
                    report,
                    Warning::port(format!("nothing is listening on port {port}")),
                );
                PortStatus::NotListening
            };
            report.ports.push(PortReport { port, status });
        }
    }

    async fn probe_health(&self, report: &mut RunReport) {
        self.output.section("Health check");
        let proxy = &self.config.proxy_container;

        let proxy_running = match report.container(proxy) {
            Some(entry) => entry.is_running(),
            None => matches!(
                self.inspect_container(proxy).await,
                ContainerFinding::Present { state, .. } if state.running
            ),
        };

        if !proxy_running {
            self.output
                .fail(&format!("{proxy} is not running, skipping health probe"));
            self.warn(
                report,
                Warning::health(format!("health probe skipped: {proxy} is not running")),
            );
            report.health = Some(HealthReport::Skipped {
                proxy: proxy.clone(),
            });
            return;
        }

        self.pause(self.settings.probe_delay, "before probing").await;

        let url = &self.config.health_url;
        let timeout = self.settings.probe_timeout;
        self.output.progress(&format!("GET {url}"));

        let health = match self.probe.probe(url, timeout).await {
            Ok(outcome) if outcome.is_healthy() => {
                self.output.ok(&format!(
                    "{url} responded {} in {}ms",
                    outcome.status,
                    outcome.elapsed.as_millis()
                ));
                HealthReport::Responded(outcome)
            }
            Ok(outcome) => {
                self.output
                    .fail(&format!("{url} responded {}", outcome.status));
                self.warn(
                    report,
                    Warning::health(format!("health check returned HTTP {}", outcome.status)),
                );
                self.dump_proxy_logs().await;
                HealthReport::Responded(outcome)
            }
            Err(e) => {
                self.output.fail(&format!("{url}: {e}"));
                let warning = Warning::health(format!("health check failed: {e}"));
                self.warn(report, warning);
                self.dump_proxy_logs().await;
                HealthReport::Failed {
                    reason: e.to_string(),
                    timeout,
                }
            }
        };
        report.health = Some(health);
    }

    async fn dump_proxy_logs(&self) {
        let proxy = &self.config.proxy_container;
        let tail = self.settings.proxy_log_tail;
        if let Some(logs) = self.capture_logs(proxy, tail).await {
            self.output
                .block(&format!("{proxy} logs (last {tail} lines)"), &logs);
        }
    }

    async fn capture_logs(&self, container: &str, tail: u32) -> Option<String> {
        match self.exec(&docker::logs(container, tail), false).await {
            // Container output is split across both streams
            Ok(out) if out.success() => Some(format!("{}{}", out.stdout, out.stderr)),
            Ok(out) => {
                tracing::debug!("docker logs {container} exited with code {}", out.code());
                None
            }
            Err(e) => {
                tracing::debug!("docker logs {container} failed: {e}");
                None
            }
        }
    }

    async fn pause(&self, delay: Duration, reason: &str) {
        if delay.is_zero() {
            return;
        }
        self.output.progress(&format!(
            "Waiting {}s {reason}...",
            delay.as_secs_f64()
        ));
        tokio::time::sleep(delay).await;
    }

    fn warn(&self, report: &mut RunReport, warning: Warning) {
        self.output.warning(&warning.message);
        report.diagnostics.warn(warning);
    }

    async fn exec(
        &self,
        inv: &Invocation,
        echo: bool,
    ) -> std::result::Result<CommandOutput, ExecError> {
        if echo {
            self.output.progress(&format!("$ {inv}"));
        }
        tracing::debug!(command = %inv, "running");
        self.runner.run(inv).await
    }

    /// Run a fatal step: spawn failures and non-zero exits abort the run.
    async fn run_checked(&self, step: Step, inv: Invocation) -> Result<CommandOutput> {
        let out = self
            .exec(&inv, true)
            .await
            .map_err(|source| Error::Exec { step, source })?;

        if !out.success() {
            if !out.stderr.trim().is_empty() {
                self.output.block(&format!("{inv} (stderr)"), &out.stderr);
            }
            return Err(Error::CommandFailed {
                step,
                command: inv.to_string(),
                code: out.code(),
            });
        }

        Ok(out)
    }
}
