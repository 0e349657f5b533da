// ABOUTME: Findings gathered by the diagnostic steps of a run.
// ABOUTME: Diagnostics never affect the exit status; they are reported and returned.

use crate::diagnostics::Diagnostics;
use crate::inspect::ContainerState;
use crate::probe::ProbeOutcome;
use std::fmt;
use std::time::Duration;

/// What the per-container diagnosis found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerFinding {
    /// The runtime knows no container by this name.
    Missing,
    /// Inspect ran but its output could not be read.
    Unreadable(String),
    /// The container exists.
    Present {
        state: ContainerState,
        /// Log tail, captured when the container is not running.
        logs: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerReport {
    pub name: String,
    pub finding: ContainerFinding,
}

impl ContainerReport {
    pub fn is_running(&self) -> bool {
        matches!(&self.finding, ContainerFinding::Present { state, .. } if state.running)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortStatus {
    Listening,
    NotListening,
    /// Neither socket listing tool was available.
    Unknown,
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortStatus::Listening => f.write_str("listening"),
            PortStatus::NotListening => f.write_str("not listening"),
            PortStatus::Unknown => f.write_str("unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortReport {
    pub port: u16,
    pub status: PortStatus,
}

/// Result of the end-to-end health step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthReport {
    /// Skipped because the proxy container is not running.
    Skipped { proxy: String },
    /// A response arrived.
    Responded(ProbeOutcome),
    /// No usable response: timeout, connection or protocol failure.
    Failed { reason: String, timeout: Duration },
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthReport::Responded(outcome) if outcome.is_healthy())
    }
}

/// Everything a completed run observed.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub diagnostics: Diagnostics,
    pub containers: Vec<ContainerReport>,
    pub ports: Vec<PortReport>,
    pub health: Option<HealthReport>,
}

impl RunReport {
    pub fn container(&self, name: &str) -> Option<&ContainerReport> {
        self.containers.iter().find(|c| c.name == name)
    }

    pub fn port(&self, port: u16) -> Option<PortStatus> {
        self.ports.iter().find(|p| p.port == port).map(|p| p.status)
    }

    /// True when every diagnostic passed.
    pub fn all_healthy(&self) -> bool {
        let containers_ok = self.containers.iter().all(|c| match &c.finding {
            ContainerFinding::Present { state, .. } => {
                state.running && !state.health.is_unhealthy()
            }
            _ => false,
        });
        let ports_ok = self
            .ports
            .iter()
            .all(|p| p.status == PortStatus::Listening);
        let health_ok = self.health.as_ref().is_some_and(HealthReport::is_healthy);
        containers_ok && ports_ok && health_ok
    }
}
