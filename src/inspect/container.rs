// ABOUTME: Container state as reported by `docker inspect`.
// ABOUTME: Extracts run state, health status and restart count from the JSON array.

use serde::Deserialize;
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error("unreadable inspect output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("inspect returned no objects")]
    Empty,
}

/// Health as reported by the container's own healthcheck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthState {
    Healthy,
    Unhealthy,
    Starting,
    /// The image defines no healthcheck.
    NotConfigured,
    Other(String),
}

impl HealthState {
    fn from_status(status: &str) -> Self {
        match status {
            "healthy" => HealthState::Healthy,
            "unhealthy" => HealthState::Unhealthy,
            "starting" => HealthState::Starting,
            other => HealthState::Other(other.to_string()),
        }
    }

    pub fn is_unhealthy(&self) -> bool {
        matches!(self, HealthState::Unhealthy)
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthState::Healthy => f.write_str("healthy"),
            HealthState::Unhealthy => f.write_str("unhealthy"),
            HealthState::Starting => f.write_str("starting"),
            HealthState::NotConfigured => f.write_str("no healthcheck"),
            HealthState::Other(s) => f.write_str(s),
        }
    }
}

/// Snapshot of one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerState {
    /// Runtime status such as `running`, `exited` or `restarting`.
    pub status: String,
    pub running: bool,
    pub health: HealthState,
    pub restart_count: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawObject {
    state: RawState,
    #[serde(default)]
    restart_count: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawState {
    #[serde(default)]
    status: String,
    #[serde(default)]
    running: bool,
    #[serde(default)]
    health: Option<RawHealth>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawHealth {
    status: String,
}

/// Parse the JSON array printed by `docker inspect --type container NAME`.
pub fn parse_inspect(json: &str) -> Result<ContainerState, InspectError> {
    let objects: Vec<RawObject> = serde_json::from_str(json)?;
    let object = objects.into_iter().next().ok_or(InspectError::Empty)?;

    let health = match object.state.health {
        Some(h) => HealthState::from_status(&h.status),
        None => HealthState::NotConfigured,
    };

    Ok(ContainerState {
        status: object.state.status,
        running: object.state.running,
        health,
        restart_count: object.restart_count,
    })
}
