// ABOUTME: Tool settings loaded from an optional .redeploy.yml file.
// ABOUTME: Tunes delays, log tails, the compose command and the probe backend.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const SETTINGS_FILENAME: &str = ".redeploy.yml";
pub const SETTINGS_FILENAME_ALT: &str = ".redeploy.yaml";
pub const SETTINGS_FILENAME_DIR: &str = ".redeploy/config.yml";

/// Backend used for the end-to-end health probe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeBackend {
    /// Built-in HTTP client; `https` URLs are handed to curl.
    #[default]
    Native,
    /// Always shell out to curl.
    Curl,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default = "default_compose_command")]
    pub compose_command: String,

    #[serde(default = "default_settle_delay", with = "humantime_serde")]
    pub settle_delay: Duration,

    #[serde(default = "default_probe_delay", with = "humantime_serde")]
    pub probe_delay: Duration,

    #[serde(default = "default_probe_timeout", with = "humantime_serde")]
    pub probe_timeout: Duration,

    #[serde(default = "default_log_tail")]
    pub log_tail: u32,

    #[serde(default = "default_proxy_log_tail")]
    pub proxy_log_tail: u32,

    #[serde(default)]
    pub probe: ProbeBackend,
}

fn default_compose_command() -> String {
    "docker-compose".to_string()
}

fn default_settle_delay() -> Duration {
    Duration::from_secs(10)
}

fn default_probe_delay() -> Duration {
    Duration::from_secs(5)
}

fn default_probe_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_log_tail() -> u32 {
    50
}

fn default_proxy_log_tail() -> u32 {
    20
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            compose_command: default_compose_command(),
            settle_delay: default_settle_delay(),
            probe_delay: default_probe_delay(),
            probe_timeout: default_probe_timeout(),
            log_tail: default_log_tail(),
            proxy_log_tail: default_proxy_log_tail(),
            probe: ProbeBackend::default(),
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load the first settings file found in `dir`, or defaults when none exists.
    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(SETTINGS_FILENAME),
            dir.join(SETTINGS_FILENAME_ALT),
            dir.join(SETTINGS_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.is_file() {
                tracing::debug!("Loading settings from {}", path.display());
                return Self::load(path);
            }
        }

        Ok(Self::default())
    }

    /// Program and leading arguments of the compose command.
    pub fn compose_program(&self) -> Vec<String> {
        self.compose_command
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    /// Zero delays, for tests and dry runs.
    pub fn without_delays(mut self) -> Self {
        self.settle_delay = Duration::ZERO;
        self.probe_delay = Duration::ZERO;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.compose_command.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "compose_command cannot be empty".to_string(),
            ));
        }
        if self.probe_timeout.is_zero() {
            return Err(Error::InvalidConfig(
                "probe_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.compose_program(), vec!["docker-compose"]);
        assert_eq!(settings.settle_delay, Duration::from_secs(10));
        assert_eq!(settings.probe_delay, Duration::from_secs(5));
        assert_eq!(settings.probe_timeout, Duration::from_secs(10));
        assert_eq!(settings.log_tail, 50);
        assert_eq!(settings.proxy_log_tail, 20);
        assert_eq!(settings.probe, ProbeBackend::Native);
    }

    #[test]
    fn parses_humantime_durations() {
        let settings = Settings::from_yaml(
            "compose_command: docker compose\nsettle_delay: 1m 30s\nprobe: curl\n",
        )
        .unwrap();
        assert_eq!(settings.compose_program(), vec!["docker", "compose"]);
        assert_eq!(settings.settle_delay, Duration::from_secs(90));
        assert_eq!(settings.probe, ProbeBackend::Curl);
        assert_eq!(settings.probe_delay, Duration::from_secs(5));
    }

    #[test]
    fn empty_document_is_default() {
        let settings = Settings::from_yaml("\n").unwrap();
        assert_eq!(settings.log_tail, 50);
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(Settings::from_yaml("settle: 5s\n").is_err());
    }

    #[test]
    fn rejects_blank_compose_command() {
        let err = Settings::from_yaml("compose_command: \"  \"\n").unwrap_err();
        assert!(err.to_string().contains("compose_command"));
    }

    #[test]
    fn discover_without_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::discover(dir.path()).unwrap();
        assert_eq!(settings.compose_command, "docker-compose");
    }

    #[test]
    fn discover_prefers_primary_filename() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join(SETTINGS_FILENAME);
        let alternate = dir.path().join(SETTINGS_FILENAME_ALT);
        std::fs::write(primary, "log_tail: 5\n").unwrap();
        std::fs::write(alternate, "log_tail: 9\n").unwrap();
        let settings = Settings::discover(dir.path()).unwrap();
        assert_eq!(settings.log_tail, 5);
    }
}
