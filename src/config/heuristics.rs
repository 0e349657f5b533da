// ABOUTME: Name-based defaults inferred from the environment identifier.
// ABOUTME: Maps identifiers like "prod" or "staging-eu" to a branch and display name.

use std::path::Path;

/// Well-known environment families recognised by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentKind {
    Production,
    Staging,
    Development,
    Testing,
}

impl EnvironmentKind {
    /// Classify an identifier by prefix, case-insensitively.
    pub fn infer(identifier: &str) -> Option<Self> {
        let id = identifier.to_ascii_lowercase();
        if id.starts_with("prod") || id == "live" {
            Some(EnvironmentKind::Production)
        } else if id.starts_with("stag") {
            Some(EnvironmentKind::Staging)
        } else if id.starts_with("dev") {
            Some(EnvironmentKind::Development)
        } else if id.starts_with("test") || id == "qa" {
            Some(EnvironmentKind::Testing)
        } else {
            None
        }
    }

    pub fn default_branch(&self) -> &'static str {
        match self {
            EnvironmentKind::Production => "main",
            EnvironmentKind::Staging => "staging",
            EnvironmentKind::Development => "develop",
            EnvironmentKind::Testing => "test",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EnvironmentKind::Production => "Production",
            EnvironmentKind::Staging => "Staging",
            EnvironmentKind::Development => "Development",
            EnvironmentKind::Testing => "Testing",
        }
    }
}

/// Derive the environment identifier from an env-file path.
///
/// `.env.staging` gives `staging`, `production.env` gives `production`, and a
/// bare `.env` gives `default`.
pub fn identifier_from_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let id = if let Some(rest) = file_name.strip_prefix(".env.") {
        rest
    } else if let Some(rest) = file_name.strip_suffix(".env") {
        rest
    } else {
        file_name.as_str()
    };

    if id.is_empty() {
        "default".to_string()
    } else {
        id.to_string()
    }
}
