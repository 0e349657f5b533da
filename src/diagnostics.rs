// ABOUTME: Diagnostics accumulator for non-fatal findings during a deployment run.
// ABOUTME: Collects tolerated failures and health findings that never change the exit status.

/// Findings that are reported but never fail the run.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a finding. The user-facing copy is printed by `Output`.
    pub fn warn(&mut self, warning: Warning) {
        tracing::debug!(kind = ?warning.kind, "{}", warning.message);
        self.warnings.push(warning);
    }

    /// Findings in the order they were recorded.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Count the warnings of one kind.
    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }
}

/// A non-fatal finding collected during a run.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// A configuration value fell back to a hard-coded default.
    pub fn fallback(message: impl Into<String>) -> Self {
        Self::new(WarningKind::Fallback, message)
    }

    /// Stopping the previous containers failed.
    pub fn teardown(message: impl Into<String>) -> Self {
        Self::new(WarningKind::Teardown, message)
    }

    /// A host or status query could not be answered.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(WarningKind::Unavailable, message)
    }

    /// A configured container is missing, stopped or unhealthy.
    pub fn container(message: impl Into<String>) -> Self {
        Self::new(WarningKind::Container, message)
    }

    /// A configured port has no listening socket.
    pub fn port(message: impl Into<String>) -> Self {
        Self::new(WarningKind::Port, message)
    }

    /// The end-to-end health probe failed or was skipped.
    pub fn health(message: impl Into<String>) -> Self {
        Self::new(WarningKind::Health, message)
    }
}

/// Which part of the run produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    Fallback,
    Teardown,
    Unavailable,
    Container,
    Port,
    Health,
}
