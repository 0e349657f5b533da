// ABOUTME: CommandRunner that records invocations instead of running them.
// ABOUTME: Backs the --dry-run flag; every command "succeeds" with empty output.

use super::{CommandOutput, CommandRunner, ExecError, Invocation};
use async_trait::async_trait;
use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct DryRunRunner {
    planned: Mutex<Vec<Invocation>>,
}

impl DryRunRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invocations recorded so far, in order.
    pub fn planned(&self) -> Vec<Invocation> {
        self.planned.lock().clone()
    }
}

#[async_trait]
impl CommandRunner for DryRunRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, ExecError> {
        tracing::debug!(command = %invocation, "dry run, not executing");
        self.planned.lock().push(invocation.clone());
        Ok(CommandOutput::ok(""))
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_in_order() {
        let runner = DryRunRunner::new();
        runner.run(&Invocation::new("git").arg("pull")).await.unwrap();
        runner
            .run(&Invocation::new("docker-compose").arg("up"))
            .await
            .unwrap();

        let planned = runner.planned();
        assert_eq!(planned.len(), 2);
        assert_eq!(planned[0].program(), "git");
        assert_eq!(planned[1].to_string(), "docker-compose up");
    }
}
