// ABOUTME: Health probe that shells out to curl through the CommandRunner.
// ABOUTME: Used for https URLs and when the settings select the curl backend.

use super::{HealthProbe, ProbeError, ProbeOutcome};
use crate::exec::{CommandRunner, Invocation};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// curl's exit code for "operation timed out".
const CURL_TIMEOUT: i32 = 28;

pub struct CurlProbe {
    runner: Arc<dyn CommandRunner>,
}

impl CurlProbe {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn invocation(url: &str, timeout: Duration) -> Invocation {
        Invocation::new("curl")
            .args(["-sS", "-o", "/dev/null"])
            .args(["-w", "%{http_code}", "--max-time"])
            .arg(max_time(timeout))
            .arg(url)
    }
}

/// `--max-time` in seconds with millisecond precision.
///
/// curl treats 0 as "no limit", so anything shorter is rounded up to 1ms.
fn max_time(timeout: Duration) -> String {
    let millis = timeout.as_millis().max(1);
    format!("{}.{:03}", millis / 1000, millis % 1000)
}

#[async_trait]
impl HealthProbe for CurlProbe {
    async fn probe(&self, url: &str, timeout: Duration) -> Result<ProbeOutcome, ProbeError> {
        let start = Instant::now();
        let output = self.runner.run(&Self::invocation(url, timeout)).await?;

        match output.exit_code {
            Some(0) => {
                let status = output
                    .stdout
                    .trim()
                    .parse()
                    .map_err(|_| ProbeError::Curl {
                        code: 0,
                        stderr: format!("unexpected status output {:?}", output.stdout.trim()),
                    })?;
                Ok(ProbeOutcome {
                    status,
                    elapsed: start.elapsed(),
                })
            }
            Some(CURL_TIMEOUT) => Err(ProbeError::Timeout(timeout)),
            _ => Err(ProbeError::Curl {
                code: output.code(),
                stderr: output.stderr.trim().to_string(),
            }),
        }
    }
}
