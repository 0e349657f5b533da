// ABOUTME: End-to-end health probe: one timed HTTP GET against the health URL.
// ABOUTME: Native hyper client for http, curl for https or when configured.

mod curl;
mod http;

pub use curl::CurlProbe;
pub use http::HttpProbe;

use crate::config::ProbeBackend;
use crate::exec::{CommandRunner, ExecError};
use async_trait::async_trait;
use hyper::Uri;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid health URL: {0}")]
    InvalidUrl(String),

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connect(std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    #[error("failed to build request: {0}")]
    Request(#[from] hyper::http::Error),

    #[error("curl exited with code {code}: {stderr}")]
    Curl { code: i32, stderr: String },

    #[error(transparent)]
    Exec(#[from] ExecError),
}

/// Response to a completed probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub status: u16,
    pub elapsed: Duration,
}

impl ProbeOutcome {
    /// Informational, success and redirect codes count as healthy.
    pub fn is_healthy(&self) -> bool {
        (100..400).contains(&self.status)
    }
}

#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Issue a single GET to `url`, giving up after `timeout`.
    async fn probe(&self, url: &str, timeout: Duration) -> Result<ProbeOutcome, ProbeError>;
}

/// Picks the backend per URL: curl when configured or for https, hyper otherwise.
pub struct ProbeRouter {
    backend: ProbeBackend,
    native: HttpProbe,
    curl: CurlProbe,
}

impl ProbeRouter {
    pub fn new(backend: ProbeBackend, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            backend,
            native: HttpProbe::new(),
            curl: CurlProbe::new(runner),
        }
    }

    fn uses_curl(&self, url: &str) -> bool {
        if self.backend == ProbeBackend::Curl {
            return true;
        }
        // Unparsable URLs go to the native client, which reports them
        let Ok(uri) = url.parse::<Uri>() else {
            return false;
        };
        uri.scheme_str()
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("https"))
    }
}

#[async_trait]
impl HealthProbe for ProbeRouter {
    async fn probe(&self, url: &str, timeout: Duration) -> Result<ProbeOutcome, ProbeError> {
        if self.uses_curl(url) {
            self.curl.probe(url, timeout).await
        } else {
            self.native.probe(url, timeout).await
        }
    }
}
