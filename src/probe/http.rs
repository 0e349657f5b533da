// ABOUTME: Native HTTP/1 health probe built on hyper over a tokio TcpStream.
// ABOUTME: Plain http only; the whole exchange runs under one timeout.

use super::{HealthProbe, ProbeError, ProbeOutcome};
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::header::{HOST, USER_AGENT};
use hyper::{Method, Request, Uri};
use hyper_util::rt::TokioIo;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;

const USER_AGENT_VALUE: &str = concat!("redeploy/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, Default)]
pub struct HttpProbe;

impl HttpProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HealthProbe for HttpProbe {
    async fn probe(&self, url: &str, timeout: Duration) -> Result<ProbeOutcome, ProbeError> {
        let start = Instant::now();
        match tokio::time::timeout(timeout, fetch_status(url)).await {
            Ok(Ok(status)) => Ok(ProbeOutcome {
                status,
                elapsed: start.elapsed(),
            }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ProbeError::Timeout(timeout)),
        }
    }
}

async fn fetch_status(url: &str) -> Result<u16, ProbeError> {
    let uri: Uri = url
        .parse()
        .map_err(|_| ProbeError::InvalidUrl(url.to_string()))?;

    match uri.scheme_str() {
        Some("http") => {}
        Some(other) => return Err(ProbeError::UnsupportedScheme(other.to_string())),
        None => return Err(ProbeError::InvalidUrl(url.to_string())),
    }

    let host = uri
        .host()
        .ok_or_else(|| ProbeError::InvalidUrl(url.to_string()))?;
    let port = uri.port_u16().unwrap_or(80);
    let authority = uri
        .authority()
        .map(|a| a.to_string())
        .unwrap_or_else(|| host.to_string());
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");

    let stream = TcpStream::connect((host.trim_matches(['[', ']']), port))
        .await
        .map_err(ProbeError::Connect)?;
    let io = TokioIo::new(stream);

    let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await?;

    // Spawn connection handler
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!("health probe connection error: {}", e);
        }
    });

    let req = Request::builder()
        .method(Method::GET)
        .uri(path)
        .header(HOST, authority)
        .header(USER_AGENT, USER_AGENT_VALUE)
        .body(Empty::<Bytes>::new())?;

    let resp = sender.send_request(req).await?;
    let status = resp.status().as_u16();

    // Drain the body so the server sees a complete exchange
    resp.into_body().collect().await?;

    Ok(status)
}
