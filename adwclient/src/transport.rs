//! Transport executor: cache lookup, HTTP exchange, gzip, telemetry.

use std::fmt;
use std::io::Read;
use std::sync::Arc;
use std::time::Instant;

use adwcache::ResponseCache;
use tracing::debug;
use ureq::Agent;

use crate::errors::TransportError;
use crate::telemetry::{Telemetry, TracingTelemetry};

/// Address of one service: base URL plus service name.
///
/// Immutable; resolves to a single URL by concatenation. An empty service
/// name resolves to the base URL alone (report-download style endpoints).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub base_url: String,
    pub service_name: String,
}

impl ServiceEndpoint {
    pub fn new(base_url: impl Into<String>, service_name: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            service_name: service_name.into(),
        }
    }

    /// Full URL of the service.
    pub fn url(&self) -> String {
        if self.service_name.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, self.service_name)
        }
    }
}

impl fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

/// One raw HTTP response as seen by the executor.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub content_encoding: Option<String>,
    pub body: Vec<u8>,
}

/// The HTTP layer underneath the executor.
///
/// Kept behind a trait so tests can script exchanges; production code uses
/// [`UreqTransport`]. Implementations must return the body for error
/// statuses too, since fault bodies on 4xx/5xx carry the information the
/// classifier needs.
pub trait HttpTransport: Send + Sync {
    fn send(
        &self,
        url: &str,
        headers: &[(&str, String)],
        body: &[u8],
    ) -> Result<HttpReply, TransportError>;
}

/// Blocking HTTP transport backed by a `ureq` agent.
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        // 4xx/5xx must not become Error::StatusCode: the SOAP fault body
        // of an HTTP 500 still has to be readable.
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport for UreqTransport {
    fn send(
        &self,
        url: &str,
        headers: &[(&str, String)],
        body: &[u8],
    ) -> Result<HttpReply, TransportError> {
        let mut request = self.agent.post(url);
        for (name, value) in headers {
            // ureq derives Content-Length from the body it is handed.
            if name.eq_ignore_ascii_case("Content-Length") {
                continue;
            }
            request = request.header(*name, value.as_str());
        }

        let mut response = request.send(body).map_err(|e| TransportError::Http {
            url: url.to_string(),
            source: e,
        })?;

        let status = response.status().as_u16();
        let content_encoding = response
            .headers()
            .get("Content-Encoding")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| TransportError::Read {
                url: url.to_string(),
                source: e,
            })?;

        Ok(HttpReply {
            status,
            content_encoding,
            body,
        })
    }
}

/// Status-dispatched exchange result.
///
/// Derived once from the numeric status code: 400, 401, 403 and 405 are
/// client faults, 500 is a server fault, everything else passes through as
/// success regardless of body content. Only the fault variants are ever
/// inspected by the fault classifier.
#[derive(Debug, Clone)]
pub enum HttpOutcome {
    Success { status: u16, body: Vec<u8> },
    ClientFault { status: u16, body: Vec<u8> },
    ServerFault { status: u16, body: Vec<u8> },
}

impl HttpOutcome {
    pub fn from_status(status: u16, body: Vec<u8>) -> Self {
        match status {
            400 | 401 | 403 | 405 => HttpOutcome::ClientFault { status, body },
            500 => HttpOutcome::ServerFault { status, body },
            _ => HttpOutcome::Success { status, body },
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            HttpOutcome::Success { status, .. }
            | HttpOutcome::ClientFault { status, .. }
            | HttpOutcome::ServerFault { status, .. } => *status,
        }
    }

    pub fn body(&self) -> &[u8] {
        match self {
            HttpOutcome::Success { body, .. }
            | HttpOutcome::ClientFault { body, .. }
            | HttpOutcome::ServerFault { body, .. } => body,
        }
    }
}

/// Executes one canonical request: cache, network, gzip, telemetry.
pub struct TransportExecutor {
    http: Arc<dyn HttpTransport>,
    cache: Option<Arc<dyn ResponseCache>>,
    cache_token: String,
    telemetry: Arc<dyn Telemetry>,
}

impl TransportExecutor {
    pub fn new(http: Arc<dyn HttpTransport>) -> Self {
        Self {
            http,
            cache: None,
            cache_token: String::new(),
            telemetry: Arc::new(TracingTelemetry),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Token mixed into every cache key, segmenting entries per credential.
    pub fn with_cache_token(mut self, token: impl Into<String>) -> Self {
        self.cache_token = token.into();
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Send one canonical request and return the status-dispatched outcome.
    ///
    /// A cache hit returns `Success { status: 200 }` without touching the
    /// network: a cached entry was stored from a successful exchange, so it
    /// is never re-classified. Fault and 503 responses are never stored.
    /// Telemetry is recorded on every exit path, errors included.
    pub fn execute(
        &self,
        endpoint: &ServiceEndpoint,
        action: &str,
        request: &[u8],
    ) -> Result<HttpOutcome, TransportError> {
        let url = endpoint.url();
        let mut scope = TelemetryScope {
            telemetry: Arc::clone(&self.telemetry),
            endpoint: endpoint.service_name.clone(),
            cache_hit: false,
            cache_kind: self.cache.as_deref().map(|c| c.kind()).unwrap_or("none"),
            start: Instant::now(),
        };

        // The request part is hex encoded: the canonical bytes are usually
        // UTF-8 XML, but the key must stay distinct for any byte change,
        // including sequences a lossy string conversion would collapse.
        let key = vec![
            url.clone(),
            self.cache_token.clone(),
            action.to_string(),
            hex::encode(request),
        ];

        if let Some(cache) = &self.cache
            && let Some(body) = cache.get(&key)
        {
            scope.cache_hit = true;
            debug!(%url, action, "Serving response from cache");
            return Ok(HttpOutcome::Success { status: 200, body });
        }

        let headers: [(&str, String); 6] = [
            ("Accept", "text/xml".to_string()),
            ("Accept-Encoding", "gzip".to_string()),
            ("Content-Type", "text/xml;charset=UTF-8".to_string()),
            ("Content-Length", request.len().to_string()),
            ("SOAPAction", action.to_string()),
            ("User-Agent", crate::USER_AGENT.to_string()),
        ];
        let reply = self.http.send(&url, &headers, request)?;

        let body = match reply.content_encoding.as_deref() {
            Some(enc) if enc.eq_ignore_ascii_case("gzip") => gunzip(&reply.body)?,
            _ => reply.body,
        };

        if reply.status == 503 {
            return Err(TransportError::ServiceUnavailable(url));
        }

        let outcome = HttpOutcome::from_status(reply.status, body);
        if let (Some(cache), HttpOutcome::Success { body, .. }) = (&self.cache, &outcome) {
            cache.set(&key, body);
        }
        Ok(outcome)
    }
}

fn gunzip(bytes: &[u8]) -> Result<Vec<u8>, TransportError> {
    let mut out = Vec::new();
    flate2::read::GzDecoder::new(bytes)
        .read_to_end(&mut out)
        .map_err(TransportError::Gzip)?;
    Ok(out)
}

/// Records telemetry when dropped, which covers every exit path of
/// `execute` including early returns and `?` propagation.
struct TelemetryScope {
    telemetry: Arc<dyn Telemetry>,
    endpoint: String,
    cache_hit: bool,
    cache_kind: &'static str,
    start: Instant,
}

impl Drop for TelemetryScope {
    fn drop(&mut self) {
        self.telemetry.record(
            &self.endpoint,
            self.cache_hit,
            self.cache_kind,
            self.start.elapsed(),
        );
    }
}
