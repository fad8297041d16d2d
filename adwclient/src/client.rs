//! Service-client facade: encode, execute with retries, decode, classify.

use std::sync::Arc;

use adwcache::ResponseCache;
use adwsoap::{RequestHeader, ResponseHeader, classify_fault, decode_response, encode_request};
use tracing::debug;

use crate::errors::ClientError;
use crate::retry::{RetryConfig, with_retries};
use crate::telemetry::Telemetry;
use crate::transport::{
    HttpOutcome, HttpTransport, ServiceEndpoint, TransportExecutor, UreqTransport,
};

/// Cross-cutting request context serialized into every envelope header.
#[derive(Debug, Clone, Default)]
pub struct ClientAuth {
    pub user_agent: String,
    pub developer_token: String,
    pub client_customer_id: Option<String>,
    /// Ask the service to apply the operations it can and report errors
    /// for the rest instead of failing the whole batch.
    pub partial_failure: bool,
    /// Server-side validation without effecting changes.
    pub validate_only: bool,
}

impl ClientAuth {
    fn request_header(&self) -> RequestHeader {
        RequestHeader {
            user_agent: self.user_agent.clone(),
            developer_token: self.developer_token.clone(),
            client_customer_id: self.client_customer_id.clone(),
            partial_failure: self.partial_failure,
            validate_only: self.validate_only,
        }
    }
}

/// A successful call: response metadata plus the inner body bytes, ready
/// for entity-specific decoding by the caller.
#[derive(Debug, Clone)]
pub struct ServiceResponse {
    pub header: ResponseHeader,
    pub body: Vec<u8>,
}

/// Client for one set of credentials, usable against any service endpoint.
///
/// Holds no mutable per-call state; safe to share across threads as long
/// as the configured cache and telemetry collaborators are.
pub struct ServiceClient {
    auth: ClientAuth,
    executor: TransportExecutor,
    retry: RetryConfig,
}

impl ServiceClient {
    /// Client over the default `ureq` transport, without caching.
    pub fn new(auth: ClientAuth) -> Self {
        Self::with_transport(auth, Arc::new(UreqTransport::new()))
    }

    /// Client over a custom HTTP transport.
    pub fn with_transport(auth: ClientAuth, http: Arc<dyn HttpTransport>) -> Self {
        Self {
            auth,
            executor: TransportExecutor::new(http),
            retry: RetryConfig::default(),
        }
    }

    /// Enable response caching. Cached responses short-circuit the network
    /// exchange and bypass fault classification; see the crate docs.
    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.executor = self.executor.with_cache(cache);
        self
    }

    /// Segment cache entries by an opaque token (typically derived from
    /// the credential), so different identities never share entries.
    pub fn with_cache_token(mut self, token: impl Into<String>) -> Self {
        self.executor = self.executor.with_cache_token(token);
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.executor = self.executor.with_telemetry(telemetry);
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Invoke `action` on `endpoint` with an already-serialized operation
    /// payload.
    ///
    /// The payload is wrapped in the canonical envelope, sent with the
    /// retry policy, and the response body is returned as raw bytes after
    /// envelope decoding and fault classification.
    pub fn call(
        &self,
        endpoint: &ServiceEndpoint,
        action: &str,
        body: &[u8],
    ) -> Result<ServiceResponse, ClientError> {
        let request = encode_request(&endpoint.base_url, &self.auth.request_header(), body)?;
        debug!(
            %endpoint,
            action,
            request = %String::from_utf8_lossy(&request),
            "Outbound SOAP envelope"
        );

        with_retries(&self.retry, |_attempt| {
            self.exchange(endpoint, action, &request)
        })
    }

    fn exchange(
        &self,
        endpoint: &ServiceEndpoint,
        action: &str,
        request: &[u8],
    ) -> Result<ServiceResponse, ClientError> {
        let outcome = self.executor.execute(endpoint, action, request)?;
        let status = outcome.status();
        let (header, inner) = decode_response(outcome.body())?;
        debug!(
            %endpoint,
            status,
            request_id = %header.request_id,
            response = %String::from_utf8_lossy(outcome.body()),
            "Inbound SOAP envelope"
        );

        match outcome {
            HttpOutcome::Success { .. } => Ok(ServiceResponse {
                header,
                body: inner,
            }),
            HttpOutcome::ClientFault { .. } | HttpOutcome::ServerFault { .. } => {
                Err(ClientError::Fault(classify_fault(&inner)?))
            }
        }
    }
}
