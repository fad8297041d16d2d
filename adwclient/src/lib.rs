//! # adwclient - transport layer for the AdWords-style SOAP API
//!
//! This crate is the request/response core every service call goes through:
//! it builds the canonical envelope, executes it over HTTP with optional
//! gzip decompression and response caching, retries transient failures, and
//! classifies server-declared faults into typed errors.
//!
//! ## Architecture
//!
//! ```text
//! caller
//!   └── ServiceClient::call
//!         └── retry loop (RetryConfig)
//!               └── TransportExecutor::execute
//!                     ├── ResponseCache lookup (optional)
//!                     └── HttpTransport::send + gzip decompression
//!               └── envelope decode + fault classification (adwsoap)
//! ```
//!
//! All operations are synchronous and blocking. The client holds no mutable
//! per-call state, so it can be shared across threads; the cache and
//! telemetry collaborators must themselves be `Send + Sync`.
//!
//! ## Caching caveat
//!
//! A cache hit short-circuits before the network exchange and is treated as
//! an HTTP 200 by construction. Fault responses are never stored, so a
//! cached entry can never replay a fault, but a cached success is also
//! never re-validated against the remote service. See
//! [`TransportExecutor::execute`] for the details.
//!
//! ## Example
//!
//! ```rust,no_run
//! use adwclient::{ClientAuth, ServiceClient, ServiceEndpoint};
//!
//! let auth = ClientAuth {
//!     user_agent: "my-tool".to_string(),
//!     developer_token: "dev-token".to_string(),
//!     client_customer_id: Some("123-456-7890".to_string()),
//!     partial_failure: false,
//!     validate_only: false,
//! };
//! let client = ServiceClient::new(auth);
//! let endpoint = ServiceEndpoint::new(
//!     "https://ads.example.com/api/cm/v201809",
//!     "CampaignService",
//! );
//! let response = client.call(&endpoint, "get", b"<get><serviceSelector/></get>")?;
//! // response.body holds the inner payload, ready for entity decoding
//! # Ok::<(), adwclient::ClientError>(())
//! ```

mod client;
mod errors;
mod retry;
mod telemetry;
mod transport;

pub use client::{ClientAuth, ServiceClient, ServiceResponse};
pub use errors::{ClientError, TransportError};
pub use retry::{RetryConfig, TRANSIENT_INTERNAL_API_REASON, is_transient, with_retries};
pub use telemetry::{NoopTelemetry, Telemetry, TracingTelemetry};
pub use transport::{
    HttpOutcome, HttpReply, HttpTransport, ServiceEndpoint, TransportExecutor, UreqTransport,
};

/// User-Agent sent with every HTTP exchange.
pub const USER_AGENT: &str = concat!("adwclient/", env!("CARGO_PKG_VERSION"), " (gzip)");
