use adwsoap::{ApiFault, SoapError};
use thiserror::Error;

/// Network-level failure: connection, body read, or decompression.
///
/// Never classified further. The retry layer treats
/// [`TransportError::ServiceUnavailable`] as transient; everything else
/// terminates the call.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: ureq::Error,
    },

    #[error("Failed to read response body from {url}: {source}")]
    Read {
        url: String,
        #[source]
        source: ureq::Error,
    },

    #[error("Service Unavailable (HTTP 503) from {0}")]
    ServiceUnavailable(String),

    #[error("Failed to decompress gzip response: {0}")]
    Gzip(#[source] std::io::Error),
}

/// Everything a service call can fail with.
///
/// Exactly one of: a transport failure, a malformed envelope, or a declared
/// API fault. The classifying metadata (original fault payload, original
/// message) is preserved in each variant; nothing is downgraded to a
/// generic failure unless no structured information could be extracted.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Soap(#[from] SoapError),

    #[error(transparent)]
    Fault(#[from] ApiFault),
}
