//! Bounded retry loop for transient failures.

use std::time::Duration;

use adwsoap::{ApiFault, ApiFaultKind};
use tracing::warn;

use crate::errors::{ClientError, TransportError};

/// Reason code of the one server fault considered transient.
pub const TRANSIENT_INTERNAL_API_REASON: &str = "UNEXPECTED_INTERNAL_API_ERROR";

/// Retry behavior, passed in at construction; there is no process-wide
/// mutable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total number of attempts, the initial one included.
    pub max_attempts: u32,
    /// Fixed wait between attempts. No backoff, no jitter.
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            delay: Duration::from_secs(5),
        }
    }
}

/// Whether an error is worth retrying.
///
/// Transient errors are matched structurally, by exact code, never by
/// message substring:
/// - HTTP 503 from the transport, and
/// - an `InternalApiError` fault whose reason is exactly
///   [`TRANSIENT_INTERNAL_API_REASON`].
///
/// Every other classified fault, parse error and transport failure
/// terminates the loop on the first occurrence.
pub fn is_transient(error: &ClientError) -> bool {
    match error {
        ClientError::Transport(TransportError::ServiceUnavailable(_)) => true,
        ClientError::Fault(ApiFault::Classified {
            kind: ApiFaultKind::InternalApi,
            reason,
            ..
        }) => reason == TRANSIENT_INTERNAL_API_REASON,
        _ => false,
    }
}

/// Run `op` until it succeeds, fails non-transiently, or the attempt
/// ceiling is reached; the last error is returned on exhaustion. Sleeps
/// `config.delay` between attempts but not after the final one. The
/// closure receives the 1-based attempt number.
pub fn with_retries<T>(
    config: &RetryConfig,
    mut op: impl FnMut(u32) -> Result<T, ClientError>,
) -> Result<T, ClientError> {
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(error) if attempt < max_attempts && is_transient(&error) => {
                warn!(attempt, max_attempts, %error, "Transient error, retrying");
                std::thread::sleep(config.delay);
            }
            Err(error) => return Err(error),
        }
    }
}
