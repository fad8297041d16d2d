//! Telemetry collaborator recorded on every transport exchange.

use std::time::Duration;

use tracing::debug;

/// Sink for per-call transport measurements.
///
/// `record` is invoked once per [`execute`](crate::TransportExecutor::execute)
/// call, on every exit path including cache hits and errors. Implementations
/// must not block and must not panic; the transport treats this as a
/// fire-and-forget side effect.
pub trait Telemetry: Send + Sync {
    fn record(&self, endpoint: &str, cache_hit: bool, cache_kind: &str, elapsed: Duration);
}

/// Default sink: emits a `tracing` debug event per call.
#[derive(Debug, Default)]
pub struct TracingTelemetry;

impl Telemetry for TracingTelemetry {
    fn record(&self, endpoint: &str, cache_hit: bool, cache_kind: &str, elapsed: Duration) {
        debug!(
            endpoint,
            cache_hit,
            cache_kind,
            elapsed_ms = elapsed.as_millis() as u64,
            "API call completed"
        );
    }
}

/// Discards all measurements.
#[derive(Debug, Default)]
pub struct NoopTelemetry;

impl Telemetry for NoopTelemetry {
    fn record(&self, _endpoint: &str, _cache_hit: bool, _cache_kind: &str, _elapsed: Duration) {}
}
