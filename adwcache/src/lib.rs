//! # adwcache - pluggable response cache for the API transport
//!
//! A cache entry is the raw bytes of a previously received response, keyed
//! by the ordered parts of the outbound request (endpoint URL, segmentation
//! token, action name, canonical request bytes). Two requests that differ
//! in any byte of any part are distinct keys; there is no semantic
//! canonicalization beyond the deterministic serialization the transport
//! already performs.
//!
//! ## Implementations
//!
//! - [`MemoryCache`] : process-local map, gone on restart
//! - [`DiskCache`] : content-addressed files under a cache directory
//!
//! Both are safe for concurrent use; the transport imposes that on any
//! [`ResponseCache`] implementation since calls may come from several
//! threads at once.

mod disk;
mod memory;

pub use disk::DiskCache;
pub use memory::MemoryCache;

/// Store of raw request/response pairs consulted by the transport.
///
/// Entry lifetime is owned by the implementation: the transport never
/// invalidates, it only reads and writes.
pub trait ResponseCache: Send + Sync {
    /// Look up the response stored for this key, if any.
    fn get(&self, key: &[String]) -> Option<Vec<u8>>;

    /// Store a response under this key, replacing any previous entry.
    ///
    /// Failures are the implementation's problem; a store that cannot
    /// persist should behave as if the entry were immediately evicted.
    fn set(&self, key: &[String], value: &[u8]);

    /// Short label used in telemetry ("memory", "disk", ...).
    fn kind(&self) -> &'static str;
}

/// Derive the primary key for a list of key parts.
///
/// SHA-256 over the length-framed parts, truncated to 16 bytes and hex
/// encoded (32 characters). Length framing keeps `["ab","c"]` and
/// `["a","bc"]` distinct.
pub fn compute_pk(key: &[String]) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    for part in key {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    let digest = hasher.finalize();
    hex::encode(&digest[..16])
}
