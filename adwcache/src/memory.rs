//! In-memory response cache.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::ResponseCache;

/// Process-local cache backed by a mutex-guarded map.
///
/// Entries live until the process exits; there is no eviction. Suitable
/// for batch runs and tests where the goal is only to avoid re-issuing
/// identical calls within one execution.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<Vec<String>, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl ResponseCache for MemoryCache {
    fn get(&self, key: &[String]) -> Option<Vec<u8>> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &[String], value: &[u8]) {
        self.entries.lock().insert(key.to_vec(), value.to_vec());
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_get_returns_stored_bytes() {
        let cache = MemoryCache::new();
        let k = key(&["url", "token", "get", "<req/>"]);
        assert!(cache.get(&k).is_none());

        cache.set(&k, b"<resp/>");
        assert_eq!(cache.get(&k).unwrap(), b"<resp/>");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_keys_do_not_collide() {
        let cache = MemoryCache::new();
        cache.set(&key(&["url", "t", "get", "<a/>"]), b"first");
        cache.set(&key(&["url", "t", "get", "<b/>"]), b"second");

        assert_eq!(cache.get(&key(&["url", "t", "get", "<a/>"])).unwrap(), b"first");
        assert_eq!(cache.get(&key(&["url", "t", "get", "<b/>"])).unwrap(), b"second");
    }

    #[test]
    fn test_set_replaces_existing_entry() {
        let cache = MemoryCache::new();
        let k = key(&["url", "t", "get", "<a/>"]);
        cache.set(&k, b"old");
        cache.set(&k, b"new");
        assert_eq!(cache.get(&k).unwrap(), b"new");
        assert_eq!(cache.len(), 1);
    }
}
