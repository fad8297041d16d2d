use adwcache::{DiskCache, MemoryCache, ResponseCache};
use tempfile::TempDir;

fn create_test_cache() -> (TempDir, DiskCache) {
    let temp_dir = tempfile::tempdir().unwrap();
    let cache = DiskCache::new(temp_dir.path()).unwrap();
    (temp_dir, cache)
}

fn key(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

#[test]
fn test_disk_cache_creation() {
    let (temp_dir, cache) = create_test_cache();
    assert_eq!(cache.cache_dir(), temp_dir.path());
    assert!(temp_dir.path().exists());
}

#[test]
fn test_disk_cache_round_trip() {
    let (_temp_dir, cache) = create_test_cache();
    let k = key(&["https://ads.example.com/api/CampaignService", "tok", "get", "<get/>"]);

    assert!(cache.get(&k).is_none());
    cache.set(&k, b"<getResponse/>");
    assert_eq!(cache.get(&k).unwrap(), b"<getResponse/>");
}

#[test]
fn test_disk_cache_single_byte_key_sensitivity() {
    let (_temp_dir, cache) = create_test_cache();
    let a = key(&["url", "tok", "get", "<sel>a</sel>"]);
    let b = key(&["url", "tok", "get", "<sel>b</sel>"]);

    cache.set(&a, b"response-a");
    assert!(cache.get(&b).is_none());
}

#[test]
fn test_disk_cache_survives_reopen() {
    let temp_dir = tempfile::tempdir().unwrap();
    let k = key(&["url", "tok", "get", "<get/>"]);

    let cache = DiskCache::new(temp_dir.path()).unwrap();
    cache.set(&k, b"persisted");
    drop(cache);

    let cache = DiskCache::new(temp_dir.path()).unwrap();
    assert_eq!(cache.get(&k).unwrap(), b"persisted");
}

#[test]
fn test_cache_kinds() {
    let (_temp_dir, disk) = create_test_cache();
    assert_eq!(disk.kind(), "disk");
    assert_eq!(MemoryCache::new().kind(), "memory");
}
