//! In-memory keyed store with per-entry expiry.
//!
//! Values are type-erased at the store boundary and handed back as `Arc<T>`,
//! so a hit returns exactly what was stored. Expired entries are removed
//! lazily when read; nothing sweeps the map in the background.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};

/// A stored value and the instant it stops being valid.
#[derive(Clone)]
pub struct CacheEntry {
    data: Arc<dyn Any + Send + Sync>,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// An entry is valid strictly before its expiry instant.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl std::fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// TTL cache for a small number of named entries.
///
/// Each `set` replaces the whole entry under the write lock, so readers never
/// observe a partial write. Concurrent `set` on one key is last-writer-wins.
#[derive(Debug, Default)]
pub struct TtlCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a valid value for `key`.
    ///
    /// Returns `None` when the key is absent, expired, or holds a value of a
    /// different type.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.get_at(key, Utc::now())
    }

    /// Like [`TtlCache::get`], evaluated at `now`.
    pub fn get_at<T: Any + Send + Sync>(&self, key: &str, now: DateTime<Utc>) -> Option<Arc<T>> {
        {
            let entries = self.entries.read().unwrap();
            match entries.get(key) {
                None => return None,
                Some(entry) if entry.is_valid_at(now) => {
                    return Arc::clone(&entry.data).downcast::<T>().ok();
                }
                Some(_) => {}
            }
        }

        // Expired: drop it, unless another writer replaced it in between.
        let mut entries = self.entries.write().unwrap();
        if entries
            .get(key)
            .is_some_and(|entry| !entry.is_valid_at(now))
        {
            entries.remove(key);
        }
        None
    }

    /// Store `value` under `key` for `ttl`, returning the stored handle.
    pub fn set<T: Any + Send + Sync>(&self, key: &str, value: T, ttl: Duration) -> Arc<T> {
        self.set_at(key, value, ttl, Utc::now())
    }

    /// Like [`TtlCache::set`], with the TTL counted from `now`.
    pub fn set_at<T: Any + Send + Sync>(
        &self,
        key: &str,
        value: T,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Arc<T> {
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let data = Arc::new(value);
        let entry = CacheEntry {
            data: data.clone(),
            expires_at,
        };
        self.entries.write().unwrap().insert(key.to_string(), entry);
        data
    }

    /// Remove a single entry.
    pub fn invalidate(&self, key: &str) {
        self.entries.write().unwrap().remove(key);
    }

    /// Remove every entry.
    pub fn invalidate_all(&self) {
        self.entries.write().unwrap().clear();
    }

    /// Number of stored entries, including expired ones not yet read.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_get_absent() {
        let cache = TtlCache::new();
        assert!(cache.get::<String>("missing").is_none());
    }

    #[test]
    fn test_set_and_get() {
        let cache = TtlCache::new();
        cache.set("greeting", "hello".to_string(), Duration::from_secs(60));

        let value = cache.get::<String>("greeting").unwrap();
        assert_eq!(value.as_str(), "hello");
    }

    #[test]
    fn test_hit_returns_same_allocation() {
        let cache = TtlCache::new();
        cache.set_at("k", vec![1, 2, 3], Duration::from_secs(60), t0());

        let a = cache.get_at::<Vec<i32>>("k", t0()).unwrap();
        let b = cache.get_at::<Vec<i32>>("k", t0()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_set_returns_stored_handle() {
        let cache = TtlCache::new();
        let stored = cache.set_at("k", vec![1, 2, 3], Duration::from_secs(60), t0());

        let read = cache.get_at::<Vec<i32>>("k", t0()).unwrap();
        assert!(Arc::ptr_eq(&stored, &read));
    }

    #[test]
    fn test_cached_empty_value_is_a_hit() {
        let cache = TtlCache::new();
        cache.set_at("empty", Vec::<i32>::new(), Duration::from_secs(60), t0());

        let value = cache.get_at::<Vec<i32>>("empty", t0());
        assert!(value.is_some());
        assert!(value.unwrap().is_empty());
    }

    #[test]
    fn test_expiry_is_exclusive() {
        let cache = TtlCache::new();
        cache.set_at("k", 1u32, Duration::from_secs(10), t0());

        let just_before = t0() + chrono::Duration::milliseconds(9_999);
        assert_eq!(*cache.get_at::<u32>("k", just_before).unwrap(), 1);

        let at_expiry = t0() + chrono::Duration::seconds(10);
        assert!(cache.get_at::<u32>("k", at_expiry).is_none());
    }

    #[test]
    fn test_expired_entry_is_removed_on_read() {
        let cache = TtlCache::new();
        cache.set_at("k", 1u32, Duration::from_secs(1), t0());
        assert_eq!(cache.len(), 1);

        let later = t0() + chrono::Duration::seconds(5);
        assert!(cache.get_at::<u32>("k", later).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_wrong_type_is_absent_but_kept() {
        let cache = TtlCache::new();
        cache.set_at("k", 1u32, Duration::from_secs(60), t0());

        assert!(cache.get_at::<String>("k", t0()).is_none());
        assert_eq!(*cache.get_at::<u32>("k", t0()).unwrap(), 1);
    }

    #[test]
    fn test_set_replaces_value_and_expiry() {
        let cache = TtlCache::new();
        cache.set_at("k", 1u32, Duration::from_secs(1), t0());
        cache.set_at("k", 2u32, Duration::from_secs(60), t0());

        let later = t0() + chrono::Duration::seconds(30);
        assert_eq!(*cache.get_at::<u32>("k", later).unwrap(), 2);
    }

    #[test]
    fn test_invalidate() {
        let cache = TtlCache::new();
        cache.set("a", 1u32, Duration::from_secs(60));
        cache.set("b", 2u32, Duration::from_secs(60));

        cache.invalidate("a");
        assert!(cache.get::<u32>("a").is_none());
        assert_eq!(*cache.get::<u32>("b").unwrap(), 2);

        // Unknown key is a no-op
        cache.invalidate("zzz");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_all() {
        let cache = TtlCache::new();
        cache.set("a", 1u32, Duration::from_secs(60));
        cache.set("b", 2u32, Duration::from_secs(60));

        cache.invalidate_all();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let cache = TtlCache::new();
        cache.set_at("k", 1u32, Duration::from_secs(u64::MAX), t0());
        assert!(cache.get_at::<u32>("k", t0()).is_some());
    }

    #[test]
    fn test_instances_are_isolated() {
        let a = TtlCache::new();
        let b = TtlCache::new();
        a.set("k", 1u32, Duration::from_secs(60));
        assert!(b.get::<u32>("k").is_none());
    }
}
