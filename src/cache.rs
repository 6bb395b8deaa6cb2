//! Bounded LRU cache shared by report rendering workers
//!
//! Parsed test-case tables are large; resolving many cases of the same
//! component would otherwise re-read the same CSV file over and over.

use lru::LruCache;
use std::borrow::Borrow;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

/// Default number of entries kept by [`BoundedCache::default`]
pub const DEFAULT_CAPACITY: usize = 32;

/// Capacity-limited key→value store with least-recently-used eviction
///
/// Every operation takes the same mutex, so a single cache can be shared
/// by reference between threads. Values are cloned out on `get`; store an
/// `Arc` when values are expensive to copy.
///
/// # Example
/// ```
/// use tracesift::cache::BoundedCache;
///
/// let cache = BoundedCache::new(2);
/// cache.put("a", 1);
/// cache.put("b", 2);
/// assert_eq!(cache.get(&"a"), Some(1)); // "a" is now most recent
/// cache.put("c", 3); // evicts "b"
/// assert!(!cache.contains(&"b"));
/// ```
#[derive(Debug)]
pub struct BoundedCache<K: Hash + Eq, V> {
    inner: Mutex<LruCache<K, V>>,
    capacity: usize,
}

impl<K: Hash + Eq, V: Clone> BoundedCache<K, V> {
    /// Create a cache holding at most `capacity` entries (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            capacity: capacity.get(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<K, V>> {
        // A panic while holding the lock cannot leave the LRU list half-updated
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Look up a value and mark it most-recently-used
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().get(key).cloned()
    }

    /// Insert or replace a value, evicting the least-recently-used entry
    /// when the cache is full
    pub fn put(&self, key: K, value: V) {
        self.lock().put(key, value);
    }

    /// Remove a value if present
    pub fn pop<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().pop(key)
    }

    /// Check membership without touching recency
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().contains(key)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<K: Hash + Eq, V: Clone> Default for BoundedCache<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_default_capacity() {
        let cache: BoundedCache<String, u32> = BoundedCache::default();
        assert_eq!(cache.capacity(), 32);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let cache: BoundedCache<u32, u32> = BoundedCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.put(1, 1);
        cache.put(2, 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&2), Some(2));
    }

    #[test]
    fn test_33rd_key_evicts_least_recent() {
        let cache = BoundedCache::new(32);
        for i in 0..32u32 {
            cache.put(i, i * 10);
        }
        cache.put(32, 320);

        assert_eq!(cache.len(), 32);
        assert!(!cache.contains(&0));
        assert!(cache.contains(&1));
        assert!(cache.contains(&32));
    }

    #[test]
    fn test_get_protects_from_next_eviction() {
        let cache = BoundedCache::new(32);
        for i in 0..32u32 {
            cache.put(i, i);
        }
        assert_eq!(cache.get(&0), Some(0));
        cache.put(32, 32);

        assert!(cache.contains(&0));
        assert!(!cache.contains(&1));
    }

    #[test]
    fn test_contains_does_not_promote() {
        let cache = BoundedCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        assert!(cache.contains("a"));
        cache.put("c", 3);
        assert!(!cache.contains("a"));
    }

    #[test]
    fn test_put_replaces_value() {
        let cache = BoundedCache::new(2);
        cache.put("a".to_string(), 1);
        cache.put("a".to_string(), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a"), Some(2));
    }

    #[test]
    fn test_pop_and_clear() {
        let cache = BoundedCache::new(4);
        cache.put(1, "one");
        cache.put(2, "two");
        assert_eq!(cache.pop(&1), Some("one"));
        assert_eq!(cache.pop(&1), None);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(BoundedCache::new(8));
        std::thread::scope(|s| {
            for t in 0..4u32 {
                let cache = Arc::clone(&cache);
                s.spawn(move || {
                    for i in 0..100u32 {
                        cache.put(t * 1000 + i, i);
                        let _ = cache.get(&(t * 1000 + i / 2));
                    }
                });
            }
        });
        assert_eq!(cache.len(), 8);
    }
}
