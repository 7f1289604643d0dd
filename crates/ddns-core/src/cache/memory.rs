// # Sliding Cache
//
// In-memory key/value cache with a sliding expiration window.
//
// ## Behavior
//
// - Every hit pushes the entry's expiry out by the full window
// - Expired entries are dropped on access, by `purge_expired()`, and by a
//   sweep that `insert()` runs at most once per window
// - A zero window disables caching: nothing is stored, every lookup misses
//
// ## Concurrency
//
// Hits only take the read lock; the expiry is an atomic offset from the
// cache's creation instant. The write lock is taken to insert, to drop an
// expired entry, and to sweep.
//
// ## Crash Behavior
//
// Nothing is persisted. After a restart every key is a miss and is re-read
// from its source.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Debug)]
struct Entry<V> {
    value: V,
    /// Milliseconds since the cache's `origin`
    expires_at: AtomicU64,
}

#[derive(Debug)]
struct Store<K, V> {
    entries: HashMap<K, Entry<V>>,
    next_sweep: u64,
}

/// In-memory cache with sliding expiration
///
/// Values are cloned out of the cache; wrap large values in an `Arc`.
/// Clones of the cache share the same storage.
///
/// # Example
///
/// ```rust,no_run
/// use ddns_core::cache::SlidingCache;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let cache = SlidingCache::new(Duration::from_secs(60));
///
///     cache.insert("home.example.com".to_string(), 42).await;
///     assert_eq!(cache.get(&"home.example.com".to_string()).await, Some(42));
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SlidingCache<K, V> {
    inner: Arc<RwLock<Store<K, V>>>,
    origin: Instant,
    ttl: Duration,
}

impl<K, V> SlidingCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache with the given sliding window
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Store {
                entries: HashMap::new(),
                next_sweep: 0,
            })),
            origin: Instant::now(),
            ttl,
        }
    }

    /// The sliding window
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether the cache stores anything at all
    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    fn now_ms(&self) -> u64 {
        millis(Instant::now().saturating_duration_since(self.origin))
    }

    fn ttl_ms(&self) -> u64 {
        millis(self.ttl)
    }

    /// Get the number of entries, including expired ones not yet purged
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }

    /// Look up a key, refreshing its expiry on a hit
    pub async fn get(&self, key: &K) -> Option<V> {
        {
            let guard = self.inner.read().await;
            let entry = guard.entries.get(key)?;
            let now = self.now_ms();

            if entry.expires_at.load(Ordering::Acquire) > now {
                entry
                    .expires_at
                    .fetch_max(now.saturating_add(self.ttl_ms()), Ordering::AcqRel);
                return Some(entry.value.clone());
            }
        }

        // Expired; re-check under the write lock, a concurrent hit or
        // insert may have revived it
        let mut guard = self.inner.write().await;
        let now = self.now_ms();
        if let Some(entry) = guard.entries.get(key) {
            if entry.expires_at.load(Ordering::Acquire) > now {
                entry
                    .expires_at
                    .store(now.saturating_add(self.ttl_ms()), Ordering::Release);
                return Some(entry.value.clone());
            }
        }
        guard.entries.remove(key);
        None
    }

    /// Store a value, replacing any previous entry
    pub async fn insert(&self, key: K, value: V) {
        if !self.is_enabled() {
            return;
        }

        let mut guard = self.inner.write().await;
        let now = self.now_ms();

        if now >= guard.next_sweep {
            guard
                .entries
                .retain(|_, entry| entry.expires_at.load(Ordering::Acquire) > now);
            guard.next_sweep = now.saturating_add(self.ttl_ms());
        }

        guard.entries.insert(
            key,
            Entry {
                value,
                expires_at: AtomicU64::new(now.saturating_add(self.ttl_ms())),
            },
        );
    }

    /// Return the cached value or compute, store and return a fresh one
    pub async fn get_or_insert_with<F>(&self, key: K, f: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key).await {
            return value;
        }

        let value = f();
        self.insert(key, value.clone()).await;
        value
    }

    /// Drop every expired entry
    pub async fn purge_expired(&self) -> usize {
        let mut guard = self.inner.write().await;
        let now = self.now_ms();
        let before = guard.entries.len();
        guard
            .entries
            .retain(|_, entry| entry.expires_at.load(Ordering::Acquire) > now);
        before - guard.entries.len()
    }

    /// Remove all entries
    pub async fn clear(&self) {
        self.inner.write().await.entries.clear();
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn test_cache_basic() {
        let cache = SlidingCache::new(WINDOW);

        assert!(cache.is_empty().await);
        cache.insert("a", 1).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(&"a").await, Some(1));
        assert_eq!(cache.get(&"b").await, None);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires() {
        let cache = SlidingCache::new(WINDOW);
        cache.insert("a", 1).await;

        tokio::time::advance(WINDOW + Duration::from_secs(1)).await;

        assert_eq!(cache.get(&"a").await, None);
        assert!(cache.is_empty().await, "expired entry is dropped on access");
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_slides_expiry() {
        let cache = SlidingCache::new(WINDOW);
        cache.insert("a", 1).await;

        // Each access within the window keeps the entry alive
        for _ in 0..3 {
            tokio::time::advance(Duration::from_secs(45)).await;
            assert_eq!(cache.get(&"a").await, Some(1));
        }

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.get(&"a").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_or_insert_with() {
        let cache = SlidingCache::new(WINDOW);
        let mut calls = 0;

        let first = cache.get_or_insert_with("a", || {
            calls += 1;
            10
        })
        .await;
        let second = cache.get_or_insert_with("a", || {
            calls += 1;
            20
        })
        .await;

        assert_eq!(first, 10);
        assert_eq!(second, 10);
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let cache = SlidingCache::new(WINDOW);
        cache.insert("old", 1).await;

        tokio::time::advance(Duration::from_secs(30)).await;
        cache.insert("new", 2).await;

        tokio::time::advance(Duration::from_secs(45)).await;
        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(&"new").await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_sweeps_expired_entries() {
        let cache = SlidingCache::new(WINDOW);
        for i in 0..100 {
            cache.insert(i, i).await;
        }

        // Within the window nothing is swept
        tokio::time::advance(Duration::from_secs(30)).await;
        cache.insert(100, 100).await;
        assert_eq!(cache.len().await, 101);

        tokio::time::advance(Duration::from_secs(45)).await;
        cache.insert(101, 101).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get(&100).await, Some(100));
        assert_eq!(cache.get(&0).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shared_hits_slide_expiry() {
        let cache = SlidingCache::new(WINDOW);
        cache.insert("a", 1).await;

        tokio::time::advance(Duration::from_secs(50)).await;
        let other = cache.clone();
        let (left, right) = tokio::join!(cache.get(&"a"), other.get(&"a"));
        assert_eq!((left, right), (Some(1), Some(1)));

        tokio::time::advance(Duration::from_secs(50)).await;
        assert_eq!(cache.get(&"a").await, Some(1));
    }

    #[tokio::test]
    async fn test_zero_window_disables_cache() {
        let cache = SlidingCache::new(Duration::ZERO);
        assert!(!cache.is_enabled());

        cache.insert("a", 1).await;
        assert!(cache.is_empty().await);

        let mut calls = 0;
        for _ in 0..2 {
            cache.get_or_insert_with("a", || {
                calls += 1;
                1
            })
            .await;
        }
        assert_eq!(calls, 2);
    }
}
