//! Memoization cache shared by concurrently running tasks.
//!
//! Keys are derived from input content, so a race between two writers of
//! the same key at worst recomputes an identical value.

use dashmap::DashMap;
use serde::Serialize;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Snapshot of a cache's size and hit rate.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    pub name: &'static str,
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Unbounded concurrent key → value memo with an explicit `clear()`.
pub struct MemoCache<K, V> {
    name: &'static str,
    entries: DashMap<K, V>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    ///
    /// No shard lock is held while `compute` runs.
    pub fn get_or_insert_with<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(hit) = self.lookup(&key) {
            return hit;
        }
        let value = compute();
        self.entries.insert(key, value.clone());
        value
    }

    /// Like [`get_or_insert_with`](Self::get_or_insert_with); errors are not cached.
    pub fn get_or_try_insert_with<F, E>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(hit) = self.lookup(&key) {
            return Ok(hit);
        }
        let value = compute()?;
        self.entries.insert(key, value.clone());
        Ok(value)
    }

    fn lookup(&self, key: &K) -> Option<V> {
        if let Some(entry) = self.entries.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Some(entry.value().clone());
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&self) {
        let dropped = self.entries.len();
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        debug!(cache = self.name, dropped, "Cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            name: self.name,
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn computes_once_per_key() {
        let cache: MemoCache<u32, u32> = MemoCache::new("test");
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            42
        };
        assert_eq!(cache.get_or_insert_with(1, compute), 42);
        assert_eq!(cache.get_or_insert_with(1, || unreachable!()), 42);
        assert_eq!(calls.get(), 1);

        let stats = cache.stats();
        assert_eq!((stats.entries, stats.hits, stats.misses), (1, 1, 1));
    }

    #[test]
    fn errors_are_not_cached() {
        let cache: MemoCache<&str, f64> = MemoCache::new("test");
        let first: Result<f64, String> = cache.get_or_try_insert_with("k", || Err("boom".into()));
        assert!(first.is_err());
        assert!(cache.is_empty());
        let second: Result<f64, String> = cache.get_or_try_insert_with("k", || Ok(1.5));
        assert_eq!(second, Ok(1.5));
    }

    #[test]
    fn clear_resets_everything() {
        let cache: MemoCache<u8, u8> = MemoCache::new("test");
        cache.get_or_insert_with(1, || 1);
        cache.get_or_insert_with(1, || 1);
        cache.clear();
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.stats().hits, 0);
    }
}
