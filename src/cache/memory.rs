use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use super::Cache;

/// Every this many writes, `put` also drops expired entries.
const PURGE_EVERY: usize = 256;

struct Entry<V> {
    value: V,
    // None: the TTL overflowed `Instant`, keep forever
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// Process-local TTL cache. Expired entries are skipped on read and swept
/// every 256 writes, or on [`MemoryCache::purge_expired`].
pub struct MemoryCache<V> {
    entries: RwLock<HashMap<String, Entry<V>>>,
    writes: AtomicUsize,
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            writes: AtomicUsize::new(0),
        }
    }
}

impl<V> MemoryCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }
}

impl<V: Clone + Send + Sync> Cache<V> for MemoryCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|entry| entry.is_live(Instant::now()))
            .map(|entry| entry.value.clone())
    }

    fn put(&self, key: &str, value: V, ttl: Duration) {
        let now = Instant::now();
        let entry = Entry {
            value,
            expires_at: now.checked_add(ttl),
        };
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if (self.writes.fetch_add(1, Ordering::Relaxed) + 1) % PURGE_EVERY == 0 {
            entries.retain(|_, entry| entry.is_live(now));
        }
        entries.insert(key.to_string(), entry);
    }

    fn forget(&self, key: &str) -> bool {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some()
    }
}
