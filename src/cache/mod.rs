//! Key/value cache seam used for reference lists and reputation scores.

mod memory;

pub use memory::MemoryCache;

use std::time::Duration;

use crate::store::StoreError;

pub trait Cache<V: Clone>: Send + Sync {
    fn get(&self, key: &str) -> Option<V>;

    fn put(&self, key: &str, value: V, ttl: Duration);

    /// Removes `key`; returns whether an entry was present.
    fn forget(&self, key: &str) -> bool;

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns the cached value, or runs `producer` and caches its output.
    /// Producer errors are returned as-is and nothing is cached.
    fn remember(
        &self,
        key: &str,
        ttl: Duration,
        producer: &mut dyn FnMut() -> Result<V, StoreError>,
    ) -> Result<V, StoreError> {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = producer()?;
        self.put(key, value.clone(), ttl);
        Ok(value)
    }
}
