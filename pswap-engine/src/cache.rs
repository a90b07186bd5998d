//! Off-chain cache interface and the in-memory implementation.
//!
//! The cache is advisory: it mirrors aggregate state for fast reads and
//! idempotency marks, while the ledger stays authoritative. Any backend that
//! offers get/set, u128 counters, and an atomic conditional set can stand in
//! for the in-memory version.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use pswap_core::{PoolError, PoolResult};

/// Key-value cache with numeric counters.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> PoolResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> PoolResult<()>;

    /// Add `delta` to the counter at `key` (missing counts as zero) and
    /// return the new value.
    async fn increment_by(&self, key: &str, delta: u128) -> PoolResult<u128>;

    /// Subtract `delta` from the counter at `key` and return the new value.
    /// Underflow is a cache-level failure, not a silent clamp.
    async fn decrement_by(&self, key: &str, delta: u128) -> PoolResult<u128>;

    /// Set `key` to `value` only if it is absent. Returns whether this call
    /// wrote the value. This is the atomic primitive idempotency relies on.
    async fn set_if_absent(&self, key: &str, value: &str) -> PoolResult<bool>;
}

/// Process-local cache backed by a locked map.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

fn parse_counter(key: &str, value: &str) -> PoolResult<u128> {
    value.parse().map_err(|_| {
        PoolError::CacheUnavailable(format!("non-numeric counter at key {}", key))
    })
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> PoolResult<Option<String>> {
        let entries = self.entries.read().unwrap();
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> PoolResult<()> {
        let mut entries = self.entries.write().unwrap();
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn increment_by(&self, key: &str, delta: u128) -> PoolResult<u128> {
        let mut entries = self.entries.write().unwrap();
        let current = match entries.get(key) {
            Some(value) => parse_counter(key, value)?,
            None => 0,
        };
        let next = current.checked_add(delta).ok_or_else(|| {
            PoolError::CacheUnavailable(format!("counter overflow at key {}", key))
        })?;
        entries.insert(key.to_owned(), next.to_string());
        Ok(next)
    }

    async fn decrement_by(&self, key: &str, delta: u128) -> PoolResult<u128> {
        let mut entries = self.entries.write().unwrap();
        let current = match entries.get(key) {
            Some(value) => parse_counter(key, value)?,
            None => 0,
        };
        let next = current.checked_sub(delta).ok_or_else(|| {
            PoolError::CacheUnavailable(format!("counter underflow at key {}", key))
        })?;
        entries.insert(key.to_owned(), next.to_string());
        Ok(next)
    }

    async fn set_if_absent(&self, key: &str, value: &str) -> PoolResult<bool> {
        let mut entries = self.entries.write().unwrap();
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_owned(), value.to_owned());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counters_start_at_zero() {
        let cache = MemoryCache::new();
        assert_eq!(cache.increment_by("k", 5).await.unwrap(), 5);
        assert_eq!(cache.increment_by("k", 3).await.unwrap(), 8);
        assert_eq!(cache.decrement_by("k", 8).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn decrement_underflow_errors() {
        let cache = MemoryCache::new();
        let err = cache.decrement_by("k", 1).await.unwrap_err();
        assert!(matches!(err, PoolError::CacheUnavailable(_)));
    }

    #[tokio::test]
    async fn set_if_absent_is_first_writer_wins() {
        let cache = MemoryCache::new();
        assert!(cache.set_if_absent("k", "1").await.unwrap());
        assert!(!cache.set_if_absent("k", "2").await.unwrap());
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("1"));
    }
}
