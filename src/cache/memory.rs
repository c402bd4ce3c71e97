// src/cache/memory.rs
// =============================================================================
// In-process cache backed by a DashMap.
//
// Expiry is lazy: an entry past its deadline reads as a miss and is removed
// on that read. There is no other eviction, so an expired entry nobody reads
// again stays in memory until the cache is dropped. The cache lives as long
// as one RepoHarvester (one CLI run); a long-running service should plug a
// store with its own eviction in behind CacheStore.
// =============================================================================

use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};

use super::CacheStore;
use crate::error::CacheError;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(deadline) if now >= deadline)
    }
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored entries, including expired ones that were never read again.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        // the read guard has to be gone before remove() touches the shard
        let hit = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            Some(_) => None,
            None => return Ok(None),
        };

        if hit.is_none() {
            self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        }
        Ok(hit)
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError> {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.entries.insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }
}
