//! In-process cache backend.
//!
//! [`InMemoryCache`] keeps entries in a `HashMap` behind a `RwLock`. Each
//! entry carries its own deadline. Expired entries read as absent. A `get`
//! that lands on an expired entry drops it; [`InMemoryCache::purge_expired`]
//! sweeps the rest.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::backend::CacheBackend;
use crate::error::{CacheError, CacheResult};

#[derive(Clone, Debug)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |deadline| deadline > now)
    }
}

/// `HashMap`-based cache for a single process.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> CacheResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> CacheResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> CacheResult<usize> {
        let now = Instant::now();
        let mut entries = self.write()?;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        Ok(before - entries.len())
    }

    /// Live keys, sorted.
    pub fn keys(&self) -> CacheResult<Vec<String>> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .read()?
            .iter()
            .filter(|(_, entry)| entry.is_live(now))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    fn read(&self) -> CacheResult<std::sync::RwLockReadGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .read()
            .map_err(|e| CacheError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> CacheResult<std::sync::RwLockWriteGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .write()
            .map_err(|e| CacheError::LockPoisoned(e.to_string()))
    }
}

impl CacheBackend for InMemoryCache {
    fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool> {
        if key.is_empty() {
            return Ok(false);
        }
        // A TTL too large to represent never expires.
        let expires_at = Instant::now().checked_add(ttl);
        self.write()?.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(true)
    }

    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        if key.is_empty() {
            return Ok(None);
        }
        let now = Instant::now();
        match self.read()?.get(key) {
            Some(entry) if entry.is_live(now) => return Ok(Some(entry.value.clone())),
            Some(_) => {}
            None => return Ok(None),
        }

        // Re-check under the write lock: the key may have been refreshed.
        let mut entries = self.write()?;
        if entries.get(key).is_some_and(|entry| !entry.is_live(now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    fn remove(&self, key: &str) -> CacheResult<bool> {
        if key.is_empty() {
            return Ok(false);
        }
        let now = Instant::now();
        Ok(self
            .write()?
            .remove(key)
            .is_some_and(|entry| entry.is_live(now)))
    }

    fn exists(&self, key: &str) -> CacheResult<bool> {
        if key.is_empty() {
            return Ok(false);
        }
        let now = Instant::now();
        Ok(self.read()?.get(key).is_some_and(|entry| entry.is_live(now)))
    }
}
