use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, CacheResult};

/// Which backend a cache request is routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheType {
    /// In-process cache.
    Memory,
    /// Remote key/value store supplied by the application.
    Remote,
}

impl FromStr for CacheType {
    type Err = CacheError;

    /// Accepts `memory`/`web` and `remote`/`redis`, in any case.
    fn from_str(s: &str) -> CacheResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "web" => Ok(CacheType::Memory),
            "remote" | "redis" => Ok(CacheType::Remote),
            other => Err(CacheError::Config(format!("unknown cache type: {other:?}"))),
        }
    }
}

impl fmt::Display for CacheType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheType::Memory => f.write_str("memory"),
            CacheType::Remote => f.write_str("remote"),
        }
    }
}

/// A string key/value cache with per-entry expiry.
///
/// Implementations treat an empty key as a miss. Writes and removals report
/// `false` for it, and reads find nothing.
///
/// The batch operations default to one single-key call per entry; backends
/// with a native multi-key command can override them.
pub trait CacheBackend: Send + Sync {
    /// Store `value` under `key` for `ttl`. Returns `true` if stored.
    fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool>;

    /// Fetch a live value.
    fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Remove a key. Returns `true` if a live entry was removed.
    fn remove(&self, key: &str) -> CacheResult<bool>;

    /// Whether a live entry exists for `key`.
    fn exists(&self, key: &str) -> CacheResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Store every entry for `ttl`. Returns `true` only if all were stored.
    fn set_many(&self, entries: &[(&str, &str)], ttl: Duration) -> CacheResult<bool> {
        let mut all = true;
        for (key, value) in entries {
            all &= self.set(key, value, ttl)?;
        }
        Ok(all)
    }

    /// Fetch the live values among `keys`. Missing keys are left out.
    fn get_many(&self, keys: &[&str]) -> CacheResult<HashMap<String, String>> {
        let mut found = HashMap::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = self.get(key)? {
                found.insert((*key).to_string(), value);
            }
        }
        Ok(found)
    }

    /// Remove every key. Returns how many live entries were removed.
    fn remove_many(&self, keys: &[&str]) -> CacheResult<usize> {
        let mut removed = 0;
        for key in keys {
            if self.remove(key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cache_type_aliases() {
        assert_eq!("Web".parse::<CacheType>().unwrap(), CacheType::Memory);
        assert_eq!("MEMORY".parse::<CacheType>().unwrap(), CacheType::Memory);
        assert_eq!("redis".parse::<CacheType>().unwrap(), CacheType::Remote);
        assert_eq!(" Remote ".parse::<CacheType>().unwrap(), CacheType::Remote);
    }

    #[test]
    fn parse_unknown_cache_type() {
        let err = "disk".parse::<CacheType>().unwrap_err();
        assert!(matches!(err, CacheError::Config(_)));
    }

    #[test]
    fn display_round_trips() {
        for ty in [CacheType::Memory, CacheType::Remote] {
            assert_eq!(ty.to_string().parse::<CacheType>().unwrap(), ty);
        }
    }

    // -----------------------------------------------------------------------
    // Batch defaults
    // -----------------------------------------------------------------------

    /// Backend that only implements the single-key calls.
    #[derive(Default)]
    struct MapBackend {
        entries: std::sync::Mutex<HashMap<String, String>>,
    }

    impl CacheBackend for MapBackend {
        fn set(&self, key: &str, value: &str, _ttl: Duration) -> CacheResult<bool> {
            if key.is_empty() {
                return Ok(false);
            }
            self.entries.lock().unwrap().insert(key.into(), value.into());
            Ok(true)
        }

        fn get(&self, key: &str) -> CacheResult<Option<String>> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        fn remove(&self, key: &str) -> CacheResult<bool> {
            Ok(self.entries.lock().unwrap().remove(key).is_some())
        }
    }

    const TTL: Duration = Duration::from_secs(60);

    #[test]
    fn set_many_reports_partial_failure() {
        let backend = MapBackend::default();
        assert!(backend.set_many(&[("a", "1"), ("b", "2")], TTL).unwrap());
        assert!(!backend.set_many(&[("c", "3"), ("", "4")], TTL).unwrap());
        assert!(backend.exists("c").unwrap());
    }

    #[test]
    fn get_many_skips_missing_keys() {
        let backend = MapBackend::default();
        backend.set_many(&[("a", "1"), ("b", "2")], TTL).unwrap();
        let found = backend.get_many(&["a", "b", "zzz"]).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found["a"], "1");
        assert_eq!(found["b"], "2");
    }

    #[test]
    fn remove_many_counts_removed_keys() {
        let backend = MapBackend::default();
        backend.set_many(&[("a", "1"), ("b", "2")], TTL).unwrap();
        assert_eq!(backend.remove_many(&["a", "b", "zzz"]).unwrap(), 2);
        assert!(backend.get_many(&["a", "b"]).unwrap().is_empty());
    }
}
