//! Backend-neutral cache front door.
//!
//! [`CacheSwitch`] routes each request to the backend registered for its
//! [`CacheType`]. A request for a type with no registered backend is not an
//! error: reads come back empty and writes report `false`, so callers can run
//! with the remote store unplugged.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::backend::{CacheBackend, CacheType};
use crate::config::CacheConfig;
use crate::error::CacheResult;
use crate::memory::InMemoryCache;

/// Routes cache operations by [`CacheType`].
pub struct CacheSwitch {
    backends: HashMap<CacheType, Arc<dyn CacheBackend>>,
    config: CacheConfig,
}

impl CacheSwitch {
    /// Create a switch with an in-memory backend registered for
    /// [`CacheType::Memory`]. No remote backend is registered.
    pub fn new(config: CacheConfig) -> Self {
        let mut backends: HashMap<CacheType, Arc<dyn CacheBackend>> = HashMap::new();
        backends.insert(CacheType::Memory, Arc::new(InMemoryCache::new()));
        Self { backends, config }
    }

    /// Register (or replace) the backend for `cache_type`.
    pub fn register(&mut self, cache_type: CacheType, backend: Arc<dyn CacheBackend>) {
        self.backends.insert(cache_type, backend);
    }

    /// Builder form of [`Self::register`].
    pub fn with_backend(mut self, cache_type: CacheType, backend: Arc<dyn CacheBackend>) -> Self {
        self.register(cache_type, backend);
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Whether a backend is registered for `cache_type`.
    pub fn is_routed(&self, cache_type: CacheType) -> bool {
        self.backends.contains_key(&cache_type)
    }

    // -----------------------------------------------------------------------
    // Raw string values
    // -----------------------------------------------------------------------

    /// Store a string for the configured default lifetime.
    pub fn set(&self, cache_type: CacheType, key: &str, value: &str) -> CacheResult<bool> {
        self.set_for(cache_type, key, value, self.config.default_ttl())
    }

    /// Store a string for `ttl`.
    pub fn set_for(
        &self,
        cache_type: CacheType,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> CacheResult<bool> {
        match self.backend(cache_type) {
            Some(backend) => backend.set(key, value, ttl),
            None => Ok(false),
        }
    }

    /// Fetch a string, or `""` when missing or unrouted.
    pub fn get(&self, cache_type: CacheType, key: &str) -> CacheResult<String> {
        match self.backend(cache_type) {
            Some(backend) => Ok(backend.get(key)?.unwrap_or_default()),
            None => Ok(String::new()),
        }
    }

    pub fn remove(&self, cache_type: CacheType, key: &str) -> CacheResult<bool> {
        match self.backend(cache_type) {
            Some(backend) => backend.remove(key),
            None => Ok(false),
        }
    }

    pub fn exists(&self, cache_type: CacheType, key: &str) -> CacheResult<bool> {
        match self.backend(cache_type) {
            Some(backend) => backend.exists(key),
            None => Ok(false),
        }
    }

    // -----------------------------------------------------------------------
    // Typed values (JSON encoded)
    // -----------------------------------------------------------------------

    /// Store a serializable value for the configured default lifetime.
    pub fn set_typed<T: Serialize>(
        &self,
        cache_type: CacheType,
        key: &str,
        value: &T,
    ) -> CacheResult<bool> {
        let encoded = serde_json::to_string(value)?;
        self.set(cache_type, key, &encoded)
    }

    /// Fetch a typed value, or `T::default()` when missing or unrouted.
    pub fn get_typed<T: DeserializeOwned + Default>(
        &self,
        cache_type: CacheType,
        key: &str,
    ) -> CacheResult<T> {
        let Some(backend) = self.backend(cache_type) else {
            return Ok(T::default());
        };
        match backend.get(key)? {
            Some(encoded) => Ok(serde_json::from_str(&encoded)?),
            None => Ok(T::default()),
        }
    }

    // -----------------------------------------------------------------------
    // Batches
    // -----------------------------------------------------------------------

    /// Store every entry for the configured default lifetime. Returns `true`
    /// only if all were stored.
    pub fn set_many(&self, cache_type: CacheType, entries: &[(&str, &str)]) -> CacheResult<bool> {
        match self.backend(cache_type) {
            Some(backend) => backend.set_many(entries, self.config.default_ttl()),
            None => Ok(false),
        }
    }

    /// Fetch the live values among `keys`; empty when unrouted.
    pub fn get_many(
        &self,
        cache_type: CacheType,
        keys: &[&str],
    ) -> CacheResult<HashMap<String, String>> {
        match self.backend(cache_type) {
            Some(backend) => backend.get_many(keys),
            None => Ok(HashMap::new()),
        }
    }

    /// Remove every key. Returns how many live entries were removed.
    pub fn remove_many(&self, cache_type: CacheType, keys: &[&str]) -> CacheResult<usize> {
        match self.backend(cache_type) {
            Some(backend) => backend.remove_many(keys),
            None => Ok(0),
        }
    }

    /// JSON-encode and store every entry of `entries`.
    pub fn set_many_typed<T: Serialize>(
        &self,
        cache_type: CacheType,
        entries: &HashMap<String, T>,
    ) -> CacheResult<bool> {
        let mut encoded = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            encoded.push((key.as_str(), serde_json::to_string(value)?));
        }
        let borrowed: Vec<(&str, &str)> = encoded
            .iter()
            .map(|(key, value)| (*key, value.as_str()))
            .collect();
        self.set_many(cache_type, &borrowed)
    }

    /// Fetch and decode the live values among `keys`.
    pub fn get_many_typed<T: DeserializeOwned>(
        &self,
        cache_type: CacheType,
        keys: &[&str],
    ) -> CacheResult<HashMap<String, T>> {
        let mut decoded = HashMap::new();
        for (key, encoded) in self.get_many(cache_type, keys)? {
            decoded.insert(key, serde_json::from_str(&encoded)?);
        }
        Ok(decoded)
    }

    // -----------------------------------------------------------------------
    // Default-backend helpers
    // -----------------------------------------------------------------------

    pub fn set_default(&self, key: &str, value: &str) -> CacheResult<bool> {
        self.set(self.config.default_backend, key, value)
    }

    pub fn get_default(&self, key: &str) -> CacheResult<String> {
        self.get(self.config.default_backend, key)
    }

    fn backend(&self, cache_type: CacheType) -> Option<&Arc<dyn CacheBackend>> {
        let backend = self.backends.get(&cache_type);
        if backend.is_none() {
            warn!(cache_type = %cache_type, "no backend registered for cache type");
        }
        backend
    }
}

impl Default for CacheSwitch {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl std::fmt::Debug for CacheSwitch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut routed: Vec<String> = self.backends.keys().map(ToString::to_string).collect();
        routed.sort();
        f.debug_struct("CacheSwitch")
            .field("routed", &routed)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::error::CacheError;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Session {
        user: String,
        hits: u32,
    }

    // -----------------------------------------------------------------------
    // Routing
    // -----------------------------------------------------------------------

    #[test]
    fn memory_is_routed_by_default() {
        let switch = CacheSwitch::default();
        assert!(switch.is_routed(CacheType::Memory));
        assert!(!switch.is_routed(CacheType::Remote));
    }

    #[test]
    fn string_round_trip_through_memory() {
        let switch = CacheSwitch::default();
        assert!(switch.set(CacheType::Memory, "greeting", "hello").unwrap());
        assert!(switch.exists(CacheType::Memory, "greeting").unwrap());
        assert_eq!(switch.get(CacheType::Memory, "greeting").unwrap(), "hello");
        assert!(switch.remove(CacheType::Memory, "greeting").unwrap());
        assert_eq!(switch.get(CacheType::Memory, "greeting").unwrap(), "");
    }

    #[test]
    fn unrouted_type_yields_empty_results() {
        let switch = CacheSwitch::default();
        assert!(!switch.set(CacheType::Remote, "k", "v").unwrap());
        assert_eq!(switch.get(CacheType::Remote, "k").unwrap(), "");
        assert!(!switch.exists(CacheType::Remote, "k").unwrap());
        assert!(!switch.remove(CacheType::Remote, "k").unwrap());
        let session: Session = switch.get_typed(CacheType::Remote, "k").unwrap();
        assert_eq!(session, Session::default());
    }

    #[test]
    fn registered_remote_backend_receives_requests() {
        let remote = Arc::new(InMemoryCache::new());
        let switch = CacheSwitch::default().with_backend(CacheType::Remote, remote.clone());
        switch.set(CacheType::Remote, "k", "v").unwrap();
        assert_eq!(remote.get("k").unwrap().as_deref(), Some("v"));
        assert!(!switch.exists(CacheType::Memory, "k").unwrap());
    }

    // -----------------------------------------------------------------------
    // Typed values
    // -----------------------------------------------------------------------

    #[test]
    fn typed_round_trip() {
        let switch = CacheSwitch::default();
        let session = Session {
            user: "ann".into(),
            hits: 3,
        };
        switch.set_typed(CacheType::Memory, "s", &session).unwrap();
        let back: Session = switch.get_typed(CacheType::Memory, "s").unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn typed_missing_key_is_default() {
        let switch = CacheSwitch::default();
        let back: Session = switch.get_typed(CacheType::Memory, "nope").unwrap();
        assert_eq!(back, Session::default());
    }

    #[test]
    fn typed_garbage_is_serialization_error() {
        let switch = CacheSwitch::default();
        switch.set(CacheType::Memory, "s", "not json").unwrap();
        let err = switch.get_typed::<Session>(CacheType::Memory, "s").unwrap_err();
        assert!(matches!(err, CacheError::Serialization(_)));
    }

    // -----------------------------------------------------------------------
    // Batches
    // -----------------------------------------------------------------------

    #[test]
    fn batch_round_trip_through_memory() {
        let switch = CacheSwitch::default();
        assert!(switch
            .set_many(CacheType::Memory, &[("a", "1"), ("b", "2")])
            .unwrap());

        let found = switch.get_many(CacheType::Memory, &["a", "b", "c"]).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found["a"], "1");

        assert_eq!(switch.remove_many(CacheType::Memory, &["a", "c"]).unwrap(), 1);
        assert_eq!(switch.get(CacheType::Memory, "a").unwrap(), "");
        assert_eq!(switch.get(CacheType::Memory, "b").unwrap(), "2");
    }

    #[test]
    fn typed_batch_round_trip() {
        let switch = CacheSwitch::default();
        let mut sessions = HashMap::new();
        sessions.insert(
            "s1".to_string(),
            Session {
                user: "ann".into(),
                hits: 1,
            },
        );
        sessions.insert(
            "s2".to_string(),
            Session {
                user: "bob".into(),
                hits: 2,
            },
        );
        assert!(switch.set_many_typed(CacheType::Memory, &sessions).unwrap());

        let back: HashMap<String, Session> = switch
            .get_many_typed(CacheType::Memory, &["s1", "s2", "s3"])
            .unwrap();
        assert_eq!(back, sessions);
    }

    #[test]
    fn typed_batch_with_garbage_is_serialization_error() {
        let switch = CacheSwitch::default();
        switch.set(CacheType::Memory, "s", "not json").unwrap();
        let err = switch
            .get_many_typed::<Session>(CacheType::Memory, &["s"])
            .unwrap_err();
        assert!(matches!(err, CacheError::Serialization(_)));
    }

    #[test]
    fn unrouted_batches_are_empty() {
        let switch = CacheSwitch::default();
        assert!(!switch.set_many(CacheType::Remote, &[("a", "1")]).unwrap());
        assert!(switch.get_many(CacheType::Remote, &["a"]).unwrap().is_empty());
        assert_eq!(switch.remove_many(CacheType::Remote, &["a"]).unwrap(), 0);
        let typed: HashMap<String, Session> =
            switch.get_many_typed(CacheType::Remote, &["a"]).unwrap();
        assert!(typed.is_empty());
    }

    // -----------------------------------------------------------------------
    // Lifetimes and defaults
    // -----------------------------------------------------------------------

    #[test]
    fn explicit_ttl_is_honoured() {
        let switch = CacheSwitch::default();
        switch
            .set_for(CacheType::Memory, "k", "v", Duration::ZERO)
            .unwrap();
        assert!(!switch.exists(CacheType::Memory, "k").unwrap());
    }

    #[test]
    fn default_backend_helpers() {
        let remote = Arc::new(InMemoryCache::new());
        let config = CacheConfig {
            default_backend: CacheType::Remote,
            ..CacheConfig::default()
        };
        let switch = CacheSwitch::new(config).with_backend(CacheType::Remote, remote.clone());
        switch.set_default("k", "v").unwrap();
        assert_eq!(switch.get_default("k").unwrap(), "v");
        assert!(remote.exists("k").unwrap());
    }
}
