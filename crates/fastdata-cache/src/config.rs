use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::CacheType;
use crate::error::{CacheError, CacheResult};

/// Default entry lifetime: 8640 hours, roughly one year.
pub const DEFAULT_TTL_HOURS: u64 = 8640;

/// Configuration for the cache switch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Backend used by the `*_default` helpers.
    pub default_backend: CacheType,
    /// Lifetime applied when a caller does not pass one.
    pub default_ttl_hours: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_backend: CacheType::Memory,
            default_ttl_hours: DEFAULT_TTL_HOURS,
        }
    }
}

impl CacheConfig {
    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(input: &str) -> CacheResult<Self> {
        toml::from_str(input).map_err(|e| CacheError::Config(e.to_string()))
    }

    pub fn default_ttl(&self) -> Duration {
        hours(self.default_ttl_hours)
    }
}

/// Convert whole hours into a `Duration`, saturating on overflow.
pub fn hours(h: u64) -> Duration {
    Duration::from_secs(h.saturating_mul(3600))
}
