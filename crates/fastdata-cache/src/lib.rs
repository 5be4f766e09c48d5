//! Pluggable caching for FastData.
//!
//! [`CacheSwitch`] is the single entry point: callers name a [`CacheType`]
//! and the switch routes to the backend registered for it. An
//! [`InMemoryCache`] is always registered for [`CacheType::Memory`]; a remote
//! store is any [`CacheBackend`] the application registers for
//! [`CacheType::Remote`].
//!
//! # Design Rules
//!
//! 1. Values are strings; typed values are JSON encoded by the switch.
//! 2. Missing keys and unrouted types read as empty, never as errors.
//! 3. Every entry carries a lifetime; the default is 8640 hours.

pub mod backend;
pub mod config;
pub mod error;
pub mod memory;
pub mod switch;

pub use backend::{CacheBackend, CacheType};
pub use config::{hours, CacheConfig, DEFAULT_TTL_HOURS};
pub use error::{CacheError, CacheResult};
pub use memory::InMemoryCache;
pub use switch::CacheSwitch;
