//! Read-through cache of type descriptors.
//!
//! [`DescriptorCache`] builds each record type's [`TypeDescriptor`] on first
//! request and hands out the same `Arc` for the rest of the cache's life.
//! There is no eviction: record shapes never change at runtime.
//!
//! # Concurrency
//!
//! Lookups take a shared read lock. On a miss the descriptor is built with no
//! lock held, then published with an insert-if-absent under the write lock.
//! Concurrent first requests for one type may each build, but only the first
//! published descriptor is ever returned; the rest are dropped. Readers never
//! observe a partially built descriptor.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::{debug, trace};

use crate::descriptor::TypeDescriptor;
use crate::error::ReflectResult;
use crate::record::{Record, RecordType, Reflect};

/// Process-wide cache of record descriptors.
pub struct DescriptorCache {
    entries: RwLock<HashMap<TypeId, Arc<TypeDescriptor>>>,
    builds: AtomicU64,
}

impl DescriptorCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            builds: AtomicU64::new(0),
        }
    }

    /// The shared cache used by callers that do not inject their own.
    pub fn global() -> Arc<DescriptorCache> {
        static GLOBAL: OnceLock<Arc<DescriptorCache>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(DescriptorCache::new())))
    }

    /// Descriptor for the statically known record type `T`.
    pub fn describe<T: Reflect>(&self) -> ReflectResult<Arc<TypeDescriptor>> {
        self.describe_type(T::record_type())
    }

    /// Descriptor for the runtime type of `record`.
    pub fn describe_record(&self, record: &dyn Record) -> ReflectResult<Arc<TypeDescriptor>> {
        self.describe_type(record.runtime_type())
    }

    /// Descriptor for a registered record type, building it on first use.
    ///
    /// A failed build is not cached: the next request tries again and fails
    /// the same way.
    pub fn describe_type(&self, record_type: RecordType) -> ReflectResult<Arc<TypeDescriptor>> {
        let type_id = record_type.type_id();
        if let Some(found) = self.lookup(&type_id) {
            trace!(type_name = record_type.name(), "descriptor cache hit");
            return Ok(found);
        }

        let built = Arc::new(TypeDescriptor::build(record_type)?);
        self.builds.fetch_add(1, Ordering::Relaxed);

        // The map only ever gains complete entries, so a poisoned lock still
        // guards a consistent map.
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let published = Arc::clone(entries.entry(type_id).or_insert(built));
        drop(entries);

        debug!(
            type_name = published.type_name(),
            properties = published.len(),
            "published type descriptor"
        );
        Ok(published)
    }

    /// Whether `T`'s descriptor has already been published.
    pub fn contains<T: Reflect>(&self) -> bool {
        self.lookup(&T::record_type().type_id()).is_some()
    }

    /// Number of cached descriptors.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if nothing has been described yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of introspections performed, including redundant concurrent
    /// builds that lost the race to publish.
    pub fn builds(&self) -> u64 {
        self.builds.load(Ordering::Relaxed)
    }

    fn lookup(&self, type_id: &TypeId) -> Option<Arc<TypeDescriptor>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(type_id)
            .cloned()
    }
}

impl Default for DescriptorCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DescriptorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorCache")
            .field("entries", &self.len())
            .field("builds", &self.builds())
            .finish()
    }
}
