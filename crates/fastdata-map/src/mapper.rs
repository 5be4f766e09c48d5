//! The structural mapper.
//!
//! [`Mapper::copy`] builds a fresh target record and fills it from a source
//! record of an unrelated type by matching property names
//! case-insensitively. Scalars are coerced into the target's declared kind;
//! composites are rebuilt exactly one level deep.
//!
//! # Rules
//!
//! - Target properties with no matching source property keep their default.
//! - An optional target scalar receives `Null` verbatim from an absent source.
//! - Nested composites copy their leaf values directly, without coercion;
//!   composites nested inside them are left at default.
//! - Any failure aborts the copy. The partially filled target is dropped.

use std::sync::Arc;

use fastdata_reflect::{
    downcast_record, Accessor, DeclaredType, DescriptorCache, PropertyDescriptor, PropertyKind,
    Record, RecordType, Reflect, ScalarKind, Value,
};
use tracing::{debug, trace};

use crate::config::MapperConfig;
use crate::convert::{Coercer, ConversionError};
use crate::error::{MapError, MapResult};

/// Copies records between independently declared types.
#[derive(Clone, Debug)]
pub struct Mapper {
    cache: Arc<DescriptorCache>,
    coercer: Coercer,
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new(DescriptorCache::global(), &MapperConfig::default())
    }
}

impl Mapper {
    /// Create a mapper over an injected descriptor cache.
    pub fn new(cache: Arc<DescriptorCache>, config: &MapperConfig) -> Self {
        Self {
            cache,
            coercer: Coercer::new(config),
        }
    }

    /// Create a mapper over the global descriptor cache.
    pub fn with_config(config: &MapperConfig) -> Self {
        Self::new(DescriptorCache::global(), config)
    }

    pub fn cache(&self) -> &DescriptorCache {
        &self.cache
    }

    /// Copy `source` into a newly constructed `T`.
    ///
    /// `T` is built through its registered parameterless constructor;
    /// `Construction` is returned if it did not register one.
    pub fn copy<T: Reflect>(&self, source: &dyn Record) -> MapResult<T> {
        let target_type = T::record_type();
        let boxed = target_type
            .construct()
            .ok_or_else(|| MapError::not_constructible(target_type.name()))?;
        let target = downcast_record::<T>(boxed).ok_or_else(|| MapError::Construction {
            type_name: target_type.name().to_string(),
            reason: "registered constructor built a different type".into(),
        })?;
        self.fill(target, source)
    }

    /// Copy `source` into the instance produced by `factory`.
    ///
    /// For targets with no registered constructor.
    pub fn copy_with<T, F>(&self, factory: F, source: &dyn Record) -> MapResult<T>
    where
        T: Reflect,
        F: FnOnce() -> T,
    {
        self.fill(factory(), source)
    }

    fn fill<T: Reflect>(&self, mut target: T, source: &dyn Record) -> MapResult<T> {
        let target_desc = self.cache.describe::<T>()?;
        let source_desc = self.cache.describe_record(source)?;
        let target_access = Accessor::new(Arc::clone(&target_desc));
        let source_access = Accessor::new(Arc::clone(&source_desc));

        debug!(
            source = source_desc.type_name(),
            target = target_desc.type_name(),
            "copying record"
        );

        for property in target_desc.properties() {
            let Some(matched) = source_desc.find(property.name()) else {
                trace!(
                    target = target_desc.type_name(),
                    property = property.name(),
                    "no source property, keeping default"
                );
                continue;
            };

            let value = source_access.get(source, matched.name())?;
            let resolved = match property.declared_type() {
                DeclaredType::Scalar(kind) => {
                    self.resolve_scalar(target_desc.type_name(), property, kind, value)?
                }
                DeclaredType::Composite(nested) => {
                    self.resolve_composite(target_desc.type_name(), property, nested, value)?
                }
            };
            target_access.set(&mut target, property.name(), resolved)?;
        }

        debug!(target = target_desc.type_name(), "record copied");
        Ok(target)
    }

    fn resolve_scalar(
        &self,
        type_name: &str,
        property: &PropertyDescriptor,
        kind: ScalarKind,
        value: Value,
    ) -> MapResult<Value> {
        if property.is_optional() && value.is_null() {
            return Ok(Value::Null);
        }
        self.coercer
            .coerce(value, kind)
            .map_err(|source| MapError::TypeConversion {
                type_name: type_name.to_string(),
                property: property.name().to_string(),
                source,
            })
    }

    /// Rebuild a composite one level deep.
    fn resolve_composite(
        &self,
        type_name: &str,
        property: &PropertyDescriptor,
        nested: RecordType,
        value: Value,
    ) -> MapResult<Value> {
        let from = value.kind_name();
        let Some(source_nested) = value.into_record() else {
            return Err(MapError::TypeConversion {
                type_name: type_name.to_string(),
                property: property.name().to_string(),
                source: ConversionError::new(
                    from,
                    nested.name(),
                    "only records populate composite properties",
                ),
            });
        };

        let mut target_nested = nested
            .construct()
            .ok_or_else(|| MapError::not_constructible(nested.name()))?;

        let source_desc = self.cache.describe_record(source_nested.as_ref())?;
        let target_desc = self.cache.describe_type(nested)?;
        let source_access = Accessor::new(Arc::clone(&source_desc));
        let target_access = Accessor::new(Arc::clone(&target_desc));

        for leaf in source_desc.properties() {
            let Some(target_leaf) = target_desc.find(leaf.name()) else {
                continue;
            };
            if target_leaf.kind() == PropertyKind::Composite {
                trace!(
                    target = target_desc.type_name(),
                    property = target_leaf.name(),
                    "second-level composite left at default"
                );
                continue;
            }
            let leaf_value = source_access.get(source_nested.as_ref(), leaf.name())?;
            target_access.set(target_nested.as_mut(), target_leaf.name(), leaf_value)?;
        }

        Ok(Value::Record(target_nested))
    }
}

/// Copy `source` into a new `T` using the global descriptor cache and the
/// default configuration.
pub fn copy<T: Reflect>(source: &dyn Record) -> MapResult<T> {
    Mapper::default().copy(source)
}
