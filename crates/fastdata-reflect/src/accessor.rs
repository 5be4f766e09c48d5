//! Name-keyed reads and writes over record instances.
//!
//! An [`Accessor`] is bound to one record type through its descriptor and
//! resolves property names case-insensitively before touching an instance.
//! It holds no per-instance state and can be reused across any number of
//! instances of its type.

use std::sync::Arc;

use crate::cache::DescriptorCache;
use crate::descriptor::{PropertyDescriptor, TypeDescriptor};
use crate::error::{ReflectError, ReflectResult};
use crate::record::{Record, Reflect};
use crate::value::Value;

/// Dynamic get/set bound to one record type.
#[derive(Clone, Debug)]
pub struct Accessor {
    descriptor: Arc<TypeDescriptor>,
}

impl Accessor {
    pub fn new(descriptor: Arc<TypeDescriptor>) -> Self {
        Self { descriptor }
    }

    /// Bind an accessor to `T` through `cache`.
    pub fn of<T: Reflect>(cache: &DescriptorCache) -> ReflectResult<Self> {
        cache.describe::<T>().map(Self::new)
    }

    /// Bind an accessor to the runtime type of `record`.
    pub fn for_record(cache: &DescriptorCache, record: &dyn Record) -> ReflectResult<Self> {
        cache.describe_record(record).map(Self::new)
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// Read the property matching `name` case-insensitively.
    pub fn get(&self, instance: &dyn Record, name: &str) -> ReflectResult<Value> {
        self.property(name)?.get(instance)
    }

    /// Write the property matching `name` case-insensitively.
    ///
    /// The value must already have the property's exact kind; `Null` is
    /// accepted only by optional properties.
    pub fn set(&self, instance: &mut dyn Record, name: &str, value: Value) -> ReflectResult<()> {
        self.property(name)?.set(instance, value)
    }

    /// Resolve `name` once and return a handle bound to that property.
    pub fn property(&self, name: &str) -> ReflectResult<BoundProperty> {
        let index = self
            .descriptor
            .position(name)
            .ok_or_else(|| ReflectError::not_found(self.descriptor.type_name(), name))?;
        Ok(BoundProperty {
            descriptor: Arc::clone(&self.descriptor),
            index,
        })
    }
}

/// A property resolved against a type descriptor.
#[derive(Clone, Debug)]
pub struct BoundProperty {
    descriptor: Arc<TypeDescriptor>,
    index: usize,
}

impl BoundProperty {
    pub fn descriptor(&self) -> &PropertyDescriptor {
        &self.descriptor.properties()[self.index]
    }

    pub fn get(&self, instance: &dyn Record) -> ReflectResult<Value> {
        self.check_instance(instance)?;
        let name = self.descriptor().name();
        instance
            .get_property(name)
            .ok_or_else(|| ReflectError::not_found(self.descriptor.type_name(), name))
    }

    pub fn set(&self, instance: &mut dyn Record, value: Value) -> ReflectResult<()> {
        self.check_instance(instance)?;
        instance.set_property(self.descriptor().name(), value)
    }

    fn check_instance(&self, instance: &dyn Record) -> ReflectResult<()> {
        let actual = instance.runtime_type();
        if actual.type_id() != self.descriptor.type_id() {
            return Err(ReflectError::InstanceMismatch {
                expected: self.descriptor.type_name().to_string(),
                found: actual.name().to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Member {
        user_name: String,
        score: Option<i64>,
    }

    record! {
        Member {
            user_name as "UserName": String,
            score as "Score": Option<i64>,
        }
    }

    #[derive(Clone, Debug, Default)]
    struct Other {
        user_name: String,
    }

    record! {
        Other { user_name as "UserName": String }
    }

    fn accessor() -> Accessor {
        Accessor::of::<Member>(&DescriptorCache::new()).unwrap()
    }

    #[test]
    fn get_matches_case_insensitively() {
        let m = Member {
            user_name: "ann".into(),
            score: Some(3),
        };
        let acc = accessor();
        assert_eq!(acc.get(&m, "username").unwrap(), Value::from("ann"));
        assert_eq!(acc.get(&m, "SCORE").unwrap(), Value::I64(3));
    }

    #[test]
    fn get_unknown_property() {
        let err = accessor().get(&Member::default(), "email").unwrap_err();
        assert_eq!(
            err,
            ReflectError::PropertyNotFound {
                type_name: "Member".into(),
                property: "email".into(),
            }
        );
    }

    #[test]
    fn set_writes_through_declared_name() {
        let mut m = Member::default();
        let acc = accessor();
        acc.set(&mut m, "USERNAME", Value::from("bob")).unwrap();
        acc.set(&mut m, "score", Value::I64(10)).unwrap();
        assert_eq!(m.user_name, "bob");
        assert_eq!(m.score, Some(10));

        acc.set(&mut m, "score", Value::Null).unwrap();
        assert_eq!(m.score, None);
    }

    #[test]
    fn set_rejects_uncoerced_value() {
        let mut m = Member::default();
        let err = accessor().set(&mut m, "score", Value::I32(1)).unwrap_err();
        assert!(matches!(err, ReflectError::TypeMismatch { .. }));
        assert_eq!(m, Member::default());
    }

    #[test]
    fn set_unknown_property() {
        let mut m = Member::default();
        let err = accessor().set(&mut m, "email", Value::from("x")).unwrap_err();
        assert!(matches!(err, ReflectError::PropertyNotFound { .. }));
    }

    #[test]
    fn bound_property_is_reusable() {
        let prop = accessor().property("username").unwrap();
        assert_eq!(prop.descriptor().name(), "UserName");

        let mut a = Member::default();
        let mut b = Member::default();
        prop.set(&mut a, Value::from("a")).unwrap();
        prop.set(&mut b, Value::from("b")).unwrap();
        assert_eq!(prop.get(&a).unwrap(), Value::from("a"));
        assert_eq!(prop.get(&b).unwrap(), Value::from("b"));
    }

    #[test]
    fn wrong_instance_type_is_rejected() {
        let other = Other {
            user_name: "x".into(),
        };
        let err = accessor().get(&other, "UserName").unwrap_err();
        assert_eq!(
            err,
            ReflectError::InstanceMismatch {
                expected: "Member".into(),
                found: "Other".into(),
            }
        );
    }

    #[test]
    fn for_record_binds_runtime_type() {
        let cache = DescriptorCache::new();
        let boxed: Box<dyn Record> = Box::new(Other::default());
        let acc = Accessor::for_record(&cache, boxed.as_ref()).unwrap();
        assert_eq!(acc.descriptor().type_name(), "Other");
    }
}
