//! Property and type descriptors.
//!
//! A [`TypeDescriptor`] is the immutable, validated shape of one record
//! type: its ordered [`PropertyDescriptor`]s plus a case-folded name index.
//!
//! # Invariants
//!
//! - Properties keep their declaration order.
//! - No two properties of one type fold to the same lowercase key; the
//!   build fails with `AmbiguousPropertyName` instead of picking one.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use crate::error::{ReflectError, ReflectResult};
use crate::field::Field;
use crate::record::RecordType;
use crate::value::ScalarKind;

/// Fold a property name to its case-insensitive lookup key.
pub fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

// ---------------------------------------------------------------------------
// DeclaredType / PropertyKind
// ---------------------------------------------------------------------------

/// The declared type of a property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclaredType {
    Scalar(ScalarKind),
    Composite(RecordType),
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Scalar(kind) => write!(f, "{kind}"),
            DeclaredType::Composite(ty) => f.write_str(ty.name()),
        }
    }
}

/// Scalar/composite classification of a property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Scalar,
    Composite,
}

// ---------------------------------------------------------------------------
// PropertyDescriptor
// ---------------------------------------------------------------------------

/// One declared property of a record type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropertyDescriptor {
    name: &'static str,
    declared: DeclaredType,
    optional: bool,
}

impl PropertyDescriptor {
    pub fn new(name: &'static str, declared: DeclaredType, optional: bool) -> Self {
        Self {
            name,
            declared,
            optional,
        }
    }

    /// Describe a property whose field type is `F`.
    pub fn of<F: Field>(name: &'static str) -> Self {
        Self::new(name, F::declared_type(), F::is_optional())
    }

    /// The property name as declared.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn declared_type(&self) -> DeclaredType {
        self.declared
    }

    /// `true` for `Option`-wrapped scalars.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn kind(&self) -> PropertyKind {
        match self.declared {
            DeclaredType::Scalar(_) => PropertyKind::Scalar,
            DeclaredType::Composite(_) => PropertyKind::Composite,
        }
    }

    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self.declared {
            DeclaredType::Scalar(kind) => Some(kind),
            DeclaredType::Composite(_) => None,
        }
    }

    /// The nested record type of a composite property.
    pub fn record_type(&self) -> Option<RecordType> {
        match self.declared {
            DeclaredType::Composite(ty) => Some(ty),
            DeclaredType::Scalar(_) => None,
        }
    }

    /// Whether `name` matches this property case-insensitively.
    pub fn matches(&self, name: &str) -> bool {
        fold_name(self.name) == fold_name(name)
    }
}

// ---------------------------------------------------------------------------
// TypeDescriptor
// ---------------------------------------------------------------------------

/// The validated shape of one record type.
#[derive(Clone, Debug)]
pub struct TypeDescriptor {
    record_type: RecordType,
    properties: Vec<PropertyDescriptor>,
    index: HashMap<String, usize>,
}

impl TypeDescriptor {
    /// Introspect a record type and validate its property table.
    pub fn build(record_type: RecordType) -> ReflectResult<Self> {
        let properties = record_type.properties();
        let mut index = HashMap::with_capacity(properties.len());

        for (position, property) in properties.iter().enumerate() {
            if let Some(&earlier) = index.get(&fold_name(property.name())) {
                let first: &PropertyDescriptor = &properties[earlier];
                return Err(ReflectError::AmbiguousPropertyName {
                    type_name: record_type.name().to_string(),
                    first: first.name().to_string(),
                    second: property.name().to_string(),
                });
            }
            index.insert(fold_name(property.name()), position);
        }

        Ok(Self {
            record_type,
            properties,
            index,
        })
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn type_id(&self) -> TypeId {
        self.record_type.type_id()
    }

    pub fn type_name(&self) -> &'static str {
        self.record_type.name()
    }

    /// All properties, in declaration order.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Position of the property matching `name` case-insensitively.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(&fold_name(name)).copied()
    }

    /// The property matching `name` case-insensitively.
    pub fn find(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.position(name).map(|i| &self.properties[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;

    #[derive(Clone, Debug, Default)]
    struct Profile {
        user_name: String,
        age: Option<u32>,
    }

    record! {
        Profile {
            user_name as "UserName": String,
            age as "Age": Option<u32>,
        }
    }

    #[derive(Clone, Debug, Default)]
    struct Clash {
        lower: i32,
        upper: i32,
    }

    record! {
        Clash {
            lower as "code": i32,
            upper as "CODE": i32,
        }
    }

    fn profile_type() -> RecordType {
        <Profile as crate::Reflect>::record_type()
    }

    #[test]
    fn build_preserves_order() {
        let desc = TypeDescriptor::build(profile_type()).unwrap();
        assert_eq!(desc.type_name(), "Profile");
        assert_eq!(desc.len(), 2);
        assert_eq!(desc.properties()[0].name(), "UserName");
        assert_eq!(desc.properties()[1].name(), "Age");
    }

    #[test]
    fn find_is_case_insensitive() {
        let desc = TypeDescriptor::build(profile_type()).unwrap();
        assert_eq!(desc.find("username").unwrap().name(), "UserName");
        assert_eq!(desc.find("USERNAME").unwrap().name(), "UserName");
        assert_eq!(desc.position("age"), Some(1));
        assert!(desc.find("email").is_none());
    }

    #[test]
    fn collision_is_rejected() {
        let err = TypeDescriptor::build(<Clash as crate::Reflect>::record_type()).unwrap_err();
        assert_eq!(
            err,
            ReflectError::AmbiguousPropertyName {
                type_name: "Clash".into(),
                first: "code".into(),
                second: "CODE".into(),
            }
        );
    }

    #[test]
    fn property_classification() {
        let desc = TypeDescriptor::build(profile_type()).unwrap();
        let age = desc.find("age").unwrap();
        assert_eq!(age.kind(), PropertyKind::Scalar);
        assert!(age.is_optional());
        assert_eq!(age.scalar_kind(), Some(ScalarKind::U32));
        assert!(age.record_type().is_none());
        assert!(age.matches("AGE"));
    }

    #[test]
    fn declared_type_display() {
        assert_eq!(DeclaredType::Scalar(ScalarKind::F64).to_string(), "f64");
        assert_eq!(DeclaredType::Composite(profile_type()).to_string(), "Profile");
    }
}
