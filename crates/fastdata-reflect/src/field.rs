//! Conversion between concrete field types and [`Value`].
//!
//! Every type that may appear as a registered record field implements
//! [`Field`]: the scalar types listed in [`ScalarKind`], `Option` of any of
//! them, and every record registered through [`record!`](crate::record).
//!
//! `from_value` is strict: it accepts only the exact runtime kind of the
//! field (plus `Null` for optional fields). Coercion is the mapper's job.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::descriptor::DeclaredType;
use crate::value::{ScalarKind, Value};

/// A type that can be stored in a record property.
pub trait Field: Sized {
    /// The declared type recorded in the property descriptor.
    fn declared_type() -> DeclaredType;

    /// Whether the field may hold the absent marker.
    fn is_optional() -> bool {
        false
    }

    /// Read the field as a [`Value`].
    fn to_value(&self) -> Value;

    /// Rebuild the field from a value of exactly its kind.
    ///
    /// Returns `None` when the value's runtime kind does not fit.
    fn from_value(value: Value) -> Option<Self>;
}

/// Marker for the built-in scalar field types.
pub trait ScalarField: Field {
    const KIND: ScalarKind;
}

macro_rules! scalar_field {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Field for $ty {
                fn declared_type() -> DeclaredType {
                    DeclaredType::Scalar(ScalarKind::$kind)
                }

                fn to_value(&self) -> Value {
                    Value::$kind(Clone::clone(self))
                }

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::$kind(v) => Some(v),
                        _ => None,
                    }
                }
            }

            impl ScalarField for $ty {
                const KIND: ScalarKind = ScalarKind::$kind;
            }
        )*
    };
}

scalar_field! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    char => Char,
    String => Text,
    DateTime<Utc> => DateTime,
    NaiveDate => Date,
    Uuid => Uuid,
    Vec<u8> => Binary,
}

impl<T: ScalarField> Field for Option<T> {
    fn declared_type() -> DeclaredType {
        T::declared_type()
    }

    fn is_optional() -> bool {
        true
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, Field::to_value)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_round_trip_through_value() {
        assert_eq!(42i32.to_value(), Value::I32(42));
        assert_eq!(i32::from_value(Value::I32(42)), Some(42));
    }

    #[test]
    fn strict_kind_rejects_widening() {
        assert_eq!(i64::from_value(Value::I32(1)), None);
        assert_eq!(String::from_value(Value::I32(1)), None);
    }

    #[test]
    fn optional_accepts_null() {
        assert_eq!(<Option<u8>>::from_value(Value::Null), Some(None));
        assert_eq!(<Option<u8>>::from_value(Value::U8(3)), Some(Some(3)));
        assert_eq!(<Option<u8>>::from_value(Value::I8(3)), None);
        assert!(<Option<u8>>::is_optional());
        assert!(!u8::is_optional());
    }

    #[test]
    fn required_rejects_null() {
        assert_eq!(bool::from_value(Value::Null), None);
    }

    #[test]
    fn optional_declares_inner_kind() {
        assert_eq!(
            <Option<String>>::declared_type(),
            DeclaredType::Scalar(ScalarKind::Text)
        );
        assert_eq!(<Option<Uuid> as Field>::declared_type(), Uuid::declared_type());
        assert_eq!(<Vec<u8> as ScalarField>::KIND, ScalarKind::Binary);
    }
}
