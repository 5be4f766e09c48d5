//! Runtime-inspectable property values.
//!
//! [`Value`] is the currency of every accessor read and write. Scalars are
//! tagged with a [`ScalarKind`] drawn from a closed set; composite values
//! carry a boxed [`Record`].

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::Record;

// ---------------------------------------------------------------------------
// ScalarKind
// ---------------------------------------------------------------------------

/// The closed set of scalar kinds a property may declare.
///
/// Classification of a property as scalar or composite is decided by this
/// enumeration alone, never by the name of the Rust type behind it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    Text,
    DateTime,
    Date,
    Uuid,
    Binary,
}

impl ScalarKind {
    /// Every scalar kind, in declaration order.
    pub const ALL: [ScalarKind; 17] = [
        ScalarKind::Bool,
        ScalarKind::I8,
        ScalarKind::I16,
        ScalarKind::I32,
        ScalarKind::I64,
        ScalarKind::U8,
        ScalarKind::U16,
        ScalarKind::U32,
        ScalarKind::U64,
        ScalarKind::F32,
        ScalarKind::F64,
        ScalarKind::Char,
        ScalarKind::Text,
        ScalarKind::DateTime,
        ScalarKind::Date,
        ScalarKind::Uuid,
        ScalarKind::Binary,
    ];

    /// Short lowercase name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::U32 => "u32",
            ScalarKind::U64 => "u64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Char => "char",
            ScalarKind::Text => "text",
            ScalarKind::DateTime => "datetime",
            ScalarKind::Date => "date",
            ScalarKind::Uuid => "uuid",
            ScalarKind::Binary => "binary",
        }
    }

    /// Returns `true` for the signed and unsigned integer kinds.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ScalarKind::I8
                | ScalarKind::I16
                | ScalarKind::I32
                | ScalarKind::I64
                | ScalarKind::U8
                | ScalarKind::U16
                | ScalarKind::U32
                | ScalarKind::U64
        )
    }

    /// Returns `true` for `F32` and `F64`.
    pub fn is_float(&self) -> bool {
        matches!(self, ScalarKind::F32 | ScalarKind::F64)
    }

    /// Returns `true` for integer and floating-point kinds.
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A property value, inspectable at runtime.
#[derive(Clone, Debug)]
pub enum Value {
    /// The absent marker held by an empty optional property.
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Char(char),
    Text(String),
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
    Uuid(Uuid),
    Binary(Vec<u8>),
    /// A nested composite record.
    Record(Box<dyn Record>),
}

impl Value {
    /// The scalar kind of this value, or `None` for `Null` and records.
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        Some(match self {
            Value::Null | Value::Record(_) => return None,
            Value::Bool(_) => ScalarKind::Bool,
            Value::I8(_) => ScalarKind::I8,
            Value::I16(_) => ScalarKind::I16,
            Value::I32(_) => ScalarKind::I32,
            Value::I64(_) => ScalarKind::I64,
            Value::U8(_) => ScalarKind::U8,
            Value::U16(_) => ScalarKind::U16,
            Value::U32(_) => ScalarKind::U32,
            Value::U64(_) => ScalarKind::U64,
            Value::F32(_) => ScalarKind::F32,
            Value::F64(_) => ScalarKind::F64,
            Value::Char(_) => ScalarKind::Char,
            Value::Text(_) => ScalarKind::Text,
            Value::DateTime(_) => ScalarKind::DateTime,
            Value::Date(_) => ScalarKind::Date,
            Value::Uuid(_) => ScalarKind::Uuid,
            Value::Binary(_) => ScalarKind::Binary,
        })
    }

    /// Name of the value's runtime kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Record(record) => record.runtime_type().name(),
            other => other.scalar_kind().map_or("unknown", |kind| kind.name()),
        }
    }

    /// Returns `true` for the absent marker.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the nested record, if this value is one.
    pub fn as_record(&self) -> Option<&dyn Record> {
        match self {
            Value::Record(record) => Some(record.as_ref()),
            _ => None,
        }
    }

    /// Take ownership of the nested record, if this value is one.
    pub fn into_record(self) -> Option<Box<dyn Record>> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }
}

/// Records compare equal when they share a runtime type and every declared
/// property compares equal.
fn records_eq(a: &dyn Record, b: &dyn Record) -> bool {
    let ty = a.runtime_type();
    if ty.type_id() != b.runtime_type().type_id() {
        return false;
    }
    ty.properties()
        .iter()
        .all(|p| a.get_property(p.name()) == b.get_property(p.name()))
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U8(a), Value::U8(b)) => a == b,
            (Value::U16(a), Value::U16(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            (Value::Binary(a), Value::Binary(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => records_eq(a.as_ref(), b.as_ref()),
            _ => false,
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from! {
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

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
