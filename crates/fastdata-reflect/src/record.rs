//! Record traits and the [`record!`](crate::record) registration macro.
//!
//! A record is a plain struct whose fields are exposed by name. Registration
//! produces three things for the type:
//!
//! - a [`RecordType`] handle carrying its identity, property table builder,
//!   and optional parameterless constructor;
//! - an object-safe [`Record`] impl for name-keyed reads and writes;
//! - a [`Field`](crate::Field) impl so the record can be nested inside
//!   other records as a composite property.

use std::any::{Any, TypeId};
use std::fmt;

use crate::descriptor::PropertyDescriptor;
use crate::error::ReflectResult;
use crate::value::Value;

// ---------------------------------------------------------------------------
// RecordType
// ---------------------------------------------------------------------------

/// Registration handle for a record type.
///
/// Cheap to copy. The property table is produced on demand by a function
/// pointer so that nested composite declarations never recurse eagerly.
#[derive(Clone, Copy)]
pub struct RecordType {
    type_id: TypeId,
    name: &'static str,
    properties: fn() -> Vec<PropertyDescriptor>,
    construct: Option<fn() -> Box<dyn Record>>,
}

impl RecordType {
    /// Describe the record type `T`.
    pub fn new<T: 'static>(
        name: &'static str,
        properties: fn() -> Vec<PropertyDescriptor>,
        construct: Option<fn() -> Box<dyn Record>>,
    ) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name,
            properties,
            construct,
        }
    }

    /// Identity of the registered Rust type.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The record's declared name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Build the declared property table, in declaration order.
    pub fn properties(&self) -> Vec<PropertyDescriptor> {
        (self.properties)()
    }

    /// Whether a parameterless constructor is registered.
    pub fn is_constructible(&self) -> bool {
        self.construct.is_some()
    }

    /// Construct a default instance, if the type registered a constructor.
    pub fn construct(&self) -> Option<Box<dyn Record>> {
        self.construct.map(|make| make())
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for RecordType {}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("name", &self.name)
            .field("constructible", &self.is_constructible())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Object-safe, name-keyed access to a record instance.
///
/// Property names passed to `get_property`/`set_property` are the exact
/// declared names; case-insensitive resolution is done by the
/// [`Accessor`](crate::Accessor) through the type descriptor.
pub trait Record: Any + Send + Sync + fmt::Debug {
    /// Registration handle of the instance's concrete type.
    fn runtime_type(&self) -> RecordType;

    /// Read a property by its declared name.
    fn get_property(&self, name: &str) -> Option<Value>;

    /// Write a property by its declared name.
    ///
    /// Fails with `PropertyNotFound` for unknown names and `TypeMismatch`
    /// when the value's kind does not fit the field exactly.
    fn set_property(&mut self, name: &str, value: Value) -> ReflectResult<()>;

    /// Clone into a new boxed record.
    fn clone_record(&self) -> Box<dyn Record>;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Static access to a record type's registration.
pub trait Reflect: Record + Sized {
    fn record_type() -> RecordType;
}

impl Clone for Box<dyn Record> {
    fn clone(&self) -> Self {
        self.clone_record()
    }
}

/// Recover a concrete record from a boxed one.
///
/// Returns `None` when the box holds a different record type.
pub fn downcast_record<T: Record>(record: Box<dyn Record>) -> Option<T> {
    record.into_any().downcast::<T>().ok().map(|concrete| *concrete)
}

// ---------------------------------------------------------------------------
// record!
// ---------------------------------------------------------------------------

/// Register an existing struct as a record.
///
/// ```
/// use fastdata_reflect::{record, Reflect};
///
/// #[derive(Clone, Debug, Default)]
/// struct Account {
///     user_name: String,
///     age: Option<i32>,
/// }
///
/// record! {
///     Account {
///         user_name as "UserName": String,
///         age: Option<i32>,
///     }
/// }
///
/// let ty = Account::record_type();
/// assert_eq!(ty.name(), "Account");
/// assert_eq!(ty.properties()[0].name(), "UserName");
/// assert!(ty.is_constructible());
/// ```
///
/// Properties take the field's identifier as their name unless renamed with
/// `as "Name"`. Construction defaults to `Default::default()`; pass
/// `#[construct(none)]` before the type name to register a record that
/// cannot be built without a caller-supplied factory.
#[macro_export]
macro_rules! record {
    (@name $field:ident $alias:literal) => {
        $alias
    };
    (@name $field:ident) => {
        stringify!($field)
    };
    (@construct [] $name:ident) => {
        $crate::record!(@construct [default] $name)
    };
    (@construct [default] $name:ident) => {{
        fn construct() -> ::std::boxed::Box<dyn $crate::Record> {
            ::std::boxed::Box::new(<$name as ::std::default::Default>::default())
        }
        ::std::option::Option::Some(construct as fn() -> ::std::boxed::Box<dyn $crate::Record>)
    }};
    (@construct [none] $name:ident) => {
        ::std::option::Option::None
    };
    (
        $(#[construct($construct:ident)])?
        $name:ident {
            $($field:ident $(as $alias:literal)? : $fty:ty),* $(,)?
        }
    ) => {
        impl $crate::Reflect for $name {
            fn record_type() -> $crate::RecordType {
                fn properties() -> ::std::vec::Vec<$crate::PropertyDescriptor> {
                    ::std::vec![
                        $($crate::PropertyDescriptor::of::<$fty>(
                            $crate::record!(@name $field $($alias)?)
                        )),*
                    ]
                }
                $crate::RecordType::new::<$name>(
                    stringify!($name),
                    properties,
                    $crate::record!(@construct [$($construct)?] $name),
                )
            }
        }

        impl $crate::Record for $name {
            fn runtime_type(&self) -> $crate::RecordType {
                <$name as $crate::Reflect>::record_type()
            }

            #[allow(unused_variables)]
            fn get_property(&self, name: &str) -> ::std::option::Option<$crate::Value> {
                $(
                    if name == $crate::record!(@name $field $($alias)?) {
                        return ::std::option::Option::Some(
                            <$fty as $crate::Field>::to_value(&self.$field),
                        );
                    }
                )*
                ::std::option::Option::None
            }

            fn set_property(
                &mut self,
                name: &str,
                value: $crate::Value,
            ) -> $crate::ReflectResult<()> {
                $(
                    if name == $crate::record!(@name $field $($alias)?) {
                        let found = value.kind_name();
                        return match <$fty as $crate::Field>::from_value(value) {
                            ::std::option::Option::Some(v) => {
                                self.$field = v;
                                ::std::result::Result::Ok(())
                            }
                            ::std::option::Option::None => {
                                ::std::result::Result::Err($crate::ReflectError::TypeMismatch {
                                    type_name: stringify!($name).to_string(),
                                    property: name.to_string(),
                                    expected: <$fty as $crate::Field>::declared_type().to_string(),
                                    found: found.to_string(),
                                })
                            }
                        };
                    }
                )*
                let _ = value;
                ::std::result::Result::Err($crate::ReflectError::PropertyNotFound {
                    type_name: stringify!($name).to_string(),
                    property: name.to_string(),
                })
            }

            fn clone_record(&self) -> ::std::boxed::Box<dyn $crate::Record> {
                ::std::boxed::Box::new(::std::clone::Clone::clone(self))
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::std::any::Any> {
                self
            }
        }

        impl $crate::Field for $name {
            fn declared_type() -> $crate::DeclaredType {
                $crate::DeclaredType::Composite(<$name as $crate::Reflect>::record_type())
            }

            fn to_value(&self) -> $crate::Value {
                $crate::Value::Record(::std::boxed::Box::new(::std::clone::Clone::clone(self)))
            }

            fn from_value(value: $crate::Value) -> ::std::option::Option<Self> {
                $crate::downcast_record::<$name>(value.into_record()?)
            }
        }
    };
}
