//! Runtime shape discovery for FastData records.
//!
//! Rust has no runtime reflection, so record types opt in explicitly with the
//! [`record!`] macro. Registration yields a property table that the
//! [`DescriptorCache`] turns into a validated, cached [`TypeDescriptor`], and
//! an [`Accessor`] reads and writes properties by name over any instance.
//!
//! # Key Types
//!
//! - [`Value`] / [`ScalarKind`]: runtime values and the closed set of scalar kinds
//! - [`Record`] / [`Reflect`]: object-safe and static record access
//! - [`RecordType`]: registration handle with optional constructor
//! - [`PropertyDescriptor`] / [`TypeDescriptor`]: property and type shapes
//! - [`DescriptorCache`]: read-through, never-evicting descriptor cache
//! - [`Accessor`] / [`BoundProperty`]: case-insensitive dynamic get/set
//!
//! # Design Rules
//!
//! 1. Scalar vs composite is decided by [`ScalarKind`], never by type names.
//! 2. Property names match case-insensitively; collisions fail at build time.
//! 3. Accessor writes never coerce: a value must already have the field's kind.

pub mod accessor;
pub mod cache;
pub mod descriptor;
pub mod error;
pub mod field;
pub mod record;
pub mod value;

pub use accessor::{Accessor, BoundProperty};
pub use cache::DescriptorCache;
pub use descriptor::{fold_name, DeclaredType, PropertyDescriptor, PropertyKind, TypeDescriptor};
pub use error::{ReflectError, ReflectResult};
pub use field::{Field, ScalarField};
pub use record::{downcast_record, Record, RecordType, Reflect};
pub use value::{ScalarKind, Value};
