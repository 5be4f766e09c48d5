//! Structural mapping between independently declared FastData records.
//!
//! The mapper copies values from a source record into a freshly constructed
//! target record of another type, matching properties by case-insensitive
//! name. Shapes come from the [`fastdata_reflect`] descriptor cache, so
//! repeated copies between the same pair of types never re-introspect.
//!
//! # Quick Start
//!
//! ```rust
//! use fastdata_map::Mapper;
//! use fastdata_reflect::record;
//!
//! #[derive(Clone, Debug, Default)]
//! struct UserDto { user_name: String, age: i32 }
//! record! { UserDto { user_name as "UserName": String, age as "Age": i32 } }
//!
//! #[derive(Clone, Debug, Default)]
//! struct UserRow { username: String, age: i64, email: Option<String> }
//! record! { UserRow { username: String, age: i64, email: Option<String> } }
//!
//! let dto = UserDto { user_name: "ann".into(), age: 30 };
//! let row: UserRow = Mapper::default().copy(&dto).unwrap();
//! assert_eq!(row.username, "ann");
//! assert_eq!(row.age, 30);
//! assert_eq!(row.email, None);
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod mapper;

pub use config::MapperConfig;
pub use convert::{Coercer, ConversionError};
pub use error::{MapError, MapResult};
pub use mapper::{copy, Mapper};
