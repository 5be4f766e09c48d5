use fastdata_reflect::ReflectError;
use thiserror::Error;

use crate::convert::ConversionError;

/// Errors that abort a copy operation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MapError {
    /// The target (or a nested target) type cannot be default-constructed.
    #[error("cannot construct {type_name}: {reason}")]
    Construction { type_name: String, reason: String },

    /// A source value cannot be coerced into the target property's type.
    #[error("cannot convert {type_name}.{property}: {source}")]
    TypeConversion {
        type_name: String,
        property: String,
        source: ConversionError,
    },

    /// Descriptor build or accessor failure.
    #[error(transparent)]
    Reflect(#[from] ReflectError),

    /// Mapper configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl MapError {
    pub(crate) fn not_constructible(type_name: &str) -> Self {
        Self::Construction {
            type_name: type_name.to_string(),
            reason: "no parameterless constructor registered".into(),
        }
    }
}

/// Result alias for mapper operations.
pub type MapResult<T> = Result<T, MapError>;
