use thiserror::Error;

/// Errors produced while describing records or accessing their properties.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReflectError {
    /// No property on the type matches the requested name.
    #[error("property '{property}' not found on {type_name}")]
    PropertyNotFound { type_name: String, property: String },

    /// The value cannot be stored into the property without coercion.
    #[error("type mismatch on {type_name}.{property}: expected {expected}, found {found}")]
    TypeMismatch {
        type_name: String,
        property: String,
        expected: String,
        found: String,
    },

    /// Two properties of one type fold to the same case-insensitive key.
    #[error("ambiguous property names on {type_name}: '{first}' and '{second}' collide")]
    AmbiguousPropertyName {
        type_name: String,
        first: String,
        second: String,
    },

    /// An accessor bound to one type was handed an instance of another.
    #[error("accessor bound to {expected} used with an instance of {found}")]
    InstanceMismatch { expected: String, found: String },
}

impl ReflectError {
    pub(crate) fn not_found(type_name: &str, property: &str) -> Self {
        Self::PropertyNotFound {
            type_name: type_name.to_string(),
            property: property.to_string(),
        }
    }
}

/// Result alias for reflection operations.
pub type ReflectResult<T> = Result<T, ReflectError>;
