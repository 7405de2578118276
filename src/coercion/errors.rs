//! Type coercion error types
//!
//! Each variant carries the raw value that failed to coerce. The filter
//! compiler adds the field name.

use thiserror::Error;

/// Result type for coercion
pub type CoercionResult<T> = Result<T, CoercionError>;

/// Raw string could not be converted into the declared type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    #[error("'{value}' is not a valid integer")]
    InvalidInteger { value: String },

    #[error("'{value}' is not a valid float")]
    InvalidFloat { value: String },

    #[error("'{value}' is not a member of [{}]", .allowed.join(", "))]
    InvalidEnumValue { value: String, allowed: Vec<String> },

    #[error("'{value}' is not a valid object identifier")]
    InvalidIdentifier { value: String },

    #[error("'{value}' is not a valid ISO-8601 timestamp")]
    InvalidTimestamp { value: String },

    /// Declared type has no string form
    #[error("Coercion into '{type_name}' is not supported")]
    UnsupportedFieldType { type_name: &'static str },
}

impl CoercionError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CoercionError::InvalidInteger { .. } => "DOCPIPE_COERCE_INVALID_INTEGER",
            CoercionError::InvalidFloat { .. } => "DOCPIPE_COERCE_INVALID_FLOAT",
            CoercionError::InvalidEnumValue { .. } => "DOCPIPE_COERCE_INVALID_ENUM_VALUE",
            CoercionError::InvalidIdentifier { .. } => "DOCPIPE_COERCE_INVALID_IDENTIFIER",
            CoercionError::InvalidTimestamp { .. } => "DOCPIPE_COERCE_INVALID_TIMESTAMP",
            CoercionError::UnsupportedFieldType { .. } => "DOCPIPE_COERCE_UNSUPPORTED_FIELD_TYPE",
        }
    }

    /// Raw value that failed, if any
    pub fn raw_value(&self) -> Option<&str> {
        match self {
            CoercionError::InvalidInteger { value }
            | CoercionError::InvalidFloat { value }
            | CoercionError::InvalidEnumValue { value, .. }
            | CoercionError::InvalidIdentifier { value }
            | CoercionError::InvalidTimestamp { value } => Some(value),
            CoercionError::UnsupportedFieldType { .. } => None,
        }
    }
}
