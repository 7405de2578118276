//! Filter compiler error types

use thiserror::Error;

use crate::coercion::CoercionError;
use crate::error::ErrorCategory;
use crate::schema::SchemaError;

/// Result type for filter compilation
pub type FilterResult<T> = Result<T, FilterError>;

/// Filter compilation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// Nested path in a filter key
    #[error("Filtering on nested field '{0}' is not supported")]
    DottedFieldNotSupported(String),

    /// Field not declared on the entity
    #[error("Field '{field}' not found on entity '{entity}'")]
    UnknownField { entity: String, field: String },

    /// Operator outside the supported comparison set
    #[error("Unsupported operator '{operator}' on field '{field}'")]
    UnsupportedOperator { field: String, operator: String },

    /// `$regex` on a field that does not hold strings
    #[error("Operator '{operator}' cannot be applied to '{field}' of type '{type_name}'")]
    OperatorTypeMismatch {
        field: String,
        operator: &'static str,
        type_name: &'static str,
    },

    /// Two filter keys that address the same stored field
    #[error("Fields '{other}' and '{field}' both filter on '{target}'")]
    ConflictingAlias {
        field: String,
        other: String,
        target: String,
    },

    /// Value could not be coerced into the field's type
    #[error("Invalid value for field '{field}': {source}")]
    Coercion {
        field: String,
        #[source]
        source: CoercionError,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl FilterError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            FilterError::DottedFieldNotSupported(_) => "DOCPIPE_FILTER_DOTTED_FIELD",
            FilterError::UnknownField { .. } => "DOCPIPE_FILTER_UNKNOWN_FIELD",
            FilterError::UnsupportedOperator { .. } => "DOCPIPE_FILTER_UNSUPPORTED_OPERATOR",
            FilterError::OperatorTypeMismatch { .. } => "DOCPIPE_FILTER_OPERATOR_TYPE_MISMATCH",
            FilterError::ConflictingAlias { .. } => "DOCPIPE_FILTER_CONFLICTING_ALIAS",
            FilterError::Coercion { source, .. } => source.code(),
            FilterError::Schema(e) => e.code(),
        }
    }

    /// Error family this error belongs to
    pub fn category(&self) -> ErrorCategory {
        match self {
            FilterError::DottedFieldNotSupported(_)
            | FilterError::UnsupportedOperator { .. }
            | FilterError::OperatorTypeMismatch { .. }
            | FilterError::ConflictingAlias { .. } => ErrorCategory::Validation,
            FilterError::UnknownField { .. } | FilterError::Schema(_) => ErrorCategory::Schema,
            FilterError::Coercion { source, .. } => match source {
                CoercionError::UnsupportedFieldType { .. } => ErrorCategory::Schema,
                _ => ErrorCategory::Coercion,
            },
        }
    }

    /// Offending field, when the error is tied to one
    pub fn field(&self) -> Option<&str> {
        match self {
            FilterError::DottedFieldNotSupported(field)
            | FilterError::UnknownField { field, .. }
            | FilterError::UnsupportedOperator { field, .. }
            | FilterError::OperatorTypeMismatch { field, .. }
            | FilterError::ConflictingAlias { field, .. }
            | FilterError::Coercion { field, .. } => Some(field),
            FilterError::Schema(_) => None,
        }
    }
}
