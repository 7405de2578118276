//! Schema error types
//!
//! Every schema error is a programming or configuration defect and is
//! treated as fatal by callers.

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Schema descriptor errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Entity not present in the registry
    #[error("Entity '{0}' is not registered")]
    UnknownEntity(String),

    /// Field not declared on the entity
    #[error("Field '{field}' is not declared on entity '{entity}'")]
    UnknownField { entity: String, field: String },

    /// Entity registered twice
    #[error("Entity '{0}' is already registered")]
    DuplicateEntity(String),

    /// Field declared twice on one entity
    #[error("Field '{field}' is declared more than once on entity '{entity}'")]
    DuplicateField { entity: String, field: String },

    /// Relationship metadata violates the declaration rules
    #[error("Invalid relationship '{entity}.{field}': {reason}")]
    InvalidRelationship {
        entity: String,
        field: String,
        reason: String,
    },

    /// Enum declared without members
    #[error("Enum field '{entity}.{field}' declares no members")]
    EmptyEnum { entity: String, field: String },

    /// Schema file could not be read or parsed
    #[error("Malformed schema file '{path}': {reason}")]
    Malformed { path: String, reason: String },
}

impl SchemaError {
    pub fn unknown_field(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            entity: entity.into(),
            field: field.into(),
        }
    }

    pub fn invalid_relationship(
        entity: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidRelationship {
            entity: entity.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::UnknownEntity(_) => "DOCPIPE_SCHEMA_UNKNOWN_ENTITY",
            SchemaError::UnknownField { .. } => "DOCPIPE_SCHEMA_UNKNOWN_FIELD",
            SchemaError::DuplicateEntity(_) => "DOCPIPE_SCHEMA_DUPLICATE_ENTITY",
            SchemaError::DuplicateField { .. } => "DOCPIPE_SCHEMA_DUPLICATE_FIELD",
            SchemaError::InvalidRelationship { .. } => "DOCPIPE_SCHEMA_INVALID_RELATIONSHIP",
            SchemaError::EmptyEnum { .. } => "DOCPIPE_SCHEMA_EMPTY_ENUM",
            SchemaError::Malformed { .. } => "DOCPIPE_SCHEMA_MALFORMED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            SchemaError::UnknownEntity("X".into()).code(),
            "DOCPIPE_SCHEMA_UNKNOWN_ENTITY"
        );
        assert_eq!(
            SchemaError::unknown_field("Order", "nope").code(),
            "DOCPIPE_SCHEMA_UNKNOWN_FIELD"
        );
    }

    #[test]
    fn test_display_names_entity_and_field() {
        let display = SchemaError::unknown_field("Order", "nope").to_string();
        assert!(display.contains("Order"));
        assert!(display.contains("nope"));
    }
}
