//! Pipeline error types
//!
//! All errors are raised before any pipeline is returned.

use thiserror::Error;

use crate::error::ErrorCategory;
use crate::schema::SchemaError;

/// Result type for pipeline construction
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Pipeline construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    // ==================
    // Validation Errors
    // ==================
    /// Limit present but not strictly positive
    #[error("limit has to be a strictly positive value or absent, got {0}")]
    InvalidLimit(i64),

    /// Negative skip
    #[error("skip has to be a non-negative integer, got {0}")]
    NegativeSkip(i64),

    /// Sort value other than 1 / -1
    #[error("sort direction for '{field}' must be either 1 or -1, got {value}")]
    InvalidSortDirection { field: String, value: String },

    // ==================
    // Relationship Errors
    // ==================
    /// Expansion would join across databases
    #[error(
        "Cannot expand '{field}' across databases: '{database}' cannot join into '{related_database}'"
    )]
    CrossDatabaseExpansion {
        field: String,
        database: String,
        related_database: String,
    },

    /// Expansion requested on a field that is not a relationship
    #[error("Field '{entity}.{field}' of type '{type_name}' cannot be expanded")]
    NotExpandable {
        entity: String,
        field: String,
        type_name: &'static str,
    },

    // ==================
    // Catalog Errors
    // ==================
    /// Named pipeline not in the catalog
    #[error("Pipeline '{0}' is not defined in the catalog")]
    UnknownPipeline(String),

    /// Catalog file could not be read or parsed
    #[error("Malformed pipeline catalog '{path}': {reason}")]
    MalformedCatalog { path: String, reason: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl PipelineError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::InvalidLimit(_) => "DOCPIPE_PIPELINE_INVALID_LIMIT",
            PipelineError::NegativeSkip(_) => "DOCPIPE_PIPELINE_NEGATIVE_SKIP",
            PipelineError::InvalidSortDirection { .. } => "DOCPIPE_PIPELINE_INVALID_SORT",
            PipelineError::CrossDatabaseExpansion { .. } => "DOCPIPE_PIPELINE_CROSS_DATABASE",
            PipelineError::NotExpandable { .. } => "DOCPIPE_PIPELINE_NOT_EXPANDABLE",
            PipelineError::UnknownPipeline(_) => "DOCPIPE_PIPELINE_UNKNOWN_PIPELINE",
            PipelineError::MalformedCatalog { .. } => "DOCPIPE_PIPELINE_MALFORMED_CATALOG",
            PipelineError::Schema(e) => e.code(),
        }
    }

    /// Error family this error belongs to
    pub fn category(&self) -> ErrorCategory {
        match self {
            PipelineError::InvalidLimit(_)
            | PipelineError::NegativeSkip(_)
            | PipelineError::InvalidSortDirection { .. }
            | PipelineError::UnknownPipeline(_) => ErrorCategory::Validation,
            PipelineError::CrossDatabaseExpansion { .. } => ErrorCategory::CrossDatabase,
            PipelineError::NotExpandable { .. }
            | PipelineError::MalformedCatalog { .. }
            | PipelineError::Schema(_) => ErrorCategory::Schema,
        }
    }
}
