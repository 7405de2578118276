//! Crate-level error type
//!
//! Subsystems keep their own error enums; this one unifies them for the
//! service facade and the CLI.

use std::fmt;

use thiserror::Error;

use crate::coercion::CoercionError;
use crate::filter::FilterError;
use crate::pipeline::PipelineError;
use crate::schema::SchemaError;
use crate::service::RunnerError;

/// Result type for crate-level operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error families surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed request parameters
    Validation,
    /// Unknown entity/field or invalid declaration
    Schema,
    /// Relationship crossing database boundaries
    CrossDatabase,
    /// Raw value not convertible to the declared type
    Coercion,
    /// Failure reported by the execution collaborator
    Execution,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::Schema => "schema",
            ErrorCategory::CrossDatabase => "cross_database",
            ErrorCategory::Coercion => "coercion",
            ErrorCategory::Execution => "execution",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any docpipe error
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Coercion(#[from] CoercionError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Runner(#[from] RunnerError),
}

impl Error {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            Error::Schema(e) => e.code(),
            Error::Coercion(e) => e.code(),
            Error::Filter(e) => e.code(),
            Error::Pipeline(e) => e.code(),
            Error::Runner(e) => e.code(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Schema(_) => ErrorCategory::Schema,
            Error::Coercion(CoercionError::UnsupportedFieldType { .. }) => ErrorCategory::Schema,
            Error::Coercion(_) => ErrorCategory::Coercion,
            Error::Filter(e) => e.category(),
            Error::Pipeline(e) => e.category(),
            Error::Runner(_) => ErrorCategory::Execution,
        }
    }
}
