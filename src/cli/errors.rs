//! CLI-specific error types
//!
//! Compiler errors keep their own stable codes; the CLI only adds codes for
//! its own failures.

use std::fmt;
use std::io;

use crate::error::Error;
use crate::filter::FilterError;
use crate::pipeline::PipelineError;
use crate::schema::SchemaError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Request JSON does not match the command's shape
    InvalidRequest,
    /// Requested limit above the configured maximum
    LimitExceeded,
    /// `catalog` used without `pipelines_file`
    NoCatalog,
    /// Error raised by the compiler, carrying its own code
    Compile(&'static str),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "DOCPIPE_CLI_CONFIG_ERROR",
            Self::IoError => "DOCPIPE_CLI_IO_ERROR",
            Self::InvalidRequest => "DOCPIPE_CLI_INVALID_REQUEST",
            Self::LimitExceeded => "DOCPIPE_CLI_LIMIT_EXCEEDED",
            Self::NoCatalog => "DOCPIPE_CLI_NO_CATALOG",
            Self::Compile(code) => *code,
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidRequest, msg)
    }

    pub fn limit_exceeded(limit: i64, max: i64) -> Self {
        Self::new(
            CliErrorCode::LimitExceeded,
            format!("limit {} exceeds the configured maximum of {}", limit, max),
        )
    }

    pub fn no_catalog() -> Self {
        Self::new(
            CliErrorCode::NoCatalog,
            "No pipelines_file configured. Add one to the config to use 'catalog'.",
        )
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::invalid_request(format!("JSON error: {}", e))
    }
}

impl From<Error> for CliError {
    fn from(e: Error) -> Self {
        Self::new(CliErrorCode::Compile(e.code()), e.to_string())
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Error::from(e).into()
    }
}

impl From<FilterError> for CliError {
    fn from(e: FilterError) -> Self {
        Error::from(e).into()
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        Error::from(e).into()
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
