//! Execution boundary
//!
//! The crate builds pipelines; running them belongs to whatever store
//! driver the caller wires in behind [`PipelineRunner`].

use bson::Document;
use thiserror::Error;

use crate::pipeline::Pipeline;

/// Failure reported by a runner
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunnerError {
    /// Store rejected or failed the aggregation
    #[error("Aggregation on '{database}.{collection}' failed: {reason}")]
    Aggregate {
        database: String,
        collection: String,
        reason: String,
    },

    /// Store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl RunnerError {
    pub fn aggregate(
        database: impl Into<String>,
        collection: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Aggregate {
            database: database.into(),
            collection: collection.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            RunnerError::Aggregate { .. } => "DOCPIPE_RUNNER_AGGREGATE_FAILED",
            RunnerError::Unavailable(_) => "DOCPIPE_RUNNER_UNAVAILABLE",
        }
    }
}

/// Executes an aggregation against a collection
pub trait PipelineRunner {
    fn aggregate(
        &self,
        database: &str,
        collection: &str,
        pipeline: &Pipeline,
    ) -> Result<Vec<Document>, RunnerError>;
}

impl<R: PipelineRunner + ?Sized> PipelineRunner for &R {
    fn aggregate(
        &self,
        database: &str,
        collection: &str,
        pipeline: &Pipeline,
    ) -> Result<Vec<Document>, RunnerError> {
        (**self).aggregate(database, collection, pipeline)
    }
}
