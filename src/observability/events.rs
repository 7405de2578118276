//! Observable events for docpipe
//!
//! Events are explicit and typed. Each event has a stable upper-snake name
//! that is attached to log records as the `event` field.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file loaded
    ConfigLoaded,
    /// Schema directory loaded
    SchemasLoaded,
    /// Single entity schema registered
    SchemaRegistered,
    /// Named pipeline catalog loaded
    CatalogLoaded,

    // Compilation
    /// Filter compiled into a typed filter
    FilterCompiled,
    /// Filter rejected
    FilterRejected,
    /// Pipeline built
    PipelineBuilt,
    /// Pipeline request rejected
    PipelineRejected,

    // Execution boundary
    /// Pipeline handed to the execution collaborator
    AggregateSubmitted,
    /// Execution collaborator failed
    AggregateFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemasLoaded => "SCHEMAS_LOADED",
            Event::SchemaRegistered => "SCHEMA_REGISTERED",
            Event::CatalogLoaded => "CATALOG_LOADED",

            Event::FilterCompiled => "FILTER_COMPILED",
            Event::FilterRejected => "FILTER_REJECTED",
            Event::PipelineBuilt => "PIPELINE_BUILT",
            Event::PipelineRejected => "PIPELINE_REJECTED",

            Event::AggregateSubmitted => "AGGREGATE_SUBMITTED",
            Event::AggregateFailed => "AGGREGATE_FAILED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
