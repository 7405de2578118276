//! Pipeline subsystem
//!
//! Turns an entity, a typed filter and expansion requests into an ordered
//! sequence of aggregation stages.
//!
//! # Design Principles
//!
//! - Deterministic: same inputs, same stages
//! - Fixed order: Match, Sort, Skip, Limit, expansions, custom pipelines, Project
//! - Fail fast: no partial pipeline is ever returned
//! - Pure: inputs are never mutated, every call allocates a fresh pipeline

mod builder;
mod catalog;
mod errors;
mod simple;
mod stage;

pub use builder::{validate_sort, PipelineBuilder, PipelineRequest};
pub use catalog::PipelineCatalog;
pub use errors::{PipelineError, PipelineResult};
pub use simple::build_simple_pipeline;
pub use stage::{Lookup, Pipeline, Stage, Unwind};
