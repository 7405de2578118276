//! Simple pipeline path
//!
//! Builds `match [+ sort] [+ skip] [+ limit] [+ project]` directly from
//! values the caller already holds in native form. No schema is consulted
//! and no coercion happens.

use bson::Document;

use super::errors::{PipelineError, PipelineResult};
use super::stage::{Pipeline, Stage};

/// Builds an untyped pipeline.
///
/// A zero limit or zero skip emits no stage; negative values are rejected.
pub fn build_simple_pipeline(
    filter: Document,
    sort: Option<Document>,
    skip: i64,
    limit: Option<i64>,
    project: Option<Document>,
) -> PipelineResult<Pipeline> {
    if let Some(limit) = limit.filter(|l| *l < 0) {
        return Err(PipelineError::InvalidLimit(limit));
    }
    if skip < 0 {
        return Err(PipelineError::NegativeSkip(skip));
    }

    let mut stages = vec![Stage::Match(filter)];
    if let Some(sort) = sort.filter(|s| !s.is_empty()) {
        stages.push(Stage::Sort(sort));
    }
    if skip > 0 {
        stages.push(Stage::Skip(skip));
    }
    if let Some(limit) = limit.filter(|l| *l > 0) {
        stages.push(Stage::Limit(limit));
    }
    if let Some(project) = project.filter(|p| !p.is_empty()) {
        stages.push(Stage::Project(project));
    }
    Ok(Pipeline::new(stages))
}
