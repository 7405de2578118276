//! Named pipeline catalog
//!
//! A JSON file maps pipeline names to literal stage sequences:
//!
//! ```json
//! { "top_customers": [ { "$group": { "_id": "$customer_id" } }, { "$sort": { "n": -1 } } ] }
//! ```
//!
//! Reading a pipeline substitutes placeholder strings and frames the stages
//! with an optional leading Match and trailing Skip / Limit.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use bson::{Bson, Document};

use crate::observability::Event;

use super::errors::{PipelineError, PipelineResult};
use super::stage::{Pipeline, Stage};

/// Immutable set of named stage sequences
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineCatalog {
    pipelines: BTreeMap<String, Vec<Document>>,
}

impl PipelineCatalog {
    pub fn new(pipelines: BTreeMap<String, Vec<Document>>) -> Self {
        Self { pipelines }
    }

    /// Loads a catalog file
    pub fn load(path: &Path) -> PipelineResult<Self> {
        let malformed = |reason: String| PipelineError::MalformedCatalog {
            path: path.display().to_string(),
            reason,
        };

        let content = fs::read_to_string(path)
            .map_err(|e| malformed(format!("Failed to read file: {}", e)))?;
        let pipelines: BTreeMap<String, Vec<Document>> = serde_json::from_str(&content)
            .map_err(|e| malformed(format!("Invalid JSON: {}", e)))?;

        tracing::info!(
            event = %Event::CatalogLoaded,
            path = %path.display(),
            pipelines = pipelines.len(),
        );
        Ok(Self::new(pipelines))
    }

    /// Pipeline names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pipelines.keys().map(String::as_str)
    }

    /// Raw stages of a named pipeline
    pub fn get(&self, name: &str) -> Option<&[Document]> {
        self.pipelines.get(name).map(Vec::as_slice)
    }

    /// Reads a named pipeline.
    ///
    /// `replacements` maps placeholder strings to the values substituted
    /// wherever a string value equals the placeholder exactly. Skip and
    /// limit are appended only when the named stages do not already contain
    /// them.
    pub fn read(
        &self,
        name: &str,
        query: Option<&Document>,
        limit: Option<i64>,
        skip: i64,
        replacements: &HashMap<String, Bson>,
    ) -> PipelineResult<Pipeline> {
        let raw = self
            .get(name)
            .ok_or_else(|| PipelineError::UnknownPipeline(name.to_string()))?;
        if let Some(limit) = limit.filter(|l| *l < 0) {
            return Err(PipelineError::InvalidLimit(limit));
        }
        if skip < 0 {
            return Err(PipelineError::NegativeSkip(skip));
        }

        let mut stages = Vec::with_capacity(raw.len() + 3);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            stages.push(Stage::Match(query.clone()));
        }
        stages.extend(
            raw.iter()
                .map(|stage| Stage::Custom(replace_in_document(stage, replacements))),
        );

        let has = |name: &str| stages.iter().any(|s| s.name() == name);
        let add_skip = skip > 0 && !has("skip");
        let add_limit = limit.filter(|l| *l > 0).filter(|_| !has("limit"));
        if add_skip {
            stages.push(Stage::Skip(skip));
        }
        if let Some(limit) = add_limit {
            stages.push(Stage::Limit(limit));
        }

        Ok(Pipeline::new(stages))
    }
}

fn replace_in_document(document: &Document, replacements: &HashMap<String, Bson>) -> Document {
    document
        .iter()
        .map(|(key, value)| (key.clone(), replace_in_value(value, replacements)))
        .collect()
}

fn replace_in_value(value: &Bson, replacements: &HashMap<String, Bson>) -> Bson {
    match value {
        Bson::String(s) => replacements
            .get(s)
            .cloned()
            .unwrap_or_else(|| value.clone()),
        Bson::Document(d) => Bson::Document(replace_in_document(d, replacements)),
        Bson::Array(items) => Bson::Array(
            items
                .iter()
                .map(|item| replace_in_value(item, replacements))
                .collect(),
        ),
        other => other.clone(),
    }
}
