//! Stage vocabulary
//!
//! Typed aggregation stages and their wire form. `to_document` produces the
//! exact operator documents the store's aggregation grammar expects.

use bson::{doc, Bson, Document};
use serde_json::Value;

/// Join descriptor for a `$lookup` stage
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// `{from, localField, foreignField, as}`
    Equality {
        from: String,
        local_field: String,
        foreign_field: String,
        as_field: String,
    },
    /// `{from, [localField, foreignField], [let], pipeline, as}`
    Pipeline {
        from: String,
        local_field: Option<String>,
        foreign_field: Option<String>,
        let_vars: Option<Document>,
        pipeline: Vec<Document>,
        as_field: String,
    },
}

impl Lookup {
    /// Field the joined array is bound to
    pub fn as_field(&self) -> &str {
        match self {
            Lookup::Equality { as_field, .. } | Lookup::Pipeline { as_field, .. } => as_field,
        }
    }

    /// Collection joined against
    pub fn from(&self) -> &str {
        match self {
            Lookup::Equality { from, .. } | Lookup::Pipeline { from, .. } => from,
        }
    }

    fn to_document(&self) -> Document {
        match self {
            Lookup::Equality {
                from,
                local_field,
                foreign_field,
                as_field,
            } => doc! {
                "from": from.as_str(),
                "localField": local_field.as_str(),
                "foreignField": foreign_field.as_str(),
                "as": as_field.as_str(),
            },
            Lookup::Pipeline {
                from,
                local_field,
                foreign_field,
                let_vars,
                pipeline,
                as_field,
            } => {
                let mut fields = doc! { "from": from.as_str() };
                if let Some(local) = local_field {
                    fields.insert("localField", local.as_str());
                }
                if let Some(foreign) = foreign_field {
                    fields.insert("foreignField", foreign.as_str());
                }
                if let Some(vars) = let_vars {
                    fields.insert("let", vars.clone());
                }
                let stages: Vec<Bson> = pipeline.iter().cloned().map(Bson::Document).collect();
                fields.insert("pipeline", stages);
                fields.insert("as", as_field.as_str());
                fields
            }
        }
    }
}

/// `$unwind` descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unwind {
    /// Field path without the leading `$`
    pub path: String,
    /// Keep rows whose array is null, missing or empty
    pub preserve_null_and_empty: bool,
}

impl Unwind {
    /// Unwind that keeps unmatched rows
    pub fn preserving(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            preserve_null_and_empty: true,
        }
    }
}

/// One aggregation stage
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Document),
    Sort(Document),
    Skip(i64),
    Limit(i64),
    Lookup(Lookup),
    Unwind(Unwind),
    AddFields(Document),
    Project(Document),
    /// Literal stage spliced verbatim from a declaration
    Custom(Document),
}

impl Stage {
    /// Operator name without the `$` prefix
    pub fn name(&self) -> &str {
        match self {
            Stage::Match(_) => "match",
            Stage::Sort(_) => "sort",
            Stage::Skip(_) => "skip",
            Stage::Limit(_) => "limit",
            Stage::Lookup(_) => "lookup",
            Stage::Unwind(_) => "unwind",
            Stage::AddFields(_) => "addFields",
            Stage::Project(_) => "project",
            Stage::Custom(stage) => stage
                .keys()
                .next()
                .map(|key| key.trim_start_matches('$'))
                .unwrap_or(""),
        }
    }

    /// Wire form of the stage
    pub fn to_document(&self) -> Document {
        match self {
            Stage::Match(filter) => doc! { "$match": filter.clone() },
            Stage::Sort(sort) => doc! { "$sort": sort.clone() },
            Stage::Skip(n) => doc! { "$skip": *n },
            Stage::Limit(n) => doc! { "$limit": *n },
            Stage::Lookup(lookup) => doc! { "$lookup": lookup.to_document() },
            Stage::Unwind(unwind) => doc! {
                "$unwind": {
                    "path": format!("${}", unwind.path),
                    "preserveNullAndEmptyArrays": unwind.preserve_null_and_empty,
                }
            },
            Stage::AddFields(fields) => doc! { "$addFields": fields.clone() },
            Stage::Project(projection) => doc! { "$project": projection.clone() },
            Stage::Custom(stage) => stage.clone(),
        }
    }
}

/// Ordered, immutable stage sequence produced per request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage operator names in order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(Stage::name).collect()
    }

    /// True if any stage has the given operator name
    pub fn contains_stage(&self, name: &str) -> bool {
        self.stages.iter().any(|s| s.name() == name)
    }

    /// Wire form of every stage
    pub fn to_documents(&self) -> Vec<Document> {
        self.stages.iter().map(Stage::to_document).collect()
    }

    /// Relaxed extended JSON rendering
    pub fn to_relaxed_json(&self) -> Value {
        Value::Array(
            self.to_documents()
                .into_iter()
                .map(|d| Bson::Document(d).into_relaxed_extjson())
                .collect(),
        )
    }
}

impl IntoIterator for Pipeline {
    type Item = Stage;
    type IntoIter = std::vec::IntoIter<Stage>;

    fn into_iter(self) -> Self::IntoIter {
        self.stages.into_iter()
    }
}

impl<'a> IntoIterator for &'a Pipeline {
    type Item = &'a Stage;
    type IntoIter = std::slice::Iter<'a, Stage>;

    fn into_iter(self) -> Self::IntoIter {
        self.stages.iter()
    }
}
