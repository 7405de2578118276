//! Pipeline builder
//!
//! Stage emission order is fixed and never rearranged:
//! 1. Match (always, possibly empty)
//! 2. Sort (non-empty sort only)
//! 3. Skip (skip > 0 only)
//! 4. Limit (limit set only)
//! 5. Expansions, in requested order
//! 6. Custom pipelines declared on the root entity, in declaration order
//! 7. Project (projection requested and non-empty), always last

use bson::{doc, Bson, Document};

use crate::observability::Event;
use crate::projection::{default_projection, nested_projection, ProjectionMap};
use crate::schema::{EntitySchema, FieldDef, SchemaRegistry};

use super::errors::{PipelineError, PipelineResult};
use super::stage::{Lookup, Pipeline, Stage, Unwind};

/// Inputs of one pipeline build
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRequest {
    /// Root entity name
    pub entity: String,
    /// Typed filter for the Match stage
    pub filter: Document,
    /// Field -> 1 / -1
    pub sort: Option<Document>,
    pub skip: i64,
    pub limit: Option<i64>,
    /// Relationship fields to expand, in order
    pub expand: Vec<String>,
    /// Emit the final projection
    pub project: bool,
}

impl PipelineRequest {
    /// Request with an empty filter and projection enabled
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            filter: Document::new(),
            sort: None,
            skip: 0,
            limit: None,
            expand: Vec::new(),
            project: true,
        }
    }

    pub fn with_filter(mut self, filter: Document) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_sort(mut self, sort: Document) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_skip(mut self, skip: i64) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Adds one field to expand
    pub fn expand(mut self, field: impl Into<String>) -> Self {
        self.expand.push(field.into());
        self
    }

    pub fn with_expand<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expand.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn with_projection(mut self, project: bool) -> Self {
        self.project = project;
        self
    }

    /// Validates limit, skip and sort shape
    pub fn validate(&self) -> PipelineResult<()> {
        if let Some(limit) = self.limit {
            if limit <= 0 {
                return Err(PipelineError::InvalidLimit(limit));
            }
        }
        if self.skip < 0 {
            return Err(PipelineError::NegativeSkip(self.skip));
        }
        if let Some(sort) = &self.sort {
            validate_sort(sort)?;
        }
        Ok(())
    }
}

/// Checks that every sort direction is exactly 1 or -1
pub fn validate_sort(sort: &Document) -> PipelineResult<()> {
    for (field, value) in sort {
        if !is_sort_direction(value) {
            return Err(PipelineError::InvalidSortDirection {
                field: field.clone(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

fn is_sort_direction(value: &Bson) -> bool {
    match value {
        Bson::Int32(v) => *v == 1 || *v == -1,
        Bson::Int64(v) => *v == 1 || *v == -1,
        Bson::Double(v) => *v == 1.0 || *v == -1.0,
        _ => false,
    }
}

/// Compiles pipeline requests against a schema registry.
///
/// Holds only a shared borrow of the registry; building is pure and may run
/// concurrently from any number of threads.
pub struct PipelineBuilder<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Builds the stage sequence for `request`.
    ///
    /// Deterministic: the same request against the same registry yields a
    /// structurally identical pipeline.
    pub fn build(&self, request: &PipelineRequest) -> PipelineResult<Pipeline> {
        let result = self.build_stages(request);
        match &result {
            Ok(pipeline) => tracing::debug!(
                event = %Event::PipelineBuilt,
                entity = %request.entity,
                stages = pipeline.len(),
                expanded = request.expand.len(),
            ),
            Err(e) => tracing::warn!(
                event = %Event::PipelineRejected,
                entity = %request.entity,
                code = e.code(),
                reason = %e,
            ),
        }
        result
    }

    fn build_stages(&self, request: &PipelineRequest) -> PipelineResult<Pipeline> {
        request.validate()?;
        let entity = self.registry.get(&request.entity)?;

        let mut stages = Vec::new();
        let mut projection = if request.project {
            default_projection(entity)
        } else {
            ProjectionMap::new()
        };

        // 1-4. Match / Sort / Skip / Limit
        stages.push(Stage::Match(request.filter.clone()));
        if let Some(sort) = request.sort.as_ref().filter(|s| !s.is_empty()) {
            stages.push(Stage::Sort(sort.clone()));
        }
        if request.skip > 0 {
            stages.push(Stage::Skip(request.skip));
        }
        if let Some(limit) = request.limit {
            stages.push(Stage::Limit(limit));
        }

        // 5. Expansions
        for field in &request.expand {
            let Some(def) = entity.field(field) else {
                continue;
            };
            self.expand_field(entity, def, request.project, &mut stages, &mut projection)?;
        }

        // 6. Root custom pipelines
        for (_, custom) in entity.custom_pipelines() {
            stages.extend(custom.iter().cloned().map(Stage::Custom));
        }

        // 7. Projection
        if request.project && !projection.is_empty() {
            stages.push(Stage::Project(projection.into_document()));
        }

        Ok(Pipeline::new(stages))
    }

    fn expand_field(
        &self,
        entity: &EntitySchema,
        def: &FieldDef,
        project: bool,
        stages: &mut Vec<Stage>,
        projection: &mut ProjectionMap,
    ) -> PipelineResult<()> {
        let related_name =
            def.field_type
                .related_entity()
                .ok_or_else(|| PipelineError::NotExpandable {
                    entity: entity.name.clone(),
                    field: def.name.clone(),
                    type_name: def.field_type.type_name(),
                })?;
        let related = self.registry.get(related_name)?;

        if related.database() != entity.database() {
            return Err(PipelineError::CrossDatabaseExpansion {
                field: def.name.clone(),
                database: entity.database().to_string(),
                related_database: related.database().to_string(),
            });
        }

        let Some((local_field, foreign_field)) = def.join_keys() else {
            return Ok(());
        };

        stages.push(Stage::Lookup(Lookup::Equality {
            from: related.collection().to_string(),
            local_field: local_field.to_string(),
            foreign_field: foreign_field.to_string(),
            as_field: def.name.clone(),
        }));
        stages.push(Stage::Unwind(Unwind::preserving(def.name.as_str())));

        if project {
            projection.merge(nested_projection(self.registry, entity, &def.name)?);
        }

        // Custom pipelines one level down only; deeper chains are not followed.
        let custom_fields = related
            .fields
            .iter()
            .filter_map(|f| f.custom_pipeline().map(|p| (f, p)));
        for (sub, custom) in custom_fields {
            let path = format!("{}.{}", def.name, sub.name);
            stages.push(Stage::Lookup(Lookup::Pipeline {
                from: related.collection().to_string(),
                local_field: Some(local_field.to_string()),
                foreign_field: Some(foreign_field.to_string()),
                let_vars: sub.let_vars.clone(),
                pipeline: custom.to_vec(),
                as_field: path.clone(),
            }));

            if sub.field_type.is_list() {
                continue;
            }
            stages.push(Stage::Unwind(Unwind::preserving(path.as_str())));
            if !sub.field_type.is_object() {
                // The joined row wraps the value under its own name.
                stages.push(Stage::AddFields(doc! {
                    path.as_str(): format!("${}.{}", path, sub.name)
                }));
            }
        }

        Ok(())
    }
}
