//! Entity service
//!
//! Binds one entity to a registry and a runner, then exposes the usual read
//! operations on top of the filter compiler and the pipeline builder.

use bson::oid::ObjectId;
use bson::{doc, Document};

use crate::error::{Error, Result};
use crate::filter::{by_id, by_ids, FilterCompiler, RawFilter};
use crate::observability::Event;
use crate::pipeline::{build_simple_pipeline, Pipeline, PipelineBuilder, PipelineRequest};
use crate::schema::{EntitySchema, SchemaRegistry, INTERNAL_ID_FIELD};

use super::runner::{PipelineRunner, RunnerError};

/// Read operations for a single entity
pub struct EntityService<'a, R> {
    registry: &'a SchemaRegistry,
    runner: R,
    entity: String,
}

impl<'a, R: PipelineRunner> EntityService<'a, R> {
    /// Binds `entity`; fails if it is not registered.
    pub fn new(registry: &'a SchemaRegistry, runner: R, entity: impl Into<String>) -> Result<Self> {
        let entity = entity.into();
        registry.get(&entity)?;
        Ok(Self {
            registry,
            runner,
            entity,
        })
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn schema(&self) -> Result<&'a EntitySchema> {
        Ok(self.registry.get(&self.entity)?)
    }

    /// A request for this entity with no conditions
    pub fn request(&self) -> PipelineRequest {
        PipelineRequest::new(self.entity.as_str())
    }

    /// Builds and runs `request`.
    ///
    /// The request's entity is ignored in favour of the bound one.
    pub fn find_many(&self, request: &PipelineRequest) -> Result<Vec<Document>> {
        let pipeline = if request.entity == self.entity {
            PipelineBuilder::new(self.registry).build(request)?
        } else {
            let mut bound = request.clone();
            bound.entity = self.entity.clone();
            PipelineBuilder::new(self.registry).build(&bound)?
        };
        self.run(&pipeline)
    }

    /// First matching row
    pub fn find_one(
        &self,
        filter: Document,
        sort: Option<Document>,
        skip: i64,
        expand: &[String],
    ) -> Result<Option<Document>> {
        let mut request = self
            .request()
            .with_filter(filter)
            .with_skip(skip)
            .with_limit(1)
            .with_expand(expand.iter().cloned());
        request.sort = sort;
        Ok(self.find_many(&request)?.into_iter().next())
    }

    pub fn get_by_id(&self, id: ObjectId, expand: &[String]) -> Result<Option<Document>> {
        self.find_one(by_id(id), None, 0, expand)
    }

    pub fn get_by_ids(
        &self,
        ids: &[ObjectId],
        sort: Option<Document>,
        skip: i64,
        limit: Option<i64>,
        expand: &[String],
    ) -> Result<Vec<Document>> {
        let mut request = self
            .request()
            .with_filter(by_ids(ids))
            .with_skip(skip)
            .with_expand(expand.iter().cloned());
        request.sort = sort;
        request.limit = limit;
        self.find_many(&request)
    }

    /// Compiles a raw filter and runs the resulting pipeline
    pub fn search(
        &self,
        raw_filter: &RawFilter,
        sort: Option<Document>,
        skip: i64,
        limit: Option<i64>,
        expand: &[String],
    ) -> Result<Vec<Document>> {
        let typed = FilterCompiler::new(self.registry).compile(&self.entity, raw_filter)?;
        let mut request = self
            .request()
            .with_filter(typed.into())
            .with_skip(skip)
            .with_expand(expand.iter().cloned());
        request.sort = sort;
        request.limit = limit;
        self.find_many(&request)
    }

    /// Identifiers of matching rows, without expansion or projection.
    ///
    /// Fails if any returned row lacks an ObjectId `_id`.
    pub fn get_only_ids(
        &self,
        filter: Document,
        sort: Option<Document>,
        skip: i64,
        limit: Option<i64>,
    ) -> Result<Vec<ObjectId>> {
        let pipeline = build_simple_pipeline(
            filter,
            sort,
            skip,
            limit,
            Some(doc! { INTERNAL_ID_FIELD: 1 }),
        )?;
        let rows = self.run(&pipeline)?;
        let schema = self.schema()?;
        rows.iter()
            .enumerate()
            .map(|(index, row)| {
                row.get_object_id(INTERNAL_ID_FIELD).map_err(|e| {
                    Error::from(RunnerError::aggregate(
                        schema.database(),
                        schema.collection(),
                        format!(
                            "row {} has no object identifier '{}': {}",
                            index, INTERNAL_ID_FIELD, e
                        ),
                    ))
                })
            })
            .collect()
    }

    fn run(&self, pipeline: &Pipeline) -> Result<Vec<Document>> {
        let schema = self.schema()?;
        tracing::debug!(
            event = %Event::AggregateSubmitted,
            entity = %self.entity,
            database = schema.database(),
            collection = schema.collection(),
            stages = pipeline.len(),
        );
        self.runner
            .aggregate(schema.database(), schema.collection(), pipeline)
            .map_err(|e| {
                tracing::warn!(
                    event = %Event::AggregateFailed,
                    entity = %self.entity,
                    code = e.code(),
                    reason = %e,
                );
                e.into()
            })
    }
}
