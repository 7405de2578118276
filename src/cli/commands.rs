//! CLI command implementations
//!
//! Each command loads the configuration, builds a [`Context`] and turns one
//! request into one response object. Commands never touch a store.

use std::collections::HashMap;
use std::path::Path;

use bson::{Bson, Document};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::filter::{FilterCompiler, RawFilter};
use crate::pipeline::{PipelineBuilder, PipelineCatalog, PipelineRequest};
use crate::schema::SchemaRegistry;

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};

/// `compile` request
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompileRequest {
    pub entity: String,
    /// Already-typed filter
    #[serde(default)]
    pub filter: Option<Document>,
    /// String-valued filter, coerced through the schema
    #[serde(default)]
    pub raw_filter: Option<RawFilter>,
    #[serde(default)]
    pub sort: Option<Document>,
    #[serde(default)]
    pub skip: i64,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub expand: Vec<String>,
    #[serde(default)]
    pub project: Option<bool>,
}

/// `catalog` request
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogRequest {
    pub name: String,
    #[serde(default)]
    pub query: Option<Document>,
    #[serde(default)]
    pub skip: i64,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub replace: HashMap<String, Bson>,
}

/// Everything a command needs, loaded from the configuration
pub struct Context {
    pub config: Config,
    pub registry: SchemaRegistry,
    pub catalog: Option<PipelineCatalog>,
}

impl Context {
    /// Loads and validates schemas, then the catalog if configured
    pub fn load(config: Config) -> CliResult<Self> {
        let registry = SchemaRegistry::load_dir(config.schema_path())?;
        let catalog = match config.pipelines_path() {
            Some(path) => Some(PipelineCatalog::load(path)?),
            None => None,
        };
        Ok(Self {
            config,
            registry,
            catalog,
        })
    }
}

/// Entry point for the binary
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(&cli.config, cli.command)
}

/// Run one command, writing exactly one response line
pub fn run_command(config_path: &Path, cmd: Command) -> CliResult<()> {
    match execute(config_path, cmd) {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

fn execute(config_path: &Path, cmd: Command) -> CliResult<Value> {
    let config = Config::load(config_path)?;
    let ctx = Context::load(config)?;

    let request = if cmd.reads_stdin() {
        read_request()?
    } else {
        Value::Null
    };

    match cmd {
        Command::Compile => compile(&ctx, serde_json::from_value(request)?),
        Command::Catalog => catalog(&ctx, serde_json::from_value(request)?),
        Command::Schemas => Ok(schemas(&ctx)),
    }
}

/// Compile one request into `{database, collection, pipeline}`
pub fn compile(ctx: &Context, request: CompileRequest) -> CliResult<Value> {
    ctx.config.check_limit(request.limit)?;

    let filter = match (request.filter, request.raw_filter) {
        (Some(_), Some(_)) => {
            return Err(CliError::invalid_request(
                "filter and raw_filter are mutually exclusive",
            ))
        }
        (Some(filter), None) => filter,
        (None, Some(raw)) => FilterCompiler::new(&ctx.registry)
            .compile(&request.entity, &raw)?
            .into(),
        (None, None) => Document::new(),
    };

    let mut pipeline_request = PipelineRequest::new(request.entity.as_str())
        .with_filter(filter)
        .with_skip(request.skip)
        .with_expand(request.expand)
        .with_projection(request.project.unwrap_or(true));
    pipeline_request.sort = request.sort;
    pipeline_request.limit = request.limit;

    let pipeline = PipelineBuilder::new(&ctx.registry).build(&pipeline_request)?;
    let entity = ctx.registry.get(&request.entity)?;

    Ok(json!({
        "database": entity.database(),
        "collection": entity.collection(),
        "pipeline": pipeline.to_relaxed_json(),
    }))
}

/// Read a named pipeline into `{pipeline}`
pub fn catalog(ctx: &Context, request: CatalogRequest) -> CliResult<Value> {
    let catalog = ctx.catalog.as_ref().ok_or_else(CliError::no_catalog)?;
    ctx.config.check_limit(request.limit)?;

    let pipeline = catalog.read(
        &request.name,
        request.query.as_ref(),
        request.limit,
        request.skip,
        &request.replace,
    )?;

    Ok(json!({ "pipeline": pipeline.to_relaxed_json() }))
}

/// Describe every registered entity
pub fn schemas(ctx: &Context) -> Value {
    let entities: Vec<Value> = ctx
        .registry
        .entity_names()
        .into_iter()
        .filter_map(|name| ctx.registry.get(name).ok())
        .map(|schema| {
            let custom: Vec<&str> = schema
                .custom_pipelines()
                .into_iter()
                .map(|(field, _)| field)
                .collect();
            json!({
                "name": schema.name,
                "database": schema.database(),
                "collection": schema.collection(),
                "fields": schema.field_names().collect::<Vec<_>>(),
                "expandable": schema.expandable_fields(),
                "custom_pipelines": custom,
            })
        })
        .collect();

    json!({ "entities": entities })
}
