//! On-disk Loading Tests
//!
//! Schema directories and pipeline catalogs are read from JSON files.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use bson::{doc, Bson};
use docpipe::pipeline::{Lookup, PipelineBuilder, PipelineCatalog, PipelineError, PipelineRequest, Stage};
use docpipe::schema::{FieldType, SchemaError, SchemaRegistry};
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn write_json(dir: &Path, name: &str, value: &serde_json::Value) {
    fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn setup_schema_dir() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_json(
        tmp.path(),
        "customer.json",
        &json!({
            "name": "Customer",
            "database": "shop",
            "collection": "customers",
            "fields": [
                { "name": "name", "type": "string" },
                { "name": "total_orders", "type": "integer",
                  "pipeline": [ { "$count": "total_orders" } ] }
            ]
        }),
    );
    write_json(
        tmp.path(),
        "order.json",
        &json!({
            "name": "Order",
            "database": "shop",
            "collection": "orders",
            "fields": [
                { "name": "status", "type": "enum", "members": ["paid", "open"] },
                { "name": "customer", "type": "entity", "entity": "Customer",
                  "local_field": "customer_id", "foreign_field": "_id" }
            ]
        }),
    );
    fs::write(tmp.path().join("README.md"), "not a schema").unwrap();
    tmp
}

// =============================================================================
// Schema Directory Tests
// =============================================================================

#[test]
fn test_load_schema_dir() {
    let tmp = setup_schema_dir();
    let registry = SchemaRegistry::load_dir(tmp.path()).unwrap();

    assert_eq!(registry.entity_names(), vec!["Customer", "Order"]);
    let order = registry.get("Order").unwrap();
    assert_eq!(order.expandable_fields(), vec!["customer"]);
    assert_eq!(
        registry.field("Order", "status").unwrap().field_type,
        FieldType::enumeration(["paid", "open"])
    );

    let customer = registry.get("Customer").unwrap();
    let custom = customer.custom_pipelines();
    assert_eq!(custom.len(), 1);
    assert_eq!(custom[0].1, &[doc! { "$count": "total_orders" }][..]);
}

#[test]
fn test_load_rejects_dangling_relationship() {
    let tmp = setup_schema_dir();
    fs::remove_file(tmp.path().join("customer.json")).unwrap();

    let err = SchemaRegistry::load_dir(tmp.path()).unwrap_err();
    assert_eq!(err.code(), "DOCPIPE_SCHEMA_INVALID_RELATIONSHIP");
}

#[test]
fn test_load_rejects_duplicate_entity() {
    let tmp = setup_schema_dir();
    fs::copy(tmp.path().join("order.json"), tmp.path().join("order_copy.json")).unwrap();

    let err = SchemaRegistry::load_dir(tmp.path()).unwrap_err();
    assert_eq!(err, SchemaError::DuplicateEntity("Order".into()));
}

#[test]
fn test_load_rejects_malformed_file() {
    let tmp = setup_schema_dir();
    fs::write(tmp.path().join("broken.json"), "{ not json").unwrap();

    let err = SchemaRegistry::load_dir(tmp.path()).unwrap_err();
    assert_eq!(err.code(), "DOCPIPE_SCHEMA_MALFORMED");
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn test_load_rejects_unknown_type() {
    let tmp = setup_schema_dir();
    write_json(
        tmp.path(),
        "weird.json",
        &json!({
            "name": "Weird",
            "database": "shop",
            "collection": "weird",
            "fields": [ { "name": "x", "type": "decimal128" } ]
        }),
    );
    assert!(SchemaRegistry::load_dir(tmp.path()).is_err());
}

#[test]
fn test_load_missing_dir() {
    let tmp = TempDir::new().unwrap();
    let err = SchemaRegistry::load_dir(&tmp.path().join("absent")).unwrap_err();
    assert_eq!(err.code(), "DOCPIPE_SCHEMA_MALFORMED");
}

/// A `let` declared next to a custom pipeline reaches the joined lookup.
#[test]
fn test_let_bindings_reach_pipeline_lookup() {
    let tmp = setup_schema_dir();
    write_json(
        tmp.path(),
        "customer.json",
        &json!({
            "name": "Customer",
            "database": "shop",
            "collection": "customers",
            "fields": [
                { "name": "name", "type": "string" },
                { "name": "recent_total", "type": "integer",
                  "let": { "cid": "$_id" },
                  "pipeline": [
                      { "$match": { "$expr": { "$eq": ["$customer_id", "$$cid"] } } },
                      { "$count": "recent_total" }
                  ] }
            ]
        }),
    );

    let registry = SchemaRegistry::load_dir(tmp.path()).unwrap();
    assert_eq!(
        registry.field("Customer", "recent_total").unwrap().let_vars,
        Some(doc! { "cid": "$_id" })
    );

    let request = PipelineRequest::new("Order")
        .expand("customer")
        .with_projection(false);
    let pipeline = PipelineBuilder::new(&registry).build(&request).unwrap();

    match &pipeline.stages()[3] {
        Stage::Lookup(Lookup::Pipeline { let_vars, as_field, .. }) => {
            assert_eq!(let_vars, &Some(doc! { "cid": "$_id" }));
            assert_eq!(as_field, "customer.recent_total");
        }
        other => panic!("expected pipeline lookup, got {:?}", other),
    }
    assert_eq!(
        pipeline.to_documents()[3],
        doc! {
            "$lookup": {
                "from": "customers",
                "localField": "customer_id",
                "foreignField": "_id",
                "let": { "cid": "$_id" },
                "pipeline": [
                    { "$match": { "$expr": { "$eq": ["$customer_id", "$$cid"] } } },
                    { "$count": "recent_total" }
                ],
                "as": "customer.recent_total",
            }
        }
    );
}

// =============================================================================
// Catalog Tests
// =============================================================================

#[test]
fn test_load_catalog_and_read() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("pipelines.json");
    write_json(
        tmp.path(),
        "pipelines.json",
        &json!({
            "orders_for": [
                { "$match": { "customer_id": "CUSTOMER" } },
                { "$group": { "_id": "$status", "n": { "$sum": 1 } } }
            ],
            "latest": [ { "$sort": { "at": -1 } }, { "$limit": 1 } ]
        }),
    );

    let catalog = PipelineCatalog::load(&path).unwrap();
    assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["latest", "orders_for"]);

    let mut replacements = HashMap::new();
    replacements.insert("CUSTOMER".to_string(), Bson::String("c-1".into()));
    let pipeline = catalog
        .read("orders_for", None, Some(5), 0, &replacements)
        .unwrap();
    assert_eq!(pipeline.stage_names(), vec!["match", "group", "limit"]);
    assert_eq!(
        pipeline.to_documents()[0],
        doc! { "$match": { "customer_id": "c-1" } }
    );

    let latest = catalog.read("latest", None, Some(5), 0, &HashMap::new()).unwrap();
    assert_eq!(latest.stage_names(), vec!["sort", "limit"]);
}

#[test]
fn test_catalog_unknown_name() {
    let catalog = PipelineCatalog::default();
    let err = catalog.read("nope", None, None, 0, &HashMap::new()).unwrap_err();
    assert_eq!(err, PipelineError::UnknownPipeline("nope".into()));
}

#[test]
fn test_catalog_malformed() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("pipelines.json");
    fs::write(&path, r#"{"x": {"$match": {}}}"#).unwrap();

    let err = PipelineCatalog::load(&path).unwrap_err();
    assert_eq!(err.code(), "DOCPIPE_PIPELINE_MALFORMED_CATALOG");
}
