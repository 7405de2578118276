//! Filter Compilation Tests
//!
//! Raw string filters are coerced into each field's declared type:
//! - Every supported operator compiles on every scalar type
//! - Nested paths are rejected before anything else
//! - Failures carry the field, the raw value and a stable code

use std::collections::BTreeMap;

use bson::oid::ObjectId;
use bson::{doc, Bson};
use docpipe::filter::{by_ids, parse_ids, ComparisonOp, FilterCompiler, FilterError, RawFilter};
use docpipe::schema::{EntitySchema, FieldDef, FieldType, Location, SchemaRegistry};
use docpipe::ErrorCategory;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_registry() -> SchemaRegistry {
    let event = EntitySchema::new(
        "Event",
        Location::new("audit", "events"),
        vec![
            FieldDef::new("count", FieldType::Integer),
            FieldDef::new("score", FieldType::Float),
            FieldDef::new("active", FieldType::Boolean),
            FieldDef::new("title", FieldType::String),
            FieldDef::new("level", FieldType::enumeration(["low", "high"])),
            FieldDef::new("owner", FieldType::Identifier),
            FieldDef::new("at", FieldType::Timestamp),
            FieldDef::new("labels", FieldType::list(FieldType::String)),
        ],
    );
    SchemaRegistry::new().with(event).unwrap()
}

fn single(field: &str, op: &str, value: &str) -> RawFilter {
    let mut ops = BTreeMap::new();
    ops.insert(op.to_string(), value.to_string());
    let mut raw = RawFilter::new();
    raw.insert(field.to_string(), ops);
    raw
}

fn compile(field: &str, op: &str, value: &str) -> Result<Bson, FilterError> {
    let registry = setup_registry();
    let typed = FilterCompiler::new(&registry).compile("Event", &single(field, op, value))?;
    let parsed = ComparisonOp::parse(op).unwrap();
    let document = typed.to_document();
    Ok(document
        .get_document(field)
        .unwrap()
        .get(parsed.as_str())
        .unwrap()
        .clone())
}

// =============================================================================
// Coercion Tests
// =============================================================================

#[test]
fn test_scalar_coercions() {
    assert_eq!(compile("count", "$gte", "42").unwrap(), Bson::Int64(42));
    assert_eq!(compile("count", "$lt", " -7 ").unwrap(), Bson::Int64(-7));
    assert_eq!(compile("score", "$gt", "2.5").unwrap(), Bson::Double(2.5));
    assert_eq!(compile("active", "$eq", "TRUE").unwrap(), Bson::Boolean(true));
    assert_eq!(compile("active", "$ne", "no").unwrap(), Bson::Boolean(false));
    assert_eq!(compile("title", "$eq", "hello").unwrap(), Bson::String("hello".into()));
    assert_eq!(compile("level", "$ne", "low").unwrap(), Bson::String("low".into()));
}

#[test]
fn test_identifier_coercion() {
    let hex = "65a1b2c3d4e5f60718293a4b";
    assert_eq!(
        compile("owner", "$eq", hex).unwrap(),
        Bson::ObjectId(ObjectId::parse_str(hex).unwrap())
    );

    let err = compile("owner", "$eq", "not-an-id").unwrap_err();
    assert_eq!(err.code(), "DOCPIPE_COERCE_INVALID_IDENTIFIER");
}

#[test]
fn test_timestamp_coercion() {
    let expected = Bson::DateTime(bson::DateTime::from_millis(1_700_000_000_000));
    assert_eq!(compile("at", "$gte", "2023-11-14T22:13:20Z").unwrap(), expected);
    assert_eq!(compile("at", "$gte", "2023-11-14T23:13:20+01:00").unwrap(), expected);

    let err = compile("at", "$lt", "yesterday").unwrap_err();
    assert_eq!(err.code(), "DOCPIPE_COERCE_INVALID_TIMESTAMP");
    assert_eq!(err.category(), ErrorCategory::Coercion);
}

#[test]
fn test_enum_membership() {
    let err = compile("level", "$eq", "medium").unwrap_err();
    assert_eq!(err.code(), "DOCPIPE_COERCE_INVALID_ENUM_VALUE");
    assert!(err.to_string().contains("level"));
    assert!(err.to_string().contains("medium"));
}

#[test]
fn test_list_field_not_filterable() {
    let err = compile("labels", "$eq", "x").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Schema);
}

// =============================================================================
// Rejection Tests
// =============================================================================

/// Dotted names fail with the same error whatever the operator or value.
#[test]
fn test_dotted_field_rejected() {
    for op in ["$eq", "$gt", "$unknown"] {
        let err = compile("owner.name", op, "x").unwrap_err();
        assert_eq!(err, FilterError::DottedFieldNotSupported("owner.name".into()));
        assert_eq!(err.category(), ErrorCategory::Validation);
    }
}

#[test]
fn test_unsupported_operator() {
    let err = compile("count", "$in", "1,2").unwrap_err();
    assert_eq!(err.code(), "DOCPIPE_FILTER_UNSUPPORTED_OPERATOR");
}

#[test]
fn test_regex_only_on_text() {
    assert_eq!(compile("title", "$regex", "^he").unwrap(), Bson::String("^he".into()));
    assert_eq!(
        compile("count", "$regex", "^4").unwrap_err().code(),
        "DOCPIPE_FILTER_OPERATOR_TYPE_MISMATCH"
    );
}

/// Patterns reach the store untouched, including syntax only the store
/// understands.
#[test]
fn test_store_patterns_pass_through() {
    for pattern in ["^(?!draft)", "(?<=#)\\w+", "(a)\\1"] {
        assert_eq!(
            compile("title", "$regex", pattern).unwrap(),
            Bson::String(pattern.into())
        );
    }
}

/// A pattern on an enum field must still name a member.
#[test]
fn test_enum_pattern_checked_for_membership() {
    assert_eq!(compile("level", "$regex", "high").unwrap(), Bson::String("high".into()));
    assert_eq!(
        compile("level", "$regex", "^h").unwrap_err().code(),
        "DOCPIPE_COERCE_INVALID_ENUM_VALUE"
    );
}

/// `id` and `_id` address the same field and may not be combined.
#[test]
fn test_identifier_aliases_conflict() {
    let registry = setup_registry();
    let mut raw = single("id", "$eq", "65a1b2c3d4e5f60718293a4b");
    raw.extend(single("_id", "$eq", "65a1b2c3d4e5f60718293a4c"));

    let err = FilterCompiler::new(&registry).compile("Event", &raw).unwrap_err();
    assert_eq!(err.code(), "DOCPIPE_FILTER_CONFLICTING_ALIAS");
    assert_eq!(err.field(), Some("id"));
}

#[test]
fn test_unknown_entity() {
    let registry = setup_registry();
    let err = FilterCompiler::new(&registry)
        .compile("Ghost", &single("count", "$eq", "1"))
        .unwrap_err();
    assert_eq!(err.code(), "DOCPIPE_SCHEMA_UNKNOWN_ENTITY");
}

// =============================================================================
// Composition Tests
// =============================================================================

/// Several fields and operators compile into one match document.
#[test]
fn test_multi_field_filter() {
    let registry = setup_registry();
    let mut raw = single("count", "$gte", "1");
    raw.get_mut("count")
        .unwrap()
        .insert("$lte".to_string(), "9".to_string());
    raw.extend(single("level", "$eq", "high"));

    let typed = FilterCompiler::new(&registry).compile("Event", &raw).unwrap();
    assert_eq!(
        typed.to_document(),
        doc! {
            "count": { "$lte": 9_i64, "$gte": 1_i64 },
            "level": { "$eq": "high" },
        }
    );
}

/// Identifier filters built from hex strings.
#[test]
fn test_ids_filter() {
    let ids = parse_ids(&["65a1b2c3d4e5f60718293a4b", "65a1b2c3d4e5f60718293a4c"]).unwrap();
    assert_eq!(by_ids(&ids), doc! { "_id": { "$in": [ids[0], ids[1]] } });
}
