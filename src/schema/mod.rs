//! Schema Descriptor subsystem
//!
//! Per-entity metadata: declared fields, their value types, relationship
//! metadata (join keys, custom sub-pipelines) and store location.
//!
//! # Design Principles
//!
//! - Schemas are defined once at startup and immutable afterwards
//! - Field order is declaration order and drives output order
//! - Join keys only on entity or list-of-entity fields
//! - Lookups of undeclared fields are errors, never defaults

mod errors;
mod registry;
mod types;

pub use errors::{SchemaError, SchemaResult};
pub use registry::SchemaRegistry;
pub use types::{EntitySchema, FieldDef, FieldType, Location, INTERNAL_ID_FIELD, OUTPUT_ID_FIELD};
