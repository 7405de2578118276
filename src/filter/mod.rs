//! Filter Compiler subsystem
//!
//! Operator-keyed string filters (`{field: {"$gte": "10"}}`) are validated
//! against the entity schema and coerced into native values before they
//! reach the pipeline builder.
//!
//! Supported operators: `$eq`, `$ne`, `$lt`, `$lte`, `$gt`, `$gte`, `$regex`.
//! Only top-level declared fields may be filtered.

mod ast;
mod compiler;
mod errors;
mod ids;

pub use ast::{ComparisonOp, RawFilter, TypedFilter};
pub use compiler::FilterCompiler;
pub use errors::{FilterError, FilterResult};
pub use ids::{by_id, by_ids, parse_ids};
