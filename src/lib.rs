//! docpipe - A declarative, schema-driven aggregation pipeline compiler
//!
//! Entity schemas declare fields, types and relationships. From a schema, a
//! filter and a set of relationship expansions, docpipe compiles the exact
//! stage sequence a document store's aggregation engine expects.

pub mod cli;
pub mod coercion;
pub mod error;
pub mod filter;
pub mod observability;
pub mod pipeline;
pub mod projection;
pub mod schema;
pub mod service;

pub use error::{Error, ErrorCategory, Result};
