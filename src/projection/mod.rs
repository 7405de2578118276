//! Projection Planner subsystem
//!
//! Derives the output shape of an entity:
//!
//! - Default projection: every declared field included as-is, `id` aliased
//!   to the internal `_id`, and `_id` itself suppressed.
//! - Nested projection: a conditional fragment for an expanded relationship
//!   that collapses an unmatched join (null key, null value or the empty
//!   placeholder left by a preserve-null unwind) to a clean `null`.

mod planner;

pub use planner::{default_projection, nested_projection, ProjectionMap};
