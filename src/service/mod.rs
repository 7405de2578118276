//! Entity service subsystem
//!
//! Thin facade tying the compiler to an execution collaborator.
//!
//! # Design Principles
//!
//! - Every pipeline is fully built and validated before the runner is called
//! - Caller inputs are never mutated
//! - No retries: runner failures are returned as-is

mod entity;
mod runner;

pub use entity::EntityService;
pub use runner::{PipelineRunner, RunnerError};
