//! Observability subsystem for docpipe
//!
//! Structured log records are emitted through `tracing`, each carrying a
//! stable `event` name from [`Event`]. The library never installs a
//! subscriber; the binary does (see [`init_logging`]).
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on compilation
//! 3. Filter values are never logged, only entity and field names

mod events;

pub use events::Event;

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "docpipe=info";

/// Installs a stderr `fmt` subscriber filtered by `RUST_LOG`.
///
/// stdout carries the JSON protocol, so logs never go there. Calling this
/// twice is harmless; the second install is ignored.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
