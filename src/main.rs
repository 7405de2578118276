//! docpipe CLI entry point
//!
//! Installs logging, then delegates everything to `cli::run`. Errors have
//! already been reported on stdout as an error envelope; they are repeated
//! on stderr and the process exits non-zero.

use docpipe::{cli, observability};

fn main() {
    observability::init_logging();

    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
