//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod flamegraph;
pub mod models;
pub mod resolve;
pub mod trace;
pub mod utils;

// Re-export main command functions
pub use flamegraph::{execute_flamegraph, validate_args};
pub use models::{FlamegraphArgs, OutputFormat, TraceArgs};
pub use resolve::resolve_log_file;
pub use trace::execute_trace;
