//! RA Log Profiler
//!
//! Reconstructs predicate evaluation pipelines from query evaluator logs
//! and turns them into Trace Event JSON and tuple-count flamegraphs.
//!
//! This crate provides the core implementation for the `ra-prof` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! ra-prof flamegraph path/to/database --open
//! ra-prof trace execute-queries-20240101.log -o trace.json
//! ```
//!
//! ## Library use
//!
//! ```
//! use ra_log_profiler::parser::reconstruct_from_text;
//! use ra_log_profiler::trace_events::build_trace;
//!
//! let log = "Starting to evaluate predicate P/2.\n3 ~50% {2} r1 = foo(x,y)\n>>> Relation P: 3 rows";
//! let reconstruction = reconstruct_from_text(log).unwrap();
//! let trace = build_trace(&reconstruction, None);
//! assert_eq!(trace.trace_events.len(), 1);
//! ```

pub mod commands;
pub mod flamegraph;
pub mod output;
pub mod parser;
pub mod trace_events;
pub mod utils;
