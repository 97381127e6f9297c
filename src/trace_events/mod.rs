//! Trace Event Format output.
//!
//! Turns the reconstructor's events into a `{ "traceEvents": [...] }`
//! document, preserving emission order.

pub mod emitter;
pub mod schema;

// Re-export main types and functions
pub use emitter::{build_trace, TraceEventEmitter};
pub use schema::{EvaluationArgs, EventArgs, EventCategory, Phase, RaField, Scope, Trace, TraceEvent};
