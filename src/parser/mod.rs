//! Evaluator log parsing.
//!
//! This module handles:
//! - Dispatching log lines to patterns (line_matcher, patterns)
//! - Reconstructing predicate pipelines from scattered lines (reconstructor)
//! - Deduplicating pipeline RA text (pipeline)
//! - Extracting dependencies from RA pseudocode (ra_deps)

pub mod line_matcher;
pub mod patterns;
pub mod pipeline;
pub mod ra_deps;
pub mod reconstructor;
pub mod schema;

// Re-export main types
pub use line_matcher::{LineHandler, LineMatcher, LogLine};
pub use patterns::{evaluator_log_matcher, LineKind};
pub use pipeline::{same_relation, strip_suffix, Pipeline, PipelineStep, RaTextCache, RaTextRef};
pub use ra_deps::{extract_dependencies, is_union_operator, RaDependencies};
pub use reconstructor::{reconstruct_from_reader, reconstruct_from_text, Reconstruction, Reconstructor};
pub use schema::{CacheHitRecord, EvaluationRecord, LogEvent, PipelineWarning, StageRecord};
