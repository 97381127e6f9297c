//! Domain events produced by the pipeline reconstructor.
//!
//! These are the reconstructor's output, in log order. The trace event
//! emitter and the flamegraph builder both consume them.

use super::pipeline::{PipelineStep, RaTextRef};
use std::collections::BTreeMap;
use std::fmt;

/// Something the reconstructor recognised in the log
#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
    /// A pipeline was closed by its row-count line
    Evaluation(EvaluationRecord),

    /// A row-count line arrived with no pipeline open
    CacheHit(CacheHitRecord),

    /// A query stage finished (from the CSV query summary)
    StageEnded(StageRecord),
}

/// A completed predicate evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRecord {
    /// Predicate name as announced when the pipeline began
    pub name: String,

    /// Rows in the resulting relation
    pub rows: Option<u64>,

    /// Steps in pipeline order
    pub steps: Vec<PipelineStep>,

    /// Whether this pipeline's RA text is new or repeats an earlier one
    pub ra: RaTextRef,

    /// Line that terminated the pipeline
    pub line_number: usize,
}

impl EvaluationRecord {
    pub fn tuple_counts(&self) -> Vec<Option<u64>> {
        self.steps.iter().map(|s| s.tuple_count).collect()
    }

    pub fn duplication_factors(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.duplication_factor).collect()
    }

    pub fn ra_texts(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.ra_text.clone()).collect()
    }

    /// Sum of step tuple counts; unparseable counts contribute nothing
    pub fn total_tuple_count(&self) -> u64 {
        self.steps
            .iter()
            .filter_map(|s| s.tuple_count)
            .fold(0u64, |acc, tc| acc.saturating_add(tc))
    }
}

/// A predicate served from the cache
#[derive(Debug, Clone, PartialEq)]
pub struct CacheHitRecord {
    pub name: String,
    pub rows: Option<u64>,
    pub line_number: usize,
}

/// A query stage completion row
#[derive(Debug, Clone, PartialEq)]
pub struct StageRecord {
    /// The query predicate column
    pub name: String,

    /// Remaining CSV columns by header name
    pub details: BTreeMap<String, String>,

    pub line_number: usize,
}

/// Recoverable anomaly found while reconstructing pipelines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineWarning {
    /// A row-count line named a different relation than the open pipeline
    NameMismatch {
        line_number: usize,
        pipeline: String,
        terminator: String,
    },
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineWarning::NameMismatch {
                line_number,
                pipeline,
                terminator,
            } => write!(
                f,
                "line {}: pipeline for {} unexpectedly terminated by {}; pipeline discarded",
                line_number, pipeline, terminator
            ),
        }
    }
}
