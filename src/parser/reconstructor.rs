//! Pipeline reconstruction from evaluator log lines.
//!
//! The reconstructor is a two-state machine:
//!
//! ```text
//!            begin                       step
//!   Idle ------------> Open(pipeline) <------+
//!    ^  \                 |  |  \------------+
//!    |   \ row count      |  | row count, same relation: Evaluation
//!    |    v CacheHit      |  | row count, other relation: warning, discard
//!    +--------------------+--+
//! ```
//!
//! A second begin while `Open` is a no-op if no step has been recorded yet
//! and a hard error otherwise. End of input discards an open pipeline.

use super::line_matcher::{LineHandler, LogLine};
use super::patterns::{evaluator_log_matcher, LineKind};
use super::pipeline::{same_relation, Pipeline, PipelineStep, RaTextCache};
use super::schema::{CacheHitRecord, EvaluationRecord, LogEvent, PipelineWarning, StageRecord};
use crate::utils::error::ParseError;
use log::{debug, warn};
use regex::{Captures, Match};
use std::collections::BTreeMap;
use std::io::BufRead;

#[derive(Debug)]
enum State {
    Idle,
    Open(Pipeline),
}

/// Result of one parsing run
#[derive(Debug, Clone)]
pub struct Reconstruction {
    /// Events in log order
    pub events: Vec<LogEvent>,

    /// Recoverable anomalies in log order
    pub warnings: Vec<PipelineWarning>,

    /// Number of distinct pipeline RA texts seen
    pub distinct_ra_texts: usize,
}

impl Reconstruction {
    pub fn evaluations(&self) -> impl Iterator<Item = &EvaluationRecord> {
        self.events.iter().filter_map(|e| match e {
            LogEvent::Evaluation(record) => Some(record),
            _ => None,
        })
    }

    pub fn cache_hits(&self) -> impl Iterator<Item = &CacheHitRecord> {
        self.events.iter().filter_map(|e| match e {
            LogEvent::CacheHit(record) => Some(record),
            _ => None,
        })
    }
}

/// Stateful pipeline reconstructor for one parsing run
///
/// **Public** - drive it through a `LineMatcher` built by `evaluator_log_matcher`,
/// or call the transition methods directly
#[derive(Debug)]
pub struct Reconstructor {
    state: State,
    ra_cache: RaTextCache,
    events: Vec<LogEvent>,
    warnings: Vec<PipelineWarning>,
    stage_header: Option<Vec<String>>,
}

impl Default for Reconstructor {
    fn default() -> Self {
        Self::new()
    }
}

impl Reconstructor {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            ra_cache: RaTextCache::new(),
            events: Vec::new(),
            warnings: Vec::new(),
            stage_header: None,
        }
    }

    /// Name of the open pipeline, if any
    pub fn open_pipeline(&self) -> Option<&str> {
        match &self.state {
            State::Idle => None,
            State::Open(pipeline) => Some(&pipeline.name),
        }
    }

    pub fn events(&self) -> &[LogEvent] {
        &self.events
    }

    pub fn warnings(&self) -> &[PipelineWarning] {
        &self.warnings
    }

    /// Start a pipeline for `name`
    ///
    /// # Errors
    /// * `ParseError::UnterminatedPipeline` - a pipeline with recorded steps is still open
    pub fn begin(&mut self, name: &str, line_number: usize) -> Result<(), ParseError> {
        if let State::Open(pipeline) = &self.state {
            if pipeline.has_steps() {
                return Err(ParseError::UnterminatedPipeline {
                    name: pipeline.name.clone(),
                    line: line_number,
                });
            }
            debug!(
                "line {}: begin for {} while {} is open with no steps; continuing",
                line_number, name, pipeline.name
            );
            return Ok(());
        }

        self.state = State::Open(Pipeline::new(name, line_number));
        Ok(())
    }

    /// Append a step to the open pipeline; ignored when idle
    pub fn push_step(&mut self, step: PipelineStep) {
        if let State::Open(pipeline) = &mut self.state {
            pipeline.push_step(step);
        }
    }

    /// Handle a row-count line for `name`
    pub fn terminate(&mut self, name: &str, rows: Option<u64>, line_number: usize) {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => {
                self.events.push(LogEvent::CacheHit(CacheHitRecord {
                    name: name.to_string(),
                    rows,
                    line_number,
                }));
            }
            State::Open(pipeline) if same_relation(&pipeline.name, name) => {
                self.flush(pipeline, rows, line_number);
            }
            State::Open(pipeline) => {
                let warning = PipelineWarning::NameMismatch {
                    line_number,
                    pipeline: pipeline.name,
                    terminator: name.to_string(),
                };
                warn!("{}", warning);
                self.warnings.push(warning);
            }
        }
    }

    fn flush(&mut self, pipeline: Pipeline, rows: Option<u64>, line_number: usize) {
        let ra = self.ra_cache.intern(pipeline.concatenated_ra());
        debug!(
            "line {}: {} evaluated in {} steps ({:?})",
            line_number,
            pipeline.name,
            pipeline.steps.len(),
            ra
        );

        self.events.push(LogEvent::Evaluation(EvaluationRecord {
            name: pipeline.name,
            rows,
            steps: pipeline.steps,
            ra,
            line_number,
        }));
    }

    /// Handle a `CSV_IMB_QUERIES` row; the first one is the header
    pub fn query_summary(&mut self, row: &str, line_number: usize) {
        let columns: Vec<String> = row.split(',').map(|c| c.trim().to_string()).collect();

        let Some(header) = &self.stage_header else {
            self.stage_header = Some(columns);
            return;
        };

        let name = columns.get(1).cloned().unwrap_or_default();
        let details = columns
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != 1)
            .map(|(index, value)| {
                let key = header
                    .get(index)
                    .filter(|h| !h.is_empty())
                    .cloned()
                    .unwrap_or_else(|| format!("column{}", index));
                (key, value.clone())
            })
            .collect::<BTreeMap<_, _>>();

        self.events.push(LogEvent::StageEnded(StageRecord {
            name,
            details,
            line_number,
        }));
    }

    /// End of input: an open pipeline is dropped without an event
    pub fn finish(&mut self) {
        if let State::Open(pipeline) = std::mem::replace(&mut self.state, State::Idle) {
            debug!(
                "Discarding unterminated pipeline {} (started at line {}, {} steps)",
                pipeline.name,
                pipeline.start_line,
                pipeline.steps.len()
            );
        }
    }

    pub fn into_reconstruction(self) -> Reconstruction {
        Reconstruction {
            distinct_ra_texts: self.ra_cache.len(),
            events: self.events,
            warnings: self.warnings,
        }
    }
}

impl LineHandler<LineKind> for Reconstructor {
    fn on_match(
        &mut self,
        kind: LineKind,
        captures: &Captures<'_>,
        line: &LogLine<'_>,
    ) -> Result<(), ParseError> {
        let group = |index: usize| captures.get(index).map(|m| m.as_str()).unwrap_or_default();

        match kind {
            LineKind::QuerySummary => self.query_summary(group(1), line.line_number),
            LineKind::BeginEvaluation | LineKind::BeginTupleCounts => {
                self.begin(group(1), line.line_number)?
            }
            LineKind::RelationRows
            | LineKind::WroteRelation
            | LineKind::HasRows
            | LineKind::FoundRelation => {
                self.terminate(group(1), parse_count(captures.get(2)), line.line_number)
            }
            LineKind::EmptyDelta => self.terminate(group(1), Some(0), line.line_number),
            LineKind::PipelineStep => {
                if self.open_pipeline().is_none() {
                    return Ok(());
                }
                self.push_step(PipelineStep {
                    tuple_count: parse_count(captures.get(1)),
                    duplication_factor: captures
                        .get(2)
                        .map(|m| parse_percentage(m.as_str()))
                        .unwrap_or(0.0),
                    arity: captures.get(3).and_then(|m| m.as_str().parse().ok()),
                    result_variable: captures.get(4).and_then(|m| m.as_str().parse().ok()),
                    ra_text: group(5).to_string(),
                    raw_line: line.text.to_string(),
                });
            }
        }

        Ok(())
    }

    fn on_end(&mut self) -> Result<(), ParseError> {
        self.finish();
        Ok(())
    }
}

// Digit-only captures fail to parse only on overflow.
fn parse_count(capture: Option<Match<'_>>) -> Option<u64> {
    capture.and_then(|m| m.as_str().parse().ok())
}

fn parse_percentage(percent: &str) -> f64 {
    percent
        .parse::<f64>()
        .map(|p| p / 100.0)
        .unwrap_or(f64::NAN)
}

/// Reconstruct pipelines from a fully buffered log text
///
/// **Public** - main entry point for in-memory logs
pub fn reconstruct_from_text(text: &str) -> Result<Reconstruction, ParseError> {
    let mut matcher = evaluator_log_matcher()?;
    let mut reconstructor = Reconstructor::new();
    matcher.feed_text(text, &mut reconstructor)?;
    Ok(reconstructor.into_reconstruction())
}

/// Reconstruct pipelines from a log read line by line
///
/// **Public** - main entry point for large log files
pub fn reconstruct_from_reader<R: BufRead>(reader: R) -> Result<Reconstruction, ParseError> {
    let mut matcher = evaluator_log_matcher()?;
    let mut reconstructor = Reconstructor::new();
    matcher.feed_reader(reader, &mut reconstructor)?;
    Ok(reconstructor.into_reconstruction())
}
