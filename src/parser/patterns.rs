//! The evaluator log vocabulary.
//!
//! Each `LineKind` is one kind of log line the reconstructor reacts to.
//! The table below is the single place to update when the log format drifts.

use super::line_matcher::LineMatcher;
use crate::utils::error::ParseError;

/// Kinds of evaluator log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `CSV_IMB_QUERIES: <row>` stage summary (first occurrence is the header)
    QuerySummary,
    /// `Starting to evaluate predicate <name>/<arity>...`
    BeginEvaluation,
    /// `Tuple counts for <name>:`
    BeginTupleCounts,
    /// `>>> Relation <name>: <N> rows`
    RelationRows,
    /// `>>> Wrote relation <name>[/...] with <N> rows`
    WroteRelation,
    /// `- <name> has <N> rows`
    HasRows,
    /// `Found relation <name> ... Relation has <N> rows`
    FoundRelation,
    /// `Empty delta for <name>` (zero rows)
    EmptyDelta,
    /// `<tc> [~<dup>%] {<arity>} r<N> = <ra>`
    PipelineStep,
}

// A relation name: word characters and a few decorations, or quoted segments.
const RELATION_NAME: &str = r#"(?:[\w()<>@#:]|"[^"]*")+"#;

/// Build the ordered pattern table for evaluator logs
///
/// **Public** - used by the reconstructor and by the flamegraph builder
///
/// Capture groups per kind:
/// * row-count kinds: 1 = relation name, 2 = row count (`EmptyDelta` has no count)
/// * begin kinds: 1 = predicate name
/// * `PipelineStep`: 1 = tuple count, 2 = duplication percent, 3 = arity,
///   4 = result variable, 5 = RA text
/// * `QuerySummary`: 1 = CSV row
pub fn evaluator_log_matcher() -> Result<LineMatcher<LineKind>, ParseError> {
    let mut matcher = LineMatcher::new();

    matcher
        .register(LineKind::QuerySummary, r"CSV_IMB_QUERIES:\s*(.*)")?
        .register(LineKind::BeginEvaluation, r"Starting to evaluate predicate (.*)/.*")?
        .register(LineKind::BeginTupleCounts, r"Tuple counts for (.*):$")?
        .register(
            LineKind::RelationRows,
            &format!(r">>> Relation ({}): (\d+) rows", RELATION_NAME),
        )?
        .register(
            LineKind::WroteRelation,
            &format!(r">>> Wrote relation ({})(?:/[^ ]*)? with (\d+) rows", RELATION_NAME),
        )?
        .register(
            LineKind::HasRows,
            &format!(r"- ({}) has (\d+) rows", RELATION_NAME),
        )?
        .register(
            LineKind::FoundRelation,
            &format!(r"Found relation ({})\b.*\bRelation has (\d+) rows", RELATION_NAME),
        )?
        .register(
            LineKind::EmptyDelta,
            &format!(r"Empty delta for ({})", RELATION_NAME),
        )?
        .register(
            LineKind::PipelineStep,
            r"(\d+)\s+(?:~(\d+(?:\.\d+)?)%\s+)?[{](\d+)[}]\s+r(\d+)\s+=\s+(.*)",
        )?;

    Ok(matcher)
}
