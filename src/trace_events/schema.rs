//! Trace Event Format wire schema.
//!
//! The subset of the Trace Event Format we write: begin/end, complete,
//! instant and metadata events. Viewable in chrome://tracing, Perfetto
//! or speedscope.

use serde::Serialize;
use std::collections::BTreeMap;

/// Top-level trace document
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Trace {
    #[serde(rename = "traceEvents")]
    pub trace_events: Vec<TraceEvent>,
}

/// Event phase
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Phase {
    #[serde(rename = "B")]
    Begin,
    #[serde(rename = "E")]
    End,
    #[serde(rename = "I")]
    Instant,
    #[serde(rename = "M")]
    Metadata,
    #[serde(rename = "X")]
    Complete,
}

/// Event category (`cat`)
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum EventCategory {
    /// Predicate evaluation and query stages
    #[serde(rename = "eval")]
    Evaluation,

    /// A predicate found in the cache
    #[serde(rename = "cachehit")]
    CacheHit,

    #[serde(rename = "meta")]
    Metadata,
}

/// How tall an instant event is drawn
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Scope {
    #[serde(rename = "g")]
    Global,
    #[serde(rename = "p")]
    Process,
    #[serde(rename = "t")]
    Thread,
}

/// One trace event
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TraceEvent {
    pub ph: Phase,
    pub cat: EventCategory,
    pub name: String,

    /// Synthetic timestamp (monotonic tick, not wall-clock time)
    pub ts: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dur: Option<u64>,

    pub pid: u32,
    pub tid: u32,

    #[serde(rename = "s", skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<EventArgs>,
}

/// Phase-specific event payload
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum EventArgs {
    Evaluation(EvaluationArgs),
    Rows { rows: Option<u64> },
    Metadata { name: String },
    Stage(BTreeMap<String, String>),
}

/// Payload of a completed evaluation
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EvaluationArgs {
    /// Rows in the resulting predicate
    pub rows: Option<u64>,

    /// Tuple counts per pipeline step
    pub tc: Vec<Option<u64>>,

    /// Duplication factor per pipeline step (1.0 is 100%)
    pub dup: Vec<f64>,

    /// RA text per step, or the ID of an earlier event with the same text
    pub ra: RaField,

    /// ID later events use to refer back to this event's RA text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum RaField {
    Text(Vec<String>),
    BackReference(u32),
}
