//! Convert reconstructed log events into trace events.

use super::schema::{EvaluationArgs, EventArgs, EventCategory, Phase, RaField, Scope, Trace, TraceEvent};
use crate::parser::{LogEvent, RaTextRef, Reconstruction};
use crate::utils::config::{EVALUATION_DURATION, PROCESS_ID, THREAD_ID};
use log::debug;

/// Accumulates trace events in emission order
///
/// **Public** - stamps each event with the next tick of a synthetic clock
#[derive(Debug, Default)]
pub struct TraceEventEmitter {
    clock: u64,
    events: Vec<TraceEvent>,
}

impl TraceEventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `process_name` / `thread_name` metadata events
    pub fn with_metadata(mut self, process_name: &str) -> Self {
        self.events.push(metadata_event("process_name", process_name));
        self.events.push(metadata_event("thread_name", "evaluator"));
        self
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Convert one log event
    pub fn push(&mut self, event: &LogEvent) {
        let ts = self.tick();

        let trace_event = match event {
            LogEvent::Evaluation(record) => {
                let (ra, id) = match record.ra {
                    RaTextRef::New(id) => (RaField::Text(record.ra_texts()), Some(id)),
                    RaTextRef::Existing(id) => (RaField::BackReference(id), None),
                };
                TraceEvent {
                    ph: Phase::Complete,
                    cat: EventCategory::Evaluation,
                    name: record.name.clone(),
                    ts,
                    dur: Some(EVALUATION_DURATION),
                    pid: PROCESS_ID,
                    tid: THREAD_ID,
                    scope: None,
                    args: Some(EventArgs::Evaluation(EvaluationArgs {
                        rows: record.rows,
                        tc: record.tuple_counts(),
                        dup: record.duplication_factors(),
                        ra,
                        id,
                    })),
                }
            }
            LogEvent::CacheHit(record) => TraceEvent {
                ph: Phase::Instant,
                cat: EventCategory::CacheHit,
                name: record.name.clone(),
                ts,
                dur: None,
                pid: PROCESS_ID,
                tid: THREAD_ID,
                scope: Some(Scope::Process),
                args: Some(EventArgs::Rows { rows: record.rows }),
            },
            LogEvent::StageEnded(record) => TraceEvent {
                ph: Phase::Instant,
                cat: EventCategory::Evaluation,
                name: record.name.clone(),
                ts,
                dur: None,
                pid: PROCESS_ID,
                tid: THREAD_ID,
                scope: Some(Scope::Process),
                args: Some(EventArgs::Stage(record.details.clone())),
            },
        };

        self.events.push(trace_event);
    }

    pub fn push_all<'a>(&mut self, events: impl IntoIterator<Item = &'a LogEvent>) {
        for event in events {
            self.push(event);
        }
    }

    pub fn finish(self) -> Trace {
        debug!("Emitted {} trace events", self.events.len());
        Trace {
            trace_events: self.events,
        }
    }
}

fn metadata_event(name: &str, value: &str) -> TraceEvent {
    TraceEvent {
        ph: Phase::Metadata,
        cat: EventCategory::Metadata,
        name: name.to_string(),
        ts: 0,
        dur: None,
        pid: PROCESS_ID,
        tid: THREAD_ID,
        scope: None,
        args: Some(EventArgs::Metadata {
            name: value.to_string(),
        }),
    }
}

/// Build the trace document for a parsing run
///
/// **Public** - main entry point for trace output
///
/// # Arguments
/// * `reconstruction` - Result of parsing a log
/// * `process_name` - Label for the process metadata event (usually the log path)
pub fn build_trace(reconstruction: &Reconstruction, process_name: Option<&str>) -> Trace {
    let mut emitter = TraceEventEmitter::new();
    if let Some(name) = process_name {
        emitter = emitter.with_metadata(name);
    }
    emitter.push_all(&reconstruction.events);
    emitter.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::reconstruct_from_text;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_evaluation_event_json() {
        let log = "Starting to evaluate predicate P/2.\n3 ~50% {2} r1 = foo(x,y)\n>>> Relation P: 3 rows";
        let trace = build_trace(&reconstruct_from_text(log).unwrap(), None);
        let value = serde_json::to_value(&trace).unwrap();

        assert_eq!(
            value,
            json!({
                "traceEvents": [{
                    "ph": "X",
                    "cat": "eval",
                    "name": "P",
                    "ts": 1,
                    "dur": 1,
                    "pid": 1,
                    "tid": 1,
                    "args": {
                        "rows": 3,
                        "tc": [3],
                        "dup": [0.5],
                        "ra": ["foo(x,y)"],
                        "id": 1
                    }
                }]
            })
        );
    }

    #[test]
    fn test_back_reference_and_cache_hit() {
        let log = "\
Tuple counts for a:
 1 {1} r1 = SCAN x
>>> Relation a: 1 rows
>>> Relation b: 9 rows
Tuple counts for c:
 2 {1} r1 = SCAN x
>>> Relation c: 2 rows";
        let trace = build_trace(&reconstruct_from_text(log).unwrap(), None);
        let value = serde_json::to_value(&trace).unwrap();
        let events = value["traceEvents"].as_array().unwrap();

        assert_eq!(events.len(), 3);
        assert_eq!(events[0]["args"]["id"], json!(1));
        assert_eq!(
            events[1],
            json!({
                "ph": "I",
                "cat": "cachehit",
                "name": "b",
                "ts": 2,
                "pid": 1,
                "tid": 1,
                "s": "p",
                "args": { "rows": 9 }
            })
        );
        assert_eq!(events[2]["args"]["ra"], json!(1));
        assert!(events[2]["args"].get("id").is_none());
    }

    #[test]
    fn test_metadata_and_monotonic_clock() {
        let log = ">>> Relation a: 1 rows\n>>> Relation b: 2 rows";
        let trace = build_trace(&reconstruct_from_text(log).unwrap(), Some("run.log"));

        let phases: Vec<Phase> = trace.trace_events.iter().map(|e| e.ph).collect();
        assert_eq!(
            phases,
            vec![Phase::Metadata, Phase::Metadata, Phase::Instant, Phase::Instant]
        );
        let stamps: Vec<u64> = trace.trace_events.iter().map(|e| e.ts).collect();
        assert_eq!(stamps, vec![0, 0, 1, 2]);
        assert_eq!(
            trace.trace_events[0].args,
            Some(EventArgs::Metadata {
                name: "run.log".to_string()
            })
        );
    }
}
