//! Pipeline records and the RA text cache.
//!
//! A pipeline is the ordered list of RA steps that computed one predicate
//! during one evaluation pass.

use crate::utils::config::{FIRST_RA_ID, RELATION_SUFFIXES};
use serde::Serialize;
use std::collections::HashMap;

/// One row of an RA program with its tuple count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineStep {
    /// Tuples produced by this step (`None` if the count did not fit in a u64)
    pub tuple_count: Option<u64>,

    /// Estimated duplication, `~37%` is stored as 0.37; 0.0 when the log omits it
    pub duplication_factor: f64,

    /// Arity of the step's result
    pub arity: Option<u32>,

    /// `N` in the `rN = ...` result variable
    pub result_variable: Option<u32>,

    /// RA pseudocode of the step, opaque to us
    pub ra_text: String,

    /// The log line the step was read from
    pub raw_line: String,
}

/// An in-progress predicate evaluation
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub name: String,
    pub steps: Vec<PipelineStep>,
    pub start_line: usize,
}

impl Pipeline {
    pub fn new(name: impl Into<String>, start_line: usize) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            start_line,
        }
    }

    pub fn push_step(&mut self, step: PipelineStep) {
        self.steps.push(step);
    }

    pub fn has_steps(&self) -> bool {
        !self.steps.is_empty()
    }

    /// All step RA texts joined by newlines, the RA cache key
    pub fn concatenated_ra(&self) -> String {
        self.steps
            .iter()
            .map(|s| s.ra_text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Strip evaluator decoration markers from the end of a relation name
///
/// **Public** - used to pair pipelines with their row-count lines
///
/// Markers are stripped repeatedly, so the result never ends in a marker
/// and `strip_suffix(strip_suffix(x)) == strip_suffix(x)`.
///
/// # Example
/// ```
/// use ra_log_profiler::parser::pipeline::strip_suffix;
/// assert_eq!(strip_suffix("foo#prev_delta"), "foo");
/// assert_eq!(strip_suffix("bar@staged_ext"), "bar");
/// ```
pub fn strip_suffix(name: &str) -> &str {
    let mut current = name;
    while let Some(stripped) = RELATION_SUFFIXES
        .iter()
        .find_map(|suffix| current.strip_suffix(*suffix))
    {
        current = stripped;
    }
    current
}

/// Whether two relation names refer to the same relation after suffix stripping
pub fn same_relation(a: &str, b: &str) -> bool {
    strip_suffix(a) == strip_suffix(b)
}

/// How a completed pipeline's RA text relates to earlier ones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaTextRef {
    /// First time this text was seen; it now has this ID
    New(u32),

    /// Identical to the text already stored under this ID
    Existing(u32),
}

/// Content-addressed store of pipeline RA texts for one parsing run
#[derive(Debug)]
pub struct RaTextCache {
    ids: HashMap<String, u32>,
    next_id: u32,
}

impl Default for RaTextCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RaTextCache {
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            next_id: FIRST_RA_ID,
        }
    }

    /// Look up `text`, assigning the next ID if it is new
    pub fn intern(&mut self, text: String) -> RaTextRef {
        if let Some(&id) = self.ids.get(&text) {
            return RaTextRef::Existing(id);
        }

        let id = self.next_id;
        self.next_id += 1;
        self.ids.insert(text, id);
        RaTextRef::New(id)
    }

    /// Number of distinct texts stored
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_each_marker() {
        assert_eq!(strip_suffix("p#cur_delta"), "p");
        assert_eq!(strip_suffix("p#prev_delta"), "p");
        assert_eq!(strip_suffix("p#prev"), "p");
        assert_eq!(strip_suffix("p@staged_ext"), "p");
        assert_eq!(strip_suffix("p_delta"), "p");
        assert_eq!(strip_suffix("p#ff"), "p#ff");
        assert_eq!(strip_suffix("delta_p"), "delta_p");
    }

    #[test]
    fn test_strip_is_idempotent() {
        for name in ["p_delta_delta", "p#prev@staged_ext", "q#cur_delta", "plain", ""] {
            let once = strip_suffix(name);
            assert_eq!(strip_suffix(once), once, "not idempotent for {}", name);
        }
    }

    #[test]
    fn test_same_relation() {
        assert!(same_relation("foo#cur_delta", "foo#prev"));
        assert!(same_relation("foo", "foo@staged_ext"));
        assert!(!same_relation("foo", "food"));
    }

    #[test]
    fn test_cache_ids_are_sequential_from_one() {
        let mut cache = RaTextCache::new();
        assert_eq!(cache.intern("a".to_string()), RaTextRef::New(1));
        assert_eq!(cache.intern("b".to_string()), RaTextRef::New(2));
        assert_eq!(cache.intern("a".to_string()), RaTextRef::Existing(1));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_concatenated_ra() {
        let mut pipeline = Pipeline::new("p", 0);
        for text in ["r1 = foo", "r2 = bar"] {
            pipeline.push_step(PipelineStep {
                tuple_count: Some(1),
                duplication_factor: 0.0,
                arity: Some(1),
                result_variable: None,
                ra_text: text.to_string(),
                raw_line: String::new(),
            });
        }
        assert_eq!(pipeline.concatenated_ra(), "r1 = foo\nr2 = bar");
    }
}
