//! Build a weighted predicate tree from reconstructed pipelines.
//!
//! Each evaluated predicate becomes one node. A node's own weight is the
//! sum of the tuple counts of every pipeline that computed it, and a
//! predicate is nested under the first predicate found to consume it.

use crate::parser::{
    extract_dependencies, reconstruct_from_reader, reconstruct_from_text, strip_suffix,
    EvaluationRecord, LogEvent, Reconstruction,
};
use crate::utils::config::FLAMEGRAPH_ROOT_NAME;
use crate::utils::error::ParseError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::BufRead;

/// A node in the flamegraph tree
///
/// **Public** - serialized as the viewer's data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlamegraphNode {
    pub name: String,

    /// Own weight plus the weight of every descendant
    pub value: u64,

    pub children: Vec<FlamegraphNode>,

    /// Log lines backing this node (absent on the root)
    #[serde(rename = "rawLines", default, skip_serializing_if = "Option::is_none")]
    pub raw_lines: Option<Vec<String>>,
}

impl FlamegraphNode {
    /// Weight not accounted for by children
    pub fn self_value(&self) -> u64 {
        let children: u64 = self.children.iter().map(|c| c.value).sum();
        self.value.saturating_sub(children)
    }

    /// Total number of nodes in this subtree, including itself
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(&node.children);
        }
        count
    }

    /// Number of nodes on the longest path from this node to a leaf
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((node, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            pending.extend(node.children.iter().map(|child| (child, depth + 1)));
        }
        deepest
    }
}

// Dependency chains nest as deep as they are long; dropping level by level
// keeps the stack flat.
impl Drop for FlamegraphNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

#[derive(Debug)]
struct PredicateEntry {
    name: String,
    self_weight: u64,
    raw_lines: Vec<String>,
    dependencies: Vec<String>,
}

/// Accumulates evaluations, then lays them out as a tree
#[derive(Debug, Default)]
pub struct FlamegraphBuilder {
    entries: Vec<PredicateEntry>,
    index: HashMap<String, usize>,
}

impl FlamegraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct predicates seen
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fold one completed evaluation into its predicate's node
    pub fn add_evaluation(&mut self, record: &EvaluationRecord) {
        let key = strip_suffix(&record.name);

        let position = match self.index.get(key) {
            Some(&position) => position,
            None => {
                self.entries.push(PredicateEntry {
                    name: key.to_string(),
                    self_weight: 0,
                    raw_lines: Vec::new(),
                    dependencies: Vec::new(),
                });
                self.index.insert(key.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };

        let entry = &mut self.entries[position];
        entry.self_weight = entry.self_weight.saturating_add(record.total_tuple_count());

        for step in &record.steps {
            entry.raw_lines.push(step.raw_line.clone());

            for relation in extract_dependencies(&step.ra_text).input_relations {
                let relation = strip_suffix(&relation);
                if relation != entry.name && !entry.dependencies.iter().any(|d| d == relation) {
                    entry.dependencies.push(relation.to_string());
                }
            }
        }
    }

    /// Fold every evaluation in `events`; other events carry no weight
    pub fn add_events(&mut self, events: &[LogEvent]) {
        for event in events {
            if let LogEvent::Evaluation(record) = event {
                self.add_evaluation(record);
            }
        }
    }

    /// Lay the predicates out as a spanning tree under a synthetic root
    pub fn build(mut self) -> FlamegraphNode {
        // Only dependencies on evaluated predicates become edges.
        let edges: Vec<Vec<usize>> = self
            .entries
            .iter()
            .map(|entry| {
                entry
                    .dependencies
                    .iter()
                    .filter_map(|d| self.index.get(d).copied())
                    .collect()
            })
            .collect();

        let mut consumed = vec![false; self.entries.len()];
        for &dependency in edges.iter().flatten() {
            consumed[dependency] = true;
        }

        let mut placed = vec![false; self.entries.len()];
        let mut children = Vec::new();

        for position in 0..self.entries.len() {
            if !consumed[position] {
                place(position, &edges, &mut self.entries, &mut placed, &mut children);
            }
        }

        // Whatever is left is only reachable through a cycle.
        for position in 0..self.entries.len() {
            if !placed[position] {
                place(position, &edges, &mut self.entries, &mut placed, &mut children);
            }
        }

        let value = children
            .iter()
            .fold(0u64, |acc, child| acc.saturating_add(child.value));

        debug!(
            "Built flamegraph with {} predicates, total weight {}",
            self.entries.len(),
            value
        );

        FlamegraphNode {
            name: FLAMEGRAPH_ROOT_NAME.to_string(),
            value,
            children,
            raw_lines: None,
        }
    }
}

struct Frame {
    position: usize,
    next_edge: usize,
    children: Vec<FlamegraphNode>,
}

impl Frame {
    fn new(position: usize) -> Self {
        Self {
            position,
            next_edge: 0,
            children: Vec::new(),
        }
    }
}

/// Depth-first placement of `start` and every unplaced predicate it reaches
///
/// A predicate is claimed when the walk first visits it, so it ends up under
/// the first consumer in visiting order. Nodes are built as their subtree
/// completes and the finished tree is pushed onto `siblings`.
fn place(
    start: usize,
    edges: &[Vec<usize>],
    entries: &mut [PredicateEntry],
    placed: &mut [bool],
    siblings: &mut Vec<FlamegraphNode>,
) {
    placed[start] = true;
    let mut stack = vec![Frame::new(start)];

    while let Some(frame) = stack.last_mut() {
        if let Some(&dependency) = edges[frame.position].get(frame.next_edge) {
            frame.next_edge += 1;
            if !placed[dependency] {
                placed[dependency] = true;
                stack.push(Frame::new(dependency));
            }
            continue;
        }

        let Some(frame) = stack.pop() else { break };
        let entry = &mut entries[frame.position];
        let value = frame
            .children
            .iter()
            .fold(entry.self_weight, |acc, child| acc.saturating_add(child.value));

        let node = FlamegraphNode {
            name: entry.name.clone(),
            value,
            children: frame.children,
            raw_lines: Some(std::mem::take(&mut entry.raw_lines)),
        };

        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => siblings.push(node),
        }
    }
}

/// Build the flamegraph for an already parsed log
pub fn build_flamegraph(reconstruction: &Reconstruction) -> FlamegraphNode {
    let mut builder = FlamegraphBuilder::new();
    builder.add_events(&reconstruction.events);
    builder.build()
}

/// Build the flamegraph from a fully buffered log
///
/// **Public** - main entry point for in-memory logs
///
/// # Errors
/// * `ParseError` - the log could not be reconstructed
pub fn build_flamegraph_from_text(text: &str) -> Result<FlamegraphNode, ParseError> {
    let reconstruction = reconstruct_from_text(text)?;
    Ok(build_flamegraph(&reconstruction))
}

/// Build the flamegraph from a log read line by line
///
/// **Public** - produces the same tree as `build_flamegraph_from_text`
///
/// # Errors
/// * `ParseError` - the log could not be read or reconstructed
pub fn build_flamegraph_from_reader<R: BufRead>(reader: R) -> Result<FlamegraphNode, ParseError> {
    let reconstruction = reconstruct_from_reader(reader)?;
    Ok(build_flamegraph(&reconstruction))
}
