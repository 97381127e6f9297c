//! Render a flamegraph tree in the formats the CLI offers.
//!
//! - Collapsed stacks (`root;a;b 42`), the input format of inferno
//! - SVG, rendered by inferno from the collapsed stacks
//! - Nested begin/end trace events, for trace viewers

use super::builder::FlamegraphNode;
use crate::trace_events::{EventCategory, Phase, Trace, TraceEvent};
use crate::utils::config::{PROCESS_ID, THREAD_ID};
use crate::utils::error::FlamegraphError;
use inferno::flamegraph::{self, Options};
use log::info;

/// Flamegraph configuration
#[derive(Debug, Clone)]
pub struct FlamegraphConfig {
    pub title: String,
    pub width: usize,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: "Evaluator Log Profile".to_string(),
            width: 1200,
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}

/// Flatten a tree into collapsed stack lines, one per node with own weight
///
/// **Public** - the input inferno expects
///
/// `;` separates frames, so it is replaced inside predicate names.
pub fn collapsed_stacks(root: &FlamegraphNode) -> Vec<String> {
    let mut lines = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut pending = vec![(root, 0)];

    while let Some((node, depth)) = pending.pop() {
        path.truncate(depth);
        path.push(node.name.replace(';', ":"));

        let own = node.self_value();
        if own > 0 {
            lines.push(format!("{} {}", path.join(";"), own));
        }
        pending.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
    }

    lines
}

/// Render the tree as an interactive SVG flamegraph
///
/// # Errors
/// * `FlamegraphError::EmptyStacks` - no node carries any weight
/// * `FlamegraphError::Render` - inferno failed to render
pub fn generate_svg(
    root: &FlamegraphNode,
    config: Option<&FlamegraphConfig>,
) -> Result<String, FlamegraphError> {
    let stacks = collapsed_stacks(root);
    if stacks.is_empty() {
        return Err(FlamegraphError::EmptyStacks);
    }

    let config = config.cloned().unwrap_or_default();
    info!("Generating flamegraph with {} stacks", stacks.len());

    let mut options = Options::default();
    options.title = config.title;
    options.image_width = Some(config.width);
    options.count_name = "tuples".to_string();

    let mut svg = Vec::new();
    flamegraph::from_lines(&mut options, stacks.iter().map(String::as_str), &mut svg)
        .map_err(|e| FlamegraphError::Render(e.to_string()))?;

    let svg = String::from_utf8(svg)?;
    info!("Flamegraph generated successfully ({} bytes)", svg.len());
    Ok(svg)
}

/// Lay the tree out as nested begin/end events
///
/// **Public** - the `trace` flamegraph format
///
/// A node spans `value` ticks starting at its parent's cursor; siblings
/// follow each other.
pub fn flamegraph_to_trace(root: &FlamegraphNode) -> Trace {
    let mut events = Vec::with_capacity(root.node_count() * 2);
    let mut pending = vec![Span::Open(root, 0)];

    while let Some(span) = pending.pop() {
        match span {
            Span::Open(node, start) => {
                events.push(span_event(Phase::Begin, &node.name, start));
                pending.push(Span::Close(node, start));

                let mut child_start = start;
                let mut opens = Vec::with_capacity(node.children.len());
                for child in &node.children {
                    opens.push(Span::Open(child, child_start));
                    child_start = child_start.saturating_add(child.value);
                }
                pending.extend(opens.into_iter().rev());
            }
            Span::Close(node, start) => {
                events.push(span_event(Phase::End, &node.name, start.saturating_add(node.value)));
            }
        }
    }

    Trace {
        trace_events: events,
    }
}

enum Span<'a> {
    Open(&'a FlamegraphNode, u64),
    Close(&'a FlamegraphNode, u64),
}

fn span_event(ph: Phase, name: &str, ts: u64) -> TraceEvent {
    TraceEvent {
        ph,
        cat: EventCategory::Evaluation,
        name: name.to_string(),
        ts,
        dur: None,
        pid: PROCESS_ID,
        tid: THREAD_ID,
        scope: None,
        args: None,
    }
}

/// Generate a one-line-per-predicate text summary of the heaviest subtrees
pub fn generate_text_summary(root: &FlamegraphNode, limit: usize) -> String {
    let mut nodes = Vec::new();
    let mut pending: Vec<&FlamegraphNode> = root.children.iter().collect();
    while let Some(node) = pending.pop() {
        nodes.push(node);
        pending.extend(&node.children);
    }
    nodes.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));

    let mut summary = format!("Total weight: {} tuples\n", root.value);
    for node in nodes.into_iter().take(limit) {
        let share = if root.value == 0 {
            0.0
        } else {
            node.value as f64 / root.value as f64 * 100.0
        };
        summary.push_str(&format!("  {:>6.2}%  {:>12}  {}\n", share, node.value, node.name));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn leaf(name: &str, value: u64) -> FlamegraphNode {
        FlamegraphNode {
            name: name.to_string(),
            value,
            children: Vec::new(),
            raw_lines: Some(Vec::new()),
        }
    }

    fn sample_tree() -> FlamegraphNode {
        let path = FlamegraphNode {
            name: "path".to_string(),
            value: 11,
            children: vec![leaf("edge", 5)],
            raw_lines: Some(Vec::new()),
        };
        FlamegraphNode {
            name: "root".to_string(),
            value: 13,
            children: vec![path, leaf("other;name", 2)],
            raw_lines: None,
        }
    }

    #[test]
    fn test_collapsed_stacks() {
        assert_eq!(
            collapsed_stacks(&sample_tree()),
            vec!["root;path 6", "root;path;edge 5", "root;other:name 2"]
        );
    }

    #[test]
    fn test_trace_layout() {
        let trace = flamegraph_to_trace(&sample_tree());
        let spans: Vec<(Phase, &str, u64)> = trace
            .trace_events
            .iter()
            .map(|e| (e.ph, e.name.as_str(), e.ts))
            .collect();

        assert_eq!(
            spans,
            vec![
                (Phase::Begin, "root", 0),
                (Phase::Begin, "path", 0),
                (Phase::Begin, "edge", 0),
                (Phase::End, "edge", 5),
                (Phase::End, "path", 11),
                (Phase::Begin, "other;name", 11),
                (Phase::End, "other;name", 13),
                (Phase::End, "root", 13),
            ]
        );
    }

    #[test]
    fn test_generate_svg() {
        let svg = generate_svg(&sample_tree(), None).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("edge"));
    }

    #[test]
    fn test_empty_tree_has_no_svg() {
        let root = leaf("root", 0);
        assert!(matches!(
            generate_svg(&root, None),
            Err(FlamegraphError::EmptyStacks)
        ));
    }

    #[test]
    fn test_render_error_message() {
        let err = FlamegraphError::Render("unexpected end of input".to_string());
        assert_eq!(err.to_string(), "Failed to render flamegraph: unexpected end of input");
    }

    #[test]
    fn test_text_summary() {
        let summary = generate_text_summary(&sample_tree(), 2);
        assert!(summary.starts_with("Total weight: 13 tuples"));
        assert!(summary.contains("path"));
        assert!(!summary.contains("other"));
    }
}
