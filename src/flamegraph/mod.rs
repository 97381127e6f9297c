//! Flamegraph construction and rendering.
//!
//! The builder turns reconstructed pipelines into a weighted predicate tree.
//! The generator renders that tree as SVG (via the inferno library) or as
//! nested trace events.

pub mod builder;
pub mod generator;

// Re-export main types
pub use builder::{
    build_flamegraph,
    build_flamegraph_from_reader,
    build_flamegraph_from_text,
    FlamegraphBuilder,
    FlamegraphNode,
};
pub use generator::{
    collapsed_stacks,
    flamegraph_to_trace,
    generate_svg,
    generate_text_summary,
    FlamegraphConfig,
};
