//! Configuration and constants for the CLI.

/// Process ID stamped on every trace event
pub const PROCESS_ID: u32 = 1;

/// Thread ID stamped on every trace event (the log is single-threaded from our view)
pub const THREAD_ID: u32 = 1;

/// First ID handed out by the RA text cache
pub const FIRST_RA_ID: u32 = 1;

/// Duration written on complete evaluation events, in synthetic ticks
pub const EVALUATION_DURATION: u64 = 1;

// Decoration markers the evaluator appends to relation names.
// A pipeline and its row-count line may name the same relation with different markers.
pub const RELATION_SUFFIXES: &[&str] = &["#cur_delta", "#prev_delta", "#prev", "@staged_ext", "_delta"];

/// Escaped union operator token in RA text
pub const UNION_OPERATOR: &str = "\\/";

// Database layout: <db>/log/execute-queries-<timestamp>.log
pub const LOG_DIR_NAME: &str = "log";
pub const LOG_FILE_PATTERN: &str = r"^execute-queries-[\d.]+\.log$";

// Default output paths per flamegraph format
pub const DEFAULT_HTML_OUTPUT: &str = "flamegraph.html";
pub const DEFAULT_TRACE_OUTPUT: &str = "flamegraph.json";
pub const DEFAULT_SVG_OUTPUT: &str = "flamegraph.svg";

/// Suffix appended to the HTML output path for the data script
pub const DATA_FILE_SUFFIX: &str = ".data.js";

/// Global variable the viewer page reads the flamegraph from
pub const VIEWER_DATA_VARIABLE: &str = "flamegraphData";

/// Name of the synthetic flamegraph root
pub const FLAMEGRAPH_ROOT_NAME: &str = "root";
