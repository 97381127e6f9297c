use crate::flamegraph::FlamegraphConfig;
use crate::utils::config::{DEFAULT_HTML_OUTPUT, DEFAULT_SVG_OUTPUT, DEFAULT_TRACE_OUTPUT};
use clap::ValueEnum;
use std::fmt;
use std::path::PathBuf;

/// Flamegraph artifact format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Static HTML page rendered with d3-flame-graph
    #[default]
    Html,

    /// Trace Event JSON (chrome://tracing, Perfetto, speedscope)
    Trace,

    /// SVG rendered with inferno
    Svg,
}

impl OutputFormat {
    /// Output path used when `--output` is not given
    pub fn default_output(self) -> PathBuf {
        PathBuf::from(match self {
            OutputFormat::Html => DEFAULT_HTML_OUTPUT,
            OutputFormat::Trace => DEFAULT_TRACE_OUTPUT,
            OutputFormat::Svg => DEFAULT_SVG_OUTPUT,
        })
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Html => write!(f, "html"),
            OutputFormat::Trace => write!(f, "trace"),
            OutputFormat::Svg => write!(f, "svg"),
        }
    }
}

/// Arguments for the flamegraph command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct FlamegraphArgs {
    /// Log file or database directory
    pub input: PathBuf,

    /// Output path (None = the format's default)
    pub output: Option<PathBuf>,

    pub format: OutputFormat,

    /// Open the generated HTML page in a browser
    pub open: bool,

    /// Read the log line by line instead of buffering it
    pub streaming: bool,

    /// Reference the data script relative to the HTML page
    pub relative: bool,

    /// Flamegraph configuration (title and width, used by SVG and HTML)
    pub flamegraph_config: Option<FlamegraphConfig>,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl FlamegraphArgs {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.format.default_output())
    }
}

impl Default for FlamegraphArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: None,
            format: OutputFormat::Html,
            open: false,
            streaming: false,
            relative: false,
            flamegraph_config: None,
            print_summary: false,
        }
    }
}

/// Arguments for the trace command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct TraceArgs {
    /// Log file or database directory
    pub input: PathBuf,

    /// Output path for the Trace Event JSON
    pub output: PathBuf,

    /// Read the log line by line instead of buffering it
    pub streaming: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_outputs() {
        assert_eq!(OutputFormat::Html.default_output(), PathBuf::from("flamegraph.html"));
        assert_eq!(OutputFormat::Trace.default_output(), PathBuf::from("flamegraph.json"));
        assert_eq!(OutputFormat::Svg.default_output(), PathBuf::from("flamegraph.svg"));
    }

    #[test]
    fn test_explicit_output_wins() {
        let args = FlamegraphArgs {
            output: Some(PathBuf::from("out/fg.html")),
            ..Default::default()
        };
        assert_eq!(args.output_path(), PathBuf::from("out/fg.html"));
    }
}
