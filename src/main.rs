//! ra-prof CLI
//!
//! Profiles query evaluator logs: reconstructs predicate pipelines and
//! writes them as flamegraphs or Trace Event JSON.

use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;
use std::process::ExitCode;

use ra_log_profiler::commands::{
    execute_flamegraph, execute_trace, validate_args, FlamegraphArgs, OutputFormat, TraceArgs,
};
use ra_log_profiler::flamegraph::FlamegraphConfig;

/// ra-prof - Tuple-count profiling for evaluator logs
#[derive(Parser, Debug)]
#[command(name = "ra-prof")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a flamegraph of evaluated predicates weighted by tuple counts
    ///
    /// If given a database, the most recent log file from that database is used.
    Flamegraph {
        /// Log file or database directory
        #[arg(value_name = "LOGFILE_OR_DATABASE")]
        input: PathBuf,

        /// Where to write the output (default depends on the format)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
        format: OutputFormat,

        /// Open the generated HTML file in a browser
        #[arg(long)]
        open: bool,

        /// Read the log line by line instead of loading it into memory
        #[arg(long)]
        streaming: bool,

        /// Reference the viewer's data file by a relative path
        #[arg(long)]
        relative: bool,

        /// Flamegraph title
        #[arg(long)]
        title: Option<String>,

        /// Flamegraph width in pixels (SVG only)
        #[arg(long, default_value = "1200")]
        width: usize,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Convert a log into Trace Event JSON
    Trace {
        /// Log file or database directory
        #[arg(value_name = "LOGFILE_OR_DATABASE")]
        input: PathBuf,

        /// Where to write the trace
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Read the log line by line instead of loading it into memory
        #[arg(long)]
        streaming: bool,
    },
}

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Flamegraph {
            input,
            output,
            format,
            open,
            streaming,
            relative,
            title,
            width,
            summary,
        } => {
            let mut config = FlamegraphConfig::new().with_width(width);
            if let Some(title) = title {
                config = config.with_title(title);
            }

            let args = FlamegraphArgs {
                input,
                output,
                format,
                open,
                streaming,
                relative,
                flamegraph_config: Some(config),
                print_summary: summary,
            };

            // Validate args first
            validate_args(&args)?;

            execute_flamegraph(args)?;
        }

        Commands::Trace {
            input,
            output,
            streaming,
        } => {
            execute_trace(TraceArgs {
                input,
                output,
                streaming,
            })?;
        }
    }

    Ok(())
}
