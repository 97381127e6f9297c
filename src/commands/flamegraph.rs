//! Flamegraph command implementation.
//!
//! The flamegraph command:
//! 1. Resolves the log file
//! 2. Reconstructs pipelines from it
//! 3. Builds the predicate tree
//! 4. Writes the tree in the requested format

use super::models::{FlamegraphArgs, OutputFormat};
use super::resolve::resolve_log_file;
use super::utils::{load_log, log_summary, open_in_browser};
use crate::flamegraph::{
    build_flamegraph, flamegraph_to_trace, generate_svg, generate_text_summary, FlamegraphConfig,
};
use crate::output::{write_json, write_svg, write_viewer};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Instant;

/// Execute the flamegraph command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// The path of the written artifact
///
/// # Errors
/// * Input resolution failures (the message is the resolver's)
/// * Log parsing errors
/// * File write errors
pub fn execute_flamegraph(args: FlamegraphArgs) -> Result<PathBuf> {
    let start_time = Instant::now();

    let input = resolve_log_file(&args.input)?;
    info!("Profiling {}", input.display());

    info!("Step 1/3: Parsing log...");
    let reconstruction = load_log(&input, args.streaming)?;
    log_summary(&reconstruction);

    info!("Step 2/3: Building flamegraph...");
    let root = build_flamegraph(&reconstruction);
    debug!("Flamegraph has {} nodes, weight {}", root.node_count(), root.value);

    info!("Step 3/3: Writing {} output...", args.format);
    let output = args.output_path();
    let config = args.flamegraph_config.clone().unwrap_or_default();

    match args.format {
        OutputFormat::Html => {
            let files = write_viewer(&root, &output, &config.title, args.relative)
                .context("Failed to write flamegraph viewer")?;
            info!("✓ Flamegraph written to: {}", files.html.display());

            if args.open {
                open_in_browser(&files.html)?;
            }
        }
        OutputFormat::Trace => {
            write_json(&flamegraph_to_trace(&root), &output)
                .context("Failed to write flamegraph trace")?;
            info!("✓ Flamegraph trace written to: {}", output.display());
        }
        OutputFormat::Svg => {
            let svg = generate_svg(&root, Some(&config)).context("Failed to generate flamegraph")?;
            write_svg(&svg, &output).context("Failed to write flamegraph SVG")?;
            info!("✓ Flamegraph written to: {}", output.display());
        }
    }

    if args.print_summary {
        println!("\n{}", "=".repeat(80));
        println!("FLAMEGRAPH SUMMARY");
        println!("{}", "=".repeat(80));
        println!("Log:         {}", input.display());
        println!("Evaluations: {}", reconstruction.evaluations().count());
        println!("Cache hits:  {}", reconstruction.cache_hits().count());
        println!("Warnings:    {}", reconstruction.warnings.len());
        println!("\n{}", generate_text_summary(&root, 10));
        println!("{}", "=".repeat(80));
    }

    info!(
        "Flamegraph completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(output)
}

/// Validate flamegraph arguments
///
/// **Public** - can be called before execute_flamegraph for early validation
pub fn validate_args(args: &FlamegraphArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input path cannot be empty");
    }

    if let Some(FlamegraphConfig { width: 0, .. }) = args.flamegraph_config {
        anyhow::bail!("Flamegraph width must be greater than 0");
    }

    if args.open && args.format != OutputFormat::Html {
        warn!("--open has no effect for {} output", args.format);
    }
    if args.relative && args.format != OutputFormat::Html {
        warn!("--relative has no effect for {} output", args.format);
    }

    Ok(())
}
