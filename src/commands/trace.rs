//! Trace command implementation.
//!
//! Resolves the log, reconstructs its pipelines and writes every event as
//! Trace Event JSON.

use super::models::TraceArgs;
use super::resolve::resolve_log_file;
use super::utils::{load_log, log_summary};
use crate::output::write_json;
use crate::trace_events::build_trace;
use anyhow::{Context, Result};
use log::info;
use std::time::Instant;

/// Execute the trace command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Input resolution failures (the message is the resolver's)
/// * Log parsing errors
/// * File write errors
pub fn execute_trace(args: TraceArgs) -> Result<()> {
    let start_time = Instant::now();

    let input = resolve_log_file(&args.input)?;
    info!("Tracing {}", input.display());

    let reconstruction = load_log(&input, args.streaming)?;
    log_summary(&reconstruction);

    let label = input.display().to_string();
    let trace = build_trace(&reconstruction, Some(&label));

    write_json(&trace, &args.output).context("Failed to write trace JSON")?;
    info!(
        "✓ {} trace events written to: {}",
        trace.trace_events.len(),
        args.output.display()
    );

    info!("Trace completed in {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::read_json;
    use std::fs;

    #[test]
    fn test_trace_from_database() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_dir = temp_dir.path().join("db/log");
        fs::create_dir_all(&log_dir).unwrap();
        fs::write(
            log_dir.join("execute-queries-1.log"),
            "Starting to evaluate predicate P/2.\n3 ~50% {2} r1 = foo(x,y)\n>>> Relation P: 3 rows\n",
        )
        .unwrap();
        let output = temp_dir.path().join("trace.json");

        execute_trace(TraceArgs {
            input: temp_dir.path().join("db"),
            output: output.clone(),
            streaming: false,
        })
        .unwrap();

        let trace: serde_json::Value = read_json(&output).unwrap();
        let events = trace["traceEvents"].as_array().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0]["ph"], "M");
        assert_eq!(events[2]["name"], "P");
        assert_eq!(events[2]["args"]["dup"], serde_json::json!([0.5]));
    }
}
