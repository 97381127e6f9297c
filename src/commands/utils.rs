use crate::parser::{reconstruct_from_reader, reconstruct_from_text, Reconstruction};
use anyhow::{Context, Result};
use log::{debug, info};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::process::Command;

/// Parse a resolved log file, buffered or line by line
pub fn load_log(path: &Path, streaming: bool) -> Result<Reconstruction> {
    debug!(
        "Parsing {} ({})",
        path.display(),
        if streaming { "streaming" } else { "buffered" }
    );

    let reconstruction = if streaming {
        let file = File::open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        reconstruct_from_reader(BufReader::new(file))
    } else {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read log file {}", path.display()))?;
        reconstruct_from_text(&text)
    };

    reconstruction.with_context(|| format!("Failed to parse log file {}", path.display()))
}

/// Log what a parsing run found
pub fn log_summary(reconstruction: &Reconstruction) {
    info!(
        "Parsed {} events: {} evaluations, {} cache hits, {} distinct RA texts, {} warnings",
        reconstruction.events.len(),
        reconstruction.evaluations().count(),
        reconstruction.cache_hits().count(),
        reconstruction.distinct_ra_texts,
        reconstruction.warnings.len()
    );
}

/// Open a file with the platform's default handler
pub fn open_in_browser(path: &Path) -> Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    } else {
        Command::new("xdg-open")
    };

    info!("Opening {}", path.display());
    command
        .arg(path)
        .spawn()
        .with_context(|| format!("Failed to open {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LOG: &str = "Tuple counts for p:\n 2 {1} r1 = SCAN x\n>>> Relation p: 2 rows\n>>> Relation q: 1 rows\n";

    #[test]
    fn test_load_log_modes_agree() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("execute-queries-1.log");
        std::fs::write(&path, LOG).unwrap();

        let buffered = load_log(&path, false).unwrap();
        let streamed = load_log(&path, true).unwrap();

        assert_eq!(buffered.events, streamed.events);
        assert_eq!(buffered.cache_hits().count(), 1);
    }

    #[test]
    fn test_load_log_reports_parse_errors() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("broken.log");
        std::fs::write(&path, "Tuple counts for p:\n 1 {1} r1 = x\nTuple counts for q:\n").unwrap();

        let error = load_log(&path, false).unwrap_err();
        assert!(format!("{:#}", error).contains("Unterminated pipeline p"));
    }
}
