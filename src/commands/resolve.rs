//! Locate the evaluator log for a CLI argument.
//!
//! The argument is either a log file or a database directory, whose logs
//! live in `<db>/log/execute-queries-<timestamp>.log`.

use crate::utils::config::{LOG_DIR_NAME, LOG_FILE_PATTERN};
use crate::utils::error::ResolveError;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static LOG_FILE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(LOG_FILE_PATTERN).unwrap());

/// Resolve `input` to a single readable log file
///
/// **Public** - called by every command before parsing
///
/// # Arguments
/// * `input` - An existing file (returned as is) or a database directory
///
/// # Returns
/// The file itself, or the database's most recent log (last in name order)
///
/// # Errors
/// * `ResolveError::NotFound` - `input` does not exist
/// * `ResolveError::NotALogOrDatabase` - directory without a `log/` subdirectory
/// * `ResolveError::NoLogs` - `log/` holds no matching log file
pub fn resolve_log_file(input: impl AsRef<Path>) -> Result<PathBuf, ResolveError> {
    let input = input.as_ref();

    if !input.exists() {
        return Err(ResolveError::NotFound(input.to_path_buf()));
    }
    if !input.is_dir() {
        return Ok(input.to_path_buf());
    }

    let log_dir = input.join(LOG_DIR_NAME);
    if !log_dir.is_dir() {
        return Err(ResolveError::NotALogOrDatabase(input.to_path_buf()));
    }

    let mut names = Vec::new();
    for entry in std::fs::read_dir(&log_dir)? {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if LOG_FILE_NAME.is_match(&name) {
            names.push(name);
        }
    }
    names.sort();

    let latest = names
        .pop()
        .ok_or_else(|| ResolveError::NoLogs(input.to_path_buf()))?;
    debug!("Using latest of {} logs in {}: {}", names.len() + 1, log_dir.display(), latest);

    Ok(log_dir.join(latest))
}
