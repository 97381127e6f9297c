//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading an evaluator log
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Unterminated pipeline {name} (new pipeline started at line {line})")]
    UnterminatedPipeline { name: String, line: usize },

    #[error("Failed to read log: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid log pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Errors that can occur while locating the log file for a CLI argument
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Not a snapshot or log file: {}", .0.display())]
    NotALogOrDatabase(PathBuf),

    #[error("No logs in snapshot: {}", .0.display())]
    NoLogs(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during flamegraph generation
#[derive(Error, Debug)]
pub enum FlamegraphError {
    #[error("Empty stack data")]
    EmptyStacks,

    #[error("Failed to render flamegraph: {0}")]
    Render(String),

    #[error("Rendered flamegraph is not valid UTF-8")]
    InvalidSvg(#[from] std::string::FromUtf8Error),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
