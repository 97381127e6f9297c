//! Output writers for traces and flamegraphs.
//!
//! This module handles writing artifacts to disk:
//! - Trace Event JSON (trace command, `--format trace`)
//! - The HTML flamegraph viewer and its data script
//! - SVG flamegraphs

pub mod html;
pub mod json;
pub mod svg;

use crate::utils::error::OutputError;
use log::debug;
use std::path::Path;

// Re-export main functions
pub use html::{
    data_file_path, escape_html, render_data_script, render_viewer_page, tree_to_json, write_viewer,
    ViewerFiles,
};
pub use json::{read_json, write_json};
pub use svg::write_svg;

/// Check an output path and create its parent directories
///
/// **Private** - shared by every writer
fn prepare_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}

fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path_is_rejected() {
        assert!(prepare_output_path(Path::new("")).is_err());
    }

    #[test]
    fn test_directory_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(prepare_output_path(temp_dir.path()).is_err());
    }

    #[test]
    fn test_parent_dirs_are_created() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("a/b/out.json");

        prepare_output_path(&nested).unwrap();

        assert!(nested.parent().unwrap().is_dir());
        assert!(!nested.exists());
    }
}
