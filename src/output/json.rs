//! JSON artifact writer.
//!
//! Trace documents can hold one event per evaluated pipeline, so they are
//! written compactly through a buffered writer.

use super::{file_size, prepare_output_path};
use crate::utils::error::OutputError;
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Serialize `value` as JSON into `output_path`
///
/// **Public** - main entry point for trace output
///
/// # Arguments
/// * `value` - Trace or flamegraph tree to write
/// * `output_path` - Destination file; parent directories are created
///
/// # Errors
/// * `OutputError::InvalidPath` - Path is empty, a directory, or cannot be created
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
pub fn write_json<T: Serialize + ?Sized>(
    value: &T,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    info!("Writing JSON to: {}", output_path.display());

    prepare_output_path(output_path)?;

    let mut writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;

    info!("JSON written successfully ({} bytes)", file_size(output_path));
    Ok(())
}

/// Read a JSON artifact back
///
/// **Public** - used by tests and tooling that post-process outputs
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_json<T: DeserializeOwned>(input_path: impl AsRef<Path>) -> Result<T, OutputError> {
    let input_path = input_path.as_ref();
    debug!("Reading JSON from: {}", input_path.display());

    let reader = BufReader::new(File::open(input_path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flamegraph::build_flamegraph_from_text;
    use crate::flamegraph::FlamegraphNode;
    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    #[test]
    fn test_write_and_read_flamegraph() {
        let root = build_flamegraph_from_text(
            "Tuple counts for p:\n 4 {1} r1 = SCAN input\n>>> Relation p: 4 rows",
        )
        .unwrap();
        let temp_file = NamedTempFile::new().unwrap();

        write_json(&root, temp_file.path()).unwrap();
        let loaded: FlamegraphNode = read_json(temp_file.path()).unwrap();

        assert_eq!(loaded, root);
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/trace.json");

        write_json(&serde_json::json!({ "traceEvents": [] }), &nested_path).unwrap();

        assert!(nested_path.exists());
    }

    #[test]
    fn test_read_invalid_json() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "not json").unwrap();

        let result: Result<FlamegraphNode, _> = read_json(temp_file.path());
        assert!(matches!(result, Err(OutputError::SerializationFailed(_))));
    }
}
