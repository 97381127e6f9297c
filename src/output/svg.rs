//! SVG flamegraph output writer.

use super::{file_size, prepare_output_path};
use crate::utils::error::OutputError;
use log::{debug, info};
use std::path::Path;

/// Write rendered SVG to a file
///
/// **Public** - main entry point for SVG output
///
/// # Errors
/// * `OutputError::InvalidPath` - Path is invalid
/// * `OutputError::WriteFailed` - I/O error during write
pub fn write_svg(svg_content: &str, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    info!("Writing SVG to: {}", output_path.display());

    prepare_output_path(output_path)?;
    if output_path.extension().map_or(true, |ext| ext != "svg") {
        debug!("File does not have .svg extension: {}", output_path.display());
    }

    std::fs::write(output_path, svg_content)?;

    let size = file_size(output_path);
    info!(
        "SVG written successfully ({} bytes, {:.2} KB)",
        size,
        size as f64 / 1024.0
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"></svg>"#;

    #[test]
    fn test_write_svg() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested/flamegraph.svg");

        write_svg(VALID_SVG, &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), VALID_SVG);
    }

    #[test]
    fn test_write_svg_to_directory_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            write_svg(VALID_SVG, temp_dir.path()),
            Err(OutputError::InvalidPath(_))
        ));
    }
}
