//! Static HTML flamegraph viewer.
//!
//! The viewer is two files: the HTML page, which loads d3-flame-graph, and
//! `<page>.data.js`, which assigns the tree to a global the page renders.
//! The page template is filled by plain string replacement because its
//! inline script is full of braces.

use super::{file_size, prepare_output_path};
use crate::flamegraph::FlamegraphNode;
use crate::utils::config::{DATA_FILE_SUFFIX, VIEWER_DATA_VARIABLE};
use crate::utils::error::OutputError;
use log::info;
use std::path::{Path, PathBuf};

const TEMPLATE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>__TITLE__</title>
<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/d3-flame-graph@4.1.3/dist/d3-flamegraph.css">
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 16px; }
  #details { margin-top: 12px; }
  #tuple-count-view { font-family: ui-monospace, SFMono-Regular, Menlo, Consolas, monospace; font-size: 12px; white-space: pre; }
</style>
</head>
<body>
<h2>__TITLE__</h2>
<div id="chart"></div>
<div id="details"><pre id="tuple-count-view"></pre></div>
<script src="https://cdn.jsdelivr.net/npm/d3@7"></script>
<script src="https://cdn.jsdelivr.net/npm/d3-flame-graph@4.1.3/dist/d3-flamegraph.min.js"></script>
<script src="https://cdn.jsdelivr.net/npm/d3-flame-graph@4.1.3/dist/d3-flamegraph-tooltip.min.js"></script>
<script src="__DATA_SRC__"></script>
<script>
function escapeHtml(text) {
  return String(text).replace(/[<>&'"]/g, m => '&#x' + m.charCodeAt(0).toString(16) + ';');
}
const tupleCountView = document.getElementById('tuple-count-view');
const chart = flamegraph().width(960);
const tip = flamegraph.tooltip.defaultFlamegraphTooltip().html(d => {
  const rawLines = d.data.rawLines;
  tupleCountView.innerText = rawLines == null ? '' : rawLines.join('\n');
  return escapeHtml(d.data.name) + ': ' + escapeHtml(d.data.value);
});
chart.tooltip(tip);
d3.select('#chart').datum(window.__DATA_VAR__).call(chart);
</script>
</body>
</html>
"#;

/// Paths written by `write_viewer`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerFiles {
    pub html: PathBuf,
    pub data: PathBuf,
}

/// Escape text substituted into HTML (element content or attribute values)
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// The data script path that belongs to an HTML page
pub fn data_file_path(html_path: &Path) -> PathBuf {
    let mut data = html_path.as_os_str().to_os_string();
    data.push(DATA_FILE_SUFFIX);
    PathBuf::from(data)
}

/// Render the viewer page
///
/// # Arguments
/// * `title` - Page title (escaped here)
/// * `data_src` - `src` of the data script (escaped here)
pub fn render_viewer_page(title: &str, data_src: &str) -> String {
    TEMPLATE
        .replace("__TITLE__", &escape_html(title))
        .replace("__DATA_SRC__", &escape_html(data_src))
        .replace("__DATA_VAR__", VIEWER_DATA_VARIABLE)
}

/// Render the data script that defines the viewer's global
pub fn render_data_script(root: &FlamegraphNode) -> Result<String, OutputError> {
    let json = tree_to_json(root)?;
    Ok(format!("window.{} = {};\n", VIEWER_DATA_VARIABLE, json))
}

enum JsonStep<'a> {
    Open(&'a FlamegraphNode),
    Separator,
    Close(&'a FlamegraphNode),
}

/// Serialize a tree to the same compact JSON as `serde_json::to_string`
///
/// The walk keeps its own stack, so trees as deep as a long dependency
/// chain serialize without recursion.
pub fn tree_to_json(root: &FlamegraphNode) -> Result<String, OutputError> {
    let mut json = String::new();
    let mut pending = vec![JsonStep::Open(root)];

    while let Some(step) = pending.pop() {
        match step {
            JsonStep::Open(node) => {
                json.push_str("{\"name\":");
                json.push_str(&serde_json::to_string(&node.name)?);
                json.push_str(",\"value\":");
                json.push_str(&node.value.to_string());
                json.push_str(",\"children\":[");

                pending.push(JsonStep::Close(node));
                for (i, child) in node.children.iter().enumerate().rev() {
                    pending.push(JsonStep::Open(child));
                    if i > 0 {
                        pending.push(JsonStep::Separator);
                    }
                }
            }
            JsonStep::Separator => json.push(','),
            JsonStep::Close(node) => {
                json.push(']');
                if let Some(raw_lines) = &node.raw_lines {
                    json.push_str(",\"rawLines\":");
                    json.push_str(&serde_json::to_string(raw_lines)?);
                }
                json.push('}');
            }
        }
    }

    Ok(json)
}

/// Write the viewer page and its data script
///
/// **Public** - main entry point for `--format html`
///
/// # Arguments
/// * `root` - Flamegraph tree
/// * `html_path` - Destination of the page; the data script goes next to it
/// * `title` - Page title
/// * `relative` - Reference the data script by file name instead of by absolute path
///
/// # Errors
/// * `OutputError::InvalidPath` - Path is invalid
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
pub fn write_viewer(
    root: &FlamegraphNode,
    html_path: impl AsRef<Path>,
    title: &str,
    relative: bool,
) -> Result<ViewerFiles, OutputError> {
    let html_path = html_path.as_ref();
    let data_path = data_file_path(html_path);
    info!("Writing flamegraph viewer to: {}", html_path.display());

    prepare_output_path(html_path)?;

    let data_src = if relative {
        data_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| OutputError::InvalidPath(html_path.display().to_string()))?
    } else if data_path.is_absolute() {
        data_path.display().to_string()
    } else {
        std::env::current_dir()?.join(&data_path).display().to_string()
    };

    std::fs::write(html_path, render_viewer_page(title, &data_src))?;
    std::fs::write(&data_path, render_data_script(root)?)?;

    info!(
        "Viewer written successfully ({} + {} bytes)",
        file_size(html_path),
        file_size(&data_path)
    );

    Ok(ViewerFiles {
        html: html_path.to_path_buf(),
        data: data_path,
    })
}
