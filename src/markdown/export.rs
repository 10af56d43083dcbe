//! HTML export
//!
//! Writes a rendered document to disk as a standalone HTML file.

use super::renderer::RenderedDocument;
use crate::error::FileResult;
use crate::file_handler::write_file_atomic_sync;
use std::path::{Path, PathBuf};

/// Extension used for exported documents
pub const HTML_EXTENSION: &str = "html";

/// Write the composed document to `output_path`
pub fn export_html_file(document: &RenderedDocument, output_path: &Path) -> FileResult<()> {
    write_file_atomic_sync(output_path, &document.composed_html)?;
    log::info!(
        "Exported {} ({} style)",
        output_path.display(),
        document.style_name
    );
    Ok(())
}

/// Generate suggested output path from input path
pub fn suggest_output_path(input_path: &Path) -> PathBuf {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");

    let mut output = input_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_default();

    output.push(format!("{}.{}", stem, HTML_EXTENSION));
    output
}
