pub mod format;
pub mod json;
pub mod latex;
pub mod markdown;
pub mod tables;
pub mod text;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use proofmetrics_core::metrics::CollectionResult;
use proofmetrics_core::types::TableFormat;

use crate::tables::all_tables;

/// One rendered table, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFile {
    /// File name including extension, e.g. `metrics-loc.tex`.
    pub name: String,
    pub content: String,
}

/// Render every table for `result` in `format`.
pub fn render_tables(result: &CollectionResult, format: TableFormat) -> Vec<TableFile> {
    let tables = match format {
        TableFormat::Latex => all_tables(result, &latex::Latex),
        TableFormat::Markdown => all_tables(result, &markdown::Markdown),
    };

    tables
        .iter()
        .map(|table| {
            let mut content = match format {
                TableFormat::Latex => latex::format_table(table),
                TableFormat::Markdown => markdown::format_table(table),
            };
            if !content.ends_with('\n') {
                content.push('\n');
            }
            TableFile {
                name: format!("{}.{}", table.name, format.extension()),
                content,
            }
        })
        .collect()
}

/// Write `files` into `dir`, creating it if needed. Returns the written paths.
pub fn write_tables(dir: &Path, files: &[TableFile]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = dir.join(&file.name);
        std::fs::write(&path, &file.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::debug!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
