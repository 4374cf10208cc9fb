// src/csv.rs

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

use crate::table::TransactionTable;

/// Quote a field only when it contains a comma. Embedded quotes are left as-is.
fn render_field(field: &str) -> String {
    if field.contains(',') {
        format!("\"{}\"", field)
    } else {
        field.to_string()
    }
}

/// Render the whole table: an unquoted header line, then one line per row.
pub fn render_csv(table: &TransactionTable) -> String {
    let mut out = String::new();
    out.push_str(&table.column_names().join(","));
    out.push('\n');

    for row in table.all_rows() {
        let fields: Vec<String> = row.iter().map(|f| render_field(f)).collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

/// Replace `path` with the rendered table.
///
/// Written to a hidden temp file next to `path` then renamed over it, so the
/// file on disk always holds a complete snapshot.
#[instrument(level = "info", skip(table), fields(rows = table.row_count()))]
pub fn write_csv(table: &TransactionTable, path: &Path) -> Result<()> {
    info!("Writing output CSV");

    let tmp_path = temp_sibling(path);
    fs::write(&tmp_path, render_csv(table))
        .with_context(|| format!("writing {:?}", tmp_path))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))?;

    info!("CSV file written");
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.csv".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}
