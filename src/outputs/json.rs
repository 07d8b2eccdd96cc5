//! JSON workbook output.
//!
//! The results sheet is written as
//!
//! ```text
//! { "sheet": "News", "rows": [[header...], [row...], ...] }
//! ```
//!
//! to `output_dir/latimes_<YY-MM-DD>_<query>_<section>.json`.

use super::table::ResultTable;
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Name of the single sheet in the workbook.
pub const SHEET_NAME: &str = "News";

#[derive(Serialize)]
struct Workbook<'a> {
    sheet: &'a str,
    rows: &'a ResultTable,
}

/// Write `table` to `output_dir/filename` and return the written path.
///
/// # Errors
///
/// Returns an error if serialisation or the file write fails, or if the file
/// is missing afterwards.
#[instrument(level = "info", skip(table), fields(output_dir = %output_dir.display(), rows = table.data_len()))]
pub async fn write_workbook(
    table: &ResultTable,
    output_dir: &Path,
    filename: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(&Workbook {
        sheet: SHEET_NAME,
        rows: table,
    })?;

    let path = output_dir.join(filename);
    info!(path = %path.display(), "Writing JSON workbook");
    fs::write(&path, json).await?;

    if fs::try_exists(&path).await? {
        info!(path = %path.display(), "News articles saved");
        Ok(path)
    } else {
        error!(path = %path.display(), "Workbook missing after write");
        Err(format!("failed to save {}", path.display()).into())
    }
}
