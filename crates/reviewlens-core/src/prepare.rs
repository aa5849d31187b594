//! Raw CSV preparation: copy a review export without unneeded columns

use crate::error::{Error, Result};
use std::path::Path;
use tracing::{info, warn};

/// Columns removed from the raw hotel review export by default
pub const DEFAULT_DROP_COLUMNS: &[&str] =
    &["Hotel_Address", "Tags", "days_since_review", "lat", "lng"];

/// Outcome of a preparation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareSummary {
    pub rows_written: usize,
    pub columns_kept: Vec<String>,
    pub columns_dropped: Vec<String>,
}

/// Copy `raw` to `clean`, leaving out every column named in `drop_columns`.
///
/// Unknown column names are skipped with a warning.
pub fn prepare_csv<S: AsRef<str>>(
    raw: impl AsRef<Path>,
    clean: impl AsRef<Path>,
    drop_columns: &[S],
) -> Result<PrepareSummary> {
    let raw = raw.as_ref();
    let clean = clean.as_ref();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(raw)?;
    let headers = reader.headers()?.clone();

    for name in drop_columns {
        if !headers.iter().any(|h| h.trim() == name.as_ref()) {
            warn!(column = name.as_ref(), "Column to drop not present in raw CSV");
        }
    }

    let keep: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !drop_columns.iter().any(|d| d.as_ref() == h.trim()))
        .map(|(i, _)| i)
        .collect();
    if keep.is_empty() {
        return Err(Error::data("preparation would drop every column"));
    }

    if let Some(parent) = clean.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(clean)?;
    writer.write_record(keep.iter().map(|&i| &headers[i]))?;

    let mut rows_written = 0;
    for record in reader.records() {
        let record = record?;
        writer.write_record(keep.iter().map(|&i| record.get(i).unwrap_or("")))?;
        rows_written += 1;
    }
    writer.flush()?;

    let columns_kept: Vec<String> = keep.iter().map(|&i| headers[i].to_string()).collect();
    let columns_dropped: Vec<String> = headers
        .iter()
        .filter(|h| !columns_kept.iter().any(|k| k == h))
        .map(str::to_string)
        .collect();

    info!(
        raw = %raw.display(),
        clean = %clean.display(),
        rows_written,
        dropped = columns_dropped.len(),
        "Prepared clean CSV"
    );

    Ok(PrepareSummary {
        rows_written,
        columns_kept,
        columns_dropped,
    })
}
