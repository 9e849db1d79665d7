//! CSV export of attendance records.
//!
//! Two field styles exist in the wild for these logs and both are kept:
//! the default strips commas out of field values (matching the shape of
//! previously exported files), the other double-quotes every field.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::record::AttendanceRecord;

/// Header row of an exported log.
pub const CSV_HEADER: &str = "Name,ID,Department,Scan Time,Scan Date";

/// How field values are sanitized for CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CsvStyle {
    /// Strip commas from field values; no quoting. Compatibility default.
    #[default]
    StripCommas,

    /// Double-quote every field, doubling embedded quotes.
    Quoted,
}

/// Render records as CSV text, oldest scan first.
///
/// `records` is expected in store order (newest first) and is reversed for
/// the export. The output has no trailing newline: a two-record store
/// yields exactly three lines.
///
/// # Errors
///
/// Returns [`Error::EmptyExport`] when there are no records; no file
/// should be written in that case.
pub fn to_csv(records: &[&AttendanceRecord], style: CsvStyle) -> Result<String> {
    if records.is_empty() {
        return Err(Error::EmptyExport);
    }

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for record in records.iter().rev() {
        let fields = [
            record.session_name.as_str(),
            record.session_id.as_str(),
            record.department.as_str(),
            &record.scan_time(),
            &record.scan_date(),
        ];
        let row: Vec<String> = fields.iter().map(|f| sanitize(f, style)).collect();
        lines.push(row.join(","));
    }
    Ok(lines.join("\n"))
}

fn sanitize(field: &str, style: CsvStyle) -> String {
    match style {
        CsvStyle::StripCommas => field.replace(',', ""),
        CsvStyle::Quoted => format!("\"{}\"", field.replace('"', "\"\"")),
    }
}

/// File name for an export.
///
/// Date-filtered exports use `attendance_log_<date>.csv`; whole-store
/// exports use `attendance-<today>.csv`.
#[must_use]
pub fn export_filename(filter_date: Option<&str>, today: DateTime<Utc>) -> String {
    match filter_date {
        Some(date) => format!("attendance_log_{date}.csv"),
        None => format!("attendance-{}.csv", today.format("%Y-%m-%d")),
    }
}

/// Write CSV text to `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_csv(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents)?;
    info!("Exported attendance log to {}", path.display());
    Ok(())
}
