//! CSV sink for report rows.

use crate::domain::TimeBand;
use crate::engine::ReportRow;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row} has columns {found:?}, expected {expected:?}")]
    ColumnMismatch {
        row: usize,
        expected: Vec<&'static str>,
        found: Vec<&'static str>,
    },
}

/// Write rows as CSV, header first. Every row must share the same columns.
///
/// An empty report still gets the default header.
pub fn write_rows<W: Write>(writer: W, rows: &[ReportRow]) -> Result<(), ExportError> {
    let headers = rows
        .first()
        .map(|r| r.columns())
        .unwrap_or_else(|| ReportRow::headers(&TimeBand::ALL));

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&headers)?;
    for (i, row) in rows.iter().enumerate() {
        let columns = row.columns();
        if columns != headers {
            return Err(ExportError::ColumnMismatch {
                row: i,
                expected: headers,
                found: columns,
            });
        }
        wtr.write_record(row.values())?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the report to `path`, creating parent directories as needed.
pub fn write_report_csv(path: &Path, rows: &[ReportRow]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::File::create(path)?;
    write_rows(std::io::BufWriter::new(file), rows)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "Wrote cohort report");
    Ok(())
}
