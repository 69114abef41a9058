//! Export seam for table data.
//!
//! Sinks receive the header labels and the stringified rows in left-to-right
//! column order and produce a downloadable artifact. The spreadsheet-workbook
//! and paginated-document writers are external collaborators honoring the
//! same contract; the CSV sink is the one kept in-repo.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export: {0}")]
    Write(String),
}

impl From<csv::Error> for ExportError {
    fn from(value: csv::Error) -> Self {
        Self::Write(value.to_string())
    }
}

/// A sink that turns a table model into a downloadable artifact.
pub trait ExportSink {
    fn export(
        &self,
        title: Option<&str>,
        headers: &[String],
        rows: &[Vec<String>],
    ) -> Result<Vec<u8>, ExportError>;
}

/// Plain CSV artifact: one header record, one record per row.
#[derive(Debug, Default)]
pub struct CsvSink;

impl CsvSink {
    pub fn new() -> Self {
        Self
    }
}

impl ExportSink for CsvSink {
    fn export(
        &self,
        _title: Option<&str>,
        headers: &[String],
        rows: &[Vec<String>],
    ) -> Result<Vec<u8>, ExportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(headers)?;
        for row in rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| ExportError::Write(e.to_string()))
    }
}
