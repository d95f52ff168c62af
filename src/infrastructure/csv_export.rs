//! CSV output for accepted listings
//!
//! One header line, then one row per accepted record in the fixed column order.
//! Quoting is left to `csv::Writer`. Every row is flushed so an interrupted crawl
//! keeps what it found.

use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::ListingRecord;

/// Streaming writer of listing rows
pub struct CsvExporter<W: Write> {
    writer: csv::Writer<W>,
    rows_written: usize,
}

impl CsvExporter<File> {
    /// Create (or truncate) the output file and write the header
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory {:?}", parent))?;
        }
        let file = File::create(path).with_context(|| format!("Failed to create CSV file {:?}", path))?;
        Self::new(file).with_context(|| format!("Failed to write CSV header to {:?}", path))
    }
}

impl<W: Write> CsvExporter<W> {
    /// Wrap a writer and emit the header line
    pub fn new(writer: W) -> csv::Result<Self> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(ListingRecord::COLUMNS)?;
        writer.flush()?;
        Ok(Self { writer, rows_written: 0 })
    }

    /// Append one record and flush it
    pub fn write_record(&mut self, record: &ListingRecord) -> csv::Result<()> {
        self.writer.write_record(record.values())?;
        self.writer.flush()?;
        self.rows_written += 1;
        Ok(())
    }

    /// Data rows written so far, header excluded
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to flush CSV output: {}", e.error()))
    }
}
