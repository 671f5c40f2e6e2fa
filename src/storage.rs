use crate::models::{CarRecord, COLUMNS};
use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Truncate, then header and rows
    Create,
    /// Header only if the file is new, then rows
    Append,
}

/// CSV file that receives one batch per listing page
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one batch, returning the number of rows written
    pub fn write_batch(&self, records: &[CarRecord], mode: WriteMode) -> Result<usize> {
        if records.is_empty() {
            info!("No data to save!");
            return Ok(0);
        }

        let (file, write_header) = match mode {
            WriteMode::Create => (
                File::create(&self.path)
                    .with_context(|| format!("Failed to create {}", self.path.display()))?,
                true,
            ),
            WriteMode::Append => {
                let exists = self.path.exists();
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)
                    .with_context(|| format!("Failed to open {}", self.path.display()))?;
                (file, !exists)
            }
        };

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if write_header {
            writer.write_record(COLUMNS)?;
        }
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        match mode {
            WriteMode::Create => info!("✓ Data successfully saved to: {}", self.path.display()),
            WriteMode::Append => info!("✓ Data successfully appended to: {}", self.path.display()),
        }
        info!("✓ Records in this batch: {}", records.len());

        Ok(records.len())
    }

    /// Like [`write_batch`](Self::write_batch), but a failure only gets logged.
    /// Returns whether the batch reached disk.
    pub fn persist(&self, records: &[CarRecord], mode: WriteMode) -> bool {
        match self.write_batch(records, mode) {
            Ok(written) => written > 0,
            Err(e) => {
                error!("Error saving to CSV: {:#}", e);
                false
            }
        }
    }
}
