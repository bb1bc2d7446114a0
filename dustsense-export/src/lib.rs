//! Dataset export for DustSense
//!
//! Writes poll records and time-series datasets to the tabular formats that
//! downstream tools (spreadsheets, pandas, plotting scripts) read directly.
//!
//! ## Supported Formats
//!
//! 1. **CSV**: header `timestamp,<metric...>`, one row per poll
//! 2. **JSON Lines**: one JSON object per poll
//! 3. **JSON**: one object mapping every column name to its values
//!
//! Undefined readings (`NaN`) are written as `NaN` in CSV and `null` in JSON.
//!
//! ```rust
//! use dustsense_core::sim::SimulatedPort;
//! use dustsense_core::time::MockClock;
//! use dustsense_core::{MultiSensorReader, ParticulateSensor};
//! use dustsense_export::{write_dataset, ExportFormat};
//!
//! let nova = ParticulateSensor::new("nova", SimulatedPort::constant(8.0, 14.0));
//! let mut reader = MultiSensorReader::new(vec![nova.into()], MockClock::new());
//! let dataset = reader.poll_series(2)?;
//!
//! let mut out = Vec::new();
//! write_dataset(&dataset, ExportFormat::Csv, &mut out)?;
//! assert!(String::from_utf8(out)?.starts_with("timestamp,nova_pm10,nova_pm25\n"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]

pub mod csv;
pub mod json;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use dustsense_core::TimeSeriesDataset;
use log::debug;
use thiserror::Error;

pub use crate::csv::write_csv;
pub use crate::json::{write_json, write_json_lines, write_record_line};

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values with a header row
    Csv,
    /// Line-delimited JSON, one poll per line
    JsonLines,
    /// Single JSON object of columns
    Json,
}

impl ExportFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "jsonl" | "ndjson" => Some(Self::JsonLines),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Write `dataset` in `format` to any writer
pub fn write_dataset<W: Write>(dataset: &TimeSeriesDataset, format: ExportFormat, writer: W) -> ExportResult<()> {
    match format {
        ExportFormat::Csv => write_csv(dataset, writer),
        ExportFormat::JsonLines => write_json_lines(dataset, writer),
        ExportFormat::Json => write_json(dataset, writer),
    }
}

/// Write `dataset` to a file, creating or truncating it
pub fn write_dataset_to_path(
    dataset: &TimeSeriesDataset,
    format: ExportFormat,
    path: impl AsRef<Path>,
) -> ExportResult<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_dataset(dataset, format, &mut writer)?;
    writer.flush()?;
    debug!("wrote {} polls to {}", dataset.len(), path.display());
    Ok(())
}
