//! JSON and JSON Lines export
//!
//! JSON Lines writes one object per poll:
//!
//! ```json
//! {"timestamp":"2024-05-01T08:00:00Z","sharp_raw":0.412,"nova_pm10":14.9,"nova_pm25":8.2}
//! ```
//!
//! JSON writes the whole dataset as one object of columns.

use std::io::Write;

use dustsense_core::time::Timestamp;
use dustsense_core::{SensorOutputRecord, TimeSeriesDataset};
use serde::Serialize;

use crate::ExportResult;

#[derive(Serialize)]
struct Line<'a> {
    timestamp: &'a Timestamp,
    #[serde(flatten)]
    record: &'a SensorOutputRecord,
}

/// Append one poll as a JSON line
pub fn write_record_line<W: Write>(
    timestamp: &Timestamp,
    record: &SensorOutputRecord,
    mut writer: W,
) -> ExportResult<()> {
    serde_json::to_writer(&mut writer, &Line { timestamp, record })?;
    writeln!(writer)?;
    Ok(())
}

/// One JSON object per poll
pub fn write_json_lines<W: Write>(dataset: &TimeSeriesDataset, mut writer: W) -> ExportResult<()> {
    for (timestamp, record) in dataset.rows() {
        write_record_line(&timestamp, &record, &mut writer)?;
    }
    Ok(())
}

/// The whole dataset as a column map
pub fn write_json<W: Write>(dataset: &TimeSeriesDataset, mut writer: W) -> ExportResult<()> {
    serde_json::to_writer(&mut writer, dataset)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn record_line_puts_timestamp_first() {
        let timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let record: SensorOutputRecord = [("a_raw".to_string(), f32::NAN), ("b_pm10".to_string(), 3.5)]
            .into_iter()
            .collect();

        let mut out = Vec::new();
        write_record_line(&timestamp, &record, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\"timestamp\":\"2024-05-01T08:00:00Z\",\"a_raw\":null,\"b_pm10\":3.5}\n"
        );
    }
}
