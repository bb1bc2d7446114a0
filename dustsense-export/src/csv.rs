//! CSV export
//!
//! ```csv
//! timestamp,sharp_raw,nova_pm10,nova_pm25
//! 2024-05-01T08:00:00+00:00,0.412,14.9,8.2
//! 2024-05-01T08:00:01+00:00,NaN,15.3,8.6
//! ```

use std::io::Write;

use dustsense_core::constants::metrics::TIMESTAMP_KEY;
use dustsense_core::TimeSeriesDataset;

use crate::ExportResult;

/// Write a header row and one row per poll
pub fn write_csv<W: Write>(dataset: &TimeSeriesDataset, mut writer: W) -> ExportResult<()> {
    let mut header = vec![escape(TIMESTAMP_KEY)];
    header.extend(dataset.keys().map(escape));
    writeln!(writer, "{}", header.join(","))?;

    let columns: Vec<&[f32]> = dataset.columns().map(|(_, values)| values).collect();
    for (row, timestamp) in dataset.timestamps().iter().enumerate() {
        write!(writer, "{}", timestamp.to_rfc3339())?;
        for values in &columns {
            write!(writer, ",{}", values[row])?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Quote a field if it contains a delimiter, quote or line break
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
