//! Export of datasets produced by a simulated station

use std::fs;

use dustsense_core::sim::{SimulatedChannel, SimulatedPort};
use dustsense_core::time::MockClock;
use dustsense_core::{MultiSensorReader, ParticulateSensor, SamplerConfig, ScalarVoltageSensor, TimeSeriesDataset};
use dustsense_export::{write_dataset, write_dataset_to_path, ExportFormat};

fn station_dataset(polls: usize) -> TimeSeriesDataset {
    let config = SamplerConfig::default().with_max_inner_attempts(2);
    // first poll passes, second exhausts both attempts
    let sharp = ScalarVoltageSensor::new(
        "sharp",
        &config,
        SimulatedChannel::cycling([0.25, 0.0, 0.0]),
        MockClock::new(),
    )
    .unwrap();
    let nova = ParticulateSensor::new("nova", SimulatedPort::constant(8.0, 14.5));

    let mut reader = MultiSensorReader::new(vec![sharp.into(), nova.into()], MockClock::new());
    reader.poll_series(polls).unwrap()
}

#[test]
fn test_csv_rows_match_polls() {
    let dataset = station_dataset(2);
    let mut out = Vec::new();
    write_dataset(&dataset, ExportFormat::Csv, &mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "timestamp,sharp_raw,nova_pm10,nova_pm25");
    assert!(lines[1].ends_with(",0.25,14.5,8"));
    assert!(lines[2].ends_with(",NaN,14.5,8"));
}

#[test]
fn test_json_columns() {
    let dataset = station_dataset(2);
    let mut out = Vec::new();
    write_dataset(&dataset, ExportFormat::Json, &mut out).unwrap();

    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["timestamp"].as_array().unwrap().len(), 2);
    assert_eq!(value["sharp_raw"][0], 0.25);
    assert!(value["sharp_raw"][1].is_null());
    assert_eq!(value["nova_pm25"], serde_json::json!([8.0, 8.0]));
}

#[test]
fn test_json_lines_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("series.jsonl");
    let dataset = station_dataset(3);

    let format = ExportFormat::from_path(&path).unwrap();
    write_dataset_to_path(&dataset, format, &path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let rows: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(rows.len(), 3);
    for row in &rows {
        let keys: Vec<&str> = row.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 4);
        assert_eq!(row["nova_pm10"], 14.5);
    }
}
