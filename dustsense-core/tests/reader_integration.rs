//! Integration tests for station polling and dataset assembly

mod common;

use dustsense_core::sim::{SimulatedBridge, SimulatedChannel, SimulatedPort};
use dustsense_core::time::MockClock;
use dustsense_core::{ConfigError, MultiSensorReader, SensorError, StationConfig};

use common::{approx_eq, two_sensor_reader};

#[test]
fn test_poll_once_key_order() {
    let mut reader = two_sensor_reader(&[0.2], 10.0, 20.0);

    let record = reader.poll_once().unwrap();

    assert_eq!(record.keys().collect::<Vec<_>>(), ["a_raw", "b_pm10", "b_pm25"]);
    assert_eq!(record.get("a_raw"), Some(0.2));
    assert_eq!(record.get("b_pm10"), Some(20.0));
    assert_eq!(record.get("b_pm25"), Some(10.0));
}

#[test]
fn test_poll_series_lengths() {
    let mut reader = two_sensor_reader(&[0.2, 0.01, 0.3], 10.0, 20.0);

    let dataset = reader.poll_series(3).unwrap();

    assert_eq!(dataset.len(), 3);
    assert_eq!(dataset.timestamps().len(), 3);
    for (_, values) in dataset.columns() {
        assert_eq!(values.len(), 3);
    }
}

#[test]
fn test_zero_polls_give_empty_dataset() {
    let mut reader = two_sensor_reader(&[0.2], 10.0, 20.0);

    let dataset = reader.poll_series(0).unwrap();
    assert!(dataset.is_empty());
}

#[test]
fn test_station_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("station.json");
    std::fs::write(
        &path,
        r#"{
            "sensors": [
                { "kind": "scalar_voltage", "name": "sharp",
                  "sampler": { "error_threshold": 0.05, "max_inner_attempts": 4, "verbosity": 2 } },
                { "kind": "particulate", "name": "nova", "port": "/dev/ttyUSB1" }
            ]
        }"#,
    )
    .unwrap();

    let station = StationConfig::from_path(&path).unwrap();
    let mut bridge = SimulatedBridge::new()
        .with_channel("sharp", SimulatedChannel::cycling([0.01, 0.02, 0.15]))
        .with_port("nova", SimulatedPort::constant(9.0, 18.0));
    let mut reader = MultiSensorReader::from_config(&station, &mut bridge, MockClock::new()).unwrap();

    let dataset = reader.poll_series(4).unwrap();
    reader.release().unwrap();

    assert_eq!(bridge.opened().collect::<Vec<_>>(), ["sharp", "nova"]);
    assert_eq!(dataset.keys().collect::<Vec<_>>(), ["sharp_raw", "nova_pm10", "nova_pm25"]);
    assert!(approx_eq(dataset.column_mean("sharp_raw").unwrap(), 0.15));
    assert_eq!(dataset.column("nova_pm25").unwrap(), &[9.0; 4]);
    assert!(dataset.timestamps().windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_unknown_kind_is_a_config_error() {
    let err = StationConfig::from_json_str(
        r#"{ "sensors": [ { "kind": "sharp", "name": "a" }, { "kind": "pms5003", "name": "b" } ] }"#,
    )
    .unwrap_err();

    assert!(matches!(err, ConfigError::UnknownSensorKind { ref kind } if kind == "pms5003"));
}

#[test]
fn test_invalid_sampler_in_station_is_rejected() {
    let err = StationConfig::from_json_str(
        r#"{ "sensors": [ { "kind": "sharp", "name": "a", "sampler": { "max_inner_attempts": 0 } } ] }"#,
    )
    .unwrap_err();

    assert!(matches!(err, ConfigError::InvalidValue { field: "max_inner_attempts", .. }));
}

#[test]
fn test_failing_sensor_aborts_series() {
    let mut bridge = SimulatedBridge::new()
        .with_channel("sharp", SimulatedChannel::constant(0.3).failing_after(1))
        .with_port("nova", SimulatedPort::constant(1.0, 1.0));
    let station = StationConfig::from_json_str(
        r#"{ "sensors": [ { "kind": "sharp", "name": "sharp" }, { "kind": "nova", "name": "nova" } ] }"#,
    )
    .unwrap();
    let mut reader = MultiSensorReader::from_config(&station, &mut bridge, MockClock::new()).unwrap();

    assert!(matches!(reader.poll_series(3), Err(SensorError::Hardware(_))));
}
