//! Multi-Sensor Station Example
//!
//! Builds a station from a JSON description, polls an analog dust sensor and
//! a particulate sensor together, and prints the resulting dataset.
//!
//! ## What You'll Learn
//!
//! - Describing a station in JSON
//! - Opening hardware through a `HardwareBridge`
//! - Reading NaN-aware column statistics
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 02_multi_sensor_station
//! ```

use dustsense_core::sim::{SimulatedBridge, SimulatedChannel, SimulatedPort};
use dustsense_core::time::MockClock;
use dustsense_core::{MultiSensorReader, ParticulateReading, SensorResult, StationConfig};

const STATION: &str = r#"{
    "sensors": [
        {
            "kind": "sharp",
            "name": "sharp",
            "sampler": { "error_threshold": 0.05, "max_inner_attempts": 3 }
        },
        { "kind": "nova", "name": "nova", "port": "/dev/ttyUSB1" }
    ]
}"#;

fn main() -> SensorResult<()> {
    println!("DustSense Multi-Sensor Station Example");
    println!("======================================\n");

    let station = StationConfig::from_json_str(STATION)?;

    let mut bridge = SimulatedBridge::new()
        .with_channel("sharp", SimulatedChannel::cycling([0.02, 0.11, 0.01, 0.01, 0.01, 0.12]))
        .with_port(
            "nova",
            SimulatedPort::scripted([
                ParticulateReading { pm25: 8.2, pm10: 14.9 },
                ParticulateReading { pm25: 8.6, pm10: 15.3 },
                ParticulateReading { pm25: 9.1, pm10: 16.0 },
            ]),
        );

    let mut reader = MultiSensorReader::from_config(&station, &mut bridge, MockClock::new())?;
    println!("Metrics: {}\n", reader.metric_keys().join(", "));

    let dataset = reader.poll_series(6)?;
    for (timestamp, record) in dataset.rows() {
        let values: Vec<String> = record.iter().map(|(k, v)| format!("{k}={v:.3}")).collect();
        println!("{}  {}", timestamp.format("%H:%M:%S"), values.join("  "));
    }

    println!();
    for key in dataset.keys() {
        match dataset.column_mean(key) {
            Some(mean) => println!("mean {key:<10} {mean:.3}"),
            None => println!("mean {key:<10} no data"),
        }
    }

    reader.release()?;
    Ok(())
}
