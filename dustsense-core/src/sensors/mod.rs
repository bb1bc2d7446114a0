//! Sensor adapters
//!
//! A station mixes sensor shapes: analog optical sensors that yield one
//! scalar per poll, and serial particulate sensors that yield two. Both sit
//! behind the [`Sensor`] capability trait, and the set of shapes is closed in
//! [`SensorAdapter`]. A sensor kind that is not one of these variants cannot
//! be constructed at all; configuration parsing rejects it up front.
//!
//! ## Metric keys
//!
//! | Variant                 | Keys, in order                  |
//! |-------------------------|---------------------------------|
//! | `ScalarVoltageSensor`   | `<name>_raw`                    |
//! | `ParticulateSensor`     | `<name>_pm10`, `<name>_pm25`    |

mod particulate;
mod scalar;

pub use particulate::ParticulateSensor;
pub use scalar::ScalarVoltageSensor;

use crate::errors::SensorResult;

/// Capability shared by every sensor shape
pub trait Sensor {
    /// Name used as the key prefix
    fn name(&self) -> &str;

    /// Keys `sample_once` will produce, in output order
    fn metric_keys(&self) -> Vec<String>;

    /// Take one measurement and name its value(s)
    ///
    /// A measurement with no valid data is reported as `NaN`, not as an error.
    fn sample_once(&mut self) -> SensorResult<Vec<(String, f32)>>;

    /// Put the hardware in its idle state
    fn release(&mut self) -> SensorResult<()> {
        Ok(())
    }
}

/// Closed set of supported sensor shapes
pub enum SensorAdapter {
    ScalarVoltage(ScalarVoltageSensor),
    Particulate(ParticulateSensor),
}

impl SensorAdapter {
    fn as_sensor(&self) -> &dyn Sensor {
        match self {
            SensorAdapter::ScalarVoltage(sensor) => sensor,
            SensorAdapter::Particulate(sensor) => sensor,
        }
    }

    fn as_sensor_mut(&mut self) -> &mut dyn Sensor {
        match self {
            SensorAdapter::ScalarVoltage(sensor) => sensor,
            SensorAdapter::Particulate(sensor) => sensor,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SensorAdapter::ScalarVoltage(_) => "scalar_voltage",
            SensorAdapter::Particulate(_) => "particulate",
        }
    }
}

impl Sensor for SensorAdapter {
    fn name(&self) -> &str {
        self.as_sensor().name()
    }

    fn metric_keys(&self) -> Vec<String> {
        self.as_sensor().metric_keys()
    }

    fn sample_once(&mut self) -> SensorResult<Vec<(String, f32)>> {
        self.as_sensor_mut().sample_once()
    }

    fn release(&mut self) -> SensorResult<()> {
        self.as_sensor_mut().release()
    }
}

impl From<ScalarVoltageSensor> for SensorAdapter {
    fn from(sensor: ScalarVoltageSensor) -> Self {
        SensorAdapter::ScalarVoltage(sensor)
    }
}

impl From<ParticulateSensor> for SensorAdapter {
    fn from(sensor: ParticulateSensor) -> Self {
        SensorAdapter::Particulate(sensor)
    }
}

fn metric_key(name: &str, suffix: &str) -> String {
    format!("{name}{suffix}")
}
