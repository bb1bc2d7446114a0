//! Polling a whole station
//!
//! [`MultiSensorReader`] walks its sensors in declaration order, collects
//! their named values into one [`SensorOutputRecord`], and repeats that to
//! build a [`TimeSeriesDataset`].
//!
//! Declaration order is part of the output contract: it decides the key order
//! of every record and the column order of every dataset.
//!
//! ```rust
//! use dustsense_core::{MultiSensorReader, ParticulateSensor, ScalarVoltageSensor, SamplerConfig};
//! use dustsense_core::sim::{SimulatedChannel, SimulatedPort};
//! use dustsense_core::time::MockClock;
//!
//! let sharp = ScalarVoltageSensor::new(
//!     "sharp",
//!     &SamplerConfig::default(),
//!     SimulatedChannel::cycling([0.01, 0.12]),
//!     MockClock::new(),
//! )?;
//! let nova = ParticulateSensor::new("nova", SimulatedPort::constant(8.0, 14.0));
//!
//! let mut reader = MultiSensorReader::new(vec![sharp.into(), nova.into()], MockClock::new());
//! let dataset = reader.poll_series(3)?;
//!
//! assert_eq!(dataset.len(), 3);
//! assert_eq!(dataset.keys().collect::<Vec<_>>(), ["sharp_raw", "nova_pm10", "nova_pm25"]);
//! # Ok::<(), dustsense_core::SensorError>(())
//! ```

use std::collections::HashSet;

use log::{debug, warn};

use crate::config::{SamplerConfig, SensorSpec, StationConfig};
use crate::errors::{HardwareError, SensorResult};
use crate::record::{SensorOutputRecord, TimeSeriesDataset};
use crate::sensors::{ParticulateSensor, ScalarVoltageSensor, Sensor, SensorAdapter};
use crate::time::{Clock, SystemClock};
use crate::traits::{AnalogChannel, ParticulatePort};

/// Opens the hardware behind each configured sensor
///
/// Replaces a process-wide board handle: every adapter receives its own,
/// exclusively owned channel or port when the reader is built.
pub trait HardwareBridge {
    /// Open the analog channel for a scalar voltage sensor
    fn open_analog(
        &mut self,
        name: &str,
        sampler: &SamplerConfig,
    ) -> Result<Box<dyn AnalogChannel>, HardwareError>;

    /// Open the serial port for a particulate sensor
    fn open_particulate(
        &mut self,
        name: &str,
        port: Option<&str>,
    ) -> Result<Box<dyn ParticulatePort>, HardwareError>;
}

/// Uniform polling over a heterogeneous sensor list
pub struct MultiSensorReader<K = SystemClock> {
    sensors: Vec<SensorAdapter>,
    clock: K,
}

impl<K: Clock> MultiSensorReader<K> {
    /// Poll `sensors` in the given order, stamping rows with `clock`
    pub fn new(sensors: Vec<SensorAdapter>, clock: K) -> Self {
        let reader = Self { sensors, clock };
        reader.warn_on_duplicate_keys();
        reader
    }

    /// Build every sensor of a station, opening its hardware through `bridge`
    ///
    /// Each scalar voltage sensor gets its own copy of `clock` for cycle
    /// timing. Sensor kinds outside the supported set never reach this point;
    /// they are rejected when the station config is parsed.
    pub fn from_config<B>(config: &StationConfig, bridge: &mut B, clock: K) -> SensorResult<Self>
    where
        B: HardwareBridge + ?Sized,
        K: Clone + 'static,
    {
        config.validate()?;

        let mut sensors = Vec::with_capacity(config.sensors.len());
        for spec in &config.sensors {
            let sensor: SensorAdapter = match spec {
                SensorSpec::ScalarVoltage { name, sampler, cycles_per_poll } => {
                    let channel = bridge.open_analog(name, sampler)?;
                    ScalarVoltageSensor::from_boxed(name.as_str(), sampler, channel, Box::new(clock.clone()))?
                        .with_cycles_per_poll(*cycles_per_poll)
                        .into()
                }
                SensorSpec::Particulate { name, port } => {
                    let port = bridge.open_particulate(name, port.as_deref())?;
                    ParticulateSensor::from_boxed(name.as_str(), port).into()
                }
            };
            debug!("configured {} sensor `{}`", sensor.kind(), sensor.name());
            sensors.push(sensor);
        }

        Ok(Self::new(sensors, clock))
    }

    fn warn_on_duplicate_keys(&self) {
        let mut seen = HashSet::new();
        for key in self.metric_keys() {
            if !seen.insert(key.clone()) {
                warn!("metric key `{}` is produced by more than one sensor; last value wins", key);
            }
        }
    }

    /// Every key a poll produces, in output order
    pub fn metric_keys(&self) -> Vec<String> {
        self.sensors.iter().flat_map(|s| s.metric_keys()).collect()
    }

    pub fn sensors(&self) -> &[SensorAdapter] {
        &self.sensors
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// Poll each sensor once, in declaration order
    ///
    /// Sensors without a valid reading contribute `NaN`. Only hardware
    /// failures abort the poll.
    pub fn poll_once(&mut self) -> SensorResult<SensorOutputRecord> {
        let mut record = SensorOutputRecord::new();
        for sensor in &mut self.sensors {
            for (key, value) in sensor.sample_once()? {
                record.insert(key, value);
            }
        }
        debug!("poll: {:?}", record);
        Ok(record)
    }

    /// Poll `count` times, stamping each row just before its poll
    pub fn poll_series(&mut self, count: usize) -> SensorResult<TimeSeriesDataset> {
        let mut dataset = TimeSeriesDataset::new();
        for _ in 0..count {
            let timestamp = self.clock.timestamp();
            let record = self.poll_once()?;
            dataset.push(timestamp, &record)?;
        }
        Ok(dataset)
    }

    /// Put every sensor back in its idle state
    ///
    /// Attempts all sensors and returns the first failure, if any.
    pub fn release(&mut self) -> SensorResult<()> {
        let mut first_error = None;
        for sensor in &mut self.sensors {
            if let Err(err) = sensor.release() {
                warn!("failed to release `{}`: {}", sensor.name(), err);
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
