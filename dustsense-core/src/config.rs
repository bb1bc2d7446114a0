//! Sampler and station configuration
//!
//! Configuration is plain data: pins, thresholds, attempt budgets, timings and
//! the list of sensors on a station. Everything deserializes from JSON with
//! per-field defaults, and everything is validated before any pin is touched.
//!
//! ```rust
//! use dustsense_core::config::{StationConfig, SensorSpec};
//!
//! let station = StationConfig::from_json_str(r#"{
//!     "sensors": [
//!         { "kind": "sharp", "name": "sharp", "sampler": { "error_threshold": 0.08 } },
//!         { "kind": "nova", "name": "nova", "port": "/dev/ttyUSB1" }
//!     ]
//! }"#)?;
//!
//! assert_eq!(station.sensors.len(), 2);
//! assert!(matches!(station.sensors[1], SensorSpec::Particulate { .. }));
//! # Ok::<(), dustsense_core::ConfigError>(())
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::sampling::{
    DEFAULT_AGGREGATION_RUNS, DEFAULT_CYCLES_PER_AGGREGATION, DEFAULT_ERROR_THRESHOLD,
    DEFAULT_MAX_INNER_ATTEMPTS, DEFAULT_READ_PIN, DEFAULT_REFERENCE_VOLTAGE, DEFAULT_TRIGGER_PIN,
};
use crate::constants::timing::{
    INTER_ATTEMPT_DELAY, POST_CYCLE_DELAY, SETTLE_DELAY, STABILIZATION_DELAY,
};
use crate::errors::ConfigError;
use crate::traits::Pin;

/// Sensor kinds a station file may name, including aliases
pub const KNOWN_SENSOR_KINDS: &[&str] = &["scalar_voltage", "sharp", "particulate", "nova"];

/// How much per-sample logging the cycle emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Verbosity {
    /// No per-sample logging
    #[default]
    Silent,
    /// Log passing samples only
    Pass,
    /// Log every sample
    All,
}

impl Verbosity {
    pub fn logs_passing(self) -> bool {
        self >= Verbosity::Pass
    }

    pub fn logs_failing(self) -> bool {
        self >= Verbosity::All
    }
}

impl TryFrom<u8> for Verbosity {
    type Error = ConfigError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Verbosity::Silent),
            1 => Ok(Verbosity::Pass),
            2 => Ok(Verbosity::All),
            _ => Err(ConfigError::invalid("verbosity", "must be 0, 1 or 2")),
        }
    }
}

impl From<Verbosity> for u8 {
    fn from(level: Verbosity) -> u8 {
        match level {
            Verbosity::Silent => 0,
            Verbosity::Pass => 1,
            Verbosity::All => 2,
        }
    }
}

/// Delays of one drive cycle, serialized as whole microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleTiming {
    /// Trigger held high before the cycle
    #[serde(with = "micros", rename = "stabilization_us")]
    pub stabilization: Duration,
    /// Trigger low to first read
    #[serde(with = "micros", rename = "settle_us")]
    pub settle: Duration,
    /// Between failed inner attempts
    #[serde(with = "micros", rename = "inter_attempt_us")]
    pub inter_attempt: Duration,
    /// Trigger held high after the cycle
    #[serde(with = "micros", rename = "post_cycle_us")]
    pub post_cycle: Duration,
}

impl Default for CycleTiming {
    fn default() -> Self {
        Self {
            stabilization: STABILIZATION_DELAY,
            settle: SETTLE_DELAY,
            inter_attempt: INTER_ATTEMPT_DELAY,
            post_cycle: POST_CYCLE_DELAY,
        }
    }
}

impl CycleTiming {
    /// Minimum wall time of one cycle that passes on its first attempt
    pub fn minimum_cycle(&self) -> Duration {
        self.stabilization + self.settle + self.post_cycle
    }
}

/// Settings of one analog dust sensor channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Digital pin driving the sensor LED (low = on)
    pub trigger_pin: Pin,
    /// Analog pin reading the sensor output (numbered apart from digital pins)
    pub read_pin: Pin,
    /// Raw fraction a reading must exceed to count as valid
    pub error_threshold: f32,
    /// Read attempts per cycle
    pub max_inner_attempts: usize,
    /// Cycles per aggregation
    pub cycles_per_aggregation: usize,
    /// Aggregations per historical series
    pub aggregation_runs: usize,
    /// Volts per unit of analog fraction
    pub reference_voltage: f32,
    /// Per-sample logging
    pub verbosity: Verbosity,
    /// Drive-cycle delays
    pub timing: CycleTiming,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            trigger_pin: DEFAULT_TRIGGER_PIN,
            read_pin: DEFAULT_READ_PIN,
            error_threshold: DEFAULT_ERROR_THRESHOLD,
            max_inner_attempts: DEFAULT_MAX_INNER_ATTEMPTS,
            cycles_per_aggregation: DEFAULT_CYCLES_PER_AGGREGATION,
            aggregation_runs: DEFAULT_AGGREGATION_RUNS,
            reference_voltage: DEFAULT_REFERENCE_VOLTAGE,
            verbosity: Verbosity::Silent,
            timing: CycleTiming::default(),
        }
    }
}

impl SamplerConfig {
    /// Defaults for a 5 V Arduino Uno style bridge
    pub fn five_volt() -> Self {
        Self {
            reference_voltage: 5.0,
            ..Self::default()
        }
    }

    pub fn with_pins(mut self, trigger_pin: Pin, read_pin: Pin) -> Self {
        self.trigger_pin = trigger_pin;
        self.read_pin = read_pin;
        self
    }

    pub fn with_error_threshold(mut self, threshold: f32) -> Self {
        self.error_threshold = threshold;
        self
    }

    pub fn with_max_inner_attempts(mut self, attempts: usize) -> Self {
        self.max_inner_attempts = attempts;
        self
    }

    pub fn with_timing(mut self, timing: CycleTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Check every field; nothing touches hardware until this passes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.error_threshold.is_finite() || !(0.0..1.0).contains(&self.error_threshold) {
            return Err(ConfigError::invalid("error_threshold", "must be in [0, 1)"));
        }
        if self.max_inner_attempts == 0 {
            return Err(ConfigError::invalid("max_inner_attempts", "must be at least 1"));
        }
        if self.cycles_per_aggregation == 0 {
            return Err(ConfigError::invalid("cycles_per_aggregation", "must be at least 1"));
        }
        if self.aggregation_runs == 0 {
            return Err(ConfigError::invalid("aggregation_runs", "must be at least 1"));
        }
        if !self.reference_voltage.is_finite() || self.reference_voltage <= 0.0 {
            return Err(ConfigError::invalid("reference_voltage", "must be a positive number"));
        }
        Ok(())
    }
}

/// One entry of a station's sensor list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SensorSpec {
    /// Analog optical dust sensor sampled through the I/O bridge
    #[serde(alias = "sharp")]
    ScalarVoltage {
        name: String,
        #[serde(default)]
        sampler: SamplerConfig,
        /// Cycles aggregated per poll
        #[serde(default = "one_cycle")]
        cycles_per_poll: usize,
    },
    /// Serial particulate sensor answering PM2.5/PM10 queries
    #[serde(alias = "nova")]
    Particulate {
        name: String,
        /// Serial device path, if the bridge needs one
        #[serde(default)]
        port: Option<String>,
    },
}

fn one_cycle() -> usize {
    1
}

impl SensorSpec {
    pub fn name(&self) -> &str {
        match self {
            SensorSpec::ScalarVoltage { name, .. } | SensorSpec::Particulate { name, .. } => name,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name().trim().is_empty() {
            return Err(ConfigError::invalid("name", "sensor name must not be empty"));
        }
        if let SensorSpec::ScalarVoltage { sampler, cycles_per_poll, .. } = self {
            sampler.validate()?;
            if *cycles_per_poll == 0 {
                return Err(ConfigError::invalid("cycles_per_poll", "must be at least 1"));
            }
        }
        Ok(())
    }
}

/// The sensors attached to one station, in polling order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationConfig {
    pub sensors: Vec<SensorSpec>,
}

impl StationConfig {
    /// Parse and validate a JSON station description
    ///
    /// Unknown `kind` tags are reported as [`ConfigError::UnknownSensorKind`]
    /// before deserialization, so a typo never turns into a silently missing
    /// sensor.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: serde_json::Value = serde_json::from_str(json)?;
        if let Some(sensors) = raw.get("sensors").and_then(|s| s.as_array()) {
            for sensor in sensors {
                let kind = sensor.get("kind").and_then(|k| k.as_str()).unwrap_or_default();
                if !KNOWN_SENSOR_KINDS.contains(&kind) {
                    return Err(ConfigError::UnknownSensorKind {
                        kind: kind.to_string(),
                    });
                }
            }
        }

        let config: StationConfig = serde_json::from_value(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON station file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sensors.iter().try_for_each(SensorSpec::validate)
    }
}

/// Serde adapter: `Duration` as whole microseconds
mod micros {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let us = u64::try_from(value.as_micros()).unwrap_or(u64::MAX);
        serializer.serialize_u64(us)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_micros)
    }
}
