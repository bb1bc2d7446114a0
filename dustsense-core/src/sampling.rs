//! One acquisition cycle on an analog dust sensor
//!
//! ## The cycle
//!
//! Optical dust sensors pulse an IR LED and report scattered light on an
//! analog pin. The output is only meaningful for a short window after the LED
//! switches on, and the first reads are often still at the dark level. One
//! cycle therefore looks like this:
//!
//! ```text
//! trigger  ‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾|_____________________|‾‾‾‾‾‾‾‾‾‾
//!          stabilization       settle  read read read  post-cycle
//!                              ^ t = 0
//! ```
//!
//! 1. Trigger high (LED off), hold `stabilization`.
//! 2. Trigger low (LED on), start the cycle timer.
//! 3. Hold `settle` before the first read.
//! 4. Read up to `max_inner_attempts` times. A read above the error threshold
//!    passes and ends the burst at once; anything else is recorded as an
//!    error sample and retried after `inter_attempt`.
//! 5. Trigger high again, hold `post_cycle`.
//! 6. The cycle reading is the mean voltage of the passing samples.
//!
//! A cycle that never passes is not an error. It keeps all of its samples,
//! marked as errors, and reports no reading.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::config::{CycleTiming, SamplerConfig, Verbosity};
use crate::errors::{ConfigError, SensorResult};
use crate::time::{millis_between, Clock};
use crate::traits::{AnalogChannel, Level, Pin};

/// A single inner read attempt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Milliseconds since the trigger went low in this cycle
    pub elapsed_ms: f32,
    /// Raw reading scaled by the reference voltage
    pub voltage: f32,
    /// Raw reading was at or below the error threshold
    pub is_error: bool,
    /// Index of the enclosing cycle within its aggregation
    pub cycle_index: usize,
}

/// Samples of one cycle plus the derived reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleResult {
    samples: Vec<SampleRecord>,
    reading: Option<f32>,
}

impl CycleResult {
    fn from_samples(samples: Vec<SampleRecord>) -> Self {
        let reading = mean(samples.iter().filter(|s| !s.is_error).map(|s| s.voltage));
        Self { samples, reading }
    }

    /// Samples in inner-attempt order
    pub fn samples(&self) -> &[SampleRecord] {
        &self.samples
    }

    /// Mean voltage of the passing samples, `None` if nothing passed
    pub fn reading(&self) -> Option<f32> {
        self.reading
    }

    /// Number of samples at or below the threshold
    pub fn error_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_error).count()
    }

    /// Whether at least one sample passed
    pub fn is_valid(&self) -> bool {
        self.reading.is_some()
    }
}

/// Arithmetic mean, `None` for an empty input
pub(crate) fn mean(values: impl IntoIterator<Item = f32>) -> Option<f32> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0f64, 0usize), |(sum, count), v| (sum + v as f64, count + 1));

    if count == 0 {
        None
    } else {
        Some((sum / count as f64) as f32)
    }
}

/// Parameters of the trigger / settle / sample / deactivate cycle
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingCycle {
    trigger_pin: Pin,
    read_pin: Pin,
    error_threshold: f32,
    max_inner_attempts: usize,
    reference_voltage: f32,
    verbosity: Verbosity,
    timing: CycleTiming,
}

impl SamplingCycle {
    /// Build from a validated sampler configuration
    pub fn new(config: &SamplerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            trigger_pin: config.trigger_pin,
            read_pin: config.read_pin,
            error_threshold: config.error_threshold,
            max_inner_attempts: config.max_inner_attempts,
            reference_voltage: config.reference_voltage,
            verbosity: config.verbosity,
            timing: config.timing,
        })
    }

    pub fn trigger_pin(&self) -> Pin {
        self.trigger_pin
    }

    pub fn read_pin(&self) -> Pin {
        self.read_pin
    }

    pub fn error_threshold(&self) -> f32 {
        self.error_threshold
    }

    pub fn timing(&self) -> &CycleTiming {
        &self.timing
    }

    /// Run one full cycle
    ///
    /// Only hardware failures are returned as errors. Samples below the
    /// threshold are recorded and the cycle completes regardless.
    pub fn run<C, K>(&self, channel: &mut C, clock: &mut K, cycle_index: usize) -> SensorResult<CycleResult>
    where
        C: AnalogChannel + ?Sized,
        K: Clock + ?Sized,
    {
        channel.write_digital(self.trigger_pin, Level::High)?;
        clock.delay(self.timing.stabilization);

        channel.write_digital(self.trigger_pin, Level::Low)?;
        let start = clock.elapsed();
        clock.delay(self.timing.settle);

        let mut samples = Vec::with_capacity(self.max_inner_attempts.min(16));
        for attempt in 0..self.max_inner_attempts {
            let raw = match channel.read_analog(self.read_pin) {
                Ok(raw) => raw,
                Err(err) => {
                    // LED off before reporting; the read error takes precedence
                    let _ = channel.write_digital(self.trigger_pin, Level::High);
                    return Err(err.into());
                }
            };
            let elapsed_ms = millis_between(start, clock.elapsed());
            // NaN reads fail the comparison and count as errors
            let passed = raw > self.error_threshold;
            let is_error = !passed;

            let record = SampleRecord {
                elapsed_ms,
                voltage: raw * self.reference_voltage,
                is_error,
                cycle_index,
            };
            self.log_sample(&record, attempt);
            samples.push(record);

            if passed {
                break;
            }
            clock.delay(self.timing.inter_attempt);
        }

        channel.write_digital(self.trigger_pin, Level::High)?;
        clock.delay(self.timing.post_cycle);

        let result = CycleResult::from_samples(samples);
        debug!(
            "cycle {} on pin {}: {} samples, {} errors, reading {:?}",
            cycle_index,
            self.read_pin,
            result.samples().len(),
            result.error_count(),
            result.reading()
        );
        Ok(result)
    }

    fn log_sample(&self, record: &SampleRecord, attempt: usize) {
        if record.is_error {
            if self.verbosity.logs_failing() {
                trace!(
                    "cycle {} attempt {}: {:.4} V below threshold after {:.3} ms",
                    record.cycle_index, attempt, record.voltage, record.elapsed_ms
                );
            }
        } else if self.verbosity.logs_passing() {
            debug!(
                "cycle {} attempt {}: {:.4} V after {:.3} ms",
                record.cycle_index, attempt, record.voltage, record.elapsed_ms
            );
        }
    }
}
