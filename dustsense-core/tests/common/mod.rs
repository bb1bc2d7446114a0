//! Shared fixtures for integration tests
//!
//! Scripted hardware and preconfigured engines so each test only states the
//! readings it cares about.

#![allow(dead_code)]

use dustsense_core::sim::{ChannelProbe, SimulatedChannel, SimulatedPort};
use dustsense_core::time::MockClock;
use dustsense_core::{
    CycleAggregator, MultiSensorReader, ParticulateSensor, SamplerConfig, SamplingCycle,
    ScalarVoltageSensor,
};

/// Default configuration with a custom threshold and attempt budget
pub fn sampler(threshold: f32, max_inner_attempts: usize) -> SamplerConfig {
    SamplerConfig::default()
        .with_error_threshold(threshold)
        .with_max_inner_attempts(max_inner_attempts)
}

pub fn cycle(threshold: f32, max_inner_attempts: usize) -> SamplingCycle {
    SamplingCycle::new(&sampler(threshold, max_inner_attempts)).expect("valid sampler config")
}

/// Aggregator over a scripted channel, plus a probe into that channel
pub fn scripted_aggregator(
    config: &SamplerConfig,
    readings: &[f32],
) -> (CycleAggregator<SimulatedChannel, MockClock>, ChannelProbe) {
    let channel = SimulatedChannel::scripted(readings.iter().copied());
    let probe = channel.probe();
    let aggregator = CycleAggregator::new(config, channel, MockClock::new()).expect("valid aggregator");
    (aggregator, probe)
}

/// Two-sensor station: an analog sensor `a` and a particulate sensor `b`
pub fn two_sensor_reader(readings: &[f32], pm25: f32, pm10: f32) -> MultiSensorReader<MockClock> {
    let a = ScalarVoltageSensor::new(
        "a",
        &SamplerConfig::default(),
        SimulatedChannel::cycling(readings.iter().copied()),
        MockClock::new(),
    )
    .expect("valid sensor");
    let b = ParticulateSensor::new("b", SimulatedPort::constant(pm25, pm10));

    MultiSensorReader::new(vec![a.into(), b.into()], MockClock::new())
}

/// Approximate float equality for readings that went through an f64 mean
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}
