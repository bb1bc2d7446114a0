//! Analog optical dust sensor (Sharp GP2Y1010 style)

use log::debug;

use super::{metric_key, Sensor};
use crate::aggregate::CycleAggregator;
use crate::config::SamplerConfig;
use crate::constants::metrics::RAW_SUFFIX;
use crate::errors::SensorResult;
use crate::time::Clock;
use crate::traits::AnalogChannel;

/// One analog channel reduced to a single scalar per poll
pub struct ScalarVoltageSensor {
    name: String,
    aggregator: CycleAggregator<Box<dyn AnalogChannel>, Box<dyn Clock>>,
    cycles_per_poll: usize,
}

impl ScalarVoltageSensor {
    /// Take ownership of the channel and park the LED off
    ///
    /// Polls run a single cycle; see [`with_cycles_per_poll`](Self::with_cycles_per_poll).
    pub fn new<C, K>(name: impl Into<String>, config: &SamplerConfig, channel: C, clock: K) -> SensorResult<Self>
    where
        C: AnalogChannel + 'static,
        K: Clock + 'static,
    {
        Self::from_boxed(name, config, Box::new(channel), Box::new(clock))
    }

    pub(crate) fn from_boxed(
        name: impl Into<String>,
        config: &SamplerConfig,
        channel: Box<dyn AnalogChannel>,
        clock: Box<dyn Clock>,
    ) -> SensorResult<Self> {
        Ok(Self {
            name: name.into(),
            aggregator: CycleAggregator::new(config, channel, clock)?,
            cycles_per_poll: 1,
        })
    }

    /// Average `cycles` cycles into each poll value (minimum 1)
    pub fn with_cycles_per_poll(mut self, cycles: usize) -> Self {
        self.cycles_per_poll = cycles.max(1);
        self
    }

    pub fn cycles_per_poll(&self) -> usize {
        self.cycles_per_poll
    }

    /// Aggregation state of the most recent poll
    pub fn aggregator(&self) -> &CycleAggregator<Box<dyn AnalogChannel>, Box<dyn Clock>> {
        &self.aggregator
    }
}

impl Sensor for ScalarVoltageSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn metric_keys(&self) -> Vec<String> {
        vec![metric_key(&self.name, RAW_SUFFIX)]
    }

    fn sample_once(&mut self) -> SensorResult<Vec<(String, f32)>> {
        let aggregation = self.aggregator.run_cycles(self.cycles_per_poll)?;
        let value = aggregation.mean.unwrap_or(f32::NAN);
        debug!("{}: {} V", self.name, value);
        Ok(vec![(metric_key(&self.name, RAW_SUFFIX), value)])
    }

    fn release(&mut self) -> SensorResult<()> {
        self.aggregator.release()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedChannel;
    use crate::time::MockClock;
    use crate::traits::Level;

    #[test]
    fn contributes_one_raw_key() {
        let mut sensor =
            ScalarVoltageSensor::new("sharp", &SamplerConfig::default(), SimulatedChannel::constant(0.3), MockClock::new())
                .unwrap();

        assert_eq!(sensor.metric_keys(), vec!["sharp_raw".to_string()]);
        assert_eq!(sensor.sample_once().unwrap(), vec![("sharp_raw".to_string(), 0.3)]);
    }

    #[test]
    fn invalid_poll_is_nan() {
        let config = SamplerConfig::default().with_max_inner_attempts(4);
        let mut sensor =
            ScalarVoltageSensor::new("sharp", &config, SimulatedChannel::constant(0.0), MockClock::new()).unwrap();

        let values = sensor.sample_once().unwrap();
        assert!(values[0].1.is_nan());
        assert_eq!(sensor.aggregator().last_cycle().unwrap().error_count(), 4);
    }

    #[test]
    fn runs_configured_cycles_per_poll() {
        let channel = SimulatedChannel::scripted([0.2, 0.4]);
        let probe = channel.probe();
        let mut sensor = ScalarVoltageSensor::new("s", &SamplerConfig::default(), channel, MockClock::new())
            .unwrap()
            .with_cycles_per_poll(2);

        let values = sensor.sample_once().unwrap();
        assert!((values[0].1 - 0.3).abs() < 1e-6);
        assert_eq!(probe.reads(), 2);
    }

    #[test]
    fn release_leaves_led_off() {
        let channel = SimulatedChannel::constant(0.3);
        let probe = channel.probe();
        let mut sensor =
            ScalarVoltageSensor::new("s", &SamplerConfig::default(), channel, MockClock::new()).unwrap();

        sensor.sample_once().unwrap();
        sensor.release().unwrap();
        assert_eq!(probe.level(4), Some(Level::High));
    }
}
