//! Repeated cycles and historical series
//!
//! A single cycle is still noisy. [`CycleAggregator`] owns one analog channel
//! and runs the cycle back to back, stamping each cycle's reading into a
//! historical series and averaging the result.
//!
//! ## Drop policy
//!
//! Every cycle produces an entry, including cycles that never saw a passing
//! sample. Those undefined entries are dropped once, when the series is
//! handed out, and never take part in the mean. If nothing is left the mean
//! is `None`; it is never coerced to zero.
//!
//! ## Ownership
//!
//! The aggregator holds the channel and clock exclusively. Cycles run strictly
//! one after another, so at most one write/read pair is ever in flight on the
//! channel.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::SamplerConfig;
use crate::errors::SensorResult;
use crate::sampling::{mean, CycleResult, SamplingCycle};
use crate::time::{Clock, Timestamp};
use crate::traits::{AnalogChannel, Level};

/// One stamped reading in a historical series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalEntry {
    pub timestamp: Timestamp,
    pub reading: f32,
}

/// Defined readings in chronological order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSeries {
    entries: Vec<HistoricalEntry>,
    dropped: usize,
}

impl HistoricalSeries {
    /// Apply the drop policy to raw per-cycle records
    pub fn from_records(records: Vec<(Timestamp, Option<f32>)>) -> Self {
        let total = records.len();
        let entries: Vec<HistoricalEntry> = records
            .into_iter()
            .filter_map(|(timestamp, reading)| reading.map(|reading| HistoricalEntry { timestamp, reading }))
            .collect();
        let dropped = total - entries.len();
        Self { entries, dropped }
    }

    pub fn entries(&self) -> &[HistoricalEntry] {
        &self.entries
    }

    pub fn readings(&self) -> impl Iterator<Item = f32> + '_ {
        self.entries.iter().map(|e| e.reading)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries removed because their cycle had no passing sample
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Mean of the retained readings, `None` if none were retained
    pub fn mean(&self) -> Option<f32> {
        mean(self.readings())
    }
}

/// Result of one aggregation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub series: HistoricalSeries,
    pub mean: Option<f32>,
}

impl Aggregation {
    fn from_series(series: HistoricalSeries) -> Self {
        let mean = series.mean();
        Self { series, mean }
    }
}

/// Runs [`SamplingCycle`] repeatedly on an exclusively owned channel
pub struct CycleAggregator<C, K> {
    cycle: SamplingCycle,
    channel: C,
    clock: K,
    cycles_per_aggregation: usize,
    aggregation_runs: usize,
    last_cycle: Option<CycleResult>,
    latest_reading: Option<f32>,
    history: HistoricalSeries,
}

impl<C, K> CycleAggregator<C, K>
where
    C: AnalogChannel,
    K: Clock,
{
    /// Validate the configuration and park the trigger pin high (LED off)
    pub fn new(config: &SamplerConfig, mut channel: C, clock: K) -> SensorResult<Self> {
        let cycle = SamplingCycle::new(config)?;
        channel.write_digital(cycle.trigger_pin(), Level::High)?;

        Ok(Self {
            cycle,
            channel,
            clock,
            cycles_per_aggregation: config.cycles_per_aggregation,
            aggregation_runs: config.aggregation_runs,
            last_cycle: None,
            latest_reading: None,
            history: HistoricalSeries::default(),
        })
    }

    /// Run exactly `n` cycles and aggregate their readings
    ///
    /// Cycles with no passing sample are recorded, then dropped before the
    /// series is returned. Updates [`latest_reading`](Self::latest_reading)
    /// and [`history`](Self::history), replacing previous values.
    pub fn run_cycles(&mut self, n: usize) -> SensorResult<Aggregation> {
        let mut records = Vec::with_capacity(n);

        for index in 0..n {
            let result = self.cycle.run(&mut self.channel, &mut self.clock, index)?;
            records.push((self.clock.timestamp(), result.reading()));
            self.last_cycle = Some(result);
        }

        let aggregation = Aggregation::from_series(HistoricalSeries::from_records(records));
        self.record(&aggregation);

        if aggregation.mean.is_none() && n > 0 {
            warn!(
                "no valid sample in {} cycles on pin {} (threshold {})",
                n,
                self.cycle.read_pin(),
                self.cycle.error_threshold()
            );
        } else {
            debug!(
                "aggregated {} cycles on pin {}: {} valid, mean {:?}",
                n,
                self.cycle.read_pin(),
                aggregation.series.len(),
                aggregation.mean
            );
        }

        Ok(aggregation)
    }

    /// Run the configured number of cycles per aggregation
    pub fn run_aggregation(&mut self) -> SensorResult<Aggregation> {
        self.run_cycles(self.cycles_per_aggregation)
    }

    /// Build a historical series of `runs` aggregations
    ///
    /// Each entry is the mean of one [`run_aggregation`](Self::run_aggregation),
    /// stamped when that aggregation finished. Aggregations without any valid
    /// cycle are dropped the same way undefined cycles are.
    pub fn run_history(&mut self, runs: usize) -> SensorResult<Aggregation> {
        let mut records = Vec::with_capacity(runs);

        for _ in 0..runs {
            let aggregation = self.run_aggregation()?;
            records.push((self.clock.timestamp(), aggregation.mean));
        }

        let aggregation = Aggregation::from_series(HistoricalSeries::from_records(records));
        self.record(&aggregation);
        Ok(aggregation)
    }

    /// Run the configured number of aggregation runs
    pub fn run_default_history(&mut self) -> SensorResult<Aggregation> {
        self.run_history(self.aggregation_runs)
    }

    fn record(&mut self, aggregation: &Aggregation) {
        self.latest_reading = aggregation.mean;
        self.history = aggregation.series.clone();
    }

    /// Mean of the most recent call, `None` before the first call or if it
    /// produced no valid reading
    pub fn latest_reading(&self) -> Option<f32> {
        self.latest_reading
    }

    /// Series exposed by the most recent call
    pub fn history(&self) -> &HistoricalSeries {
        &self.history
    }

    pub fn historical_mean(&self) -> Option<f32> {
        self.history.mean()
    }

    /// Raw samples of the last cycle run, kept for diagnostics
    pub fn last_cycle(&self) -> Option<&CycleResult> {
        self.last_cycle.as_ref()
    }

    pub fn cycles_per_aggregation(&self) -> usize {
        self.cycles_per_aggregation
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// Leave the LED off
    pub fn release(&mut self) -> SensorResult<()> {
        self.channel.write_digital(self.cycle.trigger_pin(), Level::High)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CycleTiming;
    use crate::sim::SimulatedChannel;
    use crate::time::MockClock;
    use chrono::TimeZone;

    fn config(attempts: usize) -> SamplerConfig {
        SamplerConfig::default().with_max_inner_attempts(attempts)
    }

    #[test]
    fn mean_skips_undefined_cycles() {
        // cycle 0 passes at 0.3, cycle 1 exhausts 2 attempts, cycle 2 passes at 0.5
        let channel = SimulatedChannel::scripted([0.3, 0.0, 0.0, 0.5]);
        let mut aggregator = CycleAggregator::new(&config(2), channel, MockClock::new()).unwrap();

        let aggregation = aggregator.run_cycles(3).unwrap();

        let readings: Vec<f32> = aggregation.series.readings().collect();
        assert_eq!(readings, vec![0.3, 0.5]);
        assert_eq!(aggregation.series.dropped(), 1);
        assert!((aggregation.mean.unwrap() - 0.4).abs() < 1e-6);
        assert_eq!(aggregator.latest_reading(), aggregation.mean);
    }

    #[test]
    fn all_invalid_mean_is_none() {
        let channel = SimulatedChannel::constant(0.01);
        let mut aggregator = CycleAggregator::new(&config(3), channel, MockClock::new()).unwrap();

        let aggregation = aggregator.run_cycles(4).unwrap();

        assert!(aggregation.series.is_empty());
        assert_eq!(aggregation.series.dropped(), 4);
        assert_eq!(aggregation.mean, None);
        assert_eq!(aggregator.latest_reading(), None);
        assert_eq!(aggregator.last_cycle().unwrap().samples().len(), 3);
    }

    #[test]
    fn state_is_overwritten_not_merged() {
        let channel = SimulatedChannel::scripted([0.2, 0.2, 0.6]);
        let mut aggregator = CycleAggregator::new(&config(5), channel, MockClock::new()).unwrap();

        aggregator.run_cycles(2).unwrap();
        assert_eq!(aggregator.history().len(), 2);

        aggregator.run_cycles(1).unwrap();
        assert_eq!(aggregator.history().len(), 1);
        assert_eq!(aggregator.latest_reading(), Some(0.6));
    }

    #[test]
    fn entries_are_stamped_in_order() {
        let start = chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let channel = SimulatedChannel::constant(0.4);
        let mut aggregator =
            CycleAggregator::new(&config(5), channel, MockClock::starting_at(start)).unwrap();

        let aggregation = aggregator.run_cycles(3).unwrap();
        let stamps: Vec<_> = aggregation.series.entries().iter().map(|e| e.timestamp).collect();

        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
        // each cycle holds at least stabilization + settle + post-cycle
        let minimum = chrono::Duration::from_std(CycleTiming::default().minimum_cycle()).unwrap();
        assert!(stamps[0] - start >= minimum);
    }

    #[test]
    fn history_aggregates_runs() {
        let config = SamplerConfig {
            cycles_per_aggregation: 2,
            aggregation_runs: 3,
            ..config(1)
        };
        // run 0: 0.2, 0.4 -> 0.3 | run 1: nothing | run 2: 0.5, 0.5 -> 0.5
        let channel = SimulatedChannel::scripted([0.2, 0.4, 0.0, 0.0, 0.5]);
        let mut aggregator = CycleAggregator::new(&config, channel, MockClock::new()).unwrap();

        let history = aggregator.run_default_history().unwrap();

        assert_eq!(history.series.len(), 2);
        assert_eq!(history.series.dropped(), 1);
        assert!((history.mean.unwrap() - 0.4).abs() < 1e-6);
        assert_eq!(aggregator.history().len(), 2);
    }

    #[test]
    fn zero_cycles_yield_no_data() {
        let channel = SimulatedChannel::constant(0.5);
        let mut aggregator = CycleAggregator::new(&config(1), channel, MockClock::new()).unwrap();

        let aggregation = aggregator.run_cycles(0).unwrap();
        assert!(aggregation.series.is_empty());
        assert_eq!(aggregation.mean, None);
    }

    #[test]
    fn construction_parks_trigger_high() {
        let channel = SimulatedChannel::constant(0.5);
        let aggregator = CycleAggregator::new(&config(1), channel, MockClock::new()).unwrap();

        assert_eq!(aggregator.channel().writes(), vec![(4, Level::High)]);
    }

    #[test]
    fn invalid_config_touches_no_pin() {
        let channel = SimulatedChannel::constant(0.5);
        let probe = channel.probe();
        let result = CycleAggregator::new(&config(0), channel, MockClock::new());

        assert!(result.is_err());
        assert!(probe.writes().is_empty());
    }
}
