//! Property tests for the sampling engine

mod common;

use proptest::prelude::*;

use dustsense_core::sim::{SimulatedChannel, SimulatedPort};
use dustsense_core::time::MockClock;
use dustsense_core::{CycleAggregator, MultiSensorReader, ParticulateSensor, SamplerConfig, SensorAdapter};

use common::cycle;

proptest! {
    /// A channel that first passes on attempt `k` yields exactly `k` samples
    #[test]
    fn cycle_stops_at_first_pass(
        threshold in 0.0f32..0.9,
        k in 1usize..50,
        budget_extra in 0usize..20,
        pass_margin in 0.001f32..0.1,
    ) {
        let below = threshold * 0.5;
        let pass = (threshold + pass_margin).min(1.0);
        let mut script = vec![below; k - 1];
        script.push(pass);

        let mut channel = SimulatedChannel::scripted(script);
        let mut clock = MockClock::new();
        let result = cycle(threshold, k + budget_extra).run(&mut channel, &mut clock, 0).unwrap();

        prop_assert_eq!(result.samples().len(), k);
        prop_assert!(result.samples()[..k - 1].iter().all(|s| s.is_error));
        prop_assert!(!result.samples()[k - 1].is_error);
        prop_assert_eq!(result.reading(), Some(pass));
    }

    /// Nothing above the threshold: the whole budget is spent and recorded
    #[test]
    fn exhausted_cycle_keeps_every_sample(
        threshold in 0.01f32..0.9,
        budget in 1usize..64,
        fraction in 0.0f32..=1.0,
    ) {
        let mut channel = SimulatedChannel::constant(threshold * fraction);
        let mut clock = MockClock::new();
        let result = cycle(threshold, budget).run(&mut channel, &mut clock, 0).unwrap();

        prop_assert_eq!(result.samples().len(), budget);
        prop_assert!(result.samples().iter().all(|s| s.is_error));
        prop_assert_eq!(result.reading(), None);
    }

    /// The aggregate mean always lies within the retained readings
    #[test]
    fn aggregate_mean_is_bounded(readings in prop::collection::vec(0.0f32..1.0, 1..30)) {
        let config = SamplerConfig::default().with_max_inner_attempts(1);
        let channel = SimulatedChannel::scripted(readings.clone());
        let mut aggregator = CycleAggregator::new(&config, channel, MockClock::new()).unwrap();

        let aggregation = aggregator.run_cycles(readings.len()).unwrap();
        let kept: Vec<f32> = aggregation.series.readings().collect();

        prop_assert!(kept.iter().all(|r| *r > 0.05));
        match aggregation.mean {
            Some(mean) => {
                let lo = kept.iter().copied().fold(f32::INFINITY, f32::min);
                let hi = kept.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                prop_assert!(mean >= lo - 1e-5 && mean <= hi + 1e-5);
            }
            None => prop_assert!(kept.is_empty()),
        }
    }

    /// Every column of a series has one entry per poll
    #[test]
    fn series_columns_stay_aligned(polls in 0usize..12, sensors in 1usize..5) {
        let adapters: Vec<SensorAdapter> = (0..sensors)
            .map(|i| SensorAdapter::from(ParticulateSensor::new(format!("p{i}"), SimulatedPort::constant(1.0, 2.0))))
            .collect();
        let mut reader = MultiSensorReader::new(adapters, MockClock::new());

        let dataset = reader.poll_series(polls).unwrap();

        prop_assert_eq!(dataset.timestamps().len(), polls);
        for (_, values) in dataset.columns() {
            prop_assert_eq!(values.len(), polls);
        }
    }
}
