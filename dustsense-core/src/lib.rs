//! Sampling and aggregation engine for DustSense
//!
//! Turns noisy readings from low-cost dust sensors into trustworthy scalars
//! and assembles them into time series across mixed sensor types.
//!
//! Layers, bottom up:
//! - [`SamplingCycle`]: one trigger / settle / sample / deactivate pulse
//! - [`CycleAggregator`]: repeated cycles, historical series, running mean
//! - [`MultiSensorReader`]: fan-out over a station's sensors, poll records and
//!   time-series datasets
//!
//! Hardware is reached only through [`AnalogChannel`] and [`ParticulatePort`],
//! and all waiting goes through a [`Clock`](time::Clock), so the whole stack
//! runs against [`sim`] hardware and a [`MockClock`](time::MockClock) in tests.
//!
//! ```no_run
//! use dustsense_core::{CycleAggregator, SamplerConfig};
//! use dustsense_core::sim::SimulatedChannel;
//! use dustsense_core::time::SystemClock;
//!
//! let config = SamplerConfig::default();
//! let channel = SimulatedChannel::cycling([0.02, 0.03, 0.11]);
//! let mut aggregator = CycleAggregator::new(&config, channel, SystemClock::new())?;
//!
//! let aggregation = aggregator.run_cycles(10)?;
//! match aggregation.mean {
//!     Some(volts) => println!("dust signal {volts:.3} V"),
//!     None => println!("no valid reading"),
//! }
//! # Ok::<(), dustsense_core::SensorError>(())
//! ```

#![deny(unsafe_code)]

pub mod aggregate;
pub mod config;
pub mod constants;
pub mod errors;
pub mod reader;
pub mod record;
pub mod sampling;
pub mod sensors;
pub mod sim;
pub mod time;
pub mod traits;

// Public API
pub use aggregate::{Aggregation, CycleAggregator, HistoricalEntry, HistoricalSeries};
pub use config::{CycleTiming, SamplerConfig, SensorSpec, StationConfig, Verbosity};
pub use errors::{ConfigError, HardwareError, SensorError, SensorResult};
pub use reader::{HardwareBridge, MultiSensorReader};
pub use record::{SensorOutputRecord, TimeSeriesDataset};
pub use sampling::{CycleResult, SampleRecord, SamplingCycle};
pub use sensors::{ParticulateSensor, ScalarVoltageSensor, Sensor, SensorAdapter};
pub use traits::{AnalogChannel, Level, ParticulatePort, ParticulateReading, Pin};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
