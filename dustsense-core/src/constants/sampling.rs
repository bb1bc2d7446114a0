//! Sampling Defaults
//!
//! Default knobs of the acquisition cycle and the aggregation layers above it.

/// Minimum analog fraction (of full scale) that counts as a real reading.
///
/// Anything at or below this is photodiode dark noise.
pub const DEFAULT_ERROR_THRESHOLD: f32 = 0.05;

/// Read attempts per cycle before giving up on that cycle.
pub const DEFAULT_MAX_INNER_ATTEMPTS: usize = 100;

/// Cycles averaged into a single aggregation.
pub const DEFAULT_CYCLES_PER_AGGREGATION: usize = 100;

/// Aggregations recorded into one historical series.
pub const DEFAULT_AGGREGATION_RUNS: usize = 10;

/// Digital pin wired to the sensor LED (active low).
pub const DEFAULT_TRIGGER_PIN: u8 = 4;

/// Analog input pin wired to the sensor output.
pub const DEFAULT_READ_PIN: u8 = 5;

/// Multiplier from analog fraction to volts.
///
/// 1.0 keeps readings as a fraction of full scale. Use 5.0 for a 5 V board.
pub const DEFAULT_REFERENCE_VOLTAGE: f32 = 1.0;
