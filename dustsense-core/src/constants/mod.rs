//! Constants for DustSense Core
//!
//! Every numeric default used by the engine lives here, with a note on where it
//! comes from. Configuration structs start from these values.
//!
//! ## Organization
//!
//! - **Timing**: the physical delays of the optical dust sensor drive cycle
//! - **Sampling**: thresholds, attempt budgets and repetition counts
//! - **Metrics**: metric key suffixes used in poll records

/// Delays of the LED trigger / settle / sample cycle.
pub mod timing;

/// Thresholds and attempt budgets for the acquisition cycle.
pub mod sampling;

/// Metric key suffixes and the dataset timestamp column.
pub mod metrics;

pub use timing::{
    STABILIZATION_DELAY, SETTLE_DELAY, INTER_ATTEMPT_DELAY, POST_CYCLE_DELAY,
};

pub use sampling::{
    DEFAULT_ERROR_THRESHOLD, DEFAULT_MAX_INNER_ATTEMPTS, DEFAULT_CYCLES_PER_AGGREGATION,
    DEFAULT_AGGREGATION_RUNS, DEFAULT_TRIGGER_PIN, DEFAULT_READ_PIN,
};

pub use metrics::{RAW_SUFFIX, PM10_SUFFIX, PM25_SUFFIX, TIMESTAMP_KEY};
