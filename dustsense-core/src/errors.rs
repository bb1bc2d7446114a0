//! Error Types for the Sampling Engine
//!
//! ## Design Philosophy
//!
//! Dust sensors are noisy. Most "failures" seen while sampling are nothing more
//! than an LED pulse that had not settled yet, so the engine splits failures
//! into two very different families:
//!
//! 1. **Noise**: a sample at or below the error threshold, a cycle with no
//!    passing sample, an aggregation where every cycle came back empty. None of
//!    these are errors. They are recorded (`is_error = true`), filtered, and
//!    surface as `None` / `NaN` so a dataset keeps its shape.
//!
//! 2. **Structural failures**: the serial link dropped, a configuration names a
//!    sensor kind we do not support, a series changed shape mid-run. These are
//!    returned as [`SensorError`] and abort the current operation.
//!
//! ## Error Categories
//!
//! ### Hardware
//! - `Hardware`: raised by an [`AnalogChannel`](crate::traits::AnalogChannel) or
//!   [`ParticulatePort`](crate::traits::ParticulatePort) implementation and
//!   passed through untouched.
//!
//! ### Configuration
//! - `Config`: invalid values, unknown sensor kinds, unreadable config files.
//!
//! ### Dataset
//! - `DatasetShape`: a poll inside a series disagreed with the keys of the
//!   first poll.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use dustsense_core::{SensorError, ConfigError};
//!
//! fn describe(err: &SensorError) -> &'static str {
//!     match err {
//!         SensorError::Hardware(_) => "check the USB cable and board firmware",
//!         SensorError::Config(ConfigError::UnknownSensorKind { .. }) => "fix the station file",
//!         SensorError::Config(_) => "fix the sampler settings",
//!         SensorError::DatasetShape { .. } => "do not change sensors during a series",
//!     }
//! }
//! ```

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Result type for sampling operations
pub type SensorResult<T> = Result<T, SensorError>;

/// Top-level error for the sampling engine
#[derive(Error, Debug)]
pub enum SensorError {
    /// I/O failure reported by the hardware bridge or serial driver
    #[error(transparent)]
    Hardware(#[from] HardwareError),

    /// Rejected configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A poll produced a different key set than the first poll of the series
    #[error("dataset shape changed at poll {poll}: key `{key}` {reason}")]
    DatasetShape {
        /// Offending metric key
        key: String,
        /// Zero-based poll index inside the series
        poll: usize,
        /// Whether the key appeared or went missing
        reason: &'static str,
    },
}

/// Opaque hardware failure from an external collaborator
///
/// The engine never inspects these; it only carries them up to the caller.
/// Use [`source`](std::error::Error::source) to reach the driver's own error.
#[derive(Debug)]
pub struct HardwareError {
    inner: Box<dyn StdError + Send + Sync + 'static>,
}

impl HardwareError {
    /// Wrap a driver error
    pub fn new<E>(err: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        Self { inner: err.into() }
    }

    /// Build from a plain message (handy for simulated hardware)
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(message.into())
    }
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hardware I/O failure: {}", self.inner)
    }
}

impl StdError for HardwareError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl From<std::io::Error> for HardwareError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err)
    }
}

impl From<std::io::Error> for SensorError {
    fn from(err: std::io::Error) -> Self {
        Self::Hardware(err.into())
    }
}

/// Configuration errors, raised before any pin is touched
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A numeric setting is outside its accepted range
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Name of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: &'static str,
    },

    /// Station file names a sensor kind this engine does not implement
    #[error("unknown sensor kind `{kind}`")]
    UnknownSensorKind {
        /// Kind tag found in the configuration
        kind: String,
    },

    /// Config document could not be parsed
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Config file could not be read
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::InvalidValue { field, reason }
    }
}
