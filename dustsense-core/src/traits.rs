//! Hardware-facing traits
//!
//! These are the only two things the engine needs from the outside world:
//! a pin-level bridge for analog sensors and a query interface for serial
//! particulate sensors. Keep them small; board protocols and serial framing
//! belong in the driver that implements them.

use serde::{Deserialize, Serialize};

use crate::errors::HardwareError;

/// Pin number on the I/O bridge
pub type Pin = u8;

/// Digital output level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// 0 V
    Low,
    /// Supply voltage
    High,
}

impl Level {
    /// Level as the 0/1 value used by most bridge protocols
    pub fn as_bit(self) -> u8 {
        match self {
            Level::Low => 0,
            Level::High => 1,
        }
    }
}

/// Pin read/write primitives of a microcontroller I/O bridge
///
/// Implementations must already be connected when handed to the engine; the
/// engine never retries or reconnects. Every error is passed to the caller
/// unchanged.
pub trait AnalogChannel {
    /// Drive a digital output pin
    fn write_digital(&mut self, pin: Pin, level: Level) -> Result<(), HardwareError>;

    /// Read an analog input as a fraction of full scale, in `[0, 1]`
    fn read_analog(&mut self, pin: Pin) -> Result<f32, HardwareError>;
}

impl<T: AnalogChannel + ?Sized> AnalogChannel for Box<T> {
    fn write_digital(&mut self, pin: Pin, level: Level) -> Result<(), HardwareError> {
        (**self).write_digital(pin, level)
    }

    fn read_analog(&mut self, pin: Pin) -> Result<f32, HardwareError> {
        (**self).read_analog(pin)
    }
}

/// One particulate measurement, in µg/m³
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticulateReading {
    /// PM2.5 concentration
    pub pm25: f32,
    /// PM10 concentration
    pub pm10: f32,
}

/// Query-mode serial particulate sensor (SDS011 style)
pub trait ParticulatePort {
    /// Request and block on a single measurement
    fn query(&mut self) -> Result<ParticulateReading, HardwareError>;
}

impl<T: ParticulatePort + ?Sized> ParticulatePort for Box<T> {
    fn query(&mut self) -> Result<ParticulateReading, HardwareError> {
        (**self).query()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_bits() {
        assert_eq!(Level::Low.as_bit(), 0);
        assert_eq!(Level::High.as_bit(), 1);
    }
}
