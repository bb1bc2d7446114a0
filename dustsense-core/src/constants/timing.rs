//! Drive-Cycle Timing
//!
//! Delays of one trigger / settle / sample / deactivate cycle. These encode
//! physical behaviour of the sensor and must not be shortened on real
//! hardware. Tests swap the clock, not these values.

use std::time::Duration;

/// Hold time with the trigger pin high before a cycle starts.
///
/// Lets the IR LED fully switch off so the photodiode output returns to its
/// dark level between pulses.
///
/// Source: empirical, matches the reference Arduino sketch for the GP2Y1010
pub const STABILIZATION_DELAY: Duration = Duration::from_secs(1);

/// Wait between driving the LED on and the first analog read.
///
/// The photodiode output peaks roughly 0.28 ms after the LED turns on.
///
/// Source: Sharp GP2Y1010AU0F datasheet, sampling timing chart
pub const SETTLE_DELAY: Duration = Duration::from_micros(260);

/// Spacing between inner read attempts while polling for a usable signal.
pub const INTER_ATTEMPT_DELAY: Duration = Duration::from_micros(5);

/// Hold time after the LED is switched off again.
///
/// Source: Sharp GP2Y1010AU0F datasheet (10 ms pulse cycle)
pub const POST_CYCLE_DELAY: Duration = Duration::from_millis(10);
