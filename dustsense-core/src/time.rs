//! Time management for the sampling engine
//!
//! The engine needs three things from a clock:
//! - a monotonic reading, to time samples relative to the start of a cycle
//! - a wall-clock timestamp, to stamp historical entries and dataset rows
//! - a blocking delay, to hold the LED on or off for its physical timings
//!
//! All three sit behind [`Clock`] so tests can run the full cycle instantly
//! with [`MockClock`] while production uses [`SystemClock`].

use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeZone, Utc};

/// Wall-clock timestamp attached to historical entries and dataset rows
pub type Timestamp = DateTime<Utc>;

/// Source of time and delays for the engine
pub trait Clock {
    /// Monotonic time since an arbitrary, fixed origin
    fn elapsed(&self) -> Duration;

    /// Current wall-clock time
    fn timestamp(&self) -> Timestamp;

    /// Block for `duration`
    fn delay(&mut self, duration: Duration);
}

impl<T: Clock + ?Sized> Clock for Box<T> {
    fn elapsed(&self) -> Duration {
        (**self).elapsed()
    }

    fn timestamp(&self) -> Timestamp {
        (**self).timestamp()
    }

    fn delay(&mut self, duration: Duration) {
        (**self).delay(duration)
    }
}

/// Real time: `Instant` for intervals, system time for stamps, `thread::sleep`
/// for delays
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    fn timestamp(&self) -> Timestamp {
        Utc::now()
    }

    fn delay(&mut self, duration: Duration) {
        // Sub-millisecond sleeps overshoot on most hosts; that only ever
        // lengthens the settle time, which the sensor tolerates.
        thread::sleep(duration);
    }
}

/// Simulated time for testing
///
/// `delay` returns immediately and advances simulated time by the requested
/// amount, so elapsed values inside a cycle are fully deterministic.
///
/// Clones share one timeline: a station whose sensors each hold a clone sees
/// every delay on every clone, and timestamps stay `start + elapsed`.
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Timestamp,
    state: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    now: Duration,
    delays: Vec<Duration>,
}

impl MockClock {
    /// Start at the Unix epoch
    pub fn new() -> Self {
        Self::starting_at(Utc.timestamp_opt(0, 0).single().unwrap_or_default())
    }

    /// Start at a specific wall-clock time
    pub fn starting_at(start: Timestamp) -> Self {
        Self {
            start,
            state: Arc::default(),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Move time forward without recording a delay
    pub fn advance(&mut self, duration: Duration) {
        self.state().now += duration;
    }

    /// Every delay requested so far on this timeline, in order
    pub fn delays(&self) -> Vec<Duration> {
        self.state().delays.clone()
    }

    /// Sum of all requested delays
    pub fn total_delay(&self) -> Duration {
        self.state().delays.iter().sum()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn elapsed(&self) -> Duration {
        self.state().now
    }

    fn timestamp(&self) -> Timestamp {
        let offset = chrono::Duration::from_std(self.elapsed()).unwrap_or_else(|_| chrono::Duration::zero());
        self.start + offset
    }

    fn delay(&mut self, duration: Duration) {
        let mut state = self.state();
        state.delays.push(duration);
        state.now += duration;
    }
}

/// Milliseconds between two monotonic readings, as used in sample records
pub fn millis_between(start: Duration, end: Duration) -> f32 {
    end.saturating_sub(start).as_secs_f64() as f32 * 1000.0
}
