//! Simulated hardware
//!
//! Deterministic stand-ins for the I/O bridge and the serial particulate
//! sensor. Pair them with [`MockClock`](crate::time::MockClock) to run the
//! whole engine without a board attached and without waiting.
//!
//! Readings are scripted: a [`SimulatedChannel`] hands out its script in
//! order, then either repeats the last value or starts over, depending on
//! how it was built.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::SamplerConfig;
use crate::errors::HardwareError;
use crate::reader::HardwareBridge;
use crate::traits::{AnalogChannel, Level, ParticulatePort, ParticulateReading, Pin};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptEnd {
    RepeatLast,
    Restart,
}

#[derive(Debug, Clone)]
struct Script<T> {
    values: Vec<T>,
    position: usize,
    end: ScriptEnd,
}

impl<T: Copy> Script<T> {
    fn new(values: Vec<T>, end: ScriptEnd) -> Self {
        Self { values, position: 0, end }
    }

    fn next(&mut self) -> Option<T> {
        if self.values.is_empty() {
            return None;
        }
        let index = match self.end {
            ScriptEnd::RepeatLast => self.position.min(self.values.len() - 1),
            ScriptEnd::Restart => self.position % self.values.len(),
        };
        self.position += 1;
        Some(self.values[index])
    }
}

/// Shared view of a [`SimulatedChannel`]'s activity
///
/// Stays valid after the channel has been moved into a sensor.
#[derive(Debug, Clone, Default)]
pub struct ChannelProbe {
    writes: Arc<Mutex<Vec<(Pin, Level)>>>,
    reads: Arc<AtomicUsize>,
}

impl ChannelProbe {
    /// Every digital write so far, in order
    pub fn writes(&self) -> Vec<(Pin, Level)> {
        lock(&self.writes).clone()
    }

    /// Number of analog reads so far
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// Last level written to `pin`
    pub fn level(&self, pin: Pin) -> Option<Level> {
        lock(&self.writes)
            .iter()
            .rev()
            .find(|(p, _)| *p == pin)
            .map(|(_, level)| *level)
    }
}

/// Scripted analog channel
#[derive(Debug, Clone)]
pub struct SimulatedChannel {
    script: Script<f32>,
    probe: ChannelProbe,
    fail_after: Option<usize>,
}

impl SimulatedChannel {
    /// Hand out `readings` in order, then keep repeating the last one
    pub fn scripted(readings: impl IntoIterator<Item = f32>) -> Self {
        Self::with_script(readings.into_iter().collect(), ScriptEnd::RepeatLast)
    }

    /// Hand out `readings` in order, forever
    pub fn cycling(readings: impl IntoIterator<Item = f32>) -> Self {
        Self::with_script(readings.into_iter().collect(), ScriptEnd::Restart)
    }

    /// Always read `value`
    pub fn constant(value: f32) -> Self {
        Self::scripted([value])
    }

    fn with_script(values: Vec<f32>, end: ScriptEnd) -> Self {
        Self {
            script: Script::new(values, end),
            probe: ChannelProbe::default(),
            fail_after: None,
        }
    }

    /// Fail every analog read after the first `reads` succeeded
    pub fn failing_after(mut self, reads: usize) -> Self {
        self.fail_after = Some(reads);
        self
    }

    pub fn probe(&self) -> ChannelProbe {
        self.probe.clone()
    }

    pub fn writes(&self) -> Vec<(Pin, Level)> {
        self.probe.writes()
    }

    pub fn reads(&self) -> usize {
        self.probe.reads()
    }
}

impl AnalogChannel for SimulatedChannel {
    fn write_digital(&mut self, pin: Pin, level: Level) -> Result<(), HardwareError> {
        lock(&self.probe.writes).push((pin, level));
        Ok(())
    }

    fn read_analog(&mut self, pin: Pin) -> Result<f32, HardwareError> {
        let done = self.probe.reads.load(Ordering::Relaxed);
        if self.fail_after.is_some_and(|limit| done >= limit) {
            return Err(HardwareError::msg(format!("simulated read failure on pin {pin}")));
        }
        self.probe.reads.fetch_add(1, Ordering::Relaxed);

        self.script
            .next()
            .ok_or_else(|| HardwareError::msg(format!("no scripted reading for pin {pin}")))
    }
}

/// Scripted particulate sensor
#[derive(Debug, Clone)]
pub struct SimulatedPort {
    script: Script<ParticulateReading>,
    failing: bool,
}

impl SimulatedPort {
    /// Answer with `readings` in order, then keep repeating the last one
    pub fn scripted(readings: impl IntoIterator<Item = ParticulateReading>) -> Self {
        Self {
            script: Script::new(readings.into_iter().collect(), ScriptEnd::RepeatLast),
            failing: false,
        }
    }

    pub fn constant(pm25: f32, pm10: f32) -> Self {
        Self::scripted([ParticulateReading { pm25, pm10 }])
    }

    /// Every query fails, like an unplugged serial adapter
    pub fn disconnected() -> Self {
        Self {
            failing: true,
            ..Self::scripted([])
        }
    }
}

impl ParticulatePort for SimulatedPort {
    fn query(&mut self) -> Result<ParticulateReading, HardwareError> {
        if self.failing {
            return Err(HardwareError::msg("simulated serial port disconnected"));
        }
        self.script
            .next()
            .ok_or_else(|| HardwareError::msg("no scripted particulate reading"))
    }
}

/// Bridge handing out simulated hardware by sensor name
#[derive(Debug, Default)]
pub struct SimulatedBridge {
    channels: HashMap<String, SimulatedChannel>,
    ports: HashMap<String, SimulatedPort>,
    opened: VecDeque<String>,
}

impl SimulatedBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(mut self, name: impl Into<String>, channel: SimulatedChannel) -> Self {
        self.channels.insert(name.into(), channel);
        self
    }

    pub fn with_port(mut self, name: impl Into<String>, port: SimulatedPort) -> Self {
        self.ports.insert(name.into(), port);
        self
    }

    /// Names of the devices opened so far, in order
    pub fn opened(&self) -> impl Iterator<Item = &str> {
        self.opened.iter().map(String::as_str)
    }
}

impl HardwareBridge for SimulatedBridge {
    fn open_analog(
        &mut self,
        name: &str,
        _sampler: &SamplerConfig,
    ) -> Result<Box<dyn AnalogChannel>, HardwareError> {
        let channel = self
            .channels
            .remove(name)
            .ok_or_else(|| HardwareError::msg(format!("no simulated channel for `{name}`")))?;
        self.opened.push_back(name.to_string());
        Ok(Box::new(channel))
    }

    fn open_particulate(
        &mut self,
        name: &str,
        _port: Option<&str>,
    ) -> Result<Box<dyn ParticulatePort>, HardwareError> {
        let port = self
            .ports
            .remove(name)
            .ok_or_else(|| HardwareError::msg(format!("no simulated port for `{name}`")))?;
        self.opened.push_back(name.to_string());
        Ok(Box::new(port))
    }
}
