//! Serial particulate sensor (SDS011 style)

use log::debug;

use super::{metric_key, Sensor};
use crate::constants::metrics::{PM10_SUFFIX, PM25_SUFFIX};
use crate::errors::SensorResult;
use crate::traits::ParticulatePort;

/// Query-mode PM2.5/PM10 sensor, one query per poll
pub struct ParticulateSensor {
    name: String,
    port: Box<dyn ParticulatePort>,
}

impl ParticulateSensor {
    pub fn new<P>(name: impl Into<String>, port: P) -> Self
    where
        P: ParticulatePort + 'static,
    {
        Self::from_boxed(name, Box::new(port))
    }

    pub(crate) fn from_boxed(name: impl Into<String>, port: Box<dyn ParticulatePort>) -> Self {
        Self {
            name: name.into(),
            port,
        }
    }
}

impl Sensor for ParticulateSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn metric_keys(&self) -> Vec<String> {
        vec![
            metric_key(&self.name, PM10_SUFFIX),
            metric_key(&self.name, PM25_SUFFIX),
        ]
    }

    fn sample_once(&mut self) -> SensorResult<Vec<(String, f32)>> {
        let reading = self.port.query()?;
        debug!("{}: pm2.5 {} pm10 {}", self.name, reading.pm25, reading.pm10);
        Ok(vec![
            (metric_key(&self.name, PM10_SUFFIX), reading.pm10),
            (metric_key(&self.name, PM25_SUFFIX), reading.pm25),
        ])
    }
}
