//! Poll records and time-series datasets
//!
//! [`SensorOutputRecord`] is the outcome of one poll across a station: an
//! ordered `metric -> value` map. [`TimeSeriesDataset`] stacks records from
//! consecutive polls into columns, one column per metric plus a `timestamp`
//! column.
//!
//! ## Shape invariant
//!
//! Every column of a dataset, the timestamp column included, always has the
//! same length. A poll that is missing a value still contributes a row; the
//! value is `NaN`. A poll whose key set differs from the first poll is
//! rejected as a whole, so a dataset never holds a ragged or backfilled column.
//!
//! ## Serialization
//!
//! Both types serialize as JSON objects in key order. `NaN` values become
//! `null` in JSON.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::constants::metrics::TIMESTAMP_KEY;
use crate::errors::{SensorError, SensorResult};
use crate::sampling::mean;
use crate::time::Timestamp;

/// Named values from one poll, in sensor declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorOutputRecord {
    entries: Vec<(String, f32)>,
}

impl SensorOutputRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, returning the previous value if the key was already present
    ///
    /// A repeated key keeps its original position and takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: f32) -> Option<f32> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<f32> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, f32)> for SensorOutputRecord {
    fn from_iter<I: IntoIterator<Item = (String, f32)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl Serialize for SensorOutputRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Column-oriented series of poll records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeriesDataset {
    timestamps: Vec<Timestamp>,
    columns: Vec<(String, Vec<f32>)>,
}

impl TimeSeriesDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one poll
    ///
    /// The first poll fixes the key set. Later polls must carry exactly those
    /// keys; otherwise nothing is appended and
    /// [`SensorError::DatasetShape`] is returned.
    pub fn push(&mut self, timestamp: Timestamp, record: &SensorOutputRecord) -> SensorResult<()> {
        let poll = self.len();

        if poll == 0 {
            self.columns = record.keys().map(|k| (k.to_string(), Vec::new())).collect();
        } else {
            if let Some(key) = record.keys().find(|k| self.column(k).is_none()) {
                return Err(SensorError::DatasetShape {
                    key: key.to_string(),
                    poll,
                    reason: "appeared after the first poll",
                });
            }
            if let Some((key, _)) = self.columns.iter().find(|(k, _)| !record.contains_key(k)) {
                return Err(SensorError::DatasetShape {
                    key: key.clone(),
                    poll,
                    reason: "is missing",
                });
            }
        }

        self.timestamps.push(timestamp);
        for (key, values) in &mut self.columns {
            values.push(record.get(key).unwrap_or(f32::NAN));
        }
        Ok(())
    }

    /// Number of polls
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Metric keys in column order (without `timestamp`)
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(k, _)| k.as_str())
    }

    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    pub fn column(&self, key: &str) -> Option<&[f32]> {
        self.columns
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f32])> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Mean of a column ignoring `NaN`, `None` if no finite value exists
    pub fn column_mean(&self, key: &str) -> Option<f32> {
        self.column(key)
            .and_then(|values| mean(values.iter().copied().filter(|v| v.is_finite())))
    }

    /// Rebuild the record of poll `index`
    pub fn row(&self, index: usize) -> Option<(Timestamp, SensorOutputRecord)> {
        let timestamp = *self.timestamps.get(index)?;
        let record = self
            .columns
            .iter()
            .map(|(k, values)| (k.clone(), values[index]))
            .collect();
        Some((timestamp, record))
    }

    pub fn rows(&self) -> impl Iterator<Item = (Timestamp, SensorOutputRecord)> + '_ {
        (0..self.len()).filter_map(move |index| self.row(index))
    }
}

impl Serialize for TimeSeriesDataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len() + 1))?;
        map.serialize_entry(TIMESTAMP_KEY, &self.timestamps)?;
        for (key, values) in &self.columns {
            map.serialize_entry(key, values)?;
        }
        map.end()
    }
}
