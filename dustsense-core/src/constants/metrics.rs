//! Metric Keys
//!
//! Poll records name every value `<sensor name><suffix>`.

/// Suffix of the single key contributed by a scalar voltage sensor.
pub const RAW_SUFFIX: &str = "_raw";

/// Suffix of the PM10 key contributed by a particulate sensor.
pub const PM10_SUFFIX: &str = "_pm10";

/// Suffix of the PM2.5 key contributed by a particulate sensor.
pub const PM25_SUFFIX: &str = "_pm25";

/// Name of the timestamp column in a time-series dataset.
pub const TIMESTAMP_KEY: &str = "timestamp";
