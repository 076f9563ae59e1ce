use chrono::TimeDelta;

use crate::aggregators::time_series::{BUCKET_WIDTH_MINUTES, WindowKey};

/// Configuration for aggregation behavior
#[derive(Clone, Debug)]
pub struct AggregatorsConfig {
    /// Width of a single bucket in minutes
    pub bucket_width_minutes: i64,
    /// Windows materialized on every refresh
    pub windows: Vec<WindowKey>,
}

impl Default for AggregatorsConfig {
    fn default() -> Self {
        Self {
            bucket_width_minutes: BUCKET_WIDTH_MINUTES,
            windows: WindowKey::ALL.to_vec(),
        }
    }
}

impl AggregatorsConfig {
    pub fn new(bucket_width_minutes: i64, windows: Vec<WindowKey>) -> Self {
        Self {
            bucket_width_minutes,
            windows,
        }
    }

    pub fn bucket_width(&self) -> TimeDelta {
        TimeDelta::minutes(self.bucket_width_minutes)
    }
}
