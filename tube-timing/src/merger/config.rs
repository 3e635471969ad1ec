//! Merge configuration.

use chrono::Duration;

/// Configuration parameters for merging live and scheduled departures.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// How far apart (minutes) a live and a scheduled record may be and
    /// still count as the same real departure.
    pub duplicate_tolerance_mins: i64,
}

impl MergeConfig {
    /// Create a new configuration with the given tolerance.
    pub fn new(duplicate_tolerance_mins: i64) -> Self {
        Self {
            duplicate_tolerance_mins,
        }
    }

    /// Returns the duplicate tolerance as a Duration.
    pub fn duplicate_tolerance(&self) -> Duration {
        Duration::minutes(self.duplicate_tolerance_mins)
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            duplicate_tolerance_mins: 2,
        }
    }
}
