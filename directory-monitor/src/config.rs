//! Configuration for directory monitoring.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, Result};

/// Default time between two scans of the watched directory.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Configuration for a [`DirectoryMonitor`](crate::DirectoryMonitor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Milliseconds to sleep between scans.
    pub poll_interval_ms: u64,

    /// Whether entries present at startup are reported as additions.
    pub emit_initial: bool,
}

impl MonitorConfig {
    /// Create a config with the default one second interval.
    pub fn new() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            emit_initial: true,
        }
    }

    /// Set the poll interval.
    ///
    /// The interval is stored in whole milliseconds; any sub-millisecond
    /// part is truncated, so an interval below 1ms fails [`validate`](Self::validate).
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Seed the snapshot silently instead of reporting pre-existing entries.
    pub fn skip_initial(mut self) -> Self {
        self.emit_initial = false;
        self
    }

    /// The poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Check that the configuration can drive a watch loop.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(MonitorError::Config(
                "poll interval must be at least 1ms".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::new()
    }
}
