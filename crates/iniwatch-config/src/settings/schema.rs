//! Watch settings types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level settings file layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub watch: WatchSettings,
}

/// Timing and buffering knobs for watch sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WatchSettings {
    /// Debounce tick for the change monitor.
    pub tick_interval_ms: u64,
    /// Wait between attempts to re-establish a lost watch.
    pub reconnect_backoff_ms: u64,
    /// Capacity of the event channel handed to consumers.
    pub channel_capacity: usize,
    /// Separator used to flatten `group/name` when a root key is configured.
    pub key_separator: String,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            reconnect_backoff_ms: 1000,
            channel_capacity: 16,
            key_separator: "/".into(),
        }
    }
}

impl WatchSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn reconnect_backoff(&self) -> Duration {
        Duration::from_millis(self.reconnect_backoff_ms)
    }

    /// Same settings with both timers set to `interval`.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        let ms = interval.as_millis().min(u128::from(u64::MAX)) as u64;
        self.tick_interval_ms = ms;
        self.reconnect_backoff_ms = ms;
        self
    }
}
