//! Tunables for the recorder and the player
//!
//! # Main Types
//!
//! - [`RecorderSettings`] - Move throttling, control-key exclusion, listener shutdown
//! - [`PlayerSettings`] - Stop timeout and default loop count
//!
//! Every field has a serde default so a config file only needs the keys it
//! changes. Durations are stored as milliseconds and exposed as
//! [`Duration`] through accessor methods.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default minimum gap between two recorded pointer moves
pub const DEFAULT_MOVE_THROTTLE_MS: u64 = 20;

/// Default bound on waiting for an input listener to shut down
pub const DEFAULT_LISTENER_STOP_TIMEOUT_MS: u64 = 500;

/// Default number of raw notifications buffered per input stream
pub const DEFAULT_QUEUE_CAPACITY: usize = 4096;

/// Default bound on waiting for the replay thread to exit
pub const DEFAULT_STOP_TIMEOUT_MS: u64 = 1000;

/// Keys reserved for session control; never recorded
pub const DEFAULT_EXCLUDED_KEYS: &[&str] = &["f9", "f10", "escape"];

/// Recorder tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderSettings {
    /// Minimum milliseconds between recorded moves (0 records every move)
    pub move_throttle_ms: u64,

    /// Key names that are dropped while recording
    pub excluded_keys: Vec<String>,

    /// How long `stop()` waits for each input stream to drain
    pub listener_stop_timeout_ms: u64,

    /// Raw notifications buffered per stream before new ones are dropped
    pub queue_capacity: usize,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            move_throttle_ms: DEFAULT_MOVE_THROTTLE_MS,
            excluded_keys: DEFAULT_EXCLUDED_KEYS.iter().map(|k| k.to_string()).collect(),
            listener_stop_timeout_ms: DEFAULT_LISTENER_STOP_TIMEOUT_MS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl RecorderSettings {
    /// Minimum gap between recorded moves
    pub fn move_throttle(&self) -> Duration {
        Duration::from_millis(self.move_throttle_ms)
    }

    /// Listener shutdown bound (never zero)
    pub fn listener_stop_timeout(&self) -> Duration {
        Duration::from_millis(self.listener_stop_timeout_ms.max(1))
    }

    /// Queue capacity (never zero)
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity.max(1)
    }

    /// Builder-style throttle override
    pub fn with_move_throttle(mut self, throttle: Duration) -> Self {
        self.move_throttle_ms = throttle.as_millis() as u64;
        self
    }

    /// Builder-style exclusion set override
    pub fn with_excluded_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_keys = keys.into_iter().map(Into::into).collect();
        self.normalize();
        self
    }

    /// Lower-case the exclusion set and clamp zero values
    pub fn normalize(&mut self) {
        for key in &mut self.excluded_keys {
            *key = key.to_lowercase();
        }
        self.listener_stop_timeout_ms = self.listener_stop_timeout_ms.max(1);
        self.queue_capacity = self.queue_capacity.max(1);
    }
}

/// Player tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// How long `stop()` waits for the replay thread
    pub stop_timeout_ms: u64,

    /// Loop count used when the caller does not set one (0 = infinite)
    pub default_loop_count: i64,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            stop_timeout_ms: DEFAULT_STOP_TIMEOUT_MS,
            default_loop_count: 1,
        }
    }
}

impl PlayerSettings {
    /// Stop bound (never zero)
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms.max(1))
    }

    /// Clamp zero values
    pub fn normalize(&mut self) {
        self.stop_timeout_ms = self.stop_timeout_ms.max(1);
    }
}
