//! Controller configuration
//!
//! Read once at startup from a JSON file. Every field has a default, so a
//! partial file (or none at all) is valid:
//!
//! ```json
//! {
//!   "tick_interval_ms": 500,
//!   "mode": "bike",
//!   "bounds": { "min": 3, "max": 30 },
//!   "limits": { "lower_limit": 1, "upper_limit": 35, "device_max_volume": 100 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::bounds::{VolumeBounds, VolumeLimits};
use crate::error::ConfigError;
use crate::mode::Mode;

/// Default re-evaluation period
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 500;

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

/// Startup settings for the control loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Period between evaluations while running
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Initially selected mode
    #[serde(default)]
    pub mode: Mode,

    /// Initial floor and ceiling
    #[serde(default)]
    pub bounds: VolumeBounds,

    /// Absolute limits for bound edits
    #[serde(default)]
    pub limits: VolumeLimits,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            mode: Mode::default(),
            bounds: VolumeBounds::default(),
            limits: VolumeLimits::default(),
        }
    }
}

impl ControllerConfig {
    /// Load and validate a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse and validate a configuration document
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: ControllerConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and ordering
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::invalid(
                "tick_interval_ms",
                "must be greater than zero",
            ));
        }

        let limits = &self.limits;
        if limits.lower_limit >= limits.upper_limit {
            return Err(ConfigError::invalid(
                "limits.lower_limit",
                format!(
                    "{} must be below upper_limit {}",
                    limits.lower_limit, limits.upper_limit
                ),
            ));
        }
        if limits.upper_limit > limits.device_max_volume {
            return Err(ConfigError::invalid(
                "limits.upper_limit",
                format!(
                    "{} exceeds device_max_volume {}",
                    limits.upper_limit, limits.device_max_volume
                ),
            ));
        }

        if !self.bounds.is_ordered() {
            return Err(ConfigError::invalid(
                "bounds",
                format!(
                    "min {} must be below max {}",
                    self.bounds.min, self.bounds.max
                ),
            ));
        }
        if self.bounds.max > limits.device_max_volume {
            return Err(ConfigError::invalid(
                "bounds.max",
                format!(
                    "{} exceeds device_max_volume {}",
                    self.bounds.max, limits.device_max_volume
                ),
            ));
        }

        Ok(())
    }

    /// Tick period as a [`Duration`]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
