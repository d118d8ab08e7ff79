//! TOML-based load tester configuration.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! usable configuration. The target URL is NOT part of the config file; it
//! is given to [`LoadTester`](crate::loadtest::engine::LoadTester) directly.
//!
//! # Example TOML
//!
//! ```toml
//! [settings]
//! timeout_ms = 30000
//! spike_burst_size = 100
//! stress_step = 10
//! spike_delay_secs = 1.0
//! # stress_max_rounds = 50
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::loadtest::error::LoadTestError;

/// Default per-request timeout: 30 seconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default number of simultaneous requests fired per spike.
pub const DEFAULT_SPIKE_BURST_SIZE: usize = 100;

/// Default concurrency increment between stress rounds.
pub const DEFAULT_STRESS_STEP: usize = 10;

/// Default pause between spikes, in seconds.
pub const DEFAULT_SPIKE_DELAY_SECS: f64 = 1.0;

/// Top-level load tester configuration parsed from a TOML file.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct LoadTesterConfig {
    /// General settings.
    #[serde(default)]
    pub settings: Settings,
}

/// Settings controlling transport and traffic-shape defaults.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Per-request timeout in milliseconds, applied by the HTTP client.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Number of concurrent requests in each spike burst.
    #[serde(default = "default_spike_burst_size")]
    pub spike_burst_size: usize,
    /// Concurrency increment used by stress tests when no step is given.
    #[serde(default = "default_stress_step")]
    pub stress_step: usize,
    /// Pause after each spike burst when no delay is given.
    #[serde(default = "default_spike_delay_secs")]
    pub spike_delay_secs: f64,
    /// Optional cap on stress rounds. `None` keeps the ramp open-ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress_max_rounds: Option<u32>,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_spike_burst_size() -> usize {
    DEFAULT_SPIKE_BURST_SIZE
}

fn default_stress_step() -> usize {
    DEFAULT_STRESS_STEP
}

fn default_spike_delay_secs() -> f64 {
    DEFAULT_SPIKE_DELAY_SECS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            spike_burst_size: DEFAULT_SPIKE_BURST_SIZE,
            stress_step: DEFAULT_STRESS_STEP,
            spike_delay_secs: DEFAULT_SPIKE_DELAY_SECS,
            stress_max_rounds: None,
        }
    }
}

impl LoadTesterConfig {
    /// Parse a TOML string into a validated [`LoadTesterConfig`].
    pub fn from_toml(content: &str) -> Result<Self, LoadTestError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a [`LoadTesterConfig`] from a file path.
    ///
    /// Returns [`LoadTestError::ConfigIo`] if the file cannot be read,
    /// [`LoadTestError::ConfigParse`] if the TOML is malformed, or
    /// [`LoadTestError::ConfigValidation`] if validation fails.
    pub fn load(path: &Path) -> Result<Self, LoadTestError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadTestError::ConfigIo {
            source,
            path: path.display().to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Validate that the config is semantically correct.
    pub fn validate(&self) -> Result<(), LoadTestError> {
        let s = &self.settings;
        if s.timeout_ms == 0 {
            return Err(validation("timeout_ms must be greater than 0"));
        }
        if s.spike_burst_size == 0 {
            return Err(validation("spike_burst_size must be greater than 0"));
        }
        if s.stress_step == 0 {
            return Err(validation("stress_step must be greater than 0"));
        }
        if !s.spike_delay_secs.is_finite() || s.spike_delay_secs < 0.0 {
            return Err(validation(format!(
                "spike_delay_secs must be a non-negative number, got {}",
                s.spike_delay_secs
            )));
        }
        if s.stress_max_rounds == Some(0) {
            return Err(validation(
                "stress_max_rounds must be greater than 0 when set",
            ));
        }
        Ok(())
    }
}

impl Settings {
    /// Convert the `timeout_ms` field to a [`Duration`].
    pub fn timeout_as_duration(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn validation(message: impl Into<String>) -> LoadTestError {
    LoadTestError::ConfigValidation {
        message: message.into(),
    }
}
