//! Monitor configuration
//!
//! Loaded from JSON. Every field has a default, so an empty object `{}` is a
//! complete configuration and a file only needs the values it changes:
//!
//! ```json
//! {
//!   "estimator": { "nominal_capacity_ah": 2.5, "initial_soc": 0.9 },
//!   "charger": { "enable_below": 0.3, "disable_above": 0.8 },
//!   "backlight": { "timeout_ms": 10000 },
//!   "display": { "serial": false }
//! }
//! ```

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use soc_core::EstimatorConfig;

use crate::{backlight::DEFAULT_TIMEOUT_MS, charger::ChargerConfig, MonitorError, MonitorResult};

/// Backlight settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacklightConfig {
    /// Inactivity before the backlight turns off (ms)
    pub timeout_ms: u64,
}

impl Default for BacklightConfig {
    fn default() -> Self {
        Self { timeout_ms: DEFAULT_TIMEOUT_MS }
    }
}

/// Which outputs the binary prints
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Print LCD writes
    pub lcd: bool,
    /// Print the serial summary line
    pub serial: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { lcd: true, serial: true }
    }
}

/// Complete monitor configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Estimator construction and tuning
    pub estimator: EstimatorConfig,
    /// Charger hysteresis thresholds
    pub charger: ChargerConfig,
    /// Backlight timeout
    pub backlight: BacklightConfig,
    /// Output toggles
    pub display: DisplayConfig,
}

impl MonitorConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> MonitorResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn load(path: impl AsRef<Path>) -> MonitorResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Check every section
    pub fn validate(&self) -> MonitorResult<()> {
        self.estimator.validate()?;
        self.charger.validate()?;
        if self.backlight.timeout_ms == 0 {
            return Err(MonitorError::InvalidConfig("backlight timeout must be positive"));
        }
        Ok(())
    }

    /// Set the charger thresholds
    pub fn with_charger(mut self, charger: ChargerConfig) -> Self {
        self.charger = charger;
        self
    }

    /// Set the estimator configuration
    pub fn with_estimator(mut self, estimator: EstimatorConfig) -> Self {
        self.estimator = estimator;
        self
    }

    /// Set the backlight timeout (ms)
    pub fn with_backlight_timeout(mut self, timeout_ms: u64) -> Self {
        self.backlight.timeout_ms = timeout_ms;
        self
    }
}
