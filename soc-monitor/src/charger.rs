//! Charger relay with SOC hysteresis
//!
//! ```text
//!   SOC ≤ enable_below  and off  →  ON
//!   SOC ≥ disable_above and on   →  OFF
//!   otherwise                    →  hold
//! ```
//!
//! The dead band between the two thresholds keeps the relay from chattering
//! when SOC hovers around a single set point.

use serde::{Deserialize, Serialize};

use crate::{MonitorError, MonitorResult};

/// Default SOC at or below which charging starts
pub const DEFAULT_ENABLE_BELOW: f64 = 0.40;

/// Default SOC at or above which charging stops
pub const DEFAULT_DISABLE_ABOVE: f64 = 0.70;

/// Hysteresis thresholds, as SOC fractions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargerConfig {
    /// Enable the charger at or below this SOC
    pub enable_below: f64,
    /// Disable the charger at or above this SOC
    pub disable_above: f64,
}

impl Default for ChargerConfig {
    fn default() -> Self {
        Self {
            enable_below: DEFAULT_ENABLE_BELOW,
            disable_above: DEFAULT_DISABLE_ABOVE,
        }
    }
}

impl ChargerConfig {
    /// Thresholds must be in `[0, 1]` with a non-empty dead band
    pub fn validate(&self) -> MonitorResult<()> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(self.enable_below) || !in_unit(self.disable_above) {
            return Err(MonitorError::InvalidConfig("charger thresholds must lie within [0, 1]"));
        }
        if self.enable_below >= self.disable_above {
            return Err(MonitorError::InvalidConfig(
                "charger enable threshold must be below the disable threshold",
            ));
        }
        Ok(())
    }
}

/// Relay transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargerEvent {
    /// Charger switched on
    Enabled,
    /// Charger switched off
    Disabled,
}

/// Charger relay state machine
#[derive(Debug, Clone)]
pub struct ChargerController {
    config: ChargerConfig,
    enabled: bool,
}

impl ChargerController {
    /// Create a controller with the relay off
    pub fn new(config: ChargerConfig) -> MonitorResult<Self> {
        config.validate()?;
        Ok(Self { config, enabled: false })
    }

    /// Feed the latest SOC, returning the transition if the relay switched
    pub fn update(&mut self, soc: f64) -> Option<ChargerEvent> {
        if !self.enabled && soc <= self.config.enable_below {
            self.enabled = true;
            Some(ChargerEvent::Enabled)
        } else if self.enabled && soc >= self.config.disable_above {
            self.enabled = false;
            Some(ChargerEvent::Disabled)
        } else {
            None
        }
    }

    /// Whether the relay is closed
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Thresholds in use
    pub fn config(&self) -> &ChargerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> ChargerController {
        ChargerController::new(ChargerConfig::default()).unwrap()
    }

    #[test]
    fn starts_off() {
        assert!(!controller().is_enabled());
    }

    #[test]
    fn hysteresis_cycle() {
        let mut charger = controller();

        assert_eq!(charger.update(0.55), None);
        assert_eq!(charger.update(0.40), Some(ChargerEvent::Enabled));
        assert!(charger.is_enabled());

        // Inside the dead band nothing changes, in either direction
        assert_eq!(charger.update(0.35), None);
        assert_eq!(charger.update(0.69), None);
        assert!(charger.is_enabled());

        assert_eq!(charger.update(0.70), Some(ChargerEvent::Disabled));
        assert_eq!(charger.update(0.95), None);
        assert_eq!(charger.update(0.41), None);
        assert!(!charger.is_enabled());
    }

    #[test]
    fn overlapping_thresholds_rejected() {
        let config = ChargerConfig { enable_below: 0.7, disable_above: 0.4 };
        assert!(matches!(
            ChargerController::new(config),
            Err(MonitorError::InvalidConfig(_))
        ));

        let config = ChargerConfig { enable_below: 0.5, disable_above: 0.5 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn thresholds_outside_unit_interval_rejected() {
        let config = ChargerConfig { enable_below: 0.4, disable_above: 70.0 };
        assert!(config.validate().is_err());
    }
}
