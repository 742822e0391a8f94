//! Open-Circuit-Voltage Model
//!
//! ## Overview
//!
//! Maps a terminal voltage to an SOC estimate, or reports that the voltage
//! carries no usable SOC information. Li-ion OCV curves are steep near full
//! and near empty but almost flat in between:
//!
//! ```text
//!  V
//! 4.2 ┤                                    ╭─ full
//! 4.0 ┤─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ╭╯   upper knee
//!     │        ╭──────────────────────────╯
//!     │      ╭─╯       flat plateau: Unreliable
//! 3.4 ┤─ ─ ─╭╯─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─    lower knee
//! 3.0 ┤────╯                                   empty
//!     └────┬────────────────────────────┬────┬ SOC
//!         0.2                          0.8  1.0
//! ```
//!
//! The knees are linear segments:
//!
//! | Voltage                  | Result                                      |
//! |--------------------------|---------------------------------------------|
//! | `v ≥ full`               | `1.0`                                       |
//! | `v ≤ empty`              | `0.0`                                       |
//! | `v > 4.0`                | `0.8 + 0.2·(v − 4.0)/(full − 4.0)`          |
//! | `v < 3.4`                | `0.2·(v − empty)/(3.4 − empty)`             |
//! | `3.4 ≤ v ≤ 4.0`          | `Unreliable`                                |
//!
//! ## Known Quirks
//!
//! - The 4.0 V / 3.4 V knees are fixed constants. `flat_region_low` and
//!   `flat_region_high` are carried in [`OcvParams`] but the lookup never
//!   reads them. Which boundary scheme was intended is unknown; both are
//!   kept as-is.
//! - Leaving the plateau produces a step: at 4.0 V the lookup is
//!   `Unreliable`, just above it the value jumps to ~0.8. Likewise exactly
//!   3.4 V is still plateau while 3.39 V reads ~0.195.

use crate::{
    checks,
    constants::battery::{
        DEFAULT_EMPTY_VOLTAGE_V, DEFAULT_FLAT_REGION_HIGH, DEFAULT_FLAT_REGION_LOW,
        DEFAULT_FULL_CHARGE_VOLTAGE_V, LOWER_KNEE_SOC, LOWER_KNEE_VOLTAGE_V, SOC_MAX, SOC_MIN,
        UPPER_KNEE_SOC, UPPER_KNEE_VOLTAGE_V,
    },
    errors::{EstimatorError, EstimatorResult},
};

/// OCV curve parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OcvParams {
    /// Voltage at or above which the cell reads full (V)
    pub full_charge_voltage: f64,
    /// Voltage at or below which the cell reads empty (V)
    pub empty_voltage: f64,
    /// Lower edge of the flat region (SOC fraction, not used by the lookup)
    pub flat_region_low: f64,
    /// Upper edge of the flat region (SOC fraction, not used by the lookup)
    pub flat_region_high: f64,
}

impl Default for OcvParams {
    fn default() -> Self {
        Self {
            full_charge_voltage: DEFAULT_FULL_CHARGE_VOLTAGE_V,
            empty_voltage: DEFAULT_EMPTY_VOLTAGE_V,
            flat_region_low: DEFAULT_FLAT_REGION_LOW,
            flat_region_high: DEFAULT_FLAT_REGION_HIGH,
        }
    }
}

impl OcvParams {
    /// Check that the voltage limits are finite and ordered
    pub fn validate(&self) -> EstimatorResult<()> {
        checks::check_positive(self.empty_voltage, "empty voltage must be positive")?;
        checks::check_positive(self.full_charge_voltage, "full charge voltage must be positive")?;
        if self.full_charge_voltage <= self.empty_voltage {
            return Err(EstimatorError::InvalidConfig {
                reason: "full charge voltage must exceed empty voltage",
            });
        }
        Ok(())
    }
}

/// Result of an OCV lookup
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OcvEstimate {
    /// Voltage maps to this SOC
    Soc(f64),
    /// Voltage is on the flat plateau and must not be used as a measurement
    Unreliable,
}

impl OcvEstimate {
    /// True when the estimate can drive a filter measurement update
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Soc(_))
    }

    /// The SOC value, if usable
    pub fn soc(&self) -> Option<f64> {
        match *self {
            Self::Soc(soc) => Some(soc),
            Self::Unreliable => None,
        }
    }
}

/// Voltage-to-SOC lookup with fixed knees
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OcvModel {
    params: OcvParams,
}

impl OcvModel {
    /// Create a model from validated parameters
    pub fn new(params: OcvParams) -> EstimatorResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Parameters in use
    pub fn params(&self) -> &OcvParams {
        &self.params
    }

    /// Look up SOC for a terminal voltage
    ///
    /// Branch order matters: the full/empty limits win over the knees, and the
    /// plateau test is what remains after `> 4.0` and `< 3.4` both fail.
    pub fn estimate(&self, voltage: f64) -> OcvEstimate {
        let full = self.params.full_charge_voltage;
        let empty = self.params.empty_voltage;

        if voltage >= full {
            return OcvEstimate::Soc(SOC_MAX);
        }
        if voltage <= empty {
            return OcvEstimate::Soc(SOC_MIN);
        }

        let soc = if voltage > UPPER_KNEE_VOLTAGE_V {
            UPPER_KNEE_SOC
                + (SOC_MAX - UPPER_KNEE_SOC) * (voltage - UPPER_KNEE_VOLTAGE_V)
                    / (full - UPPER_KNEE_VOLTAGE_V)
        } else if voltage < LOWER_KNEE_VOLTAGE_V {
            LOWER_KNEE_SOC * (voltage - empty) / (LOWER_KNEE_VOLTAGE_V - empty)
        } else {
            return OcvEstimate::Unreliable;
        };

        OcvEstimate::Soc(soc.clamp(SOC_MIN, SOC_MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn model() -> OcvModel {
        OcvModel::default()
    }

    #[test]
    fn full_and_empty_limits() {
        assert_eq!(model().estimate(4.2), OcvEstimate::Soc(1.0));
        assert_eq!(model().estimate(4.35), OcvEstimate::Soc(1.0));
        assert_eq!(model().estimate(3.0), OcvEstimate::Soc(0.0));
        assert_eq!(model().estimate(2.5), OcvEstimate::Soc(0.0));
    }

    #[test]
    fn plateau_is_unreliable() {
        assert_eq!(model().estimate(3.7), OcvEstimate::Unreliable);
        assert_eq!(model().estimate(3.95), OcvEstimate::Unreliable);
        assert_eq!(model().estimate(4.0), OcvEstimate::Unreliable);
        assert_eq!(model().estimate(3.4), OcvEstimate::Unreliable);
    }

    #[test]
    fn upper_knee_is_linear() {
        let soc = model().estimate(4.1).soc().unwrap();
        assert_abs_diff_eq!(soc, 0.9, epsilon = 1e-9);

        // Just above the knee the curve starts near 0.8, not at the plateau
        let soc = model().estimate(4.0001).soc().unwrap();
        assert_abs_diff_eq!(soc, 0.8, epsilon = 1e-3);
    }

    #[test]
    fn lower_knee_is_linear() {
        let soc = model().estimate(3.2).soc().unwrap();
        assert_abs_diff_eq!(soc, 0.1, epsilon = 1e-9);

        let soc = model().estimate(3.39).soc().unwrap();
        assert_abs_diff_eq!(soc, 0.195, epsilon = 1e-9);
    }

    #[test]
    fn flat_region_fields_do_not_move_the_knees() {
        let params = OcvParams {
            flat_region_low: 0.05,
            flat_region_high: 0.95,
            ..OcvParams::default()
        };
        let model = OcvModel::new(params).unwrap();
        assert_eq!(model.estimate(3.7), OcvEstimate::Unreliable);
        assert!(model.estimate(4.05).is_usable());
    }

    #[test]
    fn knees_outside_limits_are_never_reached() {
        // Full charge below the upper knee: everything above 3.9 reads full
        let params = OcvParams { full_charge_voltage: 3.9, ..OcvParams::default() };
        let model = OcvModel::new(params).unwrap();
        assert_eq!(model.estimate(3.95), OcvEstimate::Soc(1.0));
        assert_eq!(model.estimate(3.85), OcvEstimate::Unreliable);
    }

    #[test]
    fn inverted_limits_rejected() {
        let params = OcvParams {
            full_charge_voltage: 3.0,
            empty_voltage: 4.2,
            ..OcvParams::default()
        };
        assert!(matches!(
            OcvModel::new(params),
            Err(EstimatorError::InvalidConfig { .. })
        ));
    }
}
