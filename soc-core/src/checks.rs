//! Shared invariant checks for construction and configuration
//!
//! Pure functions, no side effects. Each returns the checked value so calls
//! can be chained with `?` inside struct literals.

use crate::{
    constants::battery::{SOC_MAX, SOC_MIN},
    errors::{EstimatorError, EstimatorResult},
};

/// Nominal capacity must be finite and strictly positive
pub(crate) fn check_capacity(capacity_ah: f64) -> EstimatorResult<f64> {
    if capacity_ah.is_finite() && capacity_ah > 0.0 {
        Ok(capacity_ah)
    } else {
        Err(EstimatorError::InvalidCapacity { capacity_ah })
    }
}

/// State of charge must lie in the closed unit interval
pub(crate) fn check_soc(soc: f64) -> EstimatorResult<f64> {
    // NaN fails both comparisons
    if (SOC_MIN..=SOC_MAX).contains(&soc) {
        Ok(soc)
    } else {
        Err(EstimatorError::InvalidSoc { soc })
    }
}

/// Starting voltage must be a real number
pub(crate) fn check_initial_voltage(voltage_v: f64) -> EstimatorResult<f64> {
    if voltage_v.is_finite() {
        Ok(voltage_v)
    } else {
        Err(EstimatorError::InvalidConfig {
            reason: "initial voltage must be finite",
        })
    }
}

/// Tuning value must be finite and strictly positive
pub(crate) fn check_positive(value: f64, reason: &'static str) -> EstimatorResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(EstimatorError::InvalidConfig { reason })
    }
}

/// Tuning value must be finite and not negative
pub(crate) fn check_non_negative(value: f64, reason: &'static str) -> EstimatorResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(EstimatorError::InvalidConfig { reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_bounds() {
        assert!(check_capacity(2.0).is_ok());
        assert_eq!(
            check_capacity(0.0),
            Err(EstimatorError::InvalidCapacity { capacity_ah: 0.0 })
        );
        assert!(check_capacity(-1.0).is_err());
        assert!(check_capacity(f64::INFINITY).is_err());
        assert!(check_capacity(f64::NAN).is_err());
    }

    #[test]
    fn soc_bounds_are_inclusive() {
        assert!(check_soc(0.0).is_ok());
        assert!(check_soc(1.0).is_ok());
        assert!(check_soc(1.0001).is_err());
        assert!(check_soc(-0.0001).is_err());
        assert!(check_soc(f64::NAN).is_err());
    }

    #[test]
    fn initial_voltage_must_be_finite() {
        assert_eq!(check_initial_voltage(3.7), Ok(3.7));
        assert!(check_initial_voltage(f64::NAN).is_err());
        assert!(check_initial_voltage(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn positive_rejects_zero() {
        assert!(check_positive(0.0, "noise").is_err());
        assert!(check_non_negative(0.0, "covariance").is_ok());
        assert!(check_non_negative(-0.1, "covariance").is_err());
    }
}
