//! Coulomb counter
//!
//! Integrates current over elapsed time. Positive current discharges the
//! cell, negative current charges it.
//!
//! ```text
//! Δq   = I · Δt            (Ah)
//! q   += Δq                (signed, never clamped)
//! SOC -= Δq / Q_nominal    (clamped to [0, 1])
//! ```

use crate::{
    checks,
    constants::battery::{SOC_MAX, SOC_MIN},
    errors::EstimatorResult,
};

/// Integration-only SOC track
#[derive(Debug, Clone, PartialEq)]
pub struct CoulombCounter {
    /// Fixed at construction, always > 0
    nominal_capacity_ah: f64,
    soc: f64,
    cumulative_charge_ah: f64,
}

impl CoulombCounter {
    /// Create a counter for a cell of `nominal_capacity_ah` starting at `initial_soc`
    pub fn new(nominal_capacity_ah: f64, initial_soc: f64) -> EstimatorResult<Self> {
        Ok(Self {
            nominal_capacity_ah: checks::check_capacity(nominal_capacity_ah)?,
            soc: checks::check_soc(initial_soc)?,
            cumulative_charge_ah: 0.0,
        })
    }

    /// Integrate `current_a` over `dt_hours`, returning the charge moved (Ah)
    ///
    /// `dt_hours` must not be negative. Zero is a no-op.
    pub fn integrate(&mut self, current_a: f64, dt_hours: f64) -> f64 {
        debug_assert!(dt_hours >= 0.0, "negative elapsed time");

        let delta_charge = current_a * dt_hours;
        self.cumulative_charge_ah += delta_charge;
        self.soc = (self.soc - delta_charge / self.nominal_capacity_ah).clamp(SOC_MIN, SOC_MAX);
        delta_charge
    }

    /// Restart integration from `soc` with zero accumulated charge
    pub fn reset(&mut self, soc: f64) -> EstimatorResult<()> {
        self.soc = checks::check_soc(soc)?;
        self.cumulative_charge_ah = 0.0;
        Ok(())
    }

    /// Current SOC of this track
    pub fn soc(&self) -> f64 {
        self.soc
    }

    /// Signed charge integrated since construction or reset (Ah)
    pub fn cumulative_charge_ah(&self) -> f64 {
        self.cumulative_charge_ah
    }

    /// Nominal capacity (Ah)
    pub fn nominal_capacity_ah(&self) -> f64 {
        self.nominal_capacity_ah
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EstimatorError;
    use approx::assert_abs_diff_eq;

    #[test]
    fn thirty_seconds_at_half_amp() {
        let mut counter = CoulombCounter::new(2.0, 1.0).unwrap();
        let moved = counter.integrate(0.5, 30.0 / 3600.0);

        assert_abs_diff_eq!(moved, 0.0041667, epsilon = 1e-6);
        assert_abs_diff_eq!(counter.soc(), 0.997917, epsilon = 1e-6);
        assert_abs_diff_eq!(counter.cumulative_charge_ah(), moved, epsilon = 1e-12);
    }

    #[test]
    fn zero_elapsed_time_is_noop() {
        let mut counter = CoulombCounter::new(2.0, 0.6).unwrap();
        counter.integrate(5.0, 0.0);
        assert_eq!(counter.soc(), 0.6);
        assert_eq!(counter.cumulative_charge_ah(), 0.0);
    }

    #[test]
    fn soc_clamps_but_charge_does_not() {
        let mut counter = CoulombCounter::new(1.0, 0.1).unwrap();
        counter.integrate(1.0, 1.0);
        assert_eq!(counter.soc(), 0.0);
        assert_eq!(counter.cumulative_charge_ah(), 1.0);

        // Charging back past full
        counter.integrate(-3.0, 1.0);
        assert_eq!(counter.soc(), 1.0);
        assert_eq!(counter.cumulative_charge_ah(), -2.0);
    }

    #[test]
    fn construction_checks() {
        assert!(matches!(
            CoulombCounter::new(0.0, 0.5),
            Err(EstimatorError::InvalidCapacity { .. })
        ));
        assert!(matches!(
            CoulombCounter::new(2.0, 1.5),
            Err(EstimatorError::InvalidSoc { .. })
        ));
    }

    #[test]
    fn reset_clears_charge() {
        let mut counter = CoulombCounter::new(2.0, 1.0).unwrap();
        counter.integrate(1.0, 0.5);
        counter.reset(0.8).unwrap();
        assert_eq!(counter.soc(), 0.8);
        assert_eq!(counter.cumulative_charge_ah(), 0.0);
    }
}
