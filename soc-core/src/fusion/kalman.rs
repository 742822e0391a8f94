//! Scalar Kalman Filter for SOC
//!
//! ## Overview
//!
//! One-state filter whose prediction is Coulomb counting and whose
//! measurement is the OCV-derived SOC:
//!
//! ### 1. Prediction Step
//! ```text
//! State prediction:      x̂ₖ|ₖ₋₁ = clip(xₖ₋₁ − Iₖ·Δtₖ / Q, 0, 1)
//! Covariance prediction: Pₖ|ₖ₋₁ = Pₖ₋₁ + q          (F = 1)
//! ```
//!
//! ### 2. Update Step
//! ```text
//! Innovation:      yₖ = zₖ − x̂ₖ|ₖ₋₁                 (H = 1)
//! Innovation cov:  Sₖ = Pₖ|ₖ₋₁ + r
//! Kalman gain:     Kₖ = Pₖ|ₖ₋₁ / Sₖ
//! State update:    x̂ₖ = clip(x̂ₖ|ₖ₋₁ + Kₖ·yₖ, 0, 1)
//! Covariance:      Pₖ = (1 − Kₖ)·Pₖ|ₖ₋₁
//! ```
//!
//! Covariance grows by `q` on every predict, including zero-length steps,
//! and without an update it grows without bound. That is what makes the
//! filter lean on the first measurement after a long plateau.
//!
//! `r > 0` is enforced at construction, so `S > 0` and the gain never
//! divides by zero.
//!
//! ## Usage Example
//!
//! ```rust
//! use soc_core::fusion::{KalmanConfig, SocFilter, SocKalmanFilter};
//!
//! let config = KalmanConfig::default()
//!     .with_process_noise(0.001)
//!     .with_measurement_noise(0.01);
//!
//! let mut kf = SocKalmanFilter::new(config, 2.0, 0.8)?;
//!
//! kf.predict(0.5, 10.0 / 3600.0);
//! kf.update(0.9);
//! assert!(kf.soc() > 0.8);
//! # Ok::<(), soc_core::EstimatorError>(())
//! ```

use crate::{
    checks,
    constants::{
        battery::{SOC_MAX, SOC_MIN},
        fusion::{DEFAULT_INITIAL_COVARIANCE, DEFAULT_MEASUREMENT_NOISE, DEFAULT_PROCESS_NOISE},
    },
    errors::EstimatorResult,
    fusion::SocFilter,
};

/// Kalman filter configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KalmanConfig {
    /// Initial covariance (uncertainty)
    pub initial_covariance: f64,
    /// Process noise variance (q), added on every predict
    pub process_noise: f64,
    /// Measurement noise variance (r) of the OCV-derived SOC
    pub measurement_noise: f64,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            initial_covariance: DEFAULT_INITIAL_COVARIANCE,
            process_noise: DEFAULT_PROCESS_NOISE,
            measurement_noise: DEFAULT_MEASUREMENT_NOISE,
        }
    }
}

impl KalmanConfig {
    /// Set process noise (higher = less trust in Coulomb counting)
    pub fn with_process_noise(mut self, noise: f64) -> Self {
        self.process_noise = noise;
        self
    }

    /// Set measurement noise (higher = less trust in the OCV lookup)
    pub fn with_measurement_noise(mut self, noise: f64) -> Self {
        self.measurement_noise = noise;
        self
    }

    /// Set initial covariance
    pub fn with_initial_covariance(mut self, covariance: f64) -> Self {
        self.initial_covariance = covariance;
        self
    }

    /// Check noise terms are positive and covariance is not negative
    pub fn validate(&self) -> EstimatorResult<()> {
        checks::check_positive(self.process_noise, "process noise must be positive")?;
        checks::check_positive(self.measurement_noise, "measurement noise must be positive")?;
        checks::check_non_negative(self.initial_covariance, "initial covariance must not be negative")?;
        Ok(())
    }
}

/// Scalar Kalman filter over SOC
#[derive(Debug, Clone, PartialEq)]
pub struct SocKalmanFilter {
    /// Current SOC estimate
    state: f64,
    /// Estimation error covariance
    covariance: f64,
    /// Configuration
    config: KalmanConfig,
    /// Fixed at construction, always > 0
    nominal_capacity_ah: f64,
    /// Residual of the most recent update
    last_innovation: Option<f64>,
    /// Gain of the most recent update
    last_gain: Option<f64>,
    /// Measurement updates applied since construction or reset
    update_count: u32,
}

impl SocKalmanFilter {
    /// Create a filter for a cell of `nominal_capacity_ah` starting at `initial_soc`
    pub fn new(config: KalmanConfig, nominal_capacity_ah: f64, initial_soc: f64) -> EstimatorResult<Self> {
        config.validate()?;
        Ok(Self {
            state: checks::check_soc(initial_soc)?,
            covariance: config.initial_covariance,
            config,
            nominal_capacity_ah: checks::check_capacity(nominal_capacity_ah)?,
            last_innovation: None,
            last_gain: None,
            update_count: 0,
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &KalmanConfig {
        &self.config
    }

    /// Residual `z − x̂` of the most recent measurement update
    pub fn last_innovation(&self) -> Option<f64> {
        self.last_innovation
    }

    /// Gain of the most recent measurement update
    pub fn last_gain(&self) -> Option<f64> {
        self.last_gain
    }

    /// Number of measurement updates applied
    pub fn update_count(&self) -> u32 {
        self.update_count
    }
}

impl SocFilter for SocKalmanFilter {
    fn predict(&mut self, current_a: f64, dt_hours: f64) {
        // x̂ = x − I·Δt/Q
        self.state = (self.state - current_a * dt_hours / self.nominal_capacity_ah)
            .clamp(SOC_MIN, SOC_MAX);

        // P = F·P·Fᵀ + q with F = 1
        self.covariance += self.config.process_noise;
    }

    fn update(&mut self, measured_soc: f64) {
        let innovation_covariance = self.covariance + self.config.measurement_noise;
        let gain = self.covariance / innovation_covariance;
        let residual = measured_soc - self.state;

        self.state = (self.state + gain * residual).clamp(SOC_MIN, SOC_MAX);
        self.covariance *= 1.0 - gain;

        self.last_innovation = Some(residual);
        self.last_gain = Some(gain);
        self.update_count = self.update_count.saturating_add(1);
    }

    fn soc(&self) -> f64 {
        self.state
    }

    fn covariance(&self) -> f64 {
        self.covariance
    }

    fn reset(&mut self, soc: f64) {
        self.state = soc.clamp(SOC_MIN, SOC_MAX);
        self.covariance = self.config.initial_covariance;
        self.last_innovation = None;
        self.last_gain = None;
        self.update_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EstimatorError;
    use approx::assert_abs_diff_eq;

    fn filter(initial_soc: f64) -> SocKalmanFilter {
        SocKalmanFilter::new(KalmanConfig::default(), 2.0, initial_soc).unwrap()
    }

    #[test]
    fn predict_follows_coulomb_dynamics() {
        let mut kf = filter(1.0);
        kf.predict(0.5, 30.0 / 3600.0);

        assert_abs_diff_eq!(kf.soc(), 0.997917, epsilon = 1e-6);
        assert_abs_diff_eq!(kf.covariance(), 0.101, epsilon = 1e-12);
    }

    #[test]
    fn zero_length_predict_still_grows_covariance() {
        let mut kf = filter(0.5);
        kf.predict(1.0, 0.0);
        assert_eq!(kf.soc(), 0.5);
        assert_abs_diff_eq!(kf.covariance(), 0.101, epsilon = 1e-12);
    }

    #[test]
    fn update_moves_toward_measurement() {
        let mut kf = filter(0.5);
        kf.predict(0.0, 0.0);
        kf.update(0.9);

        // P = 0.101, S = 0.111, K ≈ 0.90991
        let gain = 0.101 / 0.111;
        assert_abs_diff_eq!(kf.last_gain().unwrap(), gain, epsilon = 1e-12);
        assert_abs_diff_eq!(kf.last_innovation().unwrap(), 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(kf.soc(), 0.5 + gain * 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(kf.covariance(), (1.0 - gain) * 0.101, epsilon = 1e-12);
        assert_eq!(kf.update_count(), 1);
    }

    #[test]
    fn covariance_grows_without_updates() {
        let mut kf = filter(0.6);
        let mut previous = kf.covariance();
        for _ in 0..1000 {
            kf.predict(0.1, 1.0 / 3600.0);
            assert!(kf.covariance() > previous);
            previous = kf.covariance();
        }
        assert_abs_diff_eq!(kf.covariance(), 0.1 + 1000.0 * 0.001, epsilon = 1e-9);
    }

    #[test]
    fn repeated_updates_converge() {
        let mut kf = filter(0.2);
        for _ in 0..50 {
            kf.predict(0.0, 0.0);
            kf.update(0.9);
        }
        assert_abs_diff_eq!(kf.soc(), 0.9, epsilon = 1e-3);
        // Steady state P solves P = (P + q)·r / (P + q + r)
        assert!(kf.covariance() < 0.003);
    }

    #[test]
    fn state_stays_clamped() {
        let mut kf = filter(0.01);
        kf.predict(10.0, 1.0);
        assert_eq!(kf.soc(), 0.0);

        kf.predict(-100.0, 1.0);
        assert_eq!(kf.soc(), 1.0);
    }

    #[test]
    fn reset_restores_initial_covariance() {
        let mut kf = filter(0.4);
        kf.predict(0.0, 0.0);
        kf.update(1.0);
        kf.reset(0.7);
        assert_eq!(kf.soc(), 0.7);
        assert_eq!(kf.covariance(), 0.1);
        assert_eq!(kf.last_gain(), None);
        assert_eq!(kf.update_count(), 0);
    }

    #[test]
    fn non_positive_noise_rejected() {
        let config = KalmanConfig::default().with_measurement_noise(0.0);
        assert_eq!(
            SocKalmanFilter::new(config, 2.0, 0.5),
            Err(EstimatorError::InvalidConfig { reason: "measurement noise must be positive" })
        );

        let config = KalmanConfig::default().with_process_noise(-0.001);
        assert!(SocKalmanFilter::new(config, 2.0, 0.5).is_err());
    }
}
