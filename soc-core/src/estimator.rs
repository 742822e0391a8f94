//! SOC estimator: the per-sample update cycle
//!
//! ## Update Cycle
//!
//! ```text
//! step(I, V, t)
//!   1. Δt  = t − t_prev  (0 on first sample, ClockRegression if negative)
//!   2. t_prev = t, V_last = V
//!   3. Coulomb counter integrates I over Δt
//!   4. Kalman predict(I, Δt); OCV lookup(V); if usable → Kalman update
//!   5. reported = policy.combine(soc_coulomb, soc_filtered, usable)
//! ```
//!
//! Every check that can fail runs before step 2, so a rejected sample leaves
//! the estimator untouched.
//!
//! ## Concurrency
//!
//! `step` takes `&mut self`; the borrow checker serialises callers. The
//! estimator holds only plain values, so it can move between threads, but
//! sharing one across threads needs external locking.

use crate::{
    checks,
    constants::battery::{
        DEFAULT_INITIAL_SOC, DEFAULT_NOMINAL_CAPACITY_AH, NOMINAL_CELL_VOLTAGE_V,
    },
    coulomb::CoulombCounter,
    errors::{EstimatorError, EstimatorResult},
    fusion::{FusionPolicy, KalmanConfig, SocFilter, SocKalmanFilter},
    ocv::{OcvEstimate, OcvModel, OcvParams},
    time::{self, Timestamp},
};

/// Estimator configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EstimatorConfig {
    /// Nominal cell capacity (Ah), must be > 0
    pub nominal_capacity_ah: f64,
    /// Starting SOC for both tracks, within `[0, 1]`
    pub initial_soc: f64,
    /// Terminal voltage before the first sample (V)
    pub initial_voltage: f64,
    /// Kalman filter tuning
    pub kalman: KalmanConfig,
    /// OCV curve parameters
    pub ocv: OcvParams,
    /// Blend weights
    pub policy: FusionPolicy,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            nominal_capacity_ah: DEFAULT_NOMINAL_CAPACITY_AH,
            initial_soc: DEFAULT_INITIAL_SOC,
            initial_voltage: NOMINAL_CELL_VOLTAGE_V,
            kalman: KalmanConfig::default(),
            ocv: OcvParams::default(),
            policy: FusionPolicy::default(),
        }
    }
}

impl EstimatorConfig {
    /// Configuration for a cell with default tuning
    pub fn new(nominal_capacity_ah: f64, initial_soc: f64, initial_voltage: f64) -> Self {
        Self {
            nominal_capacity_ah,
            initial_soc,
            initial_voltage,
            ..Self::default()
        }
    }

    /// Set Kalman tuning
    pub fn with_kalman(mut self, kalman: KalmanConfig) -> Self {
        self.kalman = kalman;
        self
    }

    /// Set OCV curve parameters
    pub fn with_ocv(mut self, ocv: OcvParams) -> Self {
        self.ocv = ocv;
        self
    }

    /// Set blend weights
    pub fn with_policy(mut self, policy: FusionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Check every invariant; capacity and SOC errors take precedence
    pub fn validate(&self) -> EstimatorResult<()> {
        checks::check_capacity(self.nominal_capacity_ah)?;
        checks::check_soc(self.initial_soc)?;
        checks::check_initial_voltage(self.initial_voltage)?;
        self.kalman.validate()?;
        self.ocv.validate()?;
        self.policy.validate()
    }
}

/// Everything one cycle produced
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepReport {
    /// Blended SOC
    pub reported_soc: f64,
    /// Coulomb-counting track
    pub coulomb_soc: f64,
    /// Kalman-filtered track
    pub filtered_soc: f64,
    /// OCV lookup for this sample's voltage
    pub ocv: OcvEstimate,
    /// Elapsed time integrated on this cycle (h)
    pub dt_hours: f64,
    /// Filter covariance after this cycle
    pub covariance: f64,
    /// Signed charge integrated so far (Ah)
    pub cumulative_charge_ah: f64,
}

/// Dual-track SOC estimator
///
/// Generic over the filter so the state can grow beyond SOC; the default is
/// the scalar [`SocKalmanFilter`].
#[derive(Debug, Clone)]
pub struct SocEstimator<F: SocFilter = SocKalmanFilter> {
    coulomb: CoulombCounter,
    filter: F,
    ocv: OcvModel,
    policy: FusionPolicy,
    last_sample_time: Option<Timestamp>,
    last_voltage: f64,
    /// Usability of the previous OCV lookup, for regime-change logging
    last_ocv_usable: Option<bool>,
}

impl SocEstimator {
    /// Create an estimator with default tuning
    ///
    /// Fails with `InvalidCapacity` if `nominal_capacity_ah ≤ 0` and
    /// `InvalidSoc` if `initial_soc` is outside `[0, 1]`.
    pub fn new(nominal_capacity_ah: f64, initial_soc: f64, initial_voltage: f64) -> EstimatorResult<Self> {
        Self::with_config(EstimatorConfig::new(nominal_capacity_ah, initial_soc, initial_voltage))
    }

    /// Create an estimator from a full configuration
    pub fn with_config(config: EstimatorConfig) -> EstimatorResult<Self> {
        config.validate()?;
        let filter = SocKalmanFilter::new(config.kalman, config.nominal_capacity_ah, config.initial_soc)?;
        Self::with_filter(config, filter)
    }
}

impl<F: SocFilter> SocEstimator<F> {
    /// Create an estimator around a custom filter
    ///
    /// The filter should already be initialised to `config.initial_soc`.
    pub fn with_filter(config: EstimatorConfig, filter: F) -> EstimatorResult<Self> {
        config.validate()?;
        Ok(Self {
            coulomb: CoulombCounter::new(config.nominal_capacity_ah, config.initial_soc)?,
            filter,
            ocv: OcvModel::new(config.ocv)?,
            policy: config.policy,
            last_sample_time: None,
            last_voltage: config.initial_voltage,
            last_ocv_usable: None,
        })
    }

    /// Process one sample and return the reported SOC
    pub fn step(&mut self, current_a: f64, voltage_v: f64, timestamp: Timestamp) -> EstimatorResult<f64> {
        self.step_detailed(current_a, voltage_v, timestamp)
            .map(|report| report.reported_soc)
    }

    /// Process one sample and return every intermediate value
    pub fn step_detailed(
        &mut self,
        current_a: f64,
        voltage_v: f64,
        timestamp: Timestamp,
    ) -> EstimatorResult<StepReport> {
        if !current_a.is_finite() || !voltage_v.is_finite() {
            log_warn!("Rejected sample at {} ms: non-finite reading", timestamp);
            return Err(EstimatorError::InvalidSample);
        }

        let dt_hours = match self.last_sample_time {
            None => 0.0,
            Some(previous) => match time::elapsed_hours(previous, timestamp) {
                Some(dt) => dt,
                None => {
                    log_warn!("Rejected sample: clock went back from {} to {} ms", previous, timestamp);
                    return Err(EstimatorError::ClockRegression { previous, current: timestamp });
                }
            },
        };

        // Nothing below can fail
        self.last_sample_time = Some(timestamp);
        self.last_voltage = voltage_v;

        self.coulomb.integrate(current_a, dt_hours);

        self.filter.predict(current_a, dt_hours);
        let ocv = self.ocv.estimate(voltage_v);
        if let OcvEstimate::Soc(measured) = ocv {
            self.filter.update(measured);
        }
        self.note_regime(ocv.is_usable(), voltage_v);

        let reported_soc = self.policy.combine(self.coulomb.soc(), self.filter.soc(), ocv.is_usable());

        log_trace!(
            "t={} ms I={:.3} A V={:.3} V dt={:.6} h cc={:.4} kf={:.4} P={:.5} soc={:.4}",
            timestamp, current_a, voltage_v, dt_hours,
            self.coulomb.soc(), self.filter.soc(), self.filter.covariance(), reported_soc
        );

        Ok(StepReport {
            reported_soc,
            coulomb_soc: self.coulomb.soc(),
            filtered_soc: self.filter.soc(),
            ocv,
            dt_hours,
            covariance: self.filter.covariance(),
            cumulative_charge_ah: self.coulomb.cumulative_charge_ah(),
        })
    }

    /// Restart both tracks from a known SOC, keeping capacity and tuning
    ///
    /// Clears the sample clock, so the next sample integrates nothing.
    pub fn reset(&mut self, initial_soc: f64, initial_voltage: f64) -> EstimatorResult<()> {
        checks::check_soc(initial_soc)?;
        checks::check_initial_voltage(initial_voltage)?;
        self.coulomb.reset(initial_soc)?;
        self.filter.reset(initial_soc);
        self.last_sample_time = None;
        self.last_voltage = initial_voltage;
        self.last_ocv_usable = None;
        Ok(())
    }

    fn note_regime(&mut self, usable: bool, voltage_v: f64) {
        if self.last_ocv_usable != Some(usable) {
            if usable {
                log_debug!("OCV usable at {:.3} V, filter corrections enabled", voltage_v);
            } else {
                log_debug!("OCV plateau at {:.3} V, leaning on Coulomb counting", voltage_v);
            }
            self.last_ocv_usable = Some(usable);
        }
    }

    /// SOC of the Coulomb-counting track
    pub fn coulomb_soc(&self) -> f64 {
        self.coulomb.soc()
    }

    /// SOC of the Kalman-filtered track
    pub fn filtered_soc(&self) -> f64 {
        self.filter.soc()
    }

    /// Most recent terminal voltage (V)
    pub fn last_voltage(&self) -> f64 {
        self.last_voltage
    }

    /// Timestamp of the last accepted sample
    pub fn last_sample_time(&self) -> Option<Timestamp> {
        self.last_sample_time
    }

    /// Signed charge integrated so far (Ah)
    pub fn cumulative_charge_ah(&self) -> f64 {
        self.coulomb.cumulative_charge_ah()
    }

    /// Filter error covariance
    pub fn covariance(&self) -> f64 {
        self.filter.covariance()
    }

    /// Nominal capacity (Ah)
    pub fn nominal_capacity_ah(&self) -> f64 {
        self.coulomb.nominal_capacity_ah()
    }

    /// Charge left according to the filtered track (Ah)
    pub fn remaining_capacity_ah(&self) -> f64 {
        self.filter.soc() * self.coulomb.nominal_capacity_ah()
    }

    /// OCV model in use
    pub fn ocv_model(&self) -> &OcvModel {
        &self.ocv
    }

    /// The underlying filter
    pub fn filter(&self) -> &F {
        &self.filter
    }
}
