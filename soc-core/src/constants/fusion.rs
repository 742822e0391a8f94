//! Fusion Constants
//!
//! Kalman filter tuning and the blend weights used to combine the Coulomb
//! and filtered SOC tracks.

// ===== KALMAN TUNING =====

/// Process noise variance added on every predict (SOC²).
///
/// Models drift of the Coulomb-counting dynamics: current sensor offset,
/// capacity error, self-discharge.
pub const DEFAULT_PROCESS_NOISE: f64 = 0.001;

/// Measurement noise variance of the OCV-derived SOC (SOC²).
///
/// Terminal voltage under load is only a rough proxy for OCV, so the
/// measurement is trusted roughly ten times less than one predict step.
pub const DEFAULT_MEASUREMENT_NOISE: f64 = 0.01;

/// Initial error covariance of the filtered SOC (SOC²).
pub const DEFAULT_INITIAL_COVARIANCE: f64 = 0.1;

// ===== BLEND WEIGHTS =====

/// Weight of the Coulomb track while OCV is unreliable (plateau).
pub const PLATEAU_COULOMB_WEIGHT: f64 = 0.7;

/// Weight of the filtered track while OCV is unreliable (plateau).
pub const PLATEAU_FILTERED_WEIGHT: f64 = 0.3;

/// Weight of the Coulomb track while OCV is usable (knees).
pub const KNEE_COULOMB_WEIGHT: f64 = 0.2;

/// Weight of the filtered track while OCV is usable (knees).
pub const KNEE_FILTERED_WEIGHT: f64 = 0.8;

/// Tolerance when checking that a pair of blend weights sums to one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;
