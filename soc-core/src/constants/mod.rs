//! Constants for the SOC estimator
//!
//! All numeric values used by the estimator live here, grouped by domain,
//! with their unit in the name.
//!
//! ## Organization
//!
//! - **Battery**: OCV curve breakpoints, voltage limits, capacity defaults
//! - **Fusion**: Kalman noise tuning and blend weights
//! - **Time**: Unit conversions for the millisecond timestamp model

/// OCV curve breakpoints and cell defaults.
pub mod battery;

/// Kalman filter tuning and fusion blend weights.
pub mod fusion;

/// Time unit conversions.
pub mod time;

pub use battery::{
    DEFAULT_FULL_CHARGE_VOLTAGE_V, DEFAULT_EMPTY_VOLTAGE_V,
    UPPER_KNEE_VOLTAGE_V, LOWER_KNEE_VOLTAGE_V,
    SOC_MIN, SOC_MAX,
};

pub use fusion::{
    DEFAULT_PROCESS_NOISE, DEFAULT_MEASUREMENT_NOISE, DEFAULT_INITIAL_COVARIANCE,
};

pub use time::{MS_PER_SECOND, MS_PER_HOUR};
