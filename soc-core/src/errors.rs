//! Error Types for the SOC Estimator
//!
//! ## Design Philosophy
//!
//! The estimator runs inside a battery-management control loop, so its
//! errors follow the same rules as the rest of the hot path:
//!
//! 1. **Small Size**: every variant carries at most two `f64`/`u64` fields.
//!
//! 2. **No Heap Allocation**: messages are `&'static str`, never `String`.
//!
//! 3. **Copy Semantics**: errors are `Copy` so they can be logged, stored and
//!    returned without ownership gymnastics.
//!
//! 4. **No Partial Updates**: every error raised by [`SocEstimator::step`]
//!    is detected before the first field is written. The caller can retry
//!    with a corrected sample against exactly the same state.
//!
//! ## Error Categories
//!
//! ### Construction
//! - `InvalidCapacity`: nominal capacity is zero, negative or not finite
//! - `InvalidSoc`: initial SOC outside `[0, 1]`
//! - `InvalidConfig`: noise tuning, OCV parameters or blend weights violate
//!   their invariants
//!
//! ### Per-sample
//! - `ClockRegression`: timestamp earlier than the previous sample
//! - `InvalidSample`: current or voltage is NaN or infinite
//!
//! Out-of-range intermediate SOC values are *not* errors. Model inaccuracy
//! is expected and the policy is to clamp into `[0, 1]` silently.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use soc_core::{EstimatorError, SocEstimator};
//!
//! fn on_sample(est: &mut SocEstimator, current: f64, voltage: f64, t: u64) -> Option<f64> {
//!     match est.step(current, voltage, t) {
//!         Ok(soc) => Some(soc),
//!         Err(EstimatorError::ClockRegression { .. }) => {
//!             // Sensor timestamp jumped backwards - drop the sample
//!             None
//!         }
//!         Err(EstimatorError::InvalidSample) => {
//!             // ADC glitch - skip this cycle
//!             None
//!         }
//!         Err(_) => None,
//!     }
//! }
//! ```
//!
//! [`SocEstimator::step`]: crate::SocEstimator::step

use thiserror_no_std::Error;

use crate::time::Timestamp;

/// Result type for estimator operations
pub type EstimatorResult<T> = Result<T, EstimatorError>;

/// Estimator errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum EstimatorError {
    /// Nominal capacity must be strictly positive and finite
    #[error("Invalid nominal capacity {capacity_ah} Ah (must be > 0)")]
    InvalidCapacity {
        /// The rejected capacity in ampere-hours
        capacity_ah: f64,
    },

    /// State of charge outside the unit interval
    #[error("Invalid state of charge {soc} (must be within [0, 1])")]
    InvalidSoc {
        /// The rejected state of charge
        soc: f64,
    },

    /// Sample timestamp is earlier than the previous one
    #[error("Clock regression: sample at {current} ms precedes previous sample at {previous} ms")]
    ClockRegression {
        /// Timestamp of the last accepted sample (ms)
        previous: Timestamp,
        /// Timestamp of the rejected sample (ms)
        current: Timestamp,
    },

    /// Current or voltage is not a finite number
    #[error("Invalid sample: current and voltage must be finite")]
    InvalidSample,

    /// Tuning parameters violate their invariants
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Which invariant was violated
        reason: &'static str,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for EstimatorError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvalidCapacity { capacity_ah } =>
                defmt::write!(fmt, "Invalid capacity {} Ah", capacity_ah),
            Self::InvalidSoc { soc } =>
                defmt::write!(fmt, "Invalid SOC {}", soc),
            Self::ClockRegression { previous, current } =>
                defmt::write!(fmt, "Clock regression {} -> {} ms", previous, current),
            Self::InvalidSample =>
                defmt::write!(fmt, "Invalid sample"),
            Self::InvalidConfig { reason } =>
                defmt::write!(fmt, "Invalid config: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_are_small() {
        // Two u64 payload fields plus discriminant
        assert!(core::mem::size_of::<EstimatorError>() <= 24);
    }

    #[cfg(feature = "std")]
    #[test]
    fn clock_regression_message_names_both_timestamps() {
        let err = EstimatorError::ClockRegression { previous: 2000, current: 1500 };
        let msg = err.to_string();
        assert!(msg.contains("1500"));
        assert!(msg.contains("2000"));
    }
}
