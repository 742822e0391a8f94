//! SOC Fusion: Kalman Filtering and Track Blending
//!
//! ## Overview
//!
//! Two SOC tracks run side by side:
//!
//! ```text
//!  current ──┬──→ Coulomb counter ─────────────────┐
//!            │                                     ├─→ FusionPolicy ─→ reported SOC
//!            └──→ Kalman predict ─→ Kalman update ─┘
//!                                       ↑
//!  voltage ────→ OCV model ─────────────┘ (only off the plateau)
//! ```
//!
//! The Kalman filter uses exactly the Coulomb-counting dynamics for its
//! prediction, so on the plateau, with no usable measurement, it degenerates
//! to Coulomb counting with ever-growing covariance. Off the plateau it is
//! pulled toward the OCV lookup.
//!
//! ## Scalar Kalman Filter
//!
//! ```text
//! Predict:   x̂ = clip(x − I·Δt/Q, 0, 1)
//!            P = P + q
//! Update:    S = P + r
//!            K = P / S
//!            x̂ = x̂ + K·(z − x̂)
//!            P = (1 − K)·P
//! ```
//!
//! The state is one-dimensional, so the matrix algebra collapses to plain
//! `f64` arithmetic. The [`SocFilter`] trait is the seam to swap in a larger
//! state (e.g. SOC plus internal resistance) without touching the estimator.
//!
//! ## Blending
//!
//! [`FusionPolicy`] picks one of two weight pairs depending on whether the OCV
//! lookup was usable on this cycle:
//!
//! | Regime   | Coulomb | Filtered |
//! |----------|---------|----------|
//! | Plateau  | 0.7     | 0.3      |
//! | Knees    | 0.2     | 0.8      |

pub mod kalman;
pub mod policy;

// Re-export main types
pub use kalman::{KalmanConfig, SocKalmanFilter};
pub use policy::{BlendWeights, FusionPolicy};

/// State estimator driven by the same inputs as the Coulomb counter
///
/// ## Contract
///
/// Implementations must:
/// 1. Keep [`soc`](SocFilter::soc) within `[0, 1]` after every call
/// 2. Never panic on finite inputs
/// 3. Run in constant time without allocation
pub trait SocFilter {
    /// Propagate the state over `dt_hours` of `current_a` (positive = discharge)
    fn predict(&mut self, current_a: f64, dt_hours: f64);

    /// Correct the state with a measured SOC
    fn update(&mut self, measured_soc: f64);

    /// Current SOC estimate
    fn soc(&self) -> f64;

    /// Error covariance of the SOC estimate
    fn covariance(&self) -> f64;

    /// Restart from `soc` with the initial covariance
    fn reset(&mut self, soc: f64);
}
