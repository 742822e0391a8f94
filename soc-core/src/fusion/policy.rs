//! Blend policy combining the Coulomb and filtered SOC tracks
//!
//! ```text
//! fused = w_c·soc_coulomb + w_f·soc_filtered,   w_c + w_f = 1
//! ```
//!
//! With both inputs in `[0, 1]` and non-negative weights summing to one, the
//! result is a convex combination and stays in `[0, 1]` without clamping.

use crate::{
    constants::fusion::{
        KNEE_COULOMB_WEIGHT, KNEE_FILTERED_WEIGHT, PLATEAU_COULOMB_WEIGHT,
        PLATEAU_FILTERED_WEIGHT, WEIGHT_SUM_TOLERANCE,
    },
    errors::{EstimatorError, EstimatorResult},
};

/// One pair of blend weights
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlendWeights {
    /// Weight of the Coulomb-counting track
    pub coulomb: f64,
    /// Weight of the Kalman-filtered track
    pub filtered: f64,
}

impl BlendWeights {
    /// Create a weight pair
    pub const fn new(coulomb: f64, filtered: f64) -> Self {
        Self { coulomb, filtered }
    }

    /// Weighted sum of the two tracks
    pub fn blend(&self, soc_coulomb: f64, soc_filtered: f64) -> f64 {
        self.coulomb * soc_coulomb + self.filtered * soc_filtered
    }

    fn validate(&self) -> EstimatorResult<()> {
        let in_unit = |w: f64| (0.0..=1.0).contains(&w);
        if !in_unit(self.coulomb) || !in_unit(self.filtered) {
            return Err(EstimatorError::InvalidConfig {
                reason: "blend weights must lie within [0, 1]",
            });
        }
        if libm::fabs(self.coulomb + self.filtered - 1.0) > WEIGHT_SUM_TOLERANCE {
            return Err(EstimatorError::InvalidConfig {
                reason: "blend weights must sum to 1",
            });
        }
        Ok(())
    }
}

/// Selects blend weights by OCV usability
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FusionPolicy {
    /// Weights while the OCV lookup is unreliable (flat plateau)
    pub plateau: BlendWeights,
    /// Weights while the OCV lookup is usable (knees and limits)
    pub knee: BlendWeights,
}

impl Default for FusionPolicy {
    fn default() -> Self {
        Self {
            plateau: BlendWeights::new(PLATEAU_COULOMB_WEIGHT, PLATEAU_FILTERED_WEIGHT),
            knee: BlendWeights::new(KNEE_COULOMB_WEIGHT, KNEE_FILTERED_WEIGHT),
        }
    }
}

impl FusionPolicy {
    /// Check both weight pairs are convex
    pub fn validate(&self) -> EstimatorResult<()> {
        self.plateau.validate()?;
        self.knee.validate()
    }

    /// Weights for this cycle
    pub fn weights(&self, ocv_usable: bool) -> BlendWeights {
        if ocv_usable {
            self.knee
        } else {
            self.plateau
        }
    }

    /// Combine the two tracks into the reported SOC
    pub fn combine(&self, soc_coulomb: f64, soc_filtered: f64, ocv_usable: bool) -> f64 {
        self.weights(ocv_usable).blend(soc_coulomb, soc_filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn plateau_favours_coulomb() {
        let policy = FusionPolicy::default();
        let fused = policy.combine(1.0, 0.0, false);
        assert_abs_diff_eq!(fused, 0.7, epsilon = 1e-12);
    }

    #[test]
    fn knee_favours_filter() {
        let policy = FusionPolicy::default();
        let fused = policy.combine(1.0, 0.0, true);
        assert_abs_diff_eq!(fused, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn equal_tracks_pass_through() {
        let policy = FusionPolicy::default();
        assert_abs_diff_eq!(policy.combine(0.42, 0.42, true), 0.42, epsilon = 1e-12);
        assert_abs_diff_eq!(policy.combine(0.42, 0.42, false), 0.42, epsilon = 1e-12);
    }

    #[test]
    fn default_policy_is_valid() {
        assert!(FusionPolicy::default().validate().is_ok());
    }

    #[test]
    fn non_convex_weights_rejected() {
        let policy = FusionPolicy {
            plateau: BlendWeights::new(0.7, 0.7),
            ..FusionPolicy::default()
        };
        assert_eq!(
            policy.validate(),
            Err(EstimatorError::InvalidConfig { reason: "blend weights must sum to 1" })
        );

        let policy = FusionPolicy {
            knee: BlendWeights::new(1.5, -0.5),
            ..FusionPolicy::default()
        };
        assert!(policy.validate().is_err());
    }
}
