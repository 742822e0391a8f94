//! Shared fixtures for soc-core integration tests
//!
//! Provides the reference constant-current discharge of a 2 Ah cell from
//! 4.20 V down to 3.00 V, plus helpers to build and drive estimators.

#![allow(dead_code)]

use soc_core::{Sample, SocEstimator, StepReport, Timestamp};

/// Start of every fixture trace (ms)
pub const START_MS: Timestamp = 1_700_000_000_000;

/// Discharge current used throughout the reference trace (A)
pub const DISCHARGE_A: f64 = 0.5;

/// Nominal capacity of the reference cell (Ah)
pub const CAPACITY_AH: f64 = 2.0;

/// `(voltage V, seconds since previous sample)`
///
/// 10 s steps through the upper knee, 30 s across the plateau, 10 s down the
/// lower knee.
const DISCHARGE_STEPS: [(f64, u64); 39] = [
    (4.20, 10), (4.15, 10), (4.10, 10), (4.05, 10), (4.00, 10),
    (3.95, 30), (3.90, 30), (3.85, 30), (3.80, 30), (3.78, 30),
    (3.76, 30), (3.75, 30), (3.74, 30), (3.73, 30), (3.72, 30),
    (3.71, 30), (3.70, 30), (3.69, 30), (3.68, 30), (3.67, 30),
    (3.66, 30), (3.65, 30), (3.64, 30), (3.63, 30), (3.62, 30),
    (3.61, 30), (3.60, 30),
    (3.55, 10), (3.50, 10), (3.45, 10), (3.40, 10), (3.35, 10),
    (3.30, 10), (3.25, 10), (3.20, 10), (3.15, 10), (3.10, 10),
    (3.05, 10), (3.00, 10),
];

/// Reference discharge trace
pub fn discharge_curve() -> Vec<Sample> {
    let mut t = START_MS;
    DISCHARGE_STEPS
        .iter()
        .map(|&(voltage, dt_s)| {
            t += dt_s * 1000;
            Sample::new(t, DISCHARGE_A, voltage)
        })
        .collect()
}

/// Time spanned by the reference trace (ms)
pub fn total_duration_ms() -> u64 {
    DISCHARGE_STEPS.iter().map(|&(_, dt)| dt * 1000).sum()
}

/// Estimator for a full reference cell
pub fn full_cell() -> SocEstimator {
    SocEstimator::new(CAPACITY_AH, 1.0, 4.2).unwrap()
}

/// Feed every sample, collecting the per-cycle reports
pub fn run(estimator: &mut SocEstimator, samples: &[Sample]) -> Vec<StepReport> {
    samples
        .iter()
        .map(|s| estimator.step_detailed(s.current_a, s.voltage_v, s.timestamp).unwrap())
        .collect()
}

/// True if the voltage sits on the flat plateau of the default curve
pub fn on_plateau(voltage: f64) -> bool {
    (3.4..=4.0).contains(&voltage)
}
