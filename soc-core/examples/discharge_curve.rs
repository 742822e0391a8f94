//! Constant-Current Discharge Example
//!
//! Drives the estimator through a 0.5 A discharge of a 2 Ah cell from
//! 4.20 V down to 3.00 V and prints both SOC tracks next to the blended
//! result.
//!
//! ## What You'll See
//!
//! - Upper knee (4.2 → 4.0 V): the filter is corrected by the OCV lookup
//! - Plateau (4.0 → 3.4 V): no usable voltage, both tracks fall together
//! - Lower knee (below 3.4 V): the filter is dragged toward empty while
//!   Coulomb counting still believes the cell is mostly full
//!
//! ## Running the Example
//!
//! ```bash
//! RUST_LOG=debug cargo run --example discharge_curve
//! ```

use soc_core::{EstimatorError, OcvEstimate, SocEstimator};

/// `(current A, voltage V, seconds since previous sample)`
const MEASUREMENTS: &[(f64, f64, u64)] = &[
    // Upper knee
    (0.5, 4.20, 10), (0.5, 4.15, 10), (0.5, 4.10, 10), (0.5, 4.05, 10), (0.5, 4.00, 10),
    // Plateau
    (0.5, 3.95, 30), (0.5, 3.90, 30), (0.5, 3.85, 30), (0.5, 3.80, 30), (0.5, 3.78, 30),
    (0.5, 3.76, 30), (0.5, 3.75, 30), (0.5, 3.74, 30), (0.5, 3.73, 30), (0.5, 3.72, 30),
    (0.5, 3.71, 30), (0.5, 3.70, 30), (0.5, 3.69, 30), (0.5, 3.68, 30), (0.5, 3.67, 30),
    (0.5, 3.66, 30), (0.5, 3.65, 30), (0.5, 3.64, 30), (0.5, 3.63, 30), (0.5, 3.62, 30),
    (0.5, 3.61, 30), (0.5, 3.60, 30),
    // Lower knee
    (0.5, 3.55, 10), (0.5, 3.50, 10), (0.5, 3.45, 10), (0.5, 3.40, 10), (0.5, 3.35, 10),
    (0.5, 3.30, 10), (0.5, 3.25, 10), (0.5, 3.20, 10), (0.5, 3.15, 10), (0.5, 3.10, 10),
    (0.5, 3.05, 10), (0.5, 3.00, 10),
];

fn main() -> Result<(), EstimatorError> {
    println!("SOC Fusion Discharge Example");
    println!("============================\n");

    let mut estimator = SocEstimator::new(2.0, 1.0, 4.2)?;

    println!("{:>6}  {:>7}  {:>7}  {:>8}  {:>8}  {:>8}  {:>5}",
        "t (s)", "I (A)", "V (V)", "SOC CC", "SOC KF", "SOC", "OCV");

    let mut elapsed_s = 0u64;
    for &(current, voltage, dt_s) in MEASUREMENTS {
        elapsed_s += dt_s;
        let report = estimator.step_detailed(current, voltage, elapsed_s * 1000)?;
        let ocv = match report.ocv {
            OcvEstimate::Soc(_) => "used",
            OcvEstimate::Unreliable => "-",
        };
        println!(
            "{:>6}  {:>7.2}  {:>7.2}  {:>7.2}%  {:>7.2}%  {:>7.2}%  {:>5}",
            elapsed_s,
            current,
            voltage,
            report.coulomb_soc * 100.0,
            report.filtered_soc * 100.0,
            report.reported_soc * 100.0,
            ocv,
        );
    }

    println!();
    println!("Charge drawn:       {:.4} Ah", estimator.cumulative_charge_ah());
    println!("Remaining (filter): {:.4} Ah", estimator.remaining_capacity_ah());
    println!("Covariance:         {:.5}", estimator.covariance());

    Ok(())
}
