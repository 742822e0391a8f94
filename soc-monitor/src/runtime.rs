//! Time-to-discharge estimate
//!
//! The charger is assumed to have pushed `charger_current_a` for
//! `charge_time_s` seconds; that charge is what the load will draw down:
//!
//! ```text
//! capacity_ah = charge_time_s · I_charger / 3600
//! remaining_s = capacity_ah / I_load · 3600      (∞ with no load)
//! ```

use soc_core::constants::time::SECONDS_PER_HOUR;

/// Charge delivered by the charger (Ah)
pub fn observed_capacity_ah(charge_time_s: f64, charger_current_a: f64) -> f64 {
    charge_time_s * charger_current_a / SECONDS_PER_HOUR as f64
}

/// Seconds until the observed capacity is drained by `load_current_a`
///
/// Returns `f64::INFINITY` when the load draws nothing.
pub fn remaining_time_s(charge_time_s: f64, charger_current_a: f64, load_current_a: f64) -> f64 {
    if load_current_a > 0.0 {
        observed_capacity_ah(charge_time_s, charger_current_a) / load_current_a * SECONDS_PER_HOUR as f64
    } else {
        f64::INFINITY
    }
}
