//! Battery Constants
//!
//! Voltage limits and OCV curve breakpoints for a single 3.7 V nominal
//! lithium-ion cell.

// ===== STATE OF CHARGE LIMITS =====

/// Lower bound of state of charge (fully depleted).
pub const SOC_MIN: f64 = 0.0;

/// Upper bound of state of charge (fully charged).
pub const SOC_MAX: f64 = 1.0;

// ===== VOLTAGE LIMITS =====

/// Terminal voltage of a fully charged cell (V).
///
/// CC/CV charge termination voltage for standard Li-ion chemistry.
/// At or above this voltage the OCV model reports SOC = 1.0.
pub const DEFAULT_FULL_CHARGE_VOLTAGE_V: f64 = 4.2;

/// Terminal voltage of an empty cell (V).
///
/// Typical discharge cut-off. At or below this voltage the OCV model
/// reports SOC = 0.0.
pub const DEFAULT_EMPTY_VOLTAGE_V: f64 = 3.0;

/// Nominal cell voltage (V).
///
/// Mid-plateau resting voltage, used as the initial voltage when none is
/// configured.
pub const NOMINAL_CELL_VOLTAGE_V: f64 = 3.7;

// ===== OCV CURVE BREAKPOINTS =====

/// Upper knee of the OCV curve (V).
///
/// Above this voltage the curve is steep enough for voltage to carry SOC
/// information. Fixed, independent of the configurable flat-region fields.
pub const UPPER_KNEE_VOLTAGE_V: f64 = 4.0;

/// Lower knee of the OCV curve (V).
///
/// Below this voltage the curve steepens again towards empty. Fixed,
/// independent of the configurable flat-region fields.
pub const LOWER_KNEE_VOLTAGE_V: f64 = 3.4;

/// SOC at the upper knee.
pub const UPPER_KNEE_SOC: f64 = 0.8;

/// SOC at the lower knee.
pub const LOWER_KNEE_SOC: f64 = 0.2;

/// Lower edge of the flat region, as a fraction of SOC.
///
/// Stored alongside the OCV parameters but not consulted by the lookup,
/// which uses the fixed voltage knees above.
pub const DEFAULT_FLAT_REGION_LOW: f64 = 0.2;

/// Upper edge of the flat region, as a fraction of SOC.
///
/// Stored alongside the OCV parameters but not consulted by the lookup.
pub const DEFAULT_FLAT_REGION_HIGH: f64 = 0.8;

// ===== CELL DEFAULTS =====

/// Default nominal capacity (Ah).
///
/// Common 18650 cell rating.
pub const DEFAULT_NOMINAL_CAPACITY_AH: f64 = 2.0;

/// Default initial state of charge when the cell state is unknown.
pub const DEFAULT_INITIAL_SOC: f64 = 0.5;
