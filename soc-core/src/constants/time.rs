//! Time-Related Constants
//!
//! Conversion factors for the millisecond timestamp model.

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Seconds per minute.
pub const SECONDS_PER_MINUTE: u64 = 60;

/// Minutes per hour.
pub const MINUTES_PER_HOUR: u64 = 60;

/// Seconds per hour.
pub const SECONDS_PER_HOUR: u64 = SECONDS_PER_MINUTE * MINUTES_PER_HOUR;

/// Milliseconds per hour.
///
/// Divisor turning a millisecond delta into the hours the Coulomb counter
/// integrates over.
pub const MS_PER_HOUR: u64 = MS_PER_SECOND * SECONDS_PER_HOUR;
