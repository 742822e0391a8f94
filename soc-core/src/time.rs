//! Time handling for the sample stream
//!
//! The estimator never reads a clock itself. It only sees the timestamps
//! attached to samples and turns consecutive pairs into elapsed hours.
//! Clock sources here are for the code that *produces* samples:
//! - Monotonic time since start (interactive or live sampling)
//! - Fixed time (tests, replay)

use crate::constants::time::MS_PER_HOUR;

/// Timestamp in milliseconds (since epoch, or since start for monotonic sources)
pub type Timestamp = u64;

/// Hours elapsed between two timestamps.
///
/// Returns `None` when `current` precedes `previous`; the subtraction is never
/// attempted in that case. Equal timestamps yield exactly `0.0`.
pub fn elapsed_hours(previous: Timestamp, current: Timestamp) -> Option<f64> {
    if current < previous {
        return None;
    }
    Some((current - previous) as f64 / MS_PER_HOUR as f64)
}

/// Source of time for sample producers
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}

/// Monotonic time source, zero at construction (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct MonotonicTime {
    start: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicTime {
    /// Start counting from now
    pub fn new() -> Self {
        Self { start: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for MonotonicTime {
    fn now(&self) -> Timestamp {
        self.start.elapsed().as_millis() as Timestamp
    }
}

/// Fixed time source for testing and replay
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Create a source frozen at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Move forward by `ms` milliseconds
    pub fn advance(&mut self, ms: u64) {
        self.timestamp += ms;
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_time_advances() {
        let mut time = FixedTime::new(1000);
        assert_eq!(time.now(), 1000);

        time.advance(500);
        assert_eq!(time.now(), 1500);
    }

    #[test]
    fn thirty_seconds_in_hours() {
        let dt = elapsed_hours(0, 30_000).unwrap();
        assert!((dt - 30.0 / 3600.0).abs() < 1e-12);
    }

    #[test]
    fn equal_timestamps_are_zero_hours() {
        assert_eq!(elapsed_hours(5_000, 5_000), Some(0.0));
    }

    #[test]
    fn regression_is_rejected() {
        assert_eq!(elapsed_hours(5_000, 4_999), None);
    }

    #[cfg(feature = "std")]
    #[test]
    fn monotonic_time_never_goes_backwards() {
        let clock = MonotonicTime::new();
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
