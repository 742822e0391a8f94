//! Sample sources
//!
//! The estimator is driven by `(current, voltage, timestamp)` samples from
//! somewhere else: interactive prompts, a replay file, live ADC readings.
//! [`SampleSource`] is the pull-based interface those producers implement.
//! It uses `nb::Result`, so a polling control loop can tell "nothing yet"
//! apart from a real failure without an async runtime:
//!
//! ```rust
//! use soc_core::{SampleSource, SocEstimator, SourceError};
//!
//! fn drain<S: SampleSource<Error = SourceError<E>>, E>(
//!     source: &mut S,
//!     estimator: &mut SocEstimator,
//! ) -> Option<f64> {
//!     let mut last = None;
//!     loop {
//!         match source.poll_sample() {
//!             Ok(s) => last = estimator.step(s.current_a, s.voltage_v, s.timestamp).ok(),
//!             Err(nb::Error::WouldBlock) => return last, // try again next tick
//!             Err(nb::Error::Other(SourceError::EndOfStream)) => return last,
//!             Err(nb::Error::Other(_)) => return None,
//!         }
//!     }
//! }
//! ```

use core::fmt;

use crate::time::Timestamp;

/// One measurement cycle
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    /// Sample time (ms)
    #[cfg_attr(feature = "serde", serde(rename = "timestamp_ms"))]
    pub timestamp: Timestamp,
    /// Net cell current (A), positive = discharge
    pub current_a: f64,
    /// Terminal voltage (V)
    pub voltage_v: f64,
}

impl Sample {
    /// Create a sample
    pub const fn new(timestamp: Timestamp, current_a: f64, voltage_v: f64) -> Self {
        Self { timestamp, current_a, voltage_v }
    }
}

/// Errors from sample sources
#[derive(Debug, Clone, PartialEq)]
pub enum SourceError<E> {
    /// Transport-level error (e.g., I/O error)
    Transport(E),
    /// No more samples will arrive
    EndOfStream,
}

impl<E: fmt::Display> fmt::Display for SourceError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "Transport error: {}", e),
            Self::EndOfStream => write!(f, "End of stream"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug + fmt::Display> std::error::Error for SourceError<E> {}

/// Pull-based producer of samples
pub trait SampleSource {
    /// Type of errors that can occur
    type Error;

    /// Attempt to pull the next sample
    ///
    /// Returns:
    /// - `Ok(sample)` - Next sample available
    /// - `Err(nb::Error::WouldBlock)` - No sample available yet
    /// - `Err(nb::Error::Other(e))` - Source error occurred
    fn poll_sample(&mut self) -> nb::Result<Sample, Self::Error>;
}

/// Replays samples from a slice
///
/// Useful for tests, recorded traces and bench simulation.
pub struct SliceSource<'a> {
    samples: &'a [Sample],
    position: usize,
}

impl<'a> SliceSource<'a> {
    /// Create source from slice
    pub fn new(samples: &'a [Sample]) -> Self {
        Self { samples, position: 0 }
    }

    /// Reset to beginning
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Check if source is exhausted
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.samples.len()
    }
}

impl<'a> SampleSource for SliceSource<'a> {
    type Error = SourceError<()>;

    fn poll_sample(&mut self) -> nb::Result<Sample, Self::Error> {
        let sample = self
            .samples
            .get(self.position)
            .copied()
            .ok_or(nb::Error::Other(SourceError::EndOfStream))?;
        self.position += 1;
        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_source_replays_in_order() {
        let samples = [
            Sample::new(0, 0.5, 4.2),
            Sample::new(10_000, 0.5, 4.15),
        ];
        let mut source = SliceSource::new(&samples);

        assert_eq!(source.poll_sample(), Ok(samples[0]));
        assert_eq!(source.poll_sample(), Ok(samples[1]));
        assert!(source.is_exhausted());
        assert_eq!(
            source.poll_sample(),
            Err(nb::Error::Other(SourceError::EndOfStream))
        );

        source.reset();
        assert_eq!(source.poll_sample(), Ok(samples[0]));
    }
}
