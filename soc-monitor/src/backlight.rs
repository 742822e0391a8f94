//! Display backlight with an inactivity timeout

use soc_core::Timestamp;

/// Default inactivity timeout (ms)
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Backlight state
///
/// On at start. Turns off once more than `timeout_ms` has passed since the
/// last [`wake`](Backlight::wake); any later wake turns it back on.
#[derive(Debug, Clone)]
pub struct Backlight {
    timeout_ms: u64,
    last_interaction: Timestamp,
    on: bool,
}

impl Backlight {
    /// Create a lit backlight whose last interaction is `now`
    pub fn new(timeout_ms: u64, now: Timestamp) -> Self {
        Self { timeout_ms, last_interaction: now, on: true }
    }

    /// Record an interaction and light the display
    pub fn wake(&mut self, now: Timestamp) {
        self.last_interaction = now;
        self.on = true;
    }

    /// Apply the timeout, returning `true` only on the tick that turns it off
    pub fn tick(&mut self, now: Timestamp) -> bool {
        let idle = now.saturating_sub(self.last_interaction);
        if self.on && idle > self.timeout_ms {
            self.on = false;
            return true;
        }
        false
    }

    /// Whether the backlight is lit
    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Inactivity timeout (ms)
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turns_off_strictly_after_timeout() {
        let mut light = Backlight::new(DEFAULT_TIMEOUT_MS, 1_000);
        assert!(!light.tick(1_000 + 30_000));
        assert!(light.is_on());

        assert!(light.tick(1_000 + 30_001));
        assert!(!light.is_on());

        // Reported once
        assert!(!light.tick(1_000 + 60_000));
    }

    #[test]
    fn wake_restarts_the_timer() {
        let mut light = Backlight::new(DEFAULT_TIMEOUT_MS, 0);
        light.wake(20_000);
        assert!(!light.tick(45_000));
        assert!(light.tick(50_001));

        light.wake(60_000);
        assert!(light.is_on());
    }

    #[test]
    fn clock_before_last_interaction_keeps_it_on() {
        let mut light = Backlight::new(DEFAULT_TIMEOUT_MS, 100_000);
        assert!(!light.tick(0));
        assert!(light.is_on());
    }
}
