//! The monitor control loop
//!
//! One call to [`Monitor::process`] is one pass of the device loop:
//!
//! 1. Feed the net current and voltage to the estimator
//! 2. Accumulate time spent charging (fallback for readings without a
//!    user-supplied charge time)
//! 3. Run the charger hysteresis on the reported SOC (a switch wakes the
//!    backlight)
//! 4. Render the LCD frame
//! 5. Apply the backlight timeout
//! 6. Estimate how long the machine can run on the charged capacity
//!
//! A sample the estimator rejects aborts the pass before anything else is
//! touched, so the monitor can simply skip it.

use soc_core::{
    constants::time::MS_PER_SECOND, SocEstimator, StepReport, Timestamp,
};

use crate::{
    backlight::Backlight,
    charger::{ChargerController, ChargerEvent},
    config::MonitorConfig,
    display::{self, LcdFrame},
    runtime, MonitorResult,
};

/// One set of measured values
///
/// The machine fields describe the equipment the battery will power. Sources
/// that only know the cell (replay files) leave them equal to the battery
/// voltage and load current, and leave `time_to_charge_s` unset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Battery terminal voltage (V)
    pub voltage_v: f64,
    /// Current drawn by the load (A)
    pub load_current_a: f64,
    /// Current supplied by the charger (A)
    pub charger_current_a: f64,
    /// Voltage used by the machine (V)
    pub machine_voltage_v: f64,
    /// Current used by the machine (A)
    pub machine_current_a: f64,
    /// How long the charger has been charging (s), if known
    pub time_to_charge_s: Option<f64>,
}

impl Reading {
    /// Create a reading for the cell alone
    pub fn new(voltage_v: f64, load_current_a: f64, charger_current_a: f64) -> Self {
        Self {
            voltage_v,
            load_current_a,
            charger_current_a,
            machine_voltage_v: voltage_v,
            machine_current_a: load_current_a,
            time_to_charge_s: None,
        }
    }

    /// Set the machine's voltage (V) and current (A)
    pub fn with_machine(mut self, voltage_v: f64, current_a: f64) -> Self {
        self.machine_voltage_v = voltage_v;
        self.machine_current_a = current_a;
        self
    }

    /// Set the charge time (s) used for the remaining-time estimate
    pub fn with_time_to_charge(mut self, seconds: f64) -> Self {
        self.time_to_charge_s = Some(seconds);
        self
    }

    /// Current leaving the cell, positive = discharge
    pub fn net_current_a(&self) -> f64 {
        self.load_current_a - self.charger_current_a
    }
}

impl From<soc_core::Sample> for Reading {
    /// Split a net current back into load or charger current
    fn from(sample: soc_core::Sample) -> Self {
        if sample.current_a >= 0.0 {
            Self::new(sample.voltage_v, sample.current_a, 0.0)
        } else {
            Self::new(sample.voltage_v, 0.0, -sample.current_a)
        }
    }
}

/// Everything one pass produced
#[derive(Debug, Clone)]
pub struct MonitorReport {
    /// Sample time (ms)
    pub timestamp: Timestamp,
    /// Input of this pass
    pub reading: Reading,
    /// Estimator output
    pub step: StepReport,
    /// Relay transition on this pass, if any
    pub charger_event: Option<ChargerEvent>,
    /// Relay state after this pass
    pub charger_on: bool,
    /// Backlight state after this pass
    pub backlight_on: bool,
    /// Backlight timed out on this pass
    pub backlight_turned_off: bool,
    /// Voltage-only SOC gauge (%)
    pub gauge_percent: f64,
    /// Charge time behind the estimate (s): the reading's own, else the
    /// accumulated time the charger supplied current
    pub charge_time_s: f64,
    /// Estimated time until the machine drains the charged capacity (s)
    pub remaining_time_s: f64,
    /// Panel writes for this pass
    pub lcd: LcdFrame,
}

/// Estimator plus peripherals, driven one reading at a time
#[derive(Debug)]
pub struct Monitor {
    config: MonitorConfig,
    estimator: SocEstimator,
    charger: ChargerController,
    backlight: Option<Backlight>,
    /// Time and charger current of the last accepted reading
    last: Option<(Timestamp, f64)>,
    charge_time_s: f64,
}

impl Monitor {
    /// Validate the configuration and build every collaborator
    pub fn new(config: MonitorConfig) -> MonitorResult<Self> {
        config.validate()?;
        Ok(Self {
            estimator: SocEstimator::with_config(config.estimator)?,
            charger: ChargerController::new(config.charger)?,
            backlight: None,
            last: None,
            charge_time_s: 0.0,
            config,
        })
    }

    /// Run one pass of the loop at time `now`
    pub fn process(&mut self, reading: Reading, now: Timestamp) -> MonitorResult<MonitorReport> {
        let step = self.estimator.step_detailed(reading.net_current_a(), reading.voltage_v, now)?;

        // The interval belongs to whatever the charger was doing at its start
        if let Some((previous, charger_a)) = self.last {
            if charger_a > 0.0 {
                self.charge_time_s += now.saturating_sub(previous) as f64 / MS_PER_SECOND as f64;
            }
        }
        self.last = Some((now, reading.charger_current_a));

        let timeout_ms = self.config.backlight.timeout_ms;
        let backlight = self.backlight.get_or_insert_with(|| Backlight::new(timeout_ms, now));

        let charger_event = self.charger.update(step.reported_soc);
        if let Some(event) = charger_event {
            let charger = self.charger.config();
            log::info!(
                "{}",
                display::charger_message(event, charger.enable_below, charger.disable_above)
            );
            backlight.wake(now);
        }

        let lcd = LcdFrame::render(
            reading.voltage_v,
            reading.load_current_a,
            reading.charger_current_a,
            step.reported_soc,
            charger_event,
        );

        let backlight_turned_off = backlight.tick(now);
        if backlight_turned_off {
            log::info!("Backlight off after {} ms idle", timeout_ms);
        }

        let charge_time_s = reading.time_to_charge_s.unwrap_or(self.charge_time_s);
        let remaining_time_s =
            runtime::remaining_time_s(charge_time_s, reading.charger_current_a, reading.machine_current_a);

        log::debug!(
            "t={} ms soc={:.4} charger={} remaining={:.1} s",
            now, step.reported_soc, self.charger.is_enabled(), remaining_time_s
        );

        Ok(MonitorReport {
            timestamp: now,
            reading,
            step,
            charger_event,
            charger_on: self.charger.is_enabled(),
            backlight_on: backlight.is_on(),
            backlight_turned_off,
            gauge_percent: display::voltage_gauge_percent(reading.voltage_v),
            charge_time_s,
            remaining_time_s,
            lcd,
        })
    }

    /// Register a user interaction (e.g., a button press)
    pub fn wake_backlight(&mut self, now: Timestamp) {
        let timeout_ms = self.config.backlight.timeout_ms;
        self.backlight
            .get_or_insert_with(|| Backlight::new(timeout_ms, now))
            .wake(now);
    }

    /// Configuration in use
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// The estimator
    pub fn estimator(&self) -> &SocEstimator {
        &self.estimator
    }

    /// Whether the charger relay is closed
    pub fn charger_enabled(&self) -> bool {
        self.charger.is_enabled()
    }
}
