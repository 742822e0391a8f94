//! 16×2 character LCD and serial console rendering
//!
//! LCD text lives in fixed-capacity [`heapless::String`]s so a frame can be
//! built without allocating, exactly as it would be on the device. Text that
//! does not fit the 16 columns is cut off, like the panel itself would.
//!
//! Layout:
//!
//! ```text
//!   col 0         col 10
//!  ┌────────────────┐
//!  │V:3.7 I:0.5A    │  line 0
//!  │C:0.2A    63%   │  line 1
//!  └────────────────┘
//! ```

use core::fmt::{self, Write as _};

use crate::{charger::ChargerEvent, monitor::MonitorReport};

/// Characters per LCD line
pub const LCD_COLUMNS: usize = 16;

/// Column where the SOC percentage starts on line 1
pub const SOC_COLUMN: u8 = 10;

/// Lower end of the voltage gauge (V), reads 0 %
pub const GAUGE_EMPTY_V: f64 = 3.0;

/// Upper end of the voltage gauge (V), reads 100 %
pub const GAUGE_FULL_V: f64 = 4.2;

/// One LCD line's worth of text
pub type LcdText = heapless::String<LCD_COLUMNS>;

/// Writer that drops whatever no longer fits
struct Truncating<'a>(&'a mut LcdText);

impl fmt::Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Format into an LCD line, cutting off at [`LCD_COLUMNS`]
pub fn lcd_text(args: fmt::Arguments<'_>) -> LcdText {
    let mut text = LcdText::new();
    // Truncating never reports an error
    let _ = Truncating(&mut text).write_fmt(args);
    text
}

/// Text placed at a cursor position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcdWrite {
    /// Row, 0 or 1
    pub line: u8,
    /// Column of the first character
    pub col: u8,
    /// Text to print
    pub text: LcdText,
}

impl LcdWrite {
    /// Text at `(line, col)`
    pub fn new(line: u8, col: u8, text: LcdText) -> Self {
        Self { line, col, text }
    }
}

impl fmt::Display for LcdWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LCD [Line {}, Col {}]: {}", self.line, self.col, self.text)
    }
}

/// Everything written to the panel on one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcdFrame {
    /// Charger banner, only on cycles where the relay switched
    pub banner: Option<LcdWrite>,
    /// Voltage and load current
    pub status: LcdWrite,
    /// Charger current
    pub charger: LcdWrite,
    /// Reported SOC percentage
    pub soc: LcdWrite,
}

impl LcdFrame {
    /// Build the frame for one cycle
    pub fn render(
        voltage_v: f64,
        load_current_a: f64,
        charger_current_a: f64,
        soc: f64,
        event: Option<ChargerEvent>,
    ) -> Self {
        Self {
            banner: event.map(charger_banner),
            status: LcdWrite::new(0, 0, lcd_text(format_args!("V:{voltage_v:.1} I:{load_current_a:.1}A"))),
            charger: LcdWrite::new(1, 0, lcd_text(format_args!("C:{charger_current_a:.1}A"))),
            soc: LcdWrite::new(1, SOC_COLUMN, lcd_text(format_args!("{:.0}%", soc * 100.0))),
        }
    }

    /// Writes in the order they hit the panel
    pub fn writes(&self) -> impl Iterator<Item = &LcdWrite> {
        self.banner.iter().chain([&self.status, &self.charger, &self.soc])
    }
}

/// Full-width banner announcing a relay transition
pub fn charger_banner(event: ChargerEvent) -> LcdWrite {
    let label = match event {
        ChargerEvent::Enabled => "Chg:ON",
        ChargerEvent::Disabled => "Chg:OFF",
    };
    LcdWrite::new(1, 0, lcd_text(format_args!("{label:<width$}", width = LCD_COLUMNS)))
}

/// Console message for a relay transition, with thresholds as percentages
pub fn charger_message(event: ChargerEvent, enable_below: f64, disable_above: f64) -> String {
    match event {
        ChargerEvent::Enabled => format!("Battery <= {:.0}%, Charger ON", enable_below * 100.0),
        ChargerEvent::Disabled => format!("Battery >= {:.0}%, Charger OFF", disable_above * 100.0),
    }
}

/// Linear voltage gauge, `3.0 V → 0 %` to `4.2 V → 100 %`, clamped
pub fn voltage_gauge_percent(voltage_v: f64) -> f64 {
    let percent = (voltage_v - GAUGE_EMPTY_V) * 100.0 / (GAUGE_FULL_V - GAUGE_EMPTY_V);
    percent.clamp(0.0, 100.0)
}

/// One serial console line summarising a cycle
pub fn serial_line(report: &MonitorReport) -> String {
    format!(
        "Battery Voltage: {:.2} V, Load Current: {:.2} A, Charger Current: {:.2} A, \
         SoC: {:.0}% (CC {:.1}%, KF {:.1}%, gauge {:.0}%), \
         Machine Voltage: {:.2} V, Machine Current: {:.2} A, Time to Discharge: {:.2} seconds",
        report.reading.voltage_v,
        report.reading.load_current_a,
        report.reading.charger_current_a,
        report.step.reported_soc * 100.0,
        report.step.coulomb_soc * 100.0,
        report.step.filtered_soc * 100.0,
        report.gauge_percent,
        report.reading.machine_voltage_v,
        report.reading.machine_current_a,
        report.remaining_time_s,
    )
}
