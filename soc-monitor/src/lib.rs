//! Battery monitor built around the `soc-core` estimator
//!
//! ## Overview
//!
//! `soc-core` only turns samples into a state of charge. This crate is the
//! glue a bench or device loop needs around it:
//!
//! ```text
//!  ReplaySource / PromptSource ──→ Monitor::process ──→ MonitorReport
//!                                     │
//!                                     ├─ SocEstimator      (fused SOC)
//!                                     ├─ ChargerController (hysteresis relay)
//!                                     ├─ Backlight         (inactivity timeout)
//!                                     └─ runtime / display (time left, LCD + serial)
//! ```
//!
//! All state lives in [`Monitor`]; nothing is global. Every collaborator is a
//! plain struct that can be driven and tested on its own.
//!
//! ## Example
//!
//! ```rust
//! use soc_monitor::{Monitor, MonitorConfig, Reading};
//!
//! let mut monitor = Monitor::new(MonitorConfig::default())?;
//! let report = monitor.process(Reading::new(3.7, 0.5, 0.0), 0)?;
//! assert!(report.backlight_on);
//! # Ok::<(), soc_monitor::MonitorError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod backlight;
pub mod charger;
pub mod config;
pub mod display;
pub mod monitor;
pub mod runtime;
pub mod source;

pub use backlight::Backlight;
pub use charger::{ChargerConfig, ChargerController, ChargerEvent};
pub use config::{BacklightConfig, DisplayConfig, MonitorConfig};
pub use display::{LcdFrame, LcdText, LcdWrite};
pub use monitor::{Monitor, MonitorReport, Reading};
pub use source::{PromptSource, ReplaySource};

use soc_core::EstimatorError;
use thiserror::Error;

/// Result type for monitor operations
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Monitor errors
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Estimator rejected a sample or its configuration
    #[error("Estimator error: {0}")]
    Estimator(#[from] EstimatorError),

    /// Reading input or configuration failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A replay line could not be parsed
    #[error("Parse error on line {line}: {reason}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What was wrong with it
        reason: String,
    },

    /// Configuration file is not valid JSON for [`MonitorConfig`]
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// Configuration parsed but violates an invariant
    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
