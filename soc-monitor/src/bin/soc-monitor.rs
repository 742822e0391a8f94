//! Battery monitor simulation
//!
//! Feeds readings through the SOC estimator, charger relay and backlight,
//! printing LCD writes and a serial summary for every pass.
//!
//! ## Run
//! ```bash
//! soc-monitor                                  # interactive prompts
//! soc-monitor --replay bench.csv               # replay a recorded trace
//! RUST_LOG=debug soc-monitor --config monitor.json --replay bench.jsonl
//! ```

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context};
use soc_core::{time::MonotonicTime, SampleSource, SourceError};
use soc_monitor::{
    display, Monitor, MonitorConfig, MonitorError, MonitorReport, PromptSource, Reading,
    ReplaySource,
};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("Usage: soc-monitor [--config FILE] [--replay FILE]");
        return Ok(());
    }

    let config = match arg_value(&args, "--config")? {
        Some(path) => MonitorConfig::load(path)
            .with_context(|| format!("loading configuration from {path}"))?,
        None => MonitorConfig::default(),
    };
    let mut monitor = Monitor::new(config).context("building monitor")?;

    println!("Battery Monitor Simulation");

    match arg_value(&args, "--replay")? {
        Some(path) => {
            let mut source = ReplaySource::open(path).with_context(|| format!("opening {path}"))?;
            run_replay(&mut monitor, &mut source)
        }
        None => {
            let stdin = io::stdin();
            let mut source = PromptSource::new(stdin.lock(), io::stdout(), MonotonicTime::new());
            run_interactive(&mut monitor, &mut source)
        }
    }
}

/// Value following `flag`, if the flag is present
fn arg_value<'a>(args: &'a [String], flag: &str) -> anyhow::Result<Option<&'a str>> {
    match args.iter().position(|a| a == flag) {
        None => Ok(None),
        Some(i) => match args.get(i + 1) {
            Some(value) => Ok(Some(value.as_str())),
            None => bail!("{flag} needs a file argument"),
        },
    }
}

fn run_replay<S>(monitor: &mut Monitor, source: &mut S) -> anyhow::Result<()>
where
    S: SampleSource<Error = SourceError<MonitorError>>,
{
    let mut processed = 0usize;
    let mut skipped = 0usize;
    loop {
        let sample = match source.poll_sample() {
            Ok(sample) => sample,
            Err(nb::Error::WouldBlock) => continue,
            Err(nb::Error::Other(SourceError::EndOfStream)) => break,
            Err(nb::Error::Other(SourceError::Transport(e))) => return Err(e).context("reading replay"),
        };

        match monitor.process(Reading::from(sample), sample.timestamp) {
            Ok(report) => {
                print_report(monitor, &report)?;
                processed += 1;
            }
            Err(MonitorError::Estimator(e)) => {
                log::warn!("Skipping sample at {} ms: {}", sample.timestamp, e);
                skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!("Processed {processed} samples, skipped {skipped}");
    Ok(())
}

fn run_interactive<R, W, T>(monitor: &mut Monitor, source: &mut PromptSource<R, W, T>) -> anyhow::Result<()>
where
    R: BufRead,
    W: Write,
    T: soc_core::time::TimeSource,
{
    while let Some((now, reading)) = source.read_reading()? {
        match monitor.process(reading, now) {
            Ok(report) => print_report(monitor, &report)?,
            Err(MonitorError::Estimator(e)) => println!("Sample rejected: {e}"),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn print_report(monitor: &Monitor, report: &MonitorReport) -> io::Result<()> {
    let mut out = io::stdout().lock();
    let config = monitor.config();

    if let Some(event) = report.charger_event {
        writeln!(
            out,
            "{}",
            display::charger_message(event, config.charger.enable_below, config.charger.disable_above)
        )?;
    }
    if config.display.lcd {
        for write in report.lcd.writes() {
            writeln!(out, "{write}")?;
        }
    }
    if report.backlight_turned_off {
        writeln!(out, "Backlight OFF")?;
    }
    if config.display.serial {
        writeln!(out, "{}", display::serial_line(report))?;
    }
    Ok(())
}
