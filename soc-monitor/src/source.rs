//! Sample sources: replay files and interactive prompts
//!
//! ## Replay files
//!
//! One sample per line, either CSV or JSON Lines. The two may even be
//! mixed; each line is sniffed on its own.
//!
//! ```text
//! # recorded on the bench, 0.5 A discharge
//! timestamp_ms,current_a,voltage_v
//! 0,0.5,4.20
//! 10000,0.5,4.15
//! {"timestamp_ms":20000,"current_a":0.5,"voltage_v":4.10}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. A header is accepted
//! only before the first data line.
//!
//! ## Prompts
//!
//! [`PromptSource`] asks for six values per reading, then stamps it from a
//! [`TimeSource`]:
//!
//! | Prompt | Unit |
//! |--------|------|
//! | battery voltage | V |
//! | load current | mA |
//! | charger current | mA |
//! | machine voltage | V |
//! | machine current | mA |
//! | time to charge | s |

use std::{
    fs::File,
    io::{BufRead, BufReader, Write},
    path::Path,
};

use soc_core::{time::TimeSource, Sample, SampleSource, SourceError, Timestamp};

use crate::{monitor::Reading, MonitorError, MonitorResult};

/// Printed when a prompt answer is not a finite number
pub const INVALID_INPUT_MESSAGE: &str = "Invalid input. Please enter numeric values.";

const PROMPTS: [&str; 6] = [
    "Enter battery voltage (V, e.g., 3.7): ",
    "Enter load current (mA, e.g., 500): ",
    "Enter charger current (mA, e.g., 200): ",
    "Enter voltage used by the machine (V, e.g., 3.7): ",
    "Enter current used by the machine (mA, e.g., 500): ",
    "Enter time to charge (seconds, e.g., 3600): ",
];

/// Samples read from a CSV or JSON Lines stream
pub struct ReplaySource<R> {
    reader: R,
    line: usize,
    seen_data: bool,
    buffer: String,
}

impl ReplaySource<BufReader<File>> {
    /// Open a replay file
    pub fn open(path: impl AsRef<Path>) -> MonitorResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        log::info!("Replaying samples from {}", path.display());
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ReplaySource<R> {
    /// Read samples from any buffered reader
    pub fn new(reader: R) -> Self {
        Self { reader, line: 0, seen_data: false, buffer: String::new() }
    }

    /// Next sample, or `None` at end of input
    pub fn next_sample(&mut self) -> MonitorResult<Option<Sample>> {
        loop {
            self.buffer.clear();
            if self.reader.read_line(&mut self.buffer)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let text = self.buffer.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }

            let sample = if text.starts_with('{') {
                parse_json(text, self.line)?
            } else {
                match parse_csv(text, self.line, self.seen_data)? {
                    Some(sample) => sample,
                    None => {
                        log::debug!("Skipping header on line {}", self.line);
                        continue;
                    }
                }
            };
            self.seen_data = true;
            return Ok(Some(sample));
        }
    }

    /// Line number of the last line read (1-based)
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> SampleSource for ReplaySource<R> {
    type Error = SourceError<MonitorError>;

    fn poll_sample(&mut self) -> nb::Result<Sample, Self::Error> {
        match self.next_sample() {
            Ok(Some(sample)) => Ok(sample),
            Ok(None) => Err(nb::Error::Other(SourceError::EndOfStream)),
            Err(e) => Err(nb::Error::Other(SourceError::Transport(e))),
        }
    }
}

fn parse_error(line: usize, reason: impl Into<String>) -> MonitorError {
    MonitorError::Parse { line, reason: reason.into() }
}

fn parse_json(text: &str, line: usize) -> MonitorResult<Sample> {
    serde_json::from_str(text).map_err(|e| parse_error(line, e.to_string()))
}

/// `Ok(None)` for a header line
fn parse_csv(text: &str, line: usize, seen_data: bool) -> MonitorResult<Option<Sample>> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    if fields.len() != 3 {
        return Err(parse_error(line, format!("expected 3 fields, found {}", fields.len())));
    }

    let timestamp = match fields[0].parse::<Timestamp>() {
        Ok(t) => t,
        Err(_) if !seen_data && fields[0].parse::<f64>().is_err() => return Ok(None),
        Err(e) => return Err(parse_error(line, format!("timestamp '{}': {}", fields[0], e))),
    };
    let number = |name: &str, field: &str| {
        field
            .parse::<f64>()
            .map_err(|e| parse_error(line, format!("{} '{}': {}", name, field, e)))
    };

    Ok(Some(Sample::new(
        timestamp,
        number("current", fields[1])?,
        number("voltage", fields[2])?,
    )))
}

/// Interactive readings from a terminal (or anything `BufRead`)
pub struct PromptSource<R, W, T> {
    input: R,
    output: W,
    clock: T,
    buffer: String,
}

impl<R: BufRead, W: Write, T: TimeSource> PromptSource<R, W, T> {
    /// Prompt on `output`, read answers from `input`, stamp with `clock`
    pub fn new(input: R, output: W, clock: T) -> Self {
        Self { input, output, clock, buffer: String::new() }
    }

    /// Ask for one reading, re-prompting on invalid numbers
    ///
    /// Returns `None` once input is exhausted.
    pub fn read_reading(&mut self) -> MonitorResult<Option<(Timestamp, Reading)>> {
        loop {
            let mut answers = [0.0; PROMPTS.len()];
            let mut valid = true;
            for (answer, prompt) in answers.iter_mut().zip(PROMPTS) {
                let Some(text) = self.ask(prompt)? else {
                    return Ok(None);
                };
                match parse_finite(&text) {
                    Some(value) => *answer = value,
                    None => {
                        log::debug!("Rejected prompt input {:?}", text);
                        valid = false;
                    }
                }
            }

            if !valid {
                writeln!(self.output, "{}", INVALID_INPUT_MESSAGE)?;
                continue;
            }

            let [voltage, load_ma, charger_ma, machine_v, machine_ma, charge_s] = answers;
            let reading = Reading::new(voltage, load_ma / 1000.0, charger_ma / 1000.0)
                .with_machine(machine_v, machine_ma / 1000.0)
                .with_time_to_charge(charge_s);
            return Ok(Some((self.clock.now(), reading)));
        }
    }

    fn ask(&mut self, prompt: &str) -> MonitorResult<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        self.buffer.clear();
        if self.input.read_line(&mut self.buffer)? == 0 {
            return Ok(None);
        }
        Ok(Some(self.buffer.trim().to_owned()))
    }
}

impl<R: BufRead, W: Write, T: TimeSource> SampleSource for PromptSource<R, W, T> {
    type Error = SourceError<MonitorError>;

    fn poll_sample(&mut self) -> nb::Result<Sample, Self::Error> {
        match self.read_reading() {
            Ok(Some((timestamp, reading))) => {
                Ok(Sample::new(timestamp, reading.net_current_a(), reading.voltage_v))
            }
            Ok(None) => Err(nb::Error::Other(SourceError::EndOfStream)),
            Err(e) => Err(nb::Error::Other(SourceError::Transport(e))),
        }
    }
}

fn parse_finite(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use soc_core::time::FixedTime;
    use std::io::Cursor;

    fn replay(text: &str) -> ReplaySource<Cursor<Vec<u8>>> {
        ReplaySource::new(Cursor::new(text.as_bytes().to_vec()))
    }

    #[test]
    fn csv_with_header_and_comments() {
        let mut source = replay(
            "# bench run\n\
             timestamp_ms,current_a,voltage_v\n\
             \n\
             0,0.5,4.20\n\
             10000, 0.5 , 4.15\n",
        );
        assert_eq!(source.next_sample().unwrap(), Some(Sample::new(0, 0.5, 4.20)));
        assert_eq!(source.next_sample().unwrap(), Some(Sample::new(10_000, 0.5, 4.15)));
        assert_eq!(source.next_sample().unwrap(), None);
        assert_eq!(source.line(), 5);
    }

    #[test]
    fn json_lines() {
        let mut source = replay(
            "{\"timestamp_ms\":5,\"current_a\":-1.0,\"voltage_v\":3.9}\n\
             {\"timestamp_ms\":6,\"current_a\":0.0,\"voltage_v\":3.91}\n",
        );
        assert_eq!(source.next_sample().unwrap(), Some(Sample::new(5, -1.0, 3.9)));
        assert_eq!(source.next_sample().unwrap(), Some(Sample::new(6, 0.0, 3.91)));
        assert_eq!(source.next_sample().unwrap(), None);
    }

    #[test]
    fn header_after_data_is_an_error() {
        let mut source = replay("0,0.5,4.2\ntimestamp_ms,current_a,voltage_v\n");
        source.next_sample().unwrap();
        match source.next_sample() {
            Err(MonitorError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn bad_field_reports_line() {
        let mut source = replay("0,0.5,4.2\n\n10,abc,4.1\n");
        source.next_sample().unwrap();
        match source.next_sample() {
            Err(MonitorError::Parse { line, reason }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("current"), "{reason}");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn wrong_field_count() {
        let mut source = replay("0,0.5\n");
        assert!(matches!(source.next_sample(), Err(MonitorError::Parse { line: 1, .. })));
    }

    #[test]
    fn replay_as_sample_source() {
        let mut source = replay("0,0.5,4.2\n");
        assert_eq!(source.poll_sample().unwrap(), Sample::new(0, 0.5, 4.2));
        assert!(matches!(
            source.poll_sample(),
            Err(nb::Error::Other(SourceError::EndOfStream))
        ));
    }

    #[test]
    fn prompt_reads_all_six_answers() {
        let input = Cursor::new(b"3.7\n500\n200\n3.3\n250\n3600\n".to_vec());
        let mut output = Vec::new();
        let mut source = PromptSource::new(input, &mut output, FixedTime::new(42));

        let (t, reading) = source.read_reading().unwrap().unwrap();
        assert_eq!(t, 42);
        assert_eq!(reading.voltage_v, 3.7);
        assert_eq!(reading.load_current_a, 0.5);
        assert_eq!(reading.charger_current_a, 0.2);
        assert_eq!(reading.machine_voltage_v, 3.3);
        assert_eq!(reading.machine_current_a, 0.25);
        assert_eq!(reading.time_to_charge_s, Some(3600.0));
        assert_eq!(source.read_reading().unwrap(), None);
        drop(source);

        let printed = String::from_utf8(output).unwrap();
        assert_eq!(printed, PROMPTS.concat() + PROMPTS[0]);
    }

    #[test]
    fn prompt_input_ending_mid_reading() {
        let input = Cursor::new(b"3.7\n500\n200\n".to_vec());
        let mut source = PromptSource::new(input, Vec::new(), FixedTime::new(0));
        assert_eq!(source.read_reading().unwrap(), None);
    }

    #[test]
    fn prompt_retries_after_invalid_input() {
        let input = Cursor::new(
            b"3.7\nlots\n200\n3.7\n500\n3600\n\
              3.8\n100\n0\n3.7\n500\nnan\n\
              3.9\n100\n0\n3.6\n500\n1800\n"
                .to_vec(),
        );
        let mut output = Vec::new();
        let mut source = PromptSource::new(input, &mut output, FixedTime::new(0));

        let (_, reading) = source.read_reading().unwrap().unwrap();
        assert_eq!(
            reading,
            Reading::new(3.9, 0.1, 0.0).with_machine(3.6, 0.5).with_time_to_charge(1800.0)
        );
        drop(source);

        let printed = String::from_utf8(output).unwrap();
        assert_eq!(printed.matches(INVALID_INPUT_MESSAGE).count(), 2);
    }

    #[test]
    fn prompt_as_sample_source_uses_net_current() {
        let input = Cursor::new(b"3.7\n500\n200\n3.7\n500\n3600\n".to_vec());
        let mut source = PromptSource::new(input, Vec::new(), FixedTime::new(7));

        let sample = source.poll_sample().unwrap();
        assert_eq!(sample.timestamp, 7);
        assert!((sample.current_a - 0.3).abs() < 1e-12);
        assert_eq!(sample.voltage_v, 3.7);
    }
}
