//! Core application runner (business logic) for `swge-beacon-listener`.
//!
//! This module is intentionally decoupled from CLI parsing and process exit
//! codes so it can be tested deterministically with an injected scanner and
//! injected output streams.

use crate::advertisement::AdvertisementRecord;
use crate::beacon::{
    self, DEFAULT_MIN_RSSI, PayloadShape, decode_eddystone_tlm, decode_ibeacon,
    decode_location_beacon,
};
use crate::filter::{FilterDecision, ScanFilter, parse_duration};
use crate::location::LocationReport;
use crate::output::ReportFormatter;
use crate::output::text::{DisplayFormatter, LineFormatter};
use crate::scanner::ScanError;
use clap::Parser;
use std::future::Future;
use std::io;
use std::io::Write;
use std::pin::Pin;
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tokio::sync::mpsc;

/// Output style for accepted reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// One log line per report.
    #[default]
    Line,
    /// Multi-line status-display rendering.
    Display,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Line => write!(f, "line"),
            OutputFormat::Display => write!(f, "display"),
        }
    }
}

/// Configuration for the core run loop.
#[derive(Parser, Debug, Clone)]
#[command(author, about, version)]
pub struct Options {
    /// Minimum RSSI in dBm; weaker advertisements are ignored entirely.
    #[arg(long, default_value_t = DEFAULT_MIN_RSSI)]
    pub min_rssi: i16,

    /// Minimum time between accepted location reports.
    /// Accepts duration with suffix: 3s, 1m, 500ms, 2h.
    /// Without suffix, value is interpreted as seconds.
    #[arg(long, value_parser = parse_duration, default_value = "5s")]
    pub interval: Duration,

    /// Drop location beacons advertised under this device name
    /// (e.g. --ignore-name SITH-TLBX).
    #[arg(long)]
    pub ignore_name: Option<String>,

    /// Output format for accepted reports.
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,

    /// Prefix line output with Unix epoch seconds.
    #[arg(long)]
    pub timestamps: bool,

    /// Verbose output: log malformed payloads, filtered sightings and
    /// decoded iBeacon/Eddystone frames to stderr.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Errors returned by the core run loop.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Scanner abstraction to enable deterministic unit tests without
/// Bluetooth hardware.
pub trait Scanner: Send + Sync {
    fn start_scan(
        &self,
    ) -> Pin<
        Box<dyn Future<Output = Result<mpsc::Receiver<AdvertisementRecord>, ScanError>> + Send + '_>,
    >;
}

/// Real scanner implementation that delegates to the compiled-in backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealScanner;

impl Scanner for RealScanner {
    fn start_scan(
        &self,
    ) -> Pin<
        Box<dyn Future<Output = Result<mpsc::Receiver<AdvertisementRecord>, ScanError>> + Send + '_>,
    > {
        Box::pin(async move { crate::scanner::start_scan().await })
    }
}

fn formatter_for(options: &Options) -> Box<dyn ReportFormatter> {
    match options.format {
        OutputFormat::Line => Box::new(LineFormatter::new(options.timestamps)),
        OutputFormat::Display => Box::new(DisplayFormatter),
    }
}

/// Run the classify → decode → filter → report pipeline for one record.
///
/// Each record runs to completion before the next is taken off the channel,
/// so the filter state never sees concurrent access. Nothing in here is
/// fatal: malformed payloads and filtered sightings are logged (verbose
/// only) and dropped, and a failed report write is reported on the
/// diagnostic sink rather than aborting the stream.
fn process_record(
    record: &AdvertisementRecord,
    options: &Options,
    filter: &mut ScanFilter,
    formatter: &dyn ReportFormatter,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> io::Result<()> {
    match beacon::classify(record, options.min_rssi) {
        PayloadShape::LocationBeacon => {
            let decoded = match decode_location_beacon(&record.manufacturer_data) {
                Ok(decoded) => decoded,
                Err(e) => {
                    if options.verbose {
                        writeln!(err, "dropping malformed location beacon: {e}")?;
                    }
                    return Ok(());
                }
            };

            match filter.check(decoded.location, record.name.as_deref()) {
                FilterDecision::Accept => {
                    let report = LocationReport {
                        location: decoded.location,
                        rssi: record.rssi,
                        timestamp: SystemTime::now(),
                    };
                    // Best effort: a broken report sink must not stop the
                    // advertisement stream.
                    if let Err(e) = writeln!(out, "{}", formatter.format(&report)) {
                        let _ = writeln!(err, "report write failed: {e}");
                    }
                }
                FilterDecision::IgnoredName => {
                    if options.verbose {
                        writeln!(err, "ignoring beacon from ignored host")?;
                    }
                }
                FilterDecision::TooSoon => {
                    if options.verbose {
                        writeln!(err, "debounced {} sighting", decoded.location)?;
                    }
                }
            }
        }
        PayloadShape::IBeacon => {
            if options.verbose {
                match decode_ibeacon(&record.manufacturer_data) {
                    Ok(ibeacon) => writeln!(err, "{ibeacon}")?,
                    Err(e) => writeln!(err, "dropping malformed iBeacon frame: {e}")?,
                }
            }
        }
        PayloadShape::EddystoneTlm => {
            if options.verbose {
                match decode_eddystone_tlm(&record.service_data) {
                    Ok(tlm) => writeln!(err, "{tlm}")?,
                    Err(e) => writeln!(err, "dropping malformed TLM frame: {e}")?,
                }
            }
        }
        PayloadShape::Unrecognized => {}
    }

    Ok(())
}

/// Run the core processing loop, writing accepted reports to `out` and
/// diagnostics to `err`.
///
/// Advertisements are processed one at a time, in arrival order, until the
/// scanner closes the channel.
pub async fn run_with_io(
    options: Options,
    scanner: &dyn Scanner,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), RunError> {
    let formatter = formatter_for(&options);
    let mut filter = ScanFilter::new(options.interval, options.ignore_name.clone());

    let mut records = scanner.start_scan().await?;

    while let Some(record) = records.recv().await {
        process_record(&record, &options, &mut filter, formatter.as_ref(), out, err)?;
    }

    Ok(())
}
