//! Text formatters for location reports.

use crate::location::LocationReport;
use crate::output::ReportFormatter;
use std::time::SystemTime;

/// One log line per report: `location="Droid Depot" rssi=-60`.
///
/// Values are quoted so names with spaces stay one field when the line is
/// parsed downstream. With `timestamps` enabled the line is prefixed with
/// Unix epoch seconds.
#[derive(Debug, Clone, Default)]
pub struct LineFormatter {
    timestamps: bool,
}

impl LineFormatter {
    pub fn new(timestamps: bool) -> Self {
        LineFormatter { timestamps }
    }
}

impl ReportFormatter for LineFormatter {
    fn format(&self, report: &LocationReport) -> String {
        let body = format!("location=\"{}\" rssi={}", report.location, report.rssi);
        if !self.timestamps {
            return body;
        }
        let epoch = report
            .timestamp
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        format!("{epoch} {body}")
    }
}

/// Multi-line rendering in the shape of the original status display:
/// location name on one line, signal strength on the next.
#[derive(Debug, Clone, Default)]
pub struct DisplayFormatter;

impl ReportFormatter for DisplayFormatter {
    fn format(&self, report: &LocationReport) -> String {
        format!("Location: {}\nRSSI: {} dBm", report.location, report.rssi)
    }
}
