//! Output formatters for accepted location reports.
//!
//! This module provides a trait for formatting reports and implementations
//! for the supported output styles: a single log line per report, and a
//! multi-line rendering shaped like the small status display the original
//! hardware drove.

pub mod text;

use crate::location::LocationReport;

/// Trait for formatting location reports into output strings.
pub trait ReportFormatter: Send + Sync {
    /// Format an accepted report.
    ///
    /// # Arguments
    /// * `report` - The accepted location sighting to format
    ///
    /// # Returns
    /// A formatted string representation of the report
    fn format(&self, report: &LocationReport) -> String;
}
