//! Debounce and ignore filtering for accepted location sightings.
//!
//! Location beacons re-advertise continuously, so a raw stream of decoded
//! sightings would flood the display. The filter gates reports to at most
//! one per interval and can drop advertisements from a named host entirely.

use crate::location::Location;
use std::time::{Duration, Instant};

/// Outcome of running one decoded sighting through the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    /// Report the sighting; the debounce timer was reset.
    Accept,
    /// Advertiser name matched the configured ignore name.
    IgnoredName,
    /// Within the minimum interval since the last accepted report.
    TooSoon,
}

/// Stateful debounce gate for location reports.
///
/// Single-owner: the processing loop holds the only instance and runs one
/// advertisement to completion before the next, so no locking is needed.
/// The timer is reset only on `Accept`; rejected sightings leave the state
/// untouched, which is what keeps the minimum-interval guarantee honest.
///
/// The filter intentionally does not deduplicate by location: the same
/// location is re-reported every interval for as long as its beacon is in
/// range.
#[derive(Debug)]
pub struct ScanFilter {
    /// Minimum time between accepted reports.
    min_interval: Duration,
    /// Advertiser name to drop, if configured.
    ignore_name: Option<String>,
    /// When the last report was accepted; `None` until the first accept.
    last_accept: Option<Instant>,
    /// Most recently reported location; `None` until the first accept.
    last_location: Option<Location>,
}

impl ScanFilter {
    /// Create a filter with the given debounce interval and optional
    /// ignore name (`None` disables the name check).
    pub fn new(min_interval: Duration, ignore_name: Option<String>) -> Self {
        ScanFilter {
            min_interval,
            ignore_name,
            last_accept: None,
            last_location: None,
        }
    }

    /// Run one decoded sighting through the gates.
    ///
    /// `name` must be the advertiser name of the *current* advertisement;
    /// a record without a name field never matches the ignore name, even if
    /// an earlier advertisement from the ignored host was seen.
    pub fn check(&mut self, location: Location, name: Option<&str>) -> FilterDecision {
        if let Some(ignored) = self.ignore_name.as_deref()
            && name == Some(ignored)
        {
            return FilterDecision::IgnoredName;
        }

        let now = Instant::now();
        match self.last_accept {
            Some(last) if now.duration_since(last) < self.min_interval => FilterDecision::TooSoon,
            _ => {
                self.last_accept = Some(now);
                self.last_location = Some(location);
                FilterDecision::Accept
            }
        }
    }

    /// The most recently accepted location, if any.
    pub fn last_location(&self) -> Option<Location> {
        self.last_location
    }
}

/// Parse a duration from a human-readable string.
///
/// Supports the following suffixes:
/// - `s` or no suffix: seconds
/// - `m`: minutes
/// - `h`: hours
/// - `ms`: milliseconds
pub fn parse_duration(src: &str) -> Result<Duration, String> {
    let src = src.trim();

    if src.is_empty() {
        return Err("empty duration string".to_string());
    }

    if let Some(num) = src.strip_suffix("ms") {
        let millis: u64 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid milliseconds: {}", num))?;
        return Ok(Duration::from_millis(millis));
    }

    if let Some(num) = src.strip_suffix('h') {
        let hours: u64 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid hours: {}", num))?;
        return Ok(Duration::from_secs(hours * 3600));
    }

    if let Some(num) = src.strip_suffix('m') {
        let minutes: u64 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid minutes: {}", num))?;
        return Ok(Duration::from_secs(minutes * 60));
    }

    if let Some(num) = src.strip_suffix('s') {
        let secs: u64 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid seconds: {}", num))?;
        return Ok(Duration::from_secs(secs));
    }

    // No suffix, treat as seconds
    let secs: u64 = src
        .parse()
        .map_err(|_| format!("invalid duration: {}", src))?;
    Ok(Duration::from_secs(secs))
}
