//! The fixed table of park locations a beacon can announce.

use std::fmt;
use std::time::SystemTime;

/// A park location announced by a vendor location beacon.
///
/// The wire format carries the location as a single byte index. Only the
/// eight values below exist; anything else is rejected during decoding and
/// never reaches this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Location {
    NoBeacon = 0,
    Marketplace = 1,
    DroidDepot = 2,
    Resistance = 3,
    Unknown = 4,
    Alert = 5,
    DokOndars = 6,
    FirstOrder = 7,
}

/// Number of entries in the location table.
pub const LOCATION_COUNT: u8 = 8;

impl Location {
    /// Look up a location by its wire index. Returns `None` for indices
    /// outside the table.
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Location::NoBeacon),
            1 => Some(Location::Marketplace),
            2 => Some(Location::DroidDepot),
            3 => Some(Location::Resistance),
            4 => Some(Location::Unknown),
            5 => Some(Location::Alert),
            6 => Some(Location::DokOndars),
            7 => Some(Location::FirstOrder),
            _ => None,
        }
    }

    /// The wire index of this location.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Human-readable name, as shown on the display.
    pub fn name(self) -> &'static str {
        match self {
            Location::NoBeacon => "No Beacon",
            Location::Marketplace => "Marketplace",
            Location::DroidDepot => "Droid Depot",
            Location::Resistance => "Resistance",
            Location::Unknown => "Unknown",
            Location::Alert => "Alert",
            Location::DokOndars => "Dok Ondars",
            Location::FirstOrder => "First Order",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An accepted location sighting, ready for the output sinks.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationReport {
    /// The decoded location.
    pub location: Location,
    /// Signal strength of the advertisement that carried it, in dBm.
    pub rssi: i16,
    /// When the advertisement was accepted.
    pub timestamp: SystemTime,
}
