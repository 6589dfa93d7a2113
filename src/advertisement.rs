//! Normalized view of a single received BLE advertisement.
//!
//! The scanner backend constructs one [`AdvertisementRecord`] per received
//! advertisement; the rest of the pipeline only reads it. Records are not
//! retained after processing.

/// A snapshot of one BLE advertisement as delivered by the scanner.
///
/// `manufacturer_data` uses the on-air layout: bytes 0-1 are the
/// little-endian company identifier, followed by the vendor payload.
/// Backends that receive the company ID separately must re-prefix it.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvertisementRecord {
    /// Received signal strength in dBm (more negative = weaker).
    pub rssi: i16,
    /// Manufacturer-specific data, may be empty.
    pub manufacturer_data: Vec<u8>,
    /// Advertised device name, if the advertisement carried one.
    pub name: Option<String>,
    /// 16-bit service UUID the service data belongs to, if any.
    pub service_uuid: Option<u16>,
    /// Service data for `service_uuid`, may be empty.
    pub service_data: Vec<u8>,
}

impl AdvertisementRecord {
    /// A record with the given signal strength and no payload at all.
    /// Mostly useful as a starting point in tests and benchmarks.
    pub fn empty(rssi: i16) -> Self {
        AdvertisementRecord {
            rssi,
            manufacturer_data: Vec::new(),
            name: None,
            service_uuid: None,
            service_data: Vec::new(),
        }
    }
}
