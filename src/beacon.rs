//! Payload classification and field decoding for known beacon formats.
//!
//! Three wire formats are recognized: the vendor location beacon (the one
//! the listener exists for), the 25-byte Apple-style iBeacon frame, and the
//! Eddystone telemetry (TLM) frame. Classification is a pure function over
//! an [`AdvertisementRecord`]; the per-format decoders are pure functions
//! over byte slices. iBeacon and TLM frames are decoded for diagnostics
//! only and never reach the report path.

use crate::advertisement::AdvertisementRecord;
use crate::location::{LOCATION_COUNT, Location};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Company identifier the vendor registers its location beacons under.
///
/// Advertisements carry this little-endian, so it appears on the wire as
/// `[0x83, 0x01]`.
pub const VENDOR_COMPANY_ID: u16 = 0x0183;

/// Beacon type byte that marks a vendor frame as a location beacon.
pub const LOCATION_TYPE_CODE: u8 = 0x0A;

/// Minimum vendor frame length: company ID (2), type (1), payload through
/// the location byte at offset 4.
pub const LOCATION_FRAME_MIN_LEN: usize = 5;

/// Apple's company identifier, little-endian on the wire (`4C 00`).
pub const APPLE_COMPANY_ID: u16 = 0x004C;

/// Exact manufacturer-data length of an iBeacon frame.
pub const IBEACON_FRAME_LEN: usize = 25;

/// 16-bit service UUID Eddystone frames are advertised under.
pub const EDDYSTONE_UUID: u16 = 0xFEAA;

/// Frame-type byte of an Eddystone TLM frame.
pub const TLM_FRAME_TYPE: u8 = 0x20;

/// Shortest TLM frame we can extract battery and temperature from.
pub const TLM_FRAME_MIN_LEN: usize = 6;

/// Length of a full TLM frame including advertising and uptime counters.
pub const TLM_FRAME_FULL_LEN: usize = 14;

/// Default signal floor in dBm; weaker advertisements are not trusted.
pub const DEFAULT_MIN_RSSI: i16 = -75;

/// Error types for beacon payload decoding.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Payload shorter than the format requires.
    #[error("payload too short: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    /// Payload length does not match a fixed-size format.
    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },
    /// Location index outside the fixed location table.
    #[error("unknown location id {0} (valid range 0..{LOCATION_COUNT})")]
    UnknownLocation(u8),
}

/// Which known payload shape an advertisement matches, if any.
///
/// Produced once by [`classify`] and consumed exhaustively downstream so no
/// frame falls through unhandled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// Vendor location beacon; the only shape that can reach the reporter.
    LocationBeacon,
    /// Generic 25-byte Apple-style beacon, decoded for diagnostics.
    IBeacon,
    /// Eddystone telemetry frame, decoded for diagnostics.
    EddystoneTlm,
    /// Nothing we know, or signal too weak to trust.
    Unrecognized,
}

/// Decoded vendor location beacon fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationBeacon {
    /// Company identifier from the frame (host byte order).
    pub company_id: u16,
    /// Vendor beacon type byte.
    pub beacon_type: u8,
    /// The announced location.
    pub location: Location,
}

/// Decoded iBeacon fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IBeacon {
    /// Manufacturer identifier (host byte order).
    pub manufacturer_id: u16,
    /// Proximity UUID, wire order.
    pub proximity_uuid: [u8; 16],
    /// Major group number (big-endian on the wire).
    pub major: u16,
    /// Minor group number (big-endian on the wire).
    pub minor: u16,
    /// Calibrated signal power at 1 m, in dBm.
    pub signal_power: i8,
}

impl fmt::Display for IBeacon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let u = &self.proximity_uuid;
        write!(
            f,
            "iBeacon uuid={:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x} major={} minor={} power={}",
            u[0], u[1], u[2], u[3], u[4], u[5], u[6], u[7], u[8], u[9], u[10], u[11], u[12],
            u[13], u[14], u[15], self.major, self.minor, self.signal_power
        )
    }
}

/// Decoded Eddystone TLM fields.
///
/// Battery and temperature are present in every frame long enough to
/// classify; the advertising and uptime counters only exist in a full
/// 14-byte frame and are `None` for shorter ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EddystoneTlm {
    /// TLM version byte.
    pub version: u8,
    /// Battery voltage in millivolts.
    pub battery_mv: u16,
    /// Beacon temperature in degrees Celsius (signed 8.8 fixed point on
    /// the wire).
    pub temperature_c: f32,
    /// Count of advertising frames sent since boot.
    pub adv_count: Option<u32>,
    /// Time since boot (0.1 s resolution on the wire).
    pub uptime: Option<Duration>,
}

impl fmt::Display for EddystoneTlm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Eddystone TLM battery={}mV temperature={:.2}C",
            self.battery_mv, self.temperature_c
        )?;
        if let Some(count) = self.adv_count {
            write!(f, " adv_count={count}")?;
        }
        if let Some(uptime) = self.uptime {
            write!(f, " uptime={}s", uptime.as_secs())?;
        }
        Ok(())
    }
}

/// Classify a received advertisement against the known payload shapes.
///
/// Checks are ordered and the first match wins. The RSSI floor dominates:
/// anything weaker than `min_rssi` is `Unrecognized` regardless of payload.
/// Pure function; classifying the same record twice yields the same shape.
pub fn classify(record: &AdvertisementRecord, min_rssi: i16) -> PayloadShape {
    if record.rssi < min_rssi {
        return PayloadShape::Unrecognized;
    }

    let data = &record.manufacturer_data;
    if data.len() >= LOCATION_FRAME_MIN_LEN {
        let company = u16::from_le_bytes([data[0], data[1]]);
        if company == VENDOR_COMPANY_ID && data[2] == LOCATION_TYPE_CODE {
            return PayloadShape::LocationBeacon;
        }
    }

    if data.len() == IBEACON_FRAME_LEN && data[0] == 0x4C && data[1] == 0x00 {
        return PayloadShape::IBeacon;
    }

    if record.service_uuid == Some(EDDYSTONE_UUID)
        && record.service_data.first() == Some(&TLM_FRAME_TYPE)
    {
        return PayloadShape::EddystoneTlm;
    }

    PayloadShape::Unrecognized
}

/// Decode a vendor location beacon frame.
///
/// Layout: bytes 0-1 little-endian company ID, byte 2 beacon type, byte 4
/// the location index. Indices outside the location table are rejected so
/// the name table is never indexed out of bounds.
pub fn decode_location_beacon(data: &[u8]) -> Result<LocationBeacon, DecodeError> {
    if data.len() < LOCATION_FRAME_MIN_LEN {
        return Err(DecodeError::Truncated {
            expected: LOCATION_FRAME_MIN_LEN,
            actual: data.len(),
        });
    }

    let location_id = data[4];
    let location = Location::from_id(location_id).ok_or(DecodeError::UnknownLocation(location_id))?;

    Ok(LocationBeacon {
        company_id: u16::from_le_bytes([data[0], data[1]]),
        beacon_type: data[2],
        location,
    })
}

/// Decode a 25-byte iBeacon manufacturer-data frame.
///
/// Major and minor are big-endian on the wire and byte-swapped here.
pub fn decode_ibeacon(data: &[u8]) -> Result<IBeacon, DecodeError> {
    if data.len() != IBEACON_FRAME_LEN {
        return Err(DecodeError::WrongLength {
            expected: IBEACON_FRAME_LEN,
            actual: data.len(),
        });
    }

    let mut proximity_uuid = [0u8; 16];
    proximity_uuid.copy_from_slice(&data[2..18]);

    Ok(IBeacon {
        manufacturer_id: u16::from_le_bytes([data[0], data[1]]),
        proximity_uuid,
        major: u16::from_be_bytes([data[18], data[19]]),
        minor: u16::from_be_bytes([data[20], data[21]]),
        signal_power: data[24] as i8,
    })
}

/// Decode an Eddystone TLM service-data frame.
///
/// Layout: byte 0 frame type (already checked by classification), byte 1
/// version, bytes 2-3 battery voltage in mV, bytes 4-5 temperature as
/// signed 8.8 fixed point, all big-endian. A full 14-byte frame also
/// carries the advertising count (bytes 6-9) and uptime in 0.1 s units
/// (bytes 10-13).
pub fn decode_eddystone_tlm(data: &[u8]) -> Result<EddystoneTlm, DecodeError> {
    if data.len() < TLM_FRAME_MIN_LEN {
        return Err(DecodeError::Truncated {
            expected: TLM_FRAME_MIN_LEN,
            actual: data.len(),
        });
    }

    let raw_temp = i16::from_be_bytes([data[4], data[5]]);
    let (adv_count, uptime) = if data.len() >= TLM_FRAME_FULL_LEN {
        let count = u32::from_be_bytes([data[6], data[7], data[8], data[9]]);
        let decisecs = u32::from_be_bytes([data[10], data[11], data[12], data[13]]);
        (
            Some(count),
            Some(Duration::from_millis(u64::from(decisecs) * 100)),
        )
    } else {
        (None, None)
    };

    Ok(EddystoneTlm {
        version: data[1],
        battery_mv: u16::from_be_bytes([data[2], data[3]]),
        temperature_c: f32::from(raw_temp) / 256.0,
        adv_count,
        uptime,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ibeacon_record, location_record, tlm_record};

    #[test]
    fn test_classify_location_beacon() {
        let record = location_record(2, -60);
        assert_eq!(classify(&record, DEFAULT_MIN_RSSI), PayloadShape::LocationBeacon);
    }

    #[test]
    fn test_classify_rssi_floor_dominates() {
        // One below the floor: rejected even though the payload is valid.
        let record = location_record(2, DEFAULT_MIN_RSSI - 1);
        assert_eq!(classify(&record, DEFAULT_MIN_RSSI), PayloadShape::Unrecognized);

        // Exactly at the floor: passes on to payload checks.
        let record = location_record(2, DEFAULT_MIN_RSSI);
        assert_eq!(classify(&record, DEFAULT_MIN_RSSI), PayloadShape::LocationBeacon);
    }

    #[test]
    fn test_classify_is_idempotent() {
        let record = location_record(3, -50);
        let first = classify(&record, DEFAULT_MIN_RSSI);
        let second = classify(&record, DEFAULT_MIN_RSSI);
        assert_eq!(first, second);
    }

    #[test]
    fn test_classify_wrong_company() {
        let mut record = location_record(2, -60);
        record.manufacturer_data[0] = 0x99;
        record.manufacturer_data[1] = 0x04;
        assert_eq!(classify(&record, DEFAULT_MIN_RSSI), PayloadShape::Unrecognized);
    }

    #[test]
    fn test_classify_wrong_beacon_type() {
        let mut record = location_record(2, -60);
        record.manufacturer_data[2] = 0x0B;
        assert_eq!(classify(&record, DEFAULT_MIN_RSSI), PayloadShape::Unrecognized);
    }

    #[test]
    fn test_classify_short_manufacturer_data() {
        let mut record = AdvertisementRecord::empty(-60);
        record.manufacturer_data = vec![0x83, 0x01, 0x0A, 0x00];
        assert_eq!(classify(&record, DEFAULT_MIN_RSSI), PayloadShape::Unrecognized);
    }

    #[test]
    fn test_classify_ibeacon() {
        let record = ibeacon_record(-60);
        assert_eq!(classify(&record, DEFAULT_MIN_RSSI), PayloadShape::IBeacon);
    }

    #[test]
    fn test_classify_ibeacon_wrong_length() {
        let mut record = ibeacon_record(-60);
        record.manufacturer_data.push(0x00);
        assert_eq!(classify(&record, DEFAULT_MIN_RSSI), PayloadShape::Unrecognized);
    }

    #[test]
    fn test_classify_eddystone_tlm() {
        let record = tlm_record(-60, 0x16, 0x80);
        assert_eq!(classify(&record, DEFAULT_MIN_RSSI), PayloadShape::EddystoneTlm);
    }

    #[test]
    fn test_classify_eddystone_wrong_frame_type() {
        let mut record = tlm_record(-60, 0x16, 0x80);
        // A UID frame under the Eddystone UUID is not a TLM frame.
        record.service_data[0] = 0x00;
        assert_eq!(classify(&record, DEFAULT_MIN_RSSI), PayloadShape::Unrecognized);
    }

    #[test]
    fn test_classify_location_beacon_wins_over_ibeacon_check() {
        // A vendor frame padded to 25 bytes still classifies as a location
        // beacon: the company/type check runs first.
        let mut record = location_record(1, -60);
        record.manufacturer_data.resize(IBEACON_FRAME_LEN, 0x00);
        assert_eq!(classify(&record, DEFAULT_MIN_RSSI), PayloadShape::LocationBeacon);
    }

    #[test]
    fn test_decode_location_beacon() {
        // Spec scenario: company 0x0183 LE, type 0x0A, location byte 0x02.
        let data = [0x83, 0x01, 0x0A, 0x00, 0x02];
        let beacon = decode_location_beacon(&data).unwrap();
        assert_eq!(beacon.company_id, VENDOR_COMPANY_ID);
        assert_eq!(beacon.beacon_type, LOCATION_TYPE_CODE);
        assert_eq!(beacon.location, Location::DroidDepot);
        assert_eq!(beacon.location.name(), "Droid Depot");
    }

    #[test]
    fn test_decode_location_beacon_all_valid_ids() {
        for id in 0..LOCATION_COUNT {
            let data = [0x83, 0x01, 0x0A, 0x00, id];
            let beacon = decode_location_beacon(&data).unwrap();
            assert_eq!(beacon.location.id(), id);
        }
    }

    #[test]
    fn test_decode_location_beacon_too_short() {
        for len in 0..LOCATION_FRAME_MIN_LEN {
            let data = vec![0x83; len];
            assert_eq!(
                decode_location_beacon(&data),
                Err(DecodeError::Truncated {
                    expected: LOCATION_FRAME_MIN_LEN,
                    actual: len,
                })
            );
        }
    }

    #[test]
    fn test_decode_location_beacon_id_out_of_range() {
        // Boundary: 8 is the first invalid index.
        let data = [0x83, 0x01, 0x0A, 0x00, 0x08];
        assert_eq!(
            decode_location_beacon(&data),
            Err(DecodeError::UnknownLocation(8))
        );

        let data = [0x83, 0x01, 0x0A, 0x00, 0xFF];
        assert_eq!(
            decode_location_beacon(&data),
            Err(DecodeError::UnknownLocation(0xFF))
        );
    }

    #[test]
    fn test_decode_ibeacon() {
        let record = ibeacon_record(-60);
        let beacon = decode_ibeacon(&record.manufacturer_data).unwrap();
        assert_eq!(beacon.manufacturer_id, APPLE_COMPANY_ID);
        // Major/minor are big-endian on the wire.
        assert_eq!(beacon.major, 0x0102);
        assert_eq!(beacon.minor, 0x0304);
        assert_eq!(beacon.signal_power, -59);
        assert_eq!(beacon.proximity_uuid[0], 0xE2);
    }

    #[test]
    fn test_decode_ibeacon_wrong_length() {
        let data = vec![0x4C, 0x00, 0x02];
        assert_eq!(
            decode_ibeacon(&data),
            Err(DecodeError::WrongLength {
                expected: IBEACON_FRAME_LEN,
                actual: 3,
            })
        );
    }

    #[test]
    fn test_decode_tlm_temperature() {
        // Spec scenario: 0x1680 as signed 8.8 fixed point is 22.5 C.
        let record = tlm_record(-60, 0x16, 0x80);
        let tlm = decode_eddystone_tlm(&record.service_data).unwrap();
        assert_eq!(tlm.temperature_c, 22.5);
        assert_eq!(tlm.battery_mv, 2977);
        assert_eq!(tlm.adv_count, Some(1000));
        assert_eq!(tlm.uptime, Some(Duration::from_secs(360)));
    }

    #[test]
    fn test_decode_tlm_negative_temperature() {
        // 0xFF80 = -128 as i16 high byte -> -0.5 C.
        let record = tlm_record(-60, 0xFF, 0x80);
        let tlm = decode_eddystone_tlm(&record.service_data).unwrap();
        assert_eq!(tlm.temperature_c, -0.5);
    }

    #[test]
    fn test_decode_tlm_short_frame_has_no_counters() {
        let data = [0x20, 0x00, 0x0B, 0xA1, 0x16, 0x80];
        let tlm = decode_eddystone_tlm(&data).unwrap();
        assert_eq!(tlm.battery_mv, 0x0BA1);
        assert_eq!(tlm.temperature_c, 22.5);
        assert_eq!(tlm.adv_count, None);
        assert_eq!(tlm.uptime, None);
    }

    #[test]
    fn test_decode_tlm_too_short() {
        let data = [0x20, 0x00, 0x0B, 0xA1, 0x16];
        assert_eq!(
            decode_eddystone_tlm(&data),
            Err(DecodeError::Truncated {
                expected: TLM_FRAME_MIN_LEN,
                actual: 5,
            })
        );
    }

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::UnknownLocation(9);
        assert_eq!(format!("{err}"), "unknown location id 9 (valid range 0..8)");
    }
}
