use crate::advertisement::AdvertisementRecord;
use crate::beacon::EDDYSTONE_UUID;

/// Build a vendor location beacon advertisement announcing `location_id`.
pub fn location_record(location_id: u8, rssi: i16) -> AdvertisementRecord {
    AdvertisementRecord {
        rssi,
        // Company 0x0183 little-endian, type 0x0A, location at offset 4.
        manufacturer_data: vec![0x83, 0x01, 0x0A, 0x00, location_id],
        name: None,
        service_uuid: None,
        service_data: Vec::new(),
    }
}

/// Build a 25-byte iBeacon advertisement with fixed UUID/major/minor.
pub fn ibeacon_record(rssi: i16) -> AdvertisementRecord {
    let mut data = vec![0x4C, 0x00];
    // Proximity UUID, bytes 2-17.
    data.extend_from_slice(&[
        0xE2, 0xC5, 0x6D, 0xB5, 0xDF, 0xFB, 0x48, 0xD2, 0xB0, 0x60, 0xD0, 0xF5, 0xA7, 0x10,
        0x96, 0xE0,
    ]);
    // Major 0x0102, minor 0x0304, big-endian on the wire.
    data.extend_from_slice(&[0x01, 0x02, 0x03, 0x04]);
    // Two reserved bytes, then signal power -59 dBm.
    data.extend_from_slice(&[0x00, 0x00, 0xC5]);
    debug_assert_eq!(data.len(), 25);

    AdvertisementRecord {
        rssi,
        manufacturer_data: data,
        name: None,
        service_uuid: None,
        service_data: Vec::new(),
    }
}

/// Build a full 14-byte Eddystone TLM advertisement with the given
/// temperature bytes (battery 2977 mV, 1000 frames sent, 360 s uptime).
pub fn tlm_record(rssi: i16, temp_hi: u8, temp_lo: u8) -> AdvertisementRecord {
    AdvertisementRecord {
        rssi,
        manufacturer_data: Vec::new(),
        name: None,
        service_uuid: Some(EDDYSTONE_UUID),
        service_data: vec![
            0x20, 0x00, // frame type, version
            0x0B, 0xA1, // battery 2977 mV
            temp_hi, temp_lo, // temperature, signed 8.8 fixed point
            0x00, 0x00, 0x03, 0xE8, // adv count 1000
            0x00, 0x00, 0x0E, 0x10, // uptime 3600 decisecs = 360 s
        ],
    }
}
