//! BlueZ D-Bus backend.
//!
//! Uses the `bluer` crate to talk to the `bluetoothd` daemon, runs LE
//! discovery, and normalizes each discovered device's advertisement
//! properties into an [`AdvertisementRecord`].

use super::{ADVERTISEMENT_CHANNEL_BUFFER_SIZE, ScanError};
use crate::advertisement::AdvertisementRecord;
use crate::beacon::{APPLE_COMPANY_ID, VENDOR_COMPANY_ID};
use bluer::{Adapter, AdapterEvent, Address, DiscoveryFilter, DiscoveryTransport, Session, Uuid};
use futures::StreamExt;
use std::collections::HashMap;
use tokio::sync::mpsc;

impl From<bluer::Error> for ScanError {
    fn from(err: bluer::Error) -> Self {
        ScanError::Bluetooth(err.to_string())
    }
}

/// Bluetooth base UUID with the 16-bit alias field zeroed.
const BASE_UUID: u128 = 0x00000000_0000_1000_8000_00805F9B34FB;
const ALIAS_MASK: u128 = 0xFFFF_FFFF << 96;

/// Extract the 16-bit alias from a full 128-bit UUID, if it has one.
fn as_uuid16(uuid: &Uuid) -> Option<u16> {
    let value = uuid.as_u128();
    let alias = (value & ALIAS_MASK) >> 96;
    if value & !ALIAS_MASK == BASE_UUID && alias <= u128::from(u16::MAX) {
        Some(alias as u16)
    } else {
        None
    }
}

/// Rebuild the on-air manufacturer-data layout from BlueZ's keyed map.
///
/// BlueZ splits the company ID off into the map key; the classifier expects
/// the wire layout with the little-endian ID back in front. If a device
/// somehow advertises several company IDs, the vendor's entry wins, then
/// Apple's, then an arbitrary one.
fn wire_manufacturer_data(mut data: HashMap<u16, Vec<u8>>) -> Vec<u8> {
    let company = if data.contains_key(&VENDOR_COMPANY_ID) {
        VENDOR_COMPANY_ID
    } else if data.contains_key(&APPLE_COMPANY_ID) {
        APPLE_COMPANY_ID
    } else if let Some(&company) = data.keys().next() {
        company
    } else {
        return Vec::new();
    };

    let payload = match data.remove(&company) {
        Some(payload) => payload,
        None => return Vec::new(),
    };

    let mut wire = Vec::with_capacity(2 + payload.len());
    wire.extend_from_slice(&company.to_le_bytes());
    wire.extend_from_slice(&payload);
    wire
}

/// Start scanning for advertisements using the BlueZ D-Bus backend.
///
/// Powers on the default adapter, starts LE discovery with duplicate
/// reporting enabled, and feeds normalized records through the returned
/// channel. Runs until the receiver is dropped or discovery ends.
pub async fn start_scan() -> Result<mpsc::Receiver<AdvertisementRecord>, ScanError> {
    let session = Session::new().await?;
    let adapter = session.default_adapter().await?;
    adapter.set_powered(true).await?;

    // Duplicates must flow: the debounce filter owns repeat suppression.
    let filter = DiscoveryFilter {
        transport: DiscoveryTransport::Le,
        duplicate_data: true,
        ..Default::default()
    };
    adapter.set_discovery_filter(filter).await?;

    let mut events = adapter.discover_devices().await?;
    let (tx, rx) = mpsc::channel(ADVERTISEMENT_CHANNEL_BUFFER_SIZE);

    // The task owns all Bluetooth state; dropping it ends discovery.
    tokio::spawn(async move {
        let _session = session;

        while let Some(event) = events.next().await {
            if let AdapterEvent::DeviceAdded(address) = event {
                // A device can disappear between the event and the property
                // reads; that is routine and the record is just skipped.
                if let Ok(Some(record)) = read_record(&adapter, address).await
                    && tx.send(record).await.is_err()
                {
                    break;
                }
            }
        }
    });

    Ok(rx)
}

/// Read one device's advertisement properties into a record.
///
/// Returns `Ok(None)` when the device has no RSSI, which BlueZ reports for
/// cached entries that are not currently advertising.
async fn read_record(
    adapter: &Adapter,
    address: Address,
) -> Result<Option<AdvertisementRecord>, ScanError> {
    let device = adapter.device(address)?;

    let rssi = match device.rssi().await? {
        Some(rssi) => rssi,
        None => return Ok(None),
    };

    let manufacturer_data = device
        .manufacturer_data()
        .await?
        .map(wire_manufacturer_data)
        .unwrap_or_default();

    let name = device.name().await?;

    let (service_uuid, service_data) = match device.service_data().await? {
        Some(map) => map
            .into_iter()
            .find_map(|(uuid, data)| as_uuid16(&uuid).map(|alias| (Some(alias), data)))
            .unwrap_or((None, Vec::new())),
        None => (None, Vec::new()),
    };

    Ok(Some(AdvertisementRecord {
        rssi,
        manufacturer_data,
        name,
        service_uuid,
        service_data,
    }))
}
