//! BLE scanner glue producing advertisement records.
//!
//! The scanner is an external collaborator as far as the pipeline is
//! concerned: it yields a stream of [`AdvertisementRecord`]s over a channel
//! and nothing else. Classification and decoding happen downstream.

#[cfg(feature = "bluer")]
pub mod bluer;

use crate::advertisement::AdvertisementRecord;
use thiserror::Error;
use tokio::sync::mpsc;

/// Channel buffer size for advertisement records.
pub const ADVERTISEMENT_CHANNEL_BUFFER_SIZE: usize = 100;

/// Error type for scanner operations.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Bluetooth/adapter related error
    #[error("Bluetooth error: {0}")]
    Bluetooth(String),
    /// Built without any scanner backend
    #[error("no scanner backend compiled in")]
    NoBackend,
}

/// Start scanning for BLE advertisements.
///
/// Returns a receiver that yields one record per observed advertisement
/// until the scan task stops. Duplicate advertisements from the same beacon
/// are expected and flow through; the debounce filter deals with them.
pub async fn start_scan() -> Result<mpsc::Receiver<AdvertisementRecord>, ScanError> {
    #[cfg(feature = "bluer")]
    return bluer::start_scan().await;
    #[cfg(not(feature = "bluer"))]
    return Err(ScanError::NoBackend);
}
