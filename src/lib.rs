//! `swge-beacon-listener` library.
//!
//! The binary (`src/main.rs`) is responsible for CLI parsing and process exit codes.
//! The core “business logic” lives in [`crate::app`] where it can be tested
//! deterministically with injected scanner + injected output streams.

pub mod advertisement;
pub mod app;
pub mod beacon;
pub mod filter;
pub mod location;
pub mod output;
pub mod scanner;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the crate root
pub use advertisement::AdvertisementRecord;
pub use beacon::{
    DecodeError, EddystoneTlm, IBeacon, LocationBeacon, PayloadShape, classify,
    decode_eddystone_tlm, decode_ibeacon, decode_location_beacon,
};
pub use filter::{FilterDecision, ScanFilter, parse_duration};
pub use location::{Location, LocationReport};
pub use output::ReportFormatter;
pub use output::text::{DisplayFormatter, LineFormatter};
pub use scanner::ScanError;
