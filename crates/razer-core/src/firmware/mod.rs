//! Firmware image handling: extraction from update files and IHEX decoding.

pub mod extract;
pub mod ihex;

pub use extract::{FirmwareError, FwDescriptor, FwFormat, extract, file_digest};
pub use ihex::IhexError;
