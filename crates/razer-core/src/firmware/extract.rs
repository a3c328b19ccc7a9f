//! Firmware image extraction from vendor update files.
//!
//! A vendor firmware updater bundles the device image somewhere inside a
//! larger binary blob. Known blobs are identified by their whole-file MD5
//! digest; the matching descriptor names the embedded region, its format,
//! and the length the decoded image must be truncated to.

use md5::{Digest, Md5};
use thiserror::Error;
use tracing::debug;

use super::ihex::{self, IhexError};

#[derive(Error, Debug)]
pub enum FirmwareError {
    #[error("Unsupported firmware file (digest {digest})")]
    UnsupportedFirmware { digest: String },
    #[error("Invalid firmware file format: region {start:#X}..={end:#X} exceeds {len} byte file")]
    InvalidFirmwareFormat {
        start: usize,
        end: usize,
        len: usize,
    },
    #[error("Firmware format {0} is not yet supported")]
    FormatNotSupported(FwFormat),
    #[error(transparent)]
    Ihex(#[from] IhexError),
}

/// Embedded firmware region formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FwFormat {
    Ihex,
    /// Known to exist in some updaters, decoding not implemented yet.
    Srec,
}

impl std::fmt::Display for FwFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FwFormat::Ihex => write!(f, "Intel-HEX"),
            FwFormat::Srec => write!(f, "SREC"),
        }
    }
}

/// Where and how a device image is embedded in an update file.
#[derive(Debug, Clone, Copy)]
pub struct FwDescriptor {
    /// Lower-case hex MD5 digest of the whole update file.
    pub digest: &'static str,
    /// First byte of the embedded region.
    pub start: usize,
    /// Last byte of the embedded region, inclusive.
    pub end: usize,
    pub format: FwFormat,
    /// Final image length, if the decoded image must be cut down.
    pub truncate: Option<usize>,
}

/// One entry per known device/firmware-version pair.
const FW_TABLE: &[FwDescriptor] = &[
    // DeathAdder 1.27
    FwDescriptor {
        digest: "92d7f44637858405a83c0f192c61388c",
        start: 0x14B28,
        end: 0x1D8F4,
        format: FwFormat::Ihex,
        truncate: Some(0x4000),
    },
];

/// Lower-case hex MD5 digest of a byte buffer.
pub fn file_digest(data: &[u8]) -> String {
    Md5::digest(data)
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Look up the descriptor for a digest.
pub fn lookup(digest: &str) -> Option<&'static FwDescriptor> {
    FW_TABLE.iter().find(|d| d.digest == digest)
}

/// Extract the device-ready firmware image from a raw update file.
pub fn extract(data: &[u8]) -> Result<Vec<u8>, FirmwareError> {
    let digest = file_digest(data);
    let descriptor = lookup(&digest).ok_or_else(|| FirmwareError::UnsupportedFirmware {
        digest: digest.clone(),
    })?;
    debug!(digest = %digest, format = %descriptor.format, "Matched firmware descriptor");
    extract_with(data, descriptor)
}

/// Extraction pipeline for one descriptor: slice, decode, truncate.
pub fn extract_with(data: &[u8], descriptor: &FwDescriptor) -> Result<Vec<u8>, FirmwareError> {
    if descriptor.end >= data.len() || descriptor.start > descriptor.end {
        return Err(FirmwareError::InvalidFirmwareFormat {
            start: descriptor.start,
            end: descriptor.end,
            len: data.len(),
        });
    }
    let region = &data[descriptor.start..=descriptor.end];

    let mut image = match descriptor.format {
        FwFormat::Ihex => ihex::parse(region)?,
        FwFormat::Srec => return Err(FirmwareError::FormatNotSupported(FwFormat::Srec)),
    };
    if let Some(limit) = descriptor.truncate {
        image.truncate(limit);
    }
    debug!(len = image.len(), "Firmware image extracted");
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference digests for the MD5 implementation.
    #[test]
    fn test_file_digest() {
        assert_eq!(file_digest(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(file_digest(b"abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_lookup_known_digest() {
        let descriptor = lookup("92d7f44637858405a83c0f192c61388c").unwrap();
        assert_eq!(descriptor.start, 0x14B28);
        assert_eq!(descriptor.format, FwFormat::Ihex);
    }

    #[test]
    fn test_unknown_file_rejected() {
        assert!(matches!(
            extract(b"definitely not a firmware update"),
            Err(FirmwareError::UnsupportedFirmware { .. })
        ));
    }

    #[test]
    fn test_extract_with_descriptor() {
        // Embed a small IHEX region in a blob and slice it back out.
        // The data record writes 11 22 33 44 at address 0; its byte sum is
        // 0xAE, so the checksum byte is 0x52.
        let hex = ":040000001122334452\n:00000001FF\n";
        let mut blob = vec![0xEEu8; 32];
        let start = blob.len();
        blob.extend_from_slice(hex.as_bytes());
        let end = blob.len() - 1;
        blob.extend_from_slice(&[0xEE; 16]);

        let descriptor = FwDescriptor {
            digest: "",
            start,
            end,
            format: FwFormat::Ihex,
            truncate: Some(3),
        };
        let image = extract_with(&blob, &descriptor).unwrap();
        assert_eq!(image, vec![0x11, 0x22, 0x33]);
    }

    #[test]
    fn test_region_out_of_range() {
        let descriptor = FwDescriptor {
            digest: "",
            start: 0,
            end: 100,
            format: FwFormat::Ihex,
            truncate: None,
        };
        assert!(matches!(
            extract_with(&[0u8; 50], &descriptor),
            Err(FirmwareError::InvalidFirmwareFormat { end: 100, len: 50, .. })
        ));
    }

    #[test]
    fn test_srec_not_supported() {
        let descriptor = FwDescriptor {
            digest: "",
            start: 0,
            end: 3,
            format: FwFormat::Srec,
            truncate: None,
        };
        assert!(matches!(
            extract_with(b"S123", &descriptor),
            Err(FirmwareError::FormatNotSupported(FwFormat::Srec))
        ));
    }
}
